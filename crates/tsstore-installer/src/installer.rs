use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tsstore_core::{validate_version_tag, DependencyManifest, Diagnostic, DiagnosticCategory};

use crate::config::DEFAULT_TIMEOUT;
use crate::events::{self, StoreEvent};
use crate::lock::{Lock, LockError, LockWaitOptions, DEFAULT_LOCK_POLL_INTERVAL};
use crate::{CancelSignal, CommandInstallRunner, InstallRunner, StoreLayout};

type DiagnosticHandler = Box<dyn Fn(Diagnostic) + Send + Sync>;

/// Installs compiler versions into a shared store, once per version, across
/// any number of cooperating processes.
///
/// Failures never escape [`PackageInstaller::ensure`]; they are delivered to
/// the diagnostic handler and the call yields `None`.
pub struct PackageInstaller {
    layout: StoreLayout,
    timeout: Duration,
    poll_interval: Duration,
    runner: Box<dyn InstallRunner>,
    on_diagnostic: DiagnosticHandler,
}

impl PackageInstaller {
    pub fn new<D>(layout: StoreLayout, on_diagnostic: D) -> Self
    where
        D: Fn(Diagnostic) + Send + Sync + 'static,
    {
        Self {
            layout,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_LOCK_POLL_INTERVAL,
            runner: Box::new(CommandInstallRunner::npm()),
            on_diagnostic: Box::new(on_diagnostic),
        }
    }

    /// Bounds both the lock wait and the package manager run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_runner<R>(mut self, runner: R) -> Self
    where
        R: InstallRunner + 'static,
    {
        self.runner = Box::new(runner);
        self
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The entry module of an already installed version.
    pub fn module_path(&self, compiler_version: &str) -> Option<PathBuf> {
        if validate_version_tag(compiler_version).is_err() || !self.layout.is_ready(compiler_version)
        {
            return None;
        }
        Some(self.layout.module_path(compiler_version))
    }

    pub fn ensure(&self, compiler_version: &str, signal: Option<&CancelSignal>) -> Option<PathBuf> {
        let summary = failure_summary(compiler_version);
        if let Err(err) = validate_version_tag(compiler_version) {
            self.report(Diagnostic::from_error(summary, &err));
            return None;
        }

        let installation_path = self.layout.installation_path(compiler_version);
        let module_path = self.layout.module_path(compiler_version);

        if self.layout.is_ready(compiler_version) {
            tracing::debug!("typescript@{compiler_version} is already installed");
            return Some(module_path);
        }

        let mut lock = self.claim_lock(compiler_version, &installation_path, signal)?;

        events::dispatch(&StoreEvent::Info {
            compiler_version: compiler_version.to_string(),
            installation_path: installation_path.clone(),
        });
        tracing::info!(
            "installing typescript@{compiler_version} into {}",
            installation_path.display()
        );

        let fallback_signal = CancelSignal::new();
        let result = self.install(
            compiler_version,
            &installation_path,
            signal.unwrap_or(&fallback_signal),
        );
        lock.release();

        match result {
            Ok(()) => {
                tracing::info!("installed typescript@{compiler_version}");
                Some(module_path)
            }
            Err(err) => {
                tracing::warn!("failed to install typescript@{compiler_version}: {err:#}");
                self.report(Diagnostic::from_error(summary, &err));
                None
            }
        }
    }

    /// Waits for other installers, then claims the lock. Losing the claim to
    /// a concurrent installer sends us back to waiting.
    fn claim_lock(
        &self,
        compiler_version: &str,
        installation_path: &Path,
        signal: Option<&CancelSignal>,
    ) -> Option<Lock> {
        let summary = failure_summary(compiler_version);
        let on_lock_diagnostic = |diagnostic: Diagnostic| {
            let heading = match diagnostic.category {
                DiagnosticCategory::Error => summary.clone(),
                DiagnosticCategory::Warning => {
                    format!("Recovered a stale lock for 'typescript@{compiler_version}'.")
                }
            };
            let mut text = vec![heading];
            text.extend(diagnostic.text);
            self.report(Diagnostic {
                category: diagnostic.category,
                text,
            });
        };

        loop {
            let wait = Lock::is_locked(
                installation_path,
                LockWaitOptions {
                    timeout: self.timeout,
                    poll_interval: self.poll_interval,
                    signal,
                    on_diagnostic: &on_lock_diagnostic,
                },
            );
            match wait {
                Ok(false) => {}
                Ok(true) => return None,
                Err(err) => {
                    self.report(Diagnostic::from_error(
                        summary.clone(),
                        &anyhow::Error::new(err),
                    ));
                    return None;
                }
            }

            match Lock::acquire(installation_path) {
                Ok(lock) => return Some(lock),
                Err(LockError::Held(path)) => {
                    tracing::debug!("lock {} was claimed concurrently", path.display());
                }
                Err(err) => {
                    self.report(Diagnostic::from_error(
                        summary.clone(),
                        &anyhow::Error::new(err),
                    ));
                    return None;
                }
            }
        }
    }

    fn install(
        &self,
        compiler_version: &str,
        installation_path: &Path,
        signal: &CancelSignal,
    ) -> Result<()> {
        fs::create_dir_all(installation_path).with_context(|| {
            format!(
                "failed to create installation directory: {}",
                installation_path.display()
            )
        })?;

        let manifest_path = self.layout.manifest_path(compiler_version);
        let manifest = DependencyManifest::for_compiler(compiler_version).to_json_pretty()?;
        fs::write(&manifest_path, manifest).with_context(|| {
            format!(
                "failed to write dependency manifest: {}",
                manifest_path.display()
            )
        })?;

        self.runner
            .install(installation_path, self.timeout, signal)
            .context("failed to run package manager")?;

        let ready_marker_path = self.layout.ready_marker_path(compiler_version);
        fs::write(&ready_marker_path, b"").with_context(|| {
            format!(
                "failed to write ready marker: {}",
                ready_marker_path.display()
            )
        })?;
        Ok(())
    }

    fn report(&self, diagnostic: Diagnostic) {
        (self.on_diagnostic)(diagnostic);
    }
}

fn failure_summary(compiler_version: &str) -> String {
    format!("Failed to install 'typescript@{compiler_version}'.")
}
