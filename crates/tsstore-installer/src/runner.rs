use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::CancelSignal;

const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("failed to start package manager")]
    Process(#[source] io::Error),
    #[error("setup timeout of {}s was exceeded", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },
    #[error("process exited with code {}", render_exit_code(.0))]
    ExitCode(Option<i32>),
}

fn render_exit_code(code: &Option<i32>) -> String {
    code.map(|code| code.to_string())
        .unwrap_or_else(|| "null".to_string())
}

/// Runs the package manager inside a prepared installation directory.
pub trait InstallRunner: Send + Sync {
    fn install(
        &self,
        cwd: &Path,
        timeout: Duration,
        signal: &CancelSignal,
    ) -> Result<(), InstallError>;
}

impl<F> InstallRunner for F
where
    F: Fn(&Path, Duration, &CancelSignal) -> Result<(), InstallError> + Send + Sync,
{
    fn install(
        &self,
        cwd: &Path,
        timeout: Duration,
        signal: &CancelSignal,
    ) -> Result<(), InstallError> {
        self(cwd, timeout, signal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInstallRunner {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandInstallRunner {
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn npm() -> Self {
        let program = if cfg!(windows) { "npm.cmd" } else { "npm" };
        Self::new(
            program,
            [
                "install",
                "--ignore-scripts",
                "--no-bin-links",
                "--no-package-lock",
            ],
        )
    }

    pub(crate) fn build_command(&self, cwd: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl Default for CommandInstallRunner {
    fn default() -> Self {
        Self::npm()
    }
}

impl InstallRunner for CommandInstallRunner {
    fn install(
        &self,
        cwd: &Path,
        timeout: Duration,
        signal: &CancelSignal,
    ) -> Result<(), InstallError> {
        let mut child = self
            .build_command(cwd)
            .spawn()
            .map_err(InstallError::Process)?;
        tracing::debug!(
            "spawned {} (pid {}) in {}",
            self.program.to_string_lossy(),
            child.id(),
            cwd.display()
        );

        // A timeout too large to represent never expires.
        let deadline = Instant::now().checked_add(timeout);
        let status = loop {
            if let Some(status) = child.try_wait().map_err(InstallError::Process)? {
                break status;
            }

            let now = Instant::now();
            let stop = match deadline {
                Some(deadline) if now >= deadline => true,
                Some(deadline) => signal.wait_timeout(CHILD_POLL_INTERVAL.min(deadline - now)),
                None => signal.wait_timeout(CHILD_POLL_INTERVAL),
            };
            if stop {
                // The child may have exited on its own in the meantime.
                if let Some(status) = child.try_wait().map_err(InstallError::Process)? {
                    break status;
                }
                let _ = child.kill();
                let _ = child.wait();
                tracing::debug!("terminated package manager in {}", cwd.display());
                return Err(InstallError::Timeout { timeout });
            }
        };

        exit_status_result(status)
    }
}

fn exit_status_result(status: ExitStatus) -> Result<(), InstallError> {
    if status.success() {
        return Ok(());
    }
    Err(InstallError::ExitCode(status.code()))
}
