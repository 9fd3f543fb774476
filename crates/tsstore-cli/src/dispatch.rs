use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use indicatif::ProgressBar;
use tsstore_core::Diagnostic;
use tsstore_installer::events::{self, StoreEvent};
use tsstore_installer::StoreConfig;

use crate::completion::{resolve_completion_shell, write_completions_script};
use crate::render::TerminalRenderer;
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let shell_env = std::env::var("SHELL").ok();
        let shell = resolve_completion_shell(shell, shell_env.as_deref(), cfg!(windows));
        return write_completions_script(shell, &mut io::stdout().lock());
    }

    let config = resolve_config(&cli)?;
    tracing::debug!(
        "store {} with timeout {}s",
        config.store_path.display(),
        config.timeout.as_secs()
    );
    let renderer = TerminalRenderer::current();

    match cli.command {
        Commands::Install { versions } => run_install_command(&config, renderer, &versions),
        Commands::Path { version } => {
            let installer = config.installer(|_| {});
            let Some(module_path) = installer.module_path(&version) else {
                return Err(anyhow!(
                    "typescript@{version} is not installed in {}",
                    config.store_path.display()
                ));
            };
            println!("{}", module_path.display());
            Ok(())
        }
        Commands::List => {
            let versions = config.layout().installed_versions()?;
            if versions.is_empty() {
                println!("No installed versions");
            }
            renderer.print_lines(&versions);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

pub(crate) fn resolve_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = StoreConfig::load(cli.config.as_deref())?;
    if let Some(store_path) = &cli.store_path {
        config.store_path = store_path.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    Ok(config)
}

fn run_install_command(
    config: &StoreConfig,
    renderer: TerminalRenderer,
    versions: &[String],
) -> Result<()> {
    let diagnostics = Arc::new(Mutex::new(Vec::<Diagnostic>::new()));
    let installer = {
        let diagnostics = Arc::clone(&diagnostics);
        config.installer(move |diagnostic| {
            diagnostics
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(diagnostic);
        })
    };

    let spinner = Arc::new(Mutex::new(None::<ProgressBar>));
    let handler_id = {
        let spinner = Arc::clone(&spinner);
        events::add_handler(move |event| {
            let StoreEvent::Info {
                compiler_version, ..
            } = event;
            if let Some(progress) =
                renderer.start_spinner(&format!("installing typescript@{compiler_version}"))
            {
                *spinner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(progress);
            }
        })
    };

    let mut failed = Vec::new();
    for version in versions {
        let module_path = installer.ensure(version, None);

        if let Some(progress) = spinner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            progress.finish_and_clear();
        }
        let reported = std::mem::take(
            &mut *diagnostics
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for diagnostic in &reported {
            renderer.print_diagnostic(diagnostic);
        }

        match module_path {
            Some(path) => renderer.print_status("ok", &format!("{version} {}", path.display())),
            None => failed.push(version.as_str()),
        }
    }
    events::remove_handler(handler_id);

    if !failed.is_empty() {
        return Err(anyhow!("failed to install: {}", failed.join(", ")));
    }
    Ok(())
}
