mod completion;
mod dispatch;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tsstore_installer::parse_timeout_secs;

use crate::completion::CliCompletionShell;

const LOG_ENV: &str = "TSSTORE_LOG";

#[derive(Parser, Debug)]
#[command(name = "tsstore")]
#[command(about = "Shared store of TypeScript compiler versions for type tests", long_about = None)]
struct Cli {
    /// Store root; overrides the config file and TSSTORE_STORE_PATH.
    #[arg(long, global = true)]
    store_path: Option<PathBuf>,
    /// Seconds to wait for a lock or an install; overrides TSSTORE_TIMEOUT.
    #[arg(long, global = true, value_parser = parse_timeout_arg)]
    timeout: Option<Duration>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install compiler versions that are not in the store yet.
    Install {
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Print the entry module of an installed version.
    Path { version: String },
    /// List installed versions.
    List,
    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Option<CliCompletionShell>,
    },
}

fn parse_timeout_arg(raw: &str) -> std::result::Result<Duration, String> {
    parse_timeout_secs(raw).map_err(|err| format!("{err:#}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    dispatch::run_cli(Cli::parse())
}

#[cfg(test)]
mod tests;
