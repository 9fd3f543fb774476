use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tsstore_core::Diagnostic;

use crate::{default_store_path, PackageInstaller, StoreLayout};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;
pub const STORE_PATH_ENV: &str = "TSSTORE_STORE_PATH";
pub const TIMEOUT_ENV: &str = "TSSTORE_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub store_path: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreConfigFile {
    store_path: Option<PathBuf>,
    timeout: Option<u64>,
}

impl StoreConfig {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Defaults, then `config_file`, then the process environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with(config_file, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(config_file: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut store_path = None;
        let mut timeout = DEFAULT_TIMEOUT;

        if let Some(config_path) = config_file {
            let raw = fs::read_to_string(config_path).with_context(|| {
                format!("failed to read config file: {}", config_path.display())
            })?;
            let file: StoreConfigFile = toml::from_str(&raw).with_context(|| {
                format!("failed to parse config file: {}", config_path.display())
            })?;

            if let Some(path) = file.store_path {
                // Relative paths are relative to the config file itself.
                store_path = Some(match config_path.parent() {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path,
                });
            }
            if let Some(seconds) = file.timeout {
                timeout = timeout_from_secs(seconds).with_context(|| {
                    format!("invalid timeout in config file: {}", config_path.display())
                })?;
            }
        }

        if let Some(raw) = lookup(STORE_PATH_ENV).filter(|value| !value.trim().is_empty()) {
            store_path = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            timeout = parse_timeout_secs(&raw).with_context(|| format!("invalid {TIMEOUT_ENV}"))?;
        }

        let store_path = match store_path {
            Some(path) => path,
            None => default_store_path()?,
        };
        Ok(Self {
            store_path,
            timeout,
        })
    }

    pub fn layout(&self) -> StoreLayout {
        StoreLayout::new(&self.store_path)
    }

    pub fn installer<D>(&self, on_diagnostic: D) -> PackageInstaller
    where
        D: Fn(Diagnostic) + Send + Sync + 'static,
    {
        PackageInstaller::new(self.layout(), on_diagnostic).with_timeout(self.timeout)
    }
}

pub fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    let seconds = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("timeout must be a whole number of seconds: '{raw}'"))?;
    timeout_from_secs(seconds)
}

fn timeout_from_secs(seconds: u64) -> Result<Duration> {
    if seconds == 0 {
        return Err(anyhow!("timeout must be greater than zero"));
    }
    if seconds > MAX_TIMEOUT_SECS {
        return Err(anyhow!(
            "timeout must not exceed {MAX_TIMEOUT_SECS} seconds: {seconds}"
        ));
    }
    Ok(Duration::from_secs(seconds))
}
