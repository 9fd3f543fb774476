use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tsstore_core::compare_version_tags;

const READY_MARKER_FILE_NAME: &str = "__ready__";
const LOCK_SUFFIX: &str = "__lock__";
const MANIFEST_FILE_NAME: &str = "package.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn installation_path(&self, version_tag: &str) -> PathBuf {
        self.root.join(version_tag)
    }

    pub fn ready_marker_path(&self, version_tag: &str) -> PathBuf {
        self.installation_path(version_tag)
            .join(READY_MARKER_FILE_NAME)
    }

    pub fn manifest_path(&self, version_tag: &str) -> PathBuf {
        self.installation_path(version_tag).join(MANIFEST_FILE_NAME)
    }

    pub fn module_path(&self, version_tag: &str) -> PathBuf {
        self.installation_path(version_tag)
            .join("node_modules")
            .join("typescript")
            .join("lib")
            .join("typescript.js")
    }

    pub fn lock_path(&self, version_tag: &str) -> PathBuf {
        lock_path_for(&self.installation_path(version_tag))
    }

    pub fn is_ready(&self, version_tag: &str) -> bool {
        self.ready_marker_path(version_tag).is_file()
    }

    /// Version tags with a ready marker, in version order.
    pub fn installed_versions(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read store directory: {}", self.root.display())
                });
            }
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| {
                format!("failed to read store directory: {}", self.root.display())
            })?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(version_tag) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if self.is_ready(&version_tag) {
                versions.push(version_tag);
            }
        }

        versions.sort_by(|a, b| compare_version_tags(a, b));
        Ok(versions)
    }
}

/// The lock artifact sits next to the installation directory so it can be
/// claimed before that directory exists.
pub fn lock_path_for(installation_path: &Path) -> PathBuf {
    let mut raw = installation_path.as_os_str().to_os_string();
    raw.push(LOCK_SUFFIX);
    PathBuf::from(raw)
}

pub fn default_store_path() -> Result<PathBuf> {
    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows store path")?;
        return Ok(PathBuf::from(app_data).join("tsstore"));
    }

    if let Some(cache_home) = std::env::var_os("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
        if !cfg!(target_os = "macos") {
            return Ok(PathBuf::from(cache_home).join("tsstore"));
        }
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve store path")?;
    if cfg!(target_os = "macos") {
        return Ok(PathBuf::from(home)
            .join("Library")
            .join("Caches")
            .join("tsstore"));
    }
    Ok(PathBuf::from(home).join(".cache").join("tsstore"))
}
