mod cancel;
mod config;
pub mod events;
mod fs_utils;
mod installer;
mod layout;
mod lock;
mod runner;

pub use cancel::CancelSignal;
pub use config::{
    parse_timeout_secs, StoreConfig, DEFAULT_TIMEOUT, MAX_TIMEOUT_SECS, STORE_PATH_ENV, TIMEOUT_ENV,
};
pub use events::{HandlerId, StoreEvent};
pub use installer::PackageInstaller;
pub use layout::{default_store_path, lock_path_for, StoreLayout};
pub use lock::{Lock, LockError, LockWaitOptions, DEFAULT_LOCK_POLL_INTERVAL};
pub use runner::{CommandInstallRunner, InstallError, InstallRunner};
