use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tsstore_core::Diagnostic;

use crate::fs_utils::remove_file_if_exists;
use crate::layout::lock_path_for;
use crate::CancelSignal;

pub const DEFAULT_LOCK_POLL_INTERVAL: Duration = Duration::from_secs(1);

static NEXT_LOCK_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("lock is held by another installer: {}", .0.display())]
    Held(PathBuf),
    #[error("waiting for lock was cancelled")]
    Cancelled,
    #[error("failed to claim lock: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct LockWaitOptions<'a> {
    /// Age after which a lock counts as abandoned. Also bounds the wait itself.
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub signal: Option<&'a CancelSignal>,
    pub on_diagnostic: &'a dyn Fn(Diagnostic),
}

/// Advisory cross-process lock over one installation path.
///
/// Ownership is established by exclusively creating the lock file and ends
/// when the value is released or dropped. The file holds an owner token;
/// release only removes a file that still carries this owner's token, so a
/// superseded owner cannot delete its successor's lock.
#[derive(Debug)]
pub struct Lock {
    path: PathBuf,
    token: String,
    released: bool,
}

impl Lock {
    pub fn acquire(installation_path: &Path) -> Result<Self, LockError> {
        let path = lock_path_for(installation_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| LockError::Io {
                path: path.clone(),
                source,
            })?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LockError::Held(path));
            }
            Err(source) => return Err(LockError::Io { path, source }),
        };

        let token = owner_token();
        if let Err(source) = file
            .write_all(format!("{token}\n").as_bytes())
            .and_then(|()| file.flush())
        {
            drop(file);
            let _ = remove_file_if_exists(&path);
            return Err(LockError::Io { path, source });
        }
        tracing::debug!("acquired lock {}", path.display());

        Ok(Self {
            path,
            token,
            released: false,
        })
    }

    /// Waits while `installation_path` is locked by someone else.
    ///
    /// Returns `Ok(false)` once the lock is gone, either because its owner
    /// released it or because it was removed here after the lock's age, or
    /// the time spent waiting, reached `timeout`. Returns `Ok(true)` only
    /// when a stale lock could not be removed.
    pub fn is_locked(
        installation_path: &Path,
        options: LockWaitOptions<'_>,
    ) -> Result<bool, LockError> {
        let lock_path = lock_path_for(installation_path);
        let wait_started = Instant::now();

        loop {
            let Some(lock_age) = lock_age(&lock_path) else {
                return Ok(false);
            };

            if options.signal.is_some_and(CancelSignal::is_cancelled) {
                return Err(LockError::Cancelled);
            }

            // Clock skew or unreadable metadata must not make the wait unbounded.
            let age = lock_age.max(wait_started.elapsed());
            if age >= options.timeout {
                let seconds = options.timeout.as_secs_f64();
                return match remove_file_if_exists(&lock_path) {
                    Ok(()) => {
                        tracing::warn!("removed stale lock {}", lock_path.display());
                        (options.on_diagnostic)(Diagnostic::warning([format!(
                            "Lock wait timeout of {seconds}s was exceeded; removed stale lock '{}'.",
                            lock_path.display()
                        )]));
                        Ok(false)
                    }
                    Err(err) => {
                        (options.on_diagnostic)(Diagnostic::error([format!(
                            "Lock wait timeout of {seconds}s was exceeded; failed to remove stale lock '{}': {err}",
                            lock_path.display()
                        )]));
                        Ok(true)
                    }
                };
            }

            let wait = options.poll_interval.min(options.timeout - age);
            match options.signal {
                Some(signal) => {
                    if signal.wait_timeout(wait) {
                        return Err(LockError::Cancelled);
                    }
                }
                None => thread::sleep(wait),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the lock file if it is still ours. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim() == self.token => {}
            Ok(_) => {
                tracing::warn!(
                    "lock {} was superseded by another owner; leaving it in place",
                    self.path.display()
                );
                return;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => return,
            Err(err) => {
                tracing::warn!("failed to read lock {}: {err}", self.path.display());
                return;
            }
        }

        match remove_file_if_exists(&self.path) {
            Ok(()) => tracing::debug!("released lock {}", self.path.display()),
            Err(err) => tracing::warn!("failed to release lock {}: {err}", self.path.display()),
        }
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        self.release();
    }
}

fn owner_token() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let sequence = NEXT_LOCK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{nanos}-{sequence}", std::process::id())
}

fn lock_age(lock_path: &Path) -> Option<Duration> {
    let metadata = match fs::metadata(lock_path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(_) => return Some(Duration::ZERO),
    };
    let age = metadata
        .modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .unwrap_or(Duration::ZERO);
    Some(age)
}
