use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A cloneable cancellation handle shared between the caller and the blocking
/// waits inside the installer. Cancelling wakes every waiter at once.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    inner: Arc<SignalState>,
}

#[derive(Debug, Default)]
struct SignalState {
    cancelled: Mutex<bool>,
    changed: Condvar,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.lock_state();
        *cancelled = true;
        self.inner.changed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock_state()
    }

    /// Blocks for at most `timeout`, returning early if the signal fires.
    /// Returns whether the signal is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut cancelled = self.lock_state();
        while !*cancelled {
            let now = Instant::now();
            let remaining = match deadline {
                Some(deadline) if now >= deadline => break,
                Some(deadline) => deadline - now,
                None => timeout,
            };
            cancelled = match self.inner.changed.wait_timeout(cancelled, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        *cancelled
    }

    fn lock_state(&self) -> MutexGuard<'_, bool> {
        // A poisoned flag is still a valid bool.
        self.inner
            .cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
