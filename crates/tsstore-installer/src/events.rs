//! Process-wide notification registry.
//!
//! Installers publish events here without knowing who, if anyone, listens.
//! Handlers run synchronously on the dispatching thread and cannot influence
//! the dispatcher.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A real installation attempt is starting.
    Info {
        compiler_version: String,
        installation_path: PathBuf,
    },
}

impl StoreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Info { .. } => "store:info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

fn handlers() -> &'static Mutex<Vec<(HandlerId, Handler)>> {
    static HANDLERS: OnceLock<Mutex<Vec<(HandlerId, Handler)>>> = OnceLock::new();
    HANDLERS.get_or_init(|| Mutex::new(Vec::new()))
}

pub fn add_handler<F>(handler: F) -> HandlerId
where
    F: Fn(&StoreEvent) + Send + Sync + 'static,
{
    let id = HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed));
    handlers()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push((id, Arc::new(handler)));
    id
}

pub fn remove_handler(id: HandlerId) -> bool {
    let mut registered = handlers()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = registered.len();
    registered.retain(|(handler_id, _)| *handler_id != id);
    registered.len() != before
}

pub fn dispatch(event: &StoreEvent) {
    // Snapshot first so handlers may add or remove handlers themselves.
    let snapshot = handlers()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .iter()
        .map(|(_, handler)| Arc::clone(handler))
        .collect::<Vec<_>>();

    tracing::trace!(
        "dispatching {} to {} handler(s)",
        event.name(),
        snapshot.len()
    );
    for handler in snapshot {
        handler(event);
    }
}
