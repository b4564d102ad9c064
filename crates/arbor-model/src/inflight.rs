use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::node::NodeKey;
use crate::ModelError;

type Outcome = Option<Result<(), ModelError>>;

struct Entry {
    id: u64,
    token: CancellationToken,
    done: watch::Sender<Outcome>,
}

struct RegistryInner {
    next_id: AtomicU64,
    entries: Mutex<HashMap<NodeKey, Entry>>,
}

/// At-most-one in-flight refresh per node key.
///
/// The first caller for a key gets a [`RefreshGuard`] and performs the work;
/// later callers get a receiver that resolves to the initiator's outcome.
/// Entries are removed id-checked so a guard finishing late never evicts a
/// successor registered under the same key.
#[derive(Clone)]
pub(crate) struct InflightRegistry {
    inner: Arc<RegistryInner>,
}

pub(crate) enum Begin {
    Started(RefreshGuard),
    Coalesced(watch::Receiver<Outcome>),
}

pub(crate) struct RefreshGuard {
    registry: InflightRegistry,
    key: NodeKey,
    id: u64,
    token: CancellationToken,
    done: watch::Sender<Outcome>,
    completed: bool,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                next_id: AtomicU64::new(1),
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn begin(&self, key: NodeKey) -> Begin {
        let mut entries = self.inner.entries.lock();
        if let Some(existing) = entries.get(&key) {
            return Begin::Coalesced(existing.done.subscribe());
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let (done, _) = watch::channel(None);
        entries.insert(
            key.clone(),
            Entry {
                id,
                token: token.clone(),
                done: done.clone(),
            },
        );
        Begin::Started(RefreshGuard {
            registry: self.clone(),
            key,
            id,
            token,
            done,
            completed: false,
        })
    }

    /// Cancel every in-flight refresh whose node lives under `prefix`.
    /// Used when a workspace folder closes.
    pub fn cancel_under(&self, prefix: &Path) {
        let entries = self.inner.entries.lock();
        for (key, entry) in entries.iter() {
            if key.path.starts_with(prefix) {
                entry.token.cancel();
            }
        }
    }

    fn finish(&self, key: &NodeKey, id: u64) {
        let mut entries = self.inner.entries.lock();
        if let Some(current) = entries.get(key) {
            if current.id == id {
                entries.remove(key);
            }
        }
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.inner.entries.lock().len()
    }
}

impl RefreshGuard {
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn complete(mut self, result: Result<(), ModelError>) {
        let _ = self.done.send(Some(result));
        self.completed = true;
        self.registry.finish(&self.key, self.id);
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        if !self.completed {
            let _ = self.done.send(Some(Err(ModelError::Cancelled)));
            self.registry.finish(&self.key, self.id);
        }
    }
}

/// Wait for an in-flight refresh someone else started.
pub(crate) async fn await_coalesced(
    mut rx: watch::Receiver<Outcome>,
) -> Result<(), ModelError> {
    match rx.wait_for(|outcome| outcome.is_some()).await {
        Ok(outcome) => outcome.clone().unwrap_or(Err(ModelError::Cancelled)),
        Err(_) => Err(ModelError::Cancelled),
    }
}
