use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::error::FetchError;
use crate::record::Listable;
use crate::store::{Document, DocumentStore};

#[derive(Debug, Clone)]
pub struct FetchOutcome<R> {
    pub records: Vec<R>,
    /// Documents dropped as invalid or duplicate.
    pub rejected: usize,
}

/// Pulls the vertical's whole collection and validates it into typed records.
pub async fn fetch_records<R: Listable>(
    store: &dyn DocumentStore,
) -> Result<FetchOutcome<R>, FetchError> {
    let collection = R::VERTICAL.collection();
    let docs = store.fetch_collection(collection).await?;
    let outcome = decode_records(collection, &docs);
    tracing::debug!(
        collection,
        records = outcome.records.len(),
        rejected = outcome.rejected,
        "collection fetched"
    );
    Ok(outcome)
}

/// Keeps store order. The first document wins when ids repeat.
pub fn decode_records<R: Listable>(collection: &str, docs: &[Document]) -> FetchOutcome<R> {
    let mut seen: HashSet<String> = HashSet::with_capacity(docs.len());
    let mut records = Vec::with_capacity(docs.len());
    let mut rejected = 0usize;
    for doc in docs {
        match R::from_document(doc) {
            Ok(r) => {
                if seen.insert(r.id().to_string()) {
                    records.push(r);
                } else {
                    tracing::warn!(collection, id = r.id(), "duplicate document id, keeping first");
                    rejected += 1;
                }
            }
            Err(e) => {
                tracing::warn!(collection, "rejecting document: {e}");
                rejected += 1;
            }
        }
    }
    FetchOutcome { records, rejected }
}

/// Where a listing's data is in its lifecycle.
#[derive(Debug, Clone)]
pub enum LoadState<R> {
    Loading,
    Failed(Arc<FetchError>),
    Ready(Vec<R>),
}

impl<R> LoadState<R> {
    /// The record set; empty unless the fetch completed.
    pub fn records(&self) -> &[R] {
        match self {
            LoadState::Ready(r) => r,
            LoadState::Loading | LoadState::Failed(_) => &[],
        }
    }
}

/// An unclaimed result older than this is discarded and fetched again.
const RESULT_TTL: Duration = Duration::from_secs(30);

type Shared = Result<Arc<Vec<Document>>, Arc<FetchError>>;

#[derive(Debug, Clone)]
struct Completed {
    at: Instant,
    result: Shared,
}

#[derive(Debug)]
struct Slot {
    id: u64,
    rx: watch::Receiver<Option<Completed>>,
    abort: AbortHandle,
    waiters: usize,
    /// Set once a request gave up waiting; the fetch then runs to completion
    /// and its result is kept for the next request.
    detached: bool,
}

/// One in-flight pull per collection, shared by every request that needs it.
///
/// A request that hits its render deadline leaves the fetch running. The next
/// request for the same collection joins it, or takes its result if it has
/// already finished. A fetch is aborted only when every request waiting on it
/// is dropped before any of them gave up.
#[derive(Clone)]
pub struct FetchHub {
    store: Arc<dyn DocumentStore>,
    slots: Arc<Mutex<HashMap<&'static str, Slot>>>,
    next_id: Arc<AtomicU64>,
}

impl FetchHub {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Waits at most `deadline` for the vertical's collection.
    pub async fn load<R: Listable>(&self, deadline: Duration) -> LoadState<R> {
        let collection = R::VERTICAL.collection();
        let mut waiter = self.join(collection);
        match waiter.wait(deadline).await {
            None => {
                tracing::warn!(collection, "fetch exceeded {:?}, rendering placeholder", deadline);
                LoadState::Loading
            }
            Some(Err(e)) => LoadState::Failed(e),
            Some(Ok(docs)) => LoadState::Ready(decode_records(collection, &docs).records),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join(&self, collection: &'static str) -> Waiter {
        let mut slots = self.lock();
        if let Some(slot) = slots.get_mut(collection) {
            let stale = match &*slot.rx.borrow() {
                Some(done) => done.at.elapsed() > RESULT_TTL,
                None => false,
            };
            if !stale {
                slot.waiters += 1;
                return Waiter::new(self.clone(), collection, slot.id, slot.rx.clone());
            }
            slots.remove(collection);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(None);
        let store = self.store.clone();
        let handle = tokio::spawn(async move {
            let result = store
                .fetch_collection(collection)
                .await
                .map(Arc::new)
                .map_err(Arc::new);
            tx.send_replace(Some(Completed {
                at: Instant::now(),
                result,
            }));
        });
        slots.insert(
            collection,
            Slot {
                id,
                rx: rx.clone(),
                abort: handle.abort_handle(),
                waiters: 1,
                detached: false,
            },
        );
        tracing::debug!(collection, id, "collection fetch started");
        Waiter::new(self.clone(), collection, id, rx)
    }
}

#[derive(Debug, Clone, Copy)]
enum Release {
    Delivered,
    GaveUp,
    Dropped,
}

/// One request's interest in a shared fetch.
struct Waiter {
    hub: FetchHub,
    collection: &'static str,
    id: u64,
    rx: watch::Receiver<Option<Completed>>,
    released: bool,
}

impl Waiter {
    fn new(
        hub: FetchHub,
        collection: &'static str,
        id: u64,
        rx: watch::Receiver<Option<Completed>>,
    ) -> Self {
        Self {
            hub,
            collection,
            id,
            rx,
            released: false,
        }
    }

    async fn wait(&mut self, deadline: Duration) -> Option<Shared> {
        let outcome = match tokio::time::timeout(deadline, self.rx.wait_for(|v| v.is_some())).await
        {
            Ok(Ok(done)) => (*done).as_ref().map(|c| c.result.clone()),
            Ok(Err(_)) => Some(Err(Arc::new(FetchError::Cancelled))),
            Err(_) => None,
        };
        let how = if outcome.is_some() {
            Release::Delivered
        } else {
            Release::GaveUp
        };
        self.release(how);
        outcome
    }

    fn release(&mut self, how: Release) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }
        let mut slots = self.hub.lock();
        let Some(slot) = slots.get_mut(self.collection) else {
            return;
        };
        if slot.id != self.id {
            return;
        }
        slot.waiters = slot.waiters.saturating_sub(1);
        match how {
            Release::Delivered => {
                slots.remove(self.collection);
            }
            Release::GaveUp => slot.detached = true,
            Release::Dropped => {
                let pending = slot.rx.borrow().is_none();
                if slot.waiters == 0 && !slot.detached && pending {
                    slot.abort.abort();
                    slots.remove(self.collection);
                    tracing::debug!(collection = self.collection, "fetch cancelled, no request waiting");
                }
            }
        }
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        self.release(Release::Dropped);
    }
}
