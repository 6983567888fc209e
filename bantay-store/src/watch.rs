//! Live query subscriptions
//!
//! A watch is a standing query against one collection. Every commit that
//! touches the collection re-delivers the full matching result set to the
//! subscriber - events replace state, they are not deltas. Subscriptions
//! are explicitly cancelable and deregister themselves on drop so a
//! listener never outlives the screen that opened it.

use crate::document::Document;
use bantay_core::StoreError;
use serde_json::Value;
use std::cmp::Ordering;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

/// Sort direction for a query ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Standing query: one collection, an optional equality filter, optional
/// ordering and limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filter: Option<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    /// Query matching every document in a collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filter: None,
            order_by: None,
            limit: None,
        }
    }

    /// Keep only documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    /// Order results by `field`.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Cap the number of delivered documents.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document's fields satisfy the equality filter.
    pub fn matches(&self, fields: &Document) -> bool {
        match &self.filter {
            Some((field, expected)) => fields.get(field) == Some(expected),
            None => true,
        }
    }

    /// Order and truncate a raw result set. Without an explicit ordering,
    /// results sort by document id so snapshots are deterministic.
    pub fn arrange(&self, mut results: Vec<DocumentSnapshot>) -> Vec<DocumentSnapshot> {
        match &self.order_by {
            Some((field, direction)) => {
                results.sort_by(|a, b| {
                    let ord = compare_values(a.fields.get(field), b.fields.get(field));
                    match direction {
                        Direction::Ascending => ord,
                        Direction::Descending => ord.reverse(),
                    }
                });
            }
            None => results.sort_by(|a, b| a.id.cmp(&b.id)),
        }
        if let Some(limit) = self.limit {
            results.truncate(limit);
        }
        results
    }
}

/// One matching document: its id plus its current fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: String,
    pub fields: Document,
}

/// Event delivered to a watch subscriber.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// The full current result set for the query.
    Snapshot(Vec<DocumentSnapshot>),
    /// The listener faulted; no further snapshots will follow.
    Error(StoreError),
}

/// Total order over JSON field values for query ordering: null sorts
/// first, then booleans, numbers, strings; anything else compares equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// ============================================================================
// WATCHER REGISTRY
// ============================================================================

pub(crate) struct Watcher {
    pub id: u64,
    pub query: Query,
    pub tx: mpsc::UnboundedSender<WatchEvent>,
}

/// Registry of live watchers, shared between the store and the
/// subscriptions it hands out.
#[derive(Default)]
pub(crate) struct WatcherRegistry {
    watchers: Mutex<Vec<Watcher>>,
    next_id: AtomicU64,
}

impl WatcherRegistry {
    /// Register a watcher and hand back its subscription half.
    pub fn register(self: &Arc<Self>, query: Query) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        let collection = query.collection.clone();
        self.lock().push(Watcher { id, query, tx });
        debug!(collection = %collection, watcher = id, "Watch registered");
        Subscription {
            id,
            collection,
            rx,
            registry: Arc::clone(self),
        }
    }

    /// Drop a watcher by id.
    pub fn remove(&self, id: u64) {
        self.lock().retain(|w| w.id != id);
    }

    /// Snapshot the watchers interested in a collection.
    pub fn watchers_for(&self, collection: &str) -> Vec<(u64, Query, mpsc::UnboundedSender<WatchEvent>)> {
        self.lock()
            .iter()
            .filter(|w| w.query.collection == collection)
            .map(|w| (w.id, w.query.clone(), w.tx.clone()))
            .collect()
    }

    /// Drop watchers whose receivers have gone away.
    pub fn prune(&self, dead: &[u64]) {
        if !dead.is_empty() {
            self.lock().retain(|w| !dead.contains(&w.id));
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Watcher>> {
        self.watchers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

/// Receiving half of a watch: a long-lived, cancelable event stream.
///
/// Exactly one subscription should be alive per open tracking view. The
/// watcher deregisters on `unsubscribe` or drop, whichever comes first.
pub struct Subscription {
    id: u64,
    collection: String,
    rx: mpsc::UnboundedReceiver<WatchEvent>,
    registry: Arc<WatcherRegistry>,
}

impl Subscription {
    /// Await the next event. `None` means the store side shut down.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.rx.recv().await
    }

    /// Tear the subscription down explicitly.
    pub fn unsubscribe(self) {
        // Drop does the deregistration.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
        debug!(collection = %self.collection, watcher = self.id, "Watch deregistered");
    }
}

impl Stream for Subscription {
    type Item = WatchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// =============================================================================
// TESTS
// =============================================================================
