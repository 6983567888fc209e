//! In-memory document store
//!
//! Complete in-process implementation of the `DocumentStore` trait:
//! versioned documents under a read-write lock, optimistic-concurrency
//! transactions with a bounded retry budget, and full-result-set watch
//! fan-out on every commit. Doubles as the test double for every flow in
//! the workspace.

use crate::document::{merge_fields, Document};
use crate::watch::{DocumentSnapshot, Query, Subscription, WatchEvent, WatcherRegistry};
use crate::{DocumentStore, TxApply};
use async_trait::async_trait;
use bantay_core::{StoreError, StoreResult, TxRetryConfig};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct VersionedDoc {
    fields: Document,
    version: u64,
}

type Collections = HashMap<String, HashMap<String, VersionedDoc>>;

/// In-memory document store with live watches.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    watchers: Arc<WatcherRegistry>,
    retry: TxRetryConfig,
}

impl MemoryStore {
    /// Create a store with the default transaction retry budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with an explicit transaction retry budget.
    pub fn with_retry(retry: TxRetryConfig) -> Self {
        Self {
            retry,
            ..Self::default()
        }
    }

    /// Number of documents currently held in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.read()
            .map(|c| c.get(collection).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Collections>> {
        self.collections.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.collections.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Deliver the full current result set to every watcher of a
    /// collection, pruning watchers whose receivers have gone away.
    fn notify(&self, collection: &str) {
        let docs: Vec<DocumentSnapshot> = match self.read() {
            Ok(collections) => collections
                .get(collection)
                .map(|coll| {
                    coll.iter()
                        .map(|(id, doc)| DocumentSnapshot {
                            id: id.clone(),
                            fields: doc.fields.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Err(_) => {
                warn!(collection, "Skipping watch fan-out: store lock poisoned");
                return;
            }
        };

        let mut dead = Vec::new();
        for (id, query, tx) in self.watchers.watchers_for(collection) {
            let matching: Vec<DocumentSnapshot> = docs
                .iter()
                .filter(|snap| query.matches(&snap.fields))
                .cloned()
                .collect();
            let arranged = query.arrange(matching);
            debug!(
                collection,
                watcher = id,
                results = arranged.len(),
                "Watch fan-out"
            );
            if tx.send(WatchEvent::Snapshot(arranged)).is_err() {
                dead.push(id);
            }
        }
        self.watchers.prune(&dead);
    }

    /// One optimistic attempt: observe, apply, commit if unchanged.
    fn try_commit(
        &self,
        collection: &str,
        id: &str,
        apply: TxApply<'_>,
    ) -> StoreResult<Option<Document>> {
        let observed = {
            let collections = self.read()?;
            collections
                .get(collection)
                .and_then(|coll| coll.get(id))
                .map(|doc| (doc.fields.clone(), doc.version))
        };

        let merge = match &observed {
            Some((fields, _)) => apply(Some(fields)),
            None => apply(None),
        };

        let mut collections = self.write()?;
        let coll = collections.entry(collection.to_string()).or_default();
        let current_version = coll.get(id).map(|doc| doc.version);
        if current_version != observed.as_ref().map(|(_, version)| *version) {
            return Ok(None);
        }

        let entry = coll.entry(id.to_string()).or_default();
        merge_fields(&mut entry.fields, merge);
        entry.version += 1;
        let committed = entry.fields.clone();
        drop(collections);

        self.notify(collection);
        Ok(Some(committed))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|coll| coll.get(id))
            .map(|doc| doc.fields.clone()))
    }

    async fn set_merge(&self, collection: &str, id: &str, fields: Document) -> StoreResult<()> {
        {
            let mut collections = self.write()?;
            let entry = collections
                .entry(collection.to_string())
                .or_default()
                .entry(id.to_string())
                .or_default();
            merge_fields(&mut entry.fields, fields);
            entry.version += 1;
        }
        self.notify(collection);
        Ok(())
    }

    async fn add(&self, collection: &str, mut fields: Document) -> StoreResult<String> {
        let id = Uuid::now_v7().to_string();
        // The store is the server here: it assigns the creation timestamp.
        fields
            .entry("createdAt".to_string())
            .or_insert_with(|| chrono::Utc::now().timestamp_millis().into());
        {
            let mut collections = self.write()?;
            let coll = collections.entry(collection.to_string()).or_default();
            if coll.contains_key(&id) {
                return Err(StoreError::WriteFailed {
                    collection: collection.to_string(),
                    reason: format!("generated id {id} already exists"),
                });
            }
            coll.insert(
                id.clone(),
                VersionedDoc {
                    fields,
                    version: 1,
                },
            );
        }
        self.notify(collection);
        Ok(id)
    }

    async fn transact(
        &self,
        collection: &str,
        id: &str,
        apply: TxApply<'_>,
    ) -> StoreResult<Document> {
        let mut attempt: u32 = 0;
        loop {
            if let Some(committed) = self.try_commit(collection, id, apply)? {
                return Ok(committed);
            }
            if attempt >= self.retry.max_retries {
                return Err(StoreError::TransactionConflict {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    attempts: attempt + 1,
                });
            }
            let backoff = self.retry.backoff_for_attempt(attempt);
            debug!(
                collection,
                id,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                "Transaction conflict, retrying"
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    fn watch(&self, query: Query) -> Subscription {
        let collection = query.collection.clone();
        let subscription = self.watchers.register(query);
        // Prime the subscriber with the current result set.
        self.notify(&collection);
        subscription
    }
}

// =============================================================================
// TESTS
// =============================================================================
