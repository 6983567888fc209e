//! BANTAY Store - Document Store Trait and In-Memory Implementation
//!
//! Defines the document-store collaborator seam the reporting flows are
//! written against:
//! - point read and upsert-with-merge by collection + id
//! - auto-id insert with a store-assigned creation timestamp
//! - an atomic transaction primitive over a single document, retried
//!   transparently on write conflict
//! - live query subscriptions that re-deliver the full result set on
//!   every commit
//!
//! A managed backend lives behind this trait in production; `MemoryStore`
//! is the complete in-process implementation used by tests and demos.

pub mod document;
pub mod memory;
pub mod watch;

pub use document::{
    get_i64, get_str, get_string_or, get_u32_or_zero, merge_fields, to_document, Document,
};
pub use memory::MemoryStore;
pub use watch::{Direction, DocumentSnapshot, Query, Subscription, WatchEvent};

use async_trait::async_trait;
use bantay_core::StoreResult;

/// Transaction closure: observes the current document (or `None` when it
/// does not exist yet) and returns the fields to merge-write.
pub type TxApply<'a> = &'a (dyn Fn(Option<&Document>) -> Document + Send + Sync);

/// Document store collaborator.
///
/// Implementations must guarantee that `transact` is atomic per document:
/// two concurrent transactions on the same `(collection, id)` never both
/// commit against the same observed state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read. `None` when the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Upsert-with-merge: create the document if absent, otherwise update
    /// only the given fields and leave the rest untouched.
    async fn set_merge(&self, collection: &str, id: &str, fields: Document) -> StoreResult<()>;

    /// Insert with a store-generated id, returning the id. The store
    /// stamps `createdAt` (epoch milliseconds) when the caller has not.
    async fn add(&self, collection: &str, fields: Document) -> StoreResult<String>;

    /// Atomic read-modify-write on one document. The closure may run more
    /// than once; the returned fields are merge-written only if the
    /// observed state is still current, and the committed document is
    /// returned. Conflicts are retried internally within a bounded budget.
    async fn transact(
        &self,
        collection: &str,
        id: &str,
        apply: TxApply<'_>,
    ) -> StoreResult<Document>;

    /// Open a live subscription for a standing query. The subscriber
    /// receives the full current result set immediately and again after
    /// every commit that touches the collection.
    fn watch(&self, query: Query) -> Subscription;
}
