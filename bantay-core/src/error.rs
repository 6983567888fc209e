//! Error types for BANTAY operations

use thiserror::Error;

/// Client-side form validation errors. These never reach the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required fields missing: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },
}

/// Profile lookup errors. Expected-absence conditions, not fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("No signed-in user; sign in again to use profile data")]
    Unauthenticated,

    #[error("No saved profile found for uid {uid}")]
    NotFound { uid: String },

    #[error("Profile access failed: {0}")]
    Store(#[from] StoreError),
}

/// Document store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Transaction on {collection}/{id} could not commit after {attempts} attempts")]
    TransactionConflict {
        collection: String,
        id: String,
        attempts: u32,
    },

    #[error("Write failed on {collection}: {reason}")]
    WriteFailed { collection: String, reason: String },

    #[error("Malformed document in {collection}/{id}: {reason}")]
    MalformedDocument {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Watch on {collection} closed: {reason}")]
    WatchClosed { collection: String, reason: String },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Master error type for the reporting flows.
///
/// Allocation, submission, and subscription faults all originate in the
/// store but are tagged by the phase that hit them, so callers can keep
/// the form populated after a failed insert versus a failed allocation.
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Allocation error: {0}")]
    Allocation(StoreError),

    #[error("Submission error: {0}")]
    Submission(StoreError),

    #[error("Subscription error: {0}")]
    Subscription(StoreError),
}

/// Result type alias for reporting operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// TESTS
// =============================================================================
