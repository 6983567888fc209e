//! Sequential report-id allocation
//!
//! One counter document per local calendar day. Allocation is a single
//! atomic read-modify-write on that document: read the last handed-out
//! sequence (a missing counter reads as 0), bump it by one, merge-write
//! the counter, and return the new sequence only once the write commits.
//! Conflicting concurrent allocations on the same day are serialized by
//! the store's transaction primitive.

use crate::COUNTERS_COLLECTION;
use bantay_core::{format_report_id, timestamp_ms, ReportError, ReportResult, Timestamp};
use bantay_store::{get_u32_or_zero, Document, DocumentStore};
use serde_json::Value;
use tracing::debug;

/// Outcome of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub date_key: String,
    pub sequence: u32,
    /// `IR-{dateKey}-{sequence:04}`, derived from the two fields above.
    pub report_id: String,
}

/// Allocate the next sequence for a day key.
///
/// `now` is persisted as the counter's `updatedAt`; the day key itself is
/// the caller's local calendar day. Fails with
/// [`ReportError::Allocation`] when the store's conflict-retry budget is
/// exhausted, in which case no counter state was consumed.
pub async fn allocate_sequence(
    store: &dyn DocumentStore,
    date_key: &str,
    now: Timestamp,
) -> ReportResult<Allocation> {
    let updated_at = timestamp_ms(now);
    let committed = store
        .transact(COUNTERS_COLLECTION, date_key, &|existing| {
            let last = existing.map(|doc| get_u32_or_zero(doc, "lastSequence")).unwrap_or(0);
            let mut fields = Document::new();
            fields.insert("dateKey".to_string(), Value::from(date_key));
            fields.insert("lastSequence".to_string(), Value::from(last + 1));
            fields.insert("updatedAt".to_string(), Value::from(updated_at));
            fields
        })
        .await
        .map_err(ReportError::Allocation)?;

    // The committed document is the state this transaction wrote, so its
    // lastSequence is exactly the sequence allocated to this caller.
    let sequence = get_u32_or_zero(&committed, "lastSequence");
    let report_id = format_report_id(date_key, sequence);
    debug!(date_key, sequence, %report_id, "Sequence allocated");

    Ok(Allocation {
        date_key: date_key.to_string(),
        sequence,
        report_id,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bantay_store::MemoryStore;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_first_allocation_of_the_day_is_one() {
        let store = MemoryStore::new();
        let allocation = allocate_sequence(&store, "20250315", Utc::now()).await.unwrap();
        assert_eq!(allocation.sequence, 1);
        assert_eq!(allocation.report_id, "IR-20250315-0001");
    }

    #[tokio::test]
    async fn test_allocations_are_sequential() {
        let store = MemoryStore::new();
        let first = allocate_sequence(&store, "20250315", Utc::now()).await.unwrap();
        let second = allocate_sequence(&store, "20250315", Utc::now()).await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_ne!(first.report_id, second.report_id);
    }

    #[tokio::test]
    async fn test_day_keys_count_independently() {
        let store = MemoryStore::new();
        allocate_sequence(&store, "20250315", Utc::now()).await.unwrap();
        let other_day = allocate_sequence(&store, "20250316", Utc::now()).await.unwrap();
        assert_eq!(other_day.sequence, 1);
    }

    #[tokio::test]
    async fn test_allocation_tolerates_malformed_counter() {
        let store = MemoryStore::new();
        store
            .set_merge(
                COUNTERS_COLLECTION,
                "20250315",
                json!({ "lastSequence": "corrupt" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .await
            .unwrap();

        // A non-numeric lastSequence reads as 0, so allocation restarts at 1.
        let allocation = allocate_sequence(&store, "20250315", Utc::now()).await.unwrap();
        assert_eq!(allocation.sequence, 1);
    }

    #[tokio::test]
    async fn test_allocation_updates_counter_metadata() {
        let store = MemoryStore::new();
        let now = Utc::now();
        allocate_sequence(&store, "20250315", now).await.unwrap();

        let counter = store
            .get(COUNTERS_COLLECTION, "20250315")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(counter["dateKey"], "20250315");
        assert_eq!(counter["lastSequence"], 1);
        assert_eq!(counter["updatedAt"], timestamp_ms(now));
    }
}
