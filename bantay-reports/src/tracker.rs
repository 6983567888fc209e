//! Report tracking
//!
//! Live view over the signed-in resident's submitted reports: a standing
//! store subscription feeds a locally sorted list, filtered in memory on
//! every query change. One tracker per open screen; dropping it tears the
//! subscription down.

use crate::REPORTS_COLLECTION;
use bantay_core::{AuthProvider, StoreError, STATUS_SUBMITTED};
use bantay_store::{
    get_i64, get_string_or, DocumentSnapshot, DocumentStore, Query, Subscription, WatchEvent,
};
use chrono::{DateTime, Local};
use tracing::{info, warn};

/// Placeholder shown when a report id failed to resolve.
pub const NO_REPORT_ID: &str = "No Report ID";

/// Placeholder shown when a creation timestamp failed to resolve.
pub const NO_DATE: &str = "No date";

/// One report as presented by the tracking view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedReport {
    /// Store document id (list key).
    pub id: String,
    pub report_id: String,
    pub report: String,
    pub status: String,
    /// Pre-formatted creation date, or [`NO_DATE`].
    pub created_at: String,
    /// Creation time in epoch milliseconds; 0 when unresolved.
    pub created_at_ms: i64,
}

impl TrackedReport {
    /// Map a raw document into the view shape, defaulting every field
    /// that is missing or of the wrong type.
    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
        let created_at_ms = get_i64(&snapshot.fields, "createdAt").unwrap_or(0);
        let created_at = if created_at_ms > 0 {
            format_created_date(created_at_ms)
        } else {
            NO_DATE.to_string()
        };
        Self {
            id: snapshot.id.clone(),
            report_id: get_string_or(&snapshot.fields, "reportId", NO_REPORT_ID),
            report: get_string_or(&snapshot.fields, "report", ""),
            status: get_string_or(&snapshot.fields, "status", STATUS_SUBMITTED),
            created_at,
            created_at_ms,
        }
    }

    /// Case-insensitive substring match over the searchable fields.
    /// `keyword` must already be lowercased.
    fn matches(&self, keyword: &str) -> bool {
        self.report_id.to_lowercase().contains(keyword)
            || self.report.to_lowercase().contains(keyword)
            || self.status.to_lowercase().contains(keyword)
            || self.created_at.to_lowercase().contains(keyword)
    }
}

/// Format an epoch-millisecond creation time as a local `MM/DD/YYYY` date.
pub fn format_created_date(created_at_ms: i64) -> String {
    DateTime::from_timestamp_millis(created_at_ms)
        .map(|ts| ts.with_timezone(&Local).format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| NO_DATE.to_string())
}

/// Sort newest first; unresolved timestamps (0) sink to the end.
pub fn sort_newest_first(reports: &mut [TrackedReport]) {
    reports.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
}

/// Filter an already-sorted list by a free-text query. A blank query
/// matches everything.
pub fn filter_reports<'a>(reports: &'a [TrackedReport], query: &str) -> Vec<&'a TrackedReport> {
    let keyword = query.trim().to_lowercase();
    if keyword.is_empty() {
        return reports.iter().collect();
    }
    reports.iter().filter(|r| r.matches(&keyword)).collect()
}

/// Live tracking view state for one signed-in resident.
pub struct ReportTracker {
    subscription: Option<Subscription>,
    reports: Vec<TrackedReport>,
    loading: bool,
}

impl ReportTracker {
    /// Open the tracking view for whoever is signed in right now.
    ///
    /// Signed out: no subscription is opened and the view settles
    /// immediately on an empty, loading-complete list. When the viewed
    /// user changes, drop this tracker and open a new one.
    pub fn open(store: &dyn DocumentStore, auth: &dyn AuthProvider) -> Self {
        match auth.current_user() {
            Some(user) => {
                info!(uid = %user.uid, "Report tracker opened");
                let subscription =
                    store.watch(Query::collection(REPORTS_COLLECTION).where_eq("uid", user.uid));
                Self {
                    subscription: Some(subscription),
                    reports: Vec::new(),
                    loading: true,
                }
            }
            None => {
                info!("Report tracker opened signed out; presenting empty list");
                Self {
                    subscription: None,
                    reports: Vec::new(),
                    loading: false,
                }
            }
        }
    }

    /// Await and apply the next subscription event.
    ///
    /// Returns `false` once the subscription has ended (listener error,
    /// store shutdown, or no subscription at all); the view keeps its
    /// last settled state after that.
    pub async fn next_event(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        match subscription.recv().await {
            Some(WatchEvent::Snapshot(snapshots)) => {
                self.apply_snapshot(snapshots);
                true
            }
            Some(WatchEvent::Error(error)) => {
                self.apply_error(error);
                false
            }
            None => {
                self.loading = false;
                self.subscription = None;
                false
            }
        }
    }

    /// Replace the list with a fresh full result set, newest first.
    pub fn apply_snapshot(&mut self, snapshots: Vec<DocumentSnapshot>) {
        let mut reports: Vec<TrackedReport> =
            snapshots.iter().map(TrackedReport::from_snapshot).collect();
        sort_newest_first(&mut reports);
        self.reports = reports;
        self.loading = false;
    }

    /// Listener fault: clear the list and settle on loading-complete.
    /// Recovery is re-opening the tracker; there is no automatic retry.
    pub fn apply_error(&mut self, error: StoreError) {
        warn!(error = %error, "Report subscription failed");
        self.reports.clear();
        self.loading = false;
        self.subscription = None;
    }

    /// The full list, newest first.
    pub fn reports(&self) -> &[TrackedReport] {
        &self.reports
    }

    /// The list narrowed by a free-text query.
    pub fn filtered(&self, query: &str) -> Vec<&TrackedReport> {
        filter_reports(&self.reports, query)
    }

    /// Whether the first snapshot is still pending.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Tear the view down explicitly.
    pub fn close(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bantay_store::Document;
    use serde_json::json;

    fn snapshot(id: &str, fields: serde_json::Value) -> DocumentSnapshot {
        DocumentSnapshot {
            id: id.to_string(),
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    fn tracked(report_id: &str, body: &str, status: &str, date: &str, ms: i64) -> TrackedReport {
        TrackedReport {
            id: format!("doc-{report_id}"),
            report_id: report_id.to_string(),
            report: body.to_string(),
            status: status.to_string(),
            created_at: date.to_string(),
            created_at_ms: ms,
        }
    }

    #[test]
    fn test_from_snapshot_defaults_every_missing_field() {
        let report = TrackedReport::from_snapshot(&snapshot("d1", json!({})));
        assert_eq!(report.report_id, NO_REPORT_ID);
        assert_eq!(report.report, "");
        assert_eq!(report.status, STATUS_SUBMITTED);
        assert_eq!(report.created_at, NO_DATE);
        assert_eq!(report.created_at_ms, 0);
    }

    #[test]
    fn test_from_snapshot_formats_resolved_timestamp() {
        let report = TrackedReport::from_snapshot(&snapshot(
            "d1",
            json!({ "reportId": "IR-20250315-0001", "createdAt": 1_742_000_000_000i64 }),
        ));
        assert_eq!(report.created_at_ms, 1_742_000_000_000);
        assert_eq!(report.created_at, format_created_date(1_742_000_000_000));
        assert_ne!(report.created_at, NO_DATE);
    }

    #[test]
    fn test_sort_newest_first_sinks_unresolved_timestamps() {
        let mut reports = vec![
            tracked("IR-20250315-0001", "", "submitted", NO_DATE, 0),
            tracked("IR-20250315-0003", "", "submitted", "03/15/2025", 300),
            tracked("IR-20250315-0002", "", "submitted", "03/15/2025", 200),
        ];
        sort_newest_first(&mut reports);
        let ids: Vec<_> = reports.iter().map(|r| r.report_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["IR-20250315-0003", "IR-20250315-0002", "IR-20250315-0001"]
        );
    }

    #[test]
    fn test_filter_matches_body_case_insensitively() {
        let reports = vec![
            tracked("IR-20250315-0001", "Flood warning issued", "submitted", "03/15/2025", 100),
            tracked("IR-20250315-0002", "Road blocked", "submitted", "03/15/2025", 200),
        ];
        let hits = filter_reports(&reports, "flood");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].report_id, "IR-20250315-0001");
    }

    #[test]
    fn test_filter_matches_id_status_and_date() {
        let reports = vec![
            tracked("IR-20250315-0001", "Flooding", "resolved", "03/15/2025", 100),
            tracked("IR-20250316-0001", "Fire", "submitted", "03/16/2025", 200),
        ];
        assert_eq!(filter_reports(&reports, "0316").len(), 1);
        assert_eq!(filter_reports(&reports, "RESOLVED").len(), 1);
        assert_eq!(filter_reports(&reports, "03/15").len(), 1);
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let reports = vec![
            tracked("IR-20250315-0001", "Flooding", "submitted", "03/15/2025", 100),
            tracked("IR-20250315-0002", "Fire", "submitted", "03/15/2025", 200),
        ];
        assert_eq!(filter_reports(&reports, "").len(), 2);
        assert_eq!(filter_reports(&reports, "   ").len(), 2);
    }

    #[test]
    fn test_apply_error_clears_list_and_finishes_loading() {
        let mut tracker = ReportTracker {
            subscription: None,
            reports: vec![tracked("IR-20250315-0001", "Flooding", "submitted", "03/15/2025", 100)],
            loading: true,
        };
        tracker.apply_error(StoreError::WatchClosed {
            collection: REPORTS_COLLECTION.to_string(),
            reason: "listener fault".to_string(),
        });
        assert!(tracker.reports().is_empty());
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_apply_snapshot_replaces_rather_than_appends() {
        let mut tracker = ReportTracker {
            subscription: None,
            reports: vec![tracked("IR-20250315-0001", "", "submitted", NO_DATE, 0)],
            loading: false,
        };
        tracker.apply_snapshot(vec![snapshot(
            "d2",
            json!({ "reportId": "IR-20250315-0002", "createdAt": 200 }),
        )]);
        assert_eq!(tracker.reports().len(), 1);
        assert_eq!(tracker.reports()[0].report_id, "IR-20250315-0002");
    }

    #[tokio::test]
    async fn test_next_event_without_subscription_reports_completion() {
        let mut tracker = ReportTracker {
            subscription: None,
            reports: Vec::new(),
            loading: false,
        };
        assert!(!tracker.next_event().await);
    }

    #[test]
    fn test_snapshot_mapping_handles_wrong_field_types() {
        let fields: Document = json!({ "reportId": 7, "report": null, "createdAt": "soon" })
            .as_object()
            .cloned()
            .unwrap();
        let report = TrackedReport::from_snapshot(&DocumentSnapshot {
            id: "d1".to_string(),
            fields,
        });
        assert_eq!(report.report_id, NO_REPORT_ID);
        assert_eq!(report.report, "");
        assert_eq!(report.created_at_ms, 0);
    }
}
