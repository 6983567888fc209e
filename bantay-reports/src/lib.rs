//! BANTAY Reports - Submission and Tracking Flows
//!
//! The two cooperating flows of the resident reporting system:
//! - **Submission** (one-shot): validate the form, allocate the next
//!   per-day sequence, persist one report record.
//! - **Tracking** (long-lived): subscribe to the signed-in resident's
//!   reports, keep them sorted newest first, filter in memory.
//!
//! Both are written against the [`bantay_store::DocumentStore`] seam and
//! the [`bantay_core::AuthProvider`] seam; nothing here owns a wire
//! surface.

pub mod allocator;
pub mod profile;
pub mod submission;
pub mod tracker;

pub use allocator::{allocate_sequence, Allocation};
pub use profile::{
    compose_full_name, copy_profile_into_form, fetch_profile, save_profile, save_profile_now,
};
pub use submission::{submit_report, submit_report_at, ReportForm, SubmittedReport};
pub use tracker::{
    filter_reports, format_created_date, sort_newest_first, ReportTracker, TrackedReport,
    NO_DATE, NO_REPORT_ID,
};

/// Per-day allocation counters, keyed by the 8-digit day key.
pub const COUNTERS_COLLECTION: &str = "incidentReportCounters";

/// Submitted incident reports, store-assigned ids.
pub const REPORTS_COLLECTION: &str = "distressReports";

/// Saved resident profiles, keyed by uid.
pub const RESIDENTS_COLLECTION: &str = "residents";
