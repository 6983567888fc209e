//! BANTAY Core - Entity Types
//!
//! Pure data structures and seams for the resident reporting system.
//! All other crates depend on this. This crate contains data types, the
//! error taxonomy, and the report-id derivation - no IO.

pub mod config;
pub mod entities;
pub mod error;
pub mod identity;
pub mod report_id;

pub use config::TxRetryConfig;
pub use entities::{DailyCounter, IncidentReport, ResidentProfile, STATUS_SUBMITTED};
pub use error::{
    ProfileError, ReportError, ReportResult, StoreError, StoreResult, ValidationError,
};
pub use identity::{timestamp_ms, AuthProvider, CurrentUser, Timestamp, TimestampMs};
pub use report_id::{date_key, format_report_id, parse_report_id, REPORT_ID_PREFIX};
