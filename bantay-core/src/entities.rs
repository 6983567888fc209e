//! Core entity structures
//!
//! Pure data shapes for the reporting flows. Field names serialize in
//! camelCase to match the document layout the store carries.

use crate::TimestampMs;
use serde::{Deserialize, Serialize};

/// Status every freshly submitted report carries. Later transitions are
/// made by an administrative actor outside this system.
pub const STATUS_SUBMITTED: &str = "submitted";

/// Per-day allocation counter, keyed by its 8-digit day key.
///
/// Created on first allocation for a day, never deleted, mutated only by
/// the allocation transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DailyCounter {
    pub date_key: String,
    /// Last sequence handed out; a missing field reads as 0.
    #[serde(default)]
    pub last_sequence: u32,
    /// Epoch milliseconds of the last allocation.
    #[serde(default)]
    pub updated_at: TimestampMs,
}

/// A submitted incident report. Immutable from this client once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    /// Human-readable id, `IR-{dateKey}-{sequence:04}`.
    pub report_id: String,
    pub date_key: String,
    pub sequence: u32,
    /// Submitter identity; null when submitted while signed out.
    pub uid: Option<String>,
    pub email: Option<String>,
    pub full_name: String,
    pub address: String,
    pub contact_number: String,
    /// Free-text report body.
    pub report: String,
    pub status: String,
    /// Store-assigned creation time, epoch milliseconds.
    #[serde(default)]
    pub created_at: TimestampMs,
}

/// Saved resident profile used to pre-fill the report form.
///
/// Owned by the profile-management flow; the submission flow only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ResidentProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_initial: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub emergency_contact: String,
}

// =============================================================================
// TESTS
// =============================================================================
