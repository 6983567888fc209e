//! BANTAY Test Utilities
//!
//! Centralized test infrastructure for the workspace:
//! - the in-memory store, re-exported for convenience
//! - a static auth provider
//! - document and entity fixtures for common scenarios

// Re-export the in-process store from its source crate
pub use bantay_store::MemoryStore;

// Re-export core types for convenience
pub use bantay_core::{
    AuthProvider, CurrentUser, DailyCounter, IncidentReport, ProfileError, ReportError,
    ReportResult, ResidentProfile, StoreError, StoreResult, TxRetryConfig, ValidationError,
    STATUS_SUBMITTED,
};

use bantay_store::Document;
use serde_json::json;

// ============================================================================
// STATIC AUTH PROVIDER
// ============================================================================

/// Auth provider with a fixed answer, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<CurrentUser>,
}

impl StaticAuth {
    /// Provider that reports a signed-in user.
    pub fn signed_in(uid: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            user: Some(CurrentUser::new(uid, email)),
        }
    }

    /// Provider that reports nobody signed in.
    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.clone()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A complete resident profile.
pub fn sample_profile() -> ResidentProfile {
    ResidentProfile {
        first_name: "Juan".to_string(),
        middle_initial: "D".to_string(),
        last_name: "Cruz".to_string(),
        address: "Purok 1".to_string(),
        contact_number: "09171234567".to_string(),
        emergency_contact: "09179876543".to_string(),
    }
}

/// A report document as the store would hold it.
pub fn sample_report_doc(uid: &str, report_id: &str, body: &str, created_at_ms: i64) -> Document {
    json!({
        "uid": uid,
        "email": format!("{uid}@brgy.ph"),
        "reportId": report_id,
        "dateKey": &report_id[3..11],
        "sequence": 1,
        "fullName": "Juan D. Cruz",
        "address": "Purok 1",
        "contactNumber": "09171234567",
        "report": body,
        "status": STATUS_SUBMITTED,
        "createdAt": created_at_ms,
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

// =============================================================================
// TESTS
// =============================================================================
