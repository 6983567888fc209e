//! Identity types and the authentication seam

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Timestamps travel through documents as epoch milliseconds.
pub type TimestampMs = i64;

/// Convert a timestamp to epoch milliseconds for document storage.
pub fn timestamp_ms(ts: Timestamp) -> TimestampMs {
    ts.timestamp_millis()
}

/// The signed-in user as reported by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CurrentUser {
    pub uid: String,
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn new(uid: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            uid: uid.into(),
            email: email.map(str::to_string),
        }
    }
}

/// Authentication collaborator.
///
/// Session management lives outside this system; components only ask
/// "who is signed in right now", synchronously.
pub trait AuthProvider: Send + Sync {
    /// The currently signed-in user, or `None` when signed out.
    fn current_user(&self) -> Option<CurrentUser>;
}

// =============================================================================
// TESTS
// =============================================================================
