//! Report submission
//!
//! Validates the report form, allocates a sequential report id for the
//! local calendar day, and persists one report record. Allocation and
//! insert are two store calls; a failure between them consumes a sequence
//! number without writing a report, never the reverse.

use crate::allocator::allocate_sequence;
use crate::REPORTS_COLLECTION;
use bantay_core::{
    date_key, AuthProvider, IncidentReport, ReportError, ReportResult, ValidationError,
    STATUS_SUBMITTED,
};
use bantay_store::{to_document, DocumentStore};
use chrono::{DateTime, Local, Utc};
use tracing::{info, warn};

/// The four user-entered fields of the incident report form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    pub full_name: String,
    pub address: String,
    pub contact_number: String,
    pub report: String,
}

impl ReportForm {
    /// Check that every required field is non-empty after trimming.
    ///
    /// Fails with the full list of blank fields; nothing is sent to the
    /// store on validation failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        for (value, label) in [
            (&self.full_name, "full name"),
            (&self.address, "address"),
            (&self.contact_number, "contact number"),
            (&self.report, "report"),
        ] {
            if value.trim().is_empty() {
                missing.push(label.to_string());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields { fields: missing })
        }
    }
}

/// What the caller gets back after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedReport {
    /// Store-assigned document id of the report record.
    pub document_id: String,
    /// Human-readable report id shown to the resident.
    pub report_id: String,
}

/// Submit a report as of now, on the local calendar day.
pub async fn submit_report(
    store: &dyn DocumentStore,
    auth: &dyn AuthProvider,
    form: &ReportForm,
) -> ReportResult<SubmittedReport> {
    submit_report_at(store, auth, form, Local::now()).await
}

/// Submit a report as of an explicit instant.
///
/// The instant's local calendar day scopes the sequence counter. The
/// submitter identity is recorded when signed in and left null otherwise;
/// signed-out submissions are accepted.
pub async fn submit_report_at(
    store: &dyn DocumentStore,
    auth: &dyn AuthProvider,
    form: &ReportForm,
    now: DateTime<Local>,
) -> ReportResult<SubmittedReport> {
    form.validate()?;

    let key = date_key(now.date_naive());
    let allocation = allocate_sequence(store, &key, now.with_timezone(&Utc)).await?;

    let user = auth.current_user();
    let record = IncidentReport {
        report_id: allocation.report_id.clone(),
        date_key: allocation.date_key,
        sequence: allocation.sequence,
        uid: user.as_ref().map(|u| u.uid.clone()),
        email: user.and_then(|u| u.email),
        full_name: form.full_name.trim().to_string(),
        address: form.address.trim().to_string(),
        contact_number: form.contact_number.trim().to_string(),
        report: form.report.trim().to_string(),
        status: STATUS_SUBMITTED.to_string(),
        created_at: 0,
    };

    let mut fields = to_document(&record).map_err(ReportError::Submission)?;
    // Creation time is store-assigned, not the client clock.
    fields.remove("createdAt");

    let document_id = match store.add(REPORTS_COLLECTION, fields).await {
        Ok(id) => id,
        Err(err) => {
            // The sequence is already consumed: a gap in the visible
            // series, never a duplicate id.
            warn!(report_id = %allocation.report_id, error = %err, "Report insert failed after allocation");
            return Err(ReportError::Submission(err));
        }
    };

    info!(report_id = %allocation.report_id, document_id = %document_id, "Report submitted");
    Ok(SubmittedReport {
        document_id,
        report_id: allocation.report_id,
    })
}

// =============================================================================
// TESTS
// =============================================================================
