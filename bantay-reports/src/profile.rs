//! Resident profile access
//!
//! The profile-management flow saves one profile document per resident;
//! the submission flow copies it into the report form on request. Copying
//! is a full overwrite of the name/address/contact fields, never a merge.

use crate::{submission::ReportForm, RESIDENTS_COLLECTION};
use bantay_core::{
    timestamp_ms, AuthProvider, ProfileError, ReportResult, ResidentProfile, Timestamp,
};
use bantay_store::{to_document, DocumentStore};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

/// Compose a display name from profile parts.
///
/// Non-empty trimmed parts join with single spaces; a present middle
/// initial gets a trailing period.
pub fn compose_full_name(first: &str, middle_initial: &str, last: &str) -> String {
    let middle = middle_initial.trim();
    let middle = if middle.is_empty() {
        String::new()
    } else {
        format!("{middle}.")
    };
    [first.trim(), middle.as_str(), last.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fetch the signed-in resident's saved profile.
pub async fn fetch_profile(
    store: &dyn DocumentStore,
    auth: &dyn AuthProvider,
) -> Result<ResidentProfile, ProfileError> {
    let user = auth.current_user().ok_or(ProfileError::Unauthenticated)?;
    let fields = store
        .get(RESIDENTS_COLLECTION, &user.uid)
        .await?
        .ok_or(ProfileError::NotFound { uid: user.uid.clone() })?;
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        ProfileError::Store(bantay_core::StoreError::MalformedDocument {
            collection: RESIDENTS_COLLECTION.to_string(),
            id: user.uid,
            reason: e.to_string(),
        })
    })
}

/// Copy the saved profile into the report form.
///
/// Overwrites the name, address, and contact fields entirely; the report
/// body is untouched. On any failure the form is left exactly as it was.
pub async fn copy_profile_into_form(
    store: &dyn DocumentStore,
    auth: &dyn AuthProvider,
    form: &mut ReportForm,
) -> Result<(), ProfileError> {
    let profile = fetch_profile(store, auth).await?;
    form.full_name = compose_full_name(
        &profile.first_name,
        &profile.middle_initial,
        &profile.last_name,
    );
    form.address = profile.address.trim().to_string();
    form.contact_number = profile.contact_number.trim().to_string();
    debug!("Profile copied into report form");
    Ok(())
}

/// Save the signed-in resident's profile with upsert-with-merge.
///
/// Stamps the submitter identity and update time alongside the profile
/// fields; unrelated fields already on the document survive.
pub async fn save_profile(
    store: &dyn DocumentStore,
    auth: &dyn AuthProvider,
    profile: &ResidentProfile,
    now: Timestamp,
) -> ReportResult<()> {
    let user = auth.current_user().ok_or(ProfileError::Unauthenticated)?;
    let mut fields = to_document(profile).map_err(ProfileError::Store)?;
    fields.insert("uid".to_string(), Value::from(user.uid.clone()));
    fields.insert(
        "email".to_string(),
        user.email.clone().map(Value::from).unwrap_or(Value::Null),
    );
    fields.insert("updatedAt".to_string(), Value::from(timestamp_ms(now)));
    store
        .set_merge(RESIDENTS_COLLECTION, &user.uid, fields)
        .await
        .map_err(ProfileError::Store)?;
    info!(uid = %user.uid, "Profile saved");
    Ok(())
}

/// Save the profile as of now.
pub async fn save_profile_now(
    store: &dyn DocumentStore,
    auth: &dyn AuthProvider,
    profile: &ResidentProfile,
) -> ReportResult<()> {
    save_profile(store, auth, profile, Utc::now()).await
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bantay_store::MemoryStore;
    use bantay_test_utils::{sample_profile, StaticAuth};

    #[test]
    fn test_compose_full_name_with_middle_initial() {
        assert_eq!(compose_full_name("Juan", "D", "Cruz"), "Juan D. Cruz");
    }

    #[test]
    fn test_compose_full_name_skips_blank_parts() {
        assert_eq!(compose_full_name("Juan", "", "Cruz"), "Juan Cruz");
        assert_eq!(compose_full_name("Juan", "   ", ""), "Juan");
        assert_eq!(compose_full_name("", "", ""), "");
    }

    #[test]
    fn test_compose_full_name_trims_parts() {
        assert_eq!(compose_full_name(" Juan ", " D ", " Cruz "), "Juan D. Cruz");
    }

    #[tokio::test]
    async fn test_copy_requires_signed_in_user() {
        let store = MemoryStore::new();
        let auth = StaticAuth::signed_out();
        let mut form = ReportForm::default();

        let err = copy_profile_into_form(&store, &auth, &mut form).await.unwrap_err();
        assert_eq!(err, ProfileError::Unauthenticated);
        assert_eq!(form, ReportForm::default());
    }

    #[tokio::test]
    async fn test_copy_fails_and_leaves_form_untouched_when_profile_missing() {
        let store = MemoryStore::new();
        let auth = StaticAuth::signed_in("uid-1", None);
        let mut form = ReportForm {
            full_name: "typed by hand".to_string(),
            ..ReportForm::default()
        };

        let err = copy_profile_into_form(&store, &auth, &mut form).await.unwrap_err();
        assert_eq!(
            err,
            ProfileError::NotFound { uid: "uid-1".to_string() }
        );
        assert_eq!(form.full_name, "typed by hand");
    }

    #[tokio::test]
    async fn test_copy_overwrites_name_address_and_contact() {
        let store = MemoryStore::new();
        let auth = StaticAuth::signed_in("uid-1", Some("juan@brgy.ph"));
        save_profile_now(&store, &auth, &sample_profile()).await.unwrap();

        let mut form = ReportForm {
            full_name: "stale".to_string(),
            address: "stale".to_string(),
            contact_number: "stale".to_string(),
            report: "Flooding".to_string(),
        };
        copy_profile_into_form(&store, &auth, &mut form).await.unwrap();

        assert_eq!(form.full_name, "Juan D. Cruz");
        assert_eq!(form.address, "Purok 1");
        assert_eq!(form.contact_number, "09171234567");
        // The report body is not part of the profile copy.
        assert_eq!(form.report, "Flooding");
    }

    #[tokio::test]
    async fn test_save_profile_stamps_identity_and_update_time() {
        let store = MemoryStore::new();
        let auth = StaticAuth::signed_in("uid-1", Some("juan@brgy.ph"));
        save_profile_now(&store, &auth, &sample_profile()).await.unwrap();

        let fields = store
            .get(RESIDENTS_COLLECTION, "uid-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fields["uid"], "uid-1");
        assert_eq!(fields["email"], "juan@brgy.ph");
        assert_eq!(fields["firstName"], "Juan");
        assert!(fields["updatedAt"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_save_profile_requires_signed_in_user() {
        let store = MemoryStore::new();
        let auth = StaticAuth::signed_out();
        let err = save_profile_now(&store, &auth, &sample_profile()).await.unwrap_err();
        assert!(matches!(
            err,
            bantay_core::ReportError::Profile(ProfileError::Unauthenticated)
        ));
        assert_eq!(store.count(RESIDENTS_COLLECTION), 0);
    }
}
