mod common;

use common::Harness;
use fms_core::error::FmsError;
use fms_core::profile::{CasteCategory, MinorityStatus, ProfileCompleteness, ProfileDraft};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_save_then_fetch_applies_defaults() {
    let h = Harness::new();
    h.sign_in_asha().await;

    h.client
        .profiles
        .save(&ProfileDraft::new("Asha", "Bihar", "B.Sc"))
        .await
        .unwrap();
    let profile = h.client.profiles.fetch().await.unwrap();

    assert_eq!(profile.name, "Asha");
    assert_eq!(profile.state, "Bihar");
    assert_eq!(profile.course, "B.Sc");
    assert_eq!(profile.annual_income, 0.0);
    assert_eq!(profile.caste_category, CasteCategory::General);
    assert_eq!(profile.minority_status, MinorityStatus::NotMinority);
    assert_eq!(profile.marks_percentage, 0.0);
    assert_eq!(
        h.client.profiles.completeness().await,
        ProfileCompleteness::Complete
    );
}

#[tokio::test]
async fn test_save_is_upsert() {
    let h = Harness::new();
    h.sign_in_asha().await;

    h.client
        .profiles
        .save(&ProfileDraft::new("Asha", "Bihar", "B.Sc"))
        .await
        .unwrap();
    h.client
        .profiles
        .save(&ProfileDraft::new("Asha", "Bihar", "M.Sc").with_marks_percentage(81.5))
        .await
        .unwrap();

    let stored = h.backend.profile_of("uid-asha").unwrap();
    assert_eq!(stored.course, "M.Sc");
    assert_eq!(stored.marks_percentage, 81.5);
    assert_eq!(h.client.profiles.cached().await, Some(stored));
}

#[tokio::test]
async fn test_new_identity_has_no_profile() {
    let h = Harness::new();
    h.sign_in_asha().await;

    let err = h.client.profiles.fetch().await.unwrap_err();
    assert!(err.is_not_found());
    assert!(h.client.session.is_authenticated());
    assert!(h.client.profiles.cached().await.is_none());
}

#[tokio::test]
async fn test_invalid_draft_never_reaches_backend() {
    let h = Harness::new();
    h.sign_in_asha().await;

    let err = h
        .client
        .profiles
        .save(&ProfileDraft::new("Asha", "Bihar", "B.Sc").with_marks_percentage(101.0))
        .await
        .unwrap_err();

    assert!(matches!(err, FmsError::Validation { ref field, .. } if field == "marksPercentage"));
    assert!(h.backend.profile_of("uid-asha").is_none());
}

#[tokio::test]
async fn test_save_without_session_is_rejected() {
    let h = Harness::new();

    let err = h
        .client
        .profiles
        .save(&ProfileDraft::new("Asha", "Bihar", "B.Sc"))
        .await
        .unwrap_err();
    assert_eq!(err, FmsError::NotAuthenticated);
    assert_eq!(h.backend.profile_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_save_after_missing_marks_profile_complete() {
    let h = Harness::new();
    h.sign_in_asha().await;

    let _ = h.client.profiles.fetch().await;
    assert_eq!(
        h.client.profiles.completeness().await,
        ProfileCompleteness::Missing
    );

    h.client
        .profiles
        .save(&ProfileDraft::new("Asha", "Bihar", "B.Sc"))
        .await
        .unwrap();
    assert_eq!(
        h.client.profiles.completeness().await,
        ProfileCompleteness::Complete
    );
    assert!(h.client.eligibility.fetch_eligible().await.is_ok());
}
