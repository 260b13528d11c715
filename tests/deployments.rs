//! Deployment registry tests through the public API.

use std::collections::BTreeMap;
use std::sync::Arc;

use opsdeck::core::clock::{Clock, ManualClock};
use opsdeck::core::deploy::{
    CompletionOutcome, DeploymentFilter, DeploymentRegistry, DeploymentStatus, Environment,
    FixedProvider, SortOrder,
};
use opsdeck::error::{Error, RegistryError};
use tempfile::TempDir;

fn registry() -> DeploymentRegistry {
    let clock = Arc::new(ManualClock::epoch());
    DeploymentRegistry::in_memory(
        Box::new(FixedProvider::new(clock.clone() as Arc<dyn Clock>)),
        clock,
    )
    .unwrap()
}

#[test]
fn test_production_approval_end_to_end() {
    let mut registry = registry();

    let record = registry
        .trigger(
            "org/infra",
            "main",
            Environment::Production,
            &BTreeMap::new(),
            true,
            "ops",
        )
        .unwrap();
    assert_eq!(record.status, DeploymentStatus::PendingApproval);

    let approved = registry.approve(&record.pipeline_id, "lead").unwrap();
    assert_eq!(approved.status, DeploymentStatus::Running);

    let completed = registry
        .record_completion(&record.pipeline_id, CompletionOutcome::Succeeded)
        .unwrap();
    assert_eq!(completed.status, DeploymentStatus::Success);

    let successes = registry.list(
        &DeploymentFilter {
            status: Some(DeploymentStatus::Success),
            environment: None,
        },
        SortOrder::NewestFirst,
    );
    assert!(successes
        .iter()
        .any(|r| r.pipeline_id == record.pipeline_id));
}

#[test]
fn test_approve_succeeds_iff_pending() {
    let mut registry = registry();

    // Every seeded record that is not pending must refuse approval and
    // stay unchanged.
    let ids: Vec<(String, DeploymentStatus)> = registry
        .list(&DeploymentFilter::default(), SortOrder::NewestFirst)
        .into_iter()
        .map(|r| (r.pipeline_id.clone(), r.status))
        .collect();

    for (pipeline_id, status) in ids {
        let result = registry.approve(&pipeline_id, "ops");
        if status == DeploymentStatus::PendingApproval {
            assert_eq!(result.unwrap().status, DeploymentStatus::Running);
        } else {
            assert!(matches!(
                result.unwrap_err(),
                Error::Registry(RegistryError::InvalidTransition { .. })
            ));
            assert_eq!(registry.get(&pipeline_id).unwrap().status, status);
        }
    }
}

#[test]
fn test_unknown_pipeline_is_not_found() {
    let mut registry = registry();

    for result in [
        registry.approve("PIPE-0000", "ops").map(|_| ()),
        registry.reject("PIPE-0000", "reason", "ops").map(|_| ()),
        registry
            .record_completion("PIPE-0000", CompletionOutcome::Succeeded)
            .map(|_| ()),
        registry.get("PIPE-0000").map(|_| ()),
    ] {
        assert!(matches!(
            result.unwrap_err(),
            Error::Registry(RegistryError::NotFound(_))
        ));
    }
}

#[test]
fn test_listing_is_restartable() {
    let registry = registry();

    let first: Vec<String> = registry
        .list(&DeploymentFilter::default(), SortOrder::NewestFirst)
        .iter()
        .map(|r| r.pipeline_id.clone())
        .collect();
    let second: Vec<String> = registry
        .list(&DeploymentFilter::default(), SortOrder::NewestFirst)
        .iter()
        .map(|r| r.pipeline_id.clone())
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_rejection_reason_is_retained_for_audit() {
    let mut registry = registry();

    registry
        .reject("PIPE-1235", "missing change ticket", "ops")
        .unwrap();

    let record = registry.get("PIPE-1235").unwrap();
    assert_eq!(record.status, DeploymentStatus::Failed);
    assert_eq!(
        record.failure_reason.as_deref(),
        Some("missing change ticket")
    );
    assert_eq!(record.decided_by.as_deref(), Some("ops"));
    assert!(record.completed_at.is_some());
}

#[test]
fn test_state_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::epoch());

    {
        let mut registry = DeploymentRegistry::open(
            tmp.path(),
            Box::new(FixedProvider::new(clock.clone() as Arc<dyn Clock>)),
            clock.clone(),
        )
        .unwrap();
        registry.approve("PIPE-1235", "ops").unwrap();
    }

    let registry = DeploymentRegistry::open(
        tmp.path(),
        Box::new(FixedProvider::new(clock.clone() as Arc<dyn Clock>)),
        clock,
    )
    .unwrap();

    // The persisted decision wins over a fresh provider seed.
    let record = registry.get("PIPE-1235").unwrap();
    assert_eq!(record.status, DeploymentStatus::Running);
    assert_eq!(record.decided_by.as_deref(), Some("ops"));
}

#[test]
fn test_records_are_never_deleted() {
    let mut registry = registry();
    let before = registry.len();

    registry.reject("PIPE-1235", "not now", "ops").unwrap();
    registry
        .record_completion("PIPE-1230", CompletionOutcome::Failed)
        .unwrap();

    assert_eq!(registry.len(), before);
}
