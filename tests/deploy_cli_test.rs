//! `opsdeck deploy` integration tests.
//!
//! These drive the approval state machine end to end through the binary;
//! registry state persists in the test directory between invocations.

mod support;
use support::*;

fn deployments_json(t: &Test, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["--json"];
    args.extend_from_slice(extra);
    let output = t.deploy_list(&args);
    assert_success(&output);
    serde_json::from_str(&stdout(&output)).unwrap()
}

#[test]
fn test_list_seeds_fallback_records() {
    let t = Test::init();

    let output = t.deploy_list(&[]);
    assert_success(&output);
    assert_stdout_contains(&output, "PIPE-1235");
    assert_stdout_contains(&output, "pending_approval");
    assert_stdout_contains(&output, "fallback (illustrative data)");
}

#[test]
fn test_list_orders_newest_first() {
    let t = Test::init();

    let records = deployments_json(&t, &[]);
    let ids: Vec<&str> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["pipeline_id"].as_str().unwrap())
        .collect();

    assert_eq!(
        ids,
        vec![
            "PIPE-1230", "PIPE-1235", "PIPE-1233", "PIPE-1232", "PIPE-1234", "PIPE-1231"
        ]
    );
}

#[test]
fn test_list_ascending_reverses_order() {
    let t = Test::init();

    let records = deployments_json(&t, &["--asc"]);
    let first = records[0]["pipeline_id"].as_str().unwrap();
    assert_eq!(first, "PIPE-1231");
}

#[test]
fn test_list_filters_by_status_and_environment() {
    let t = Test::init();

    let failed = deployments_json(&t, &["--status", "failed"]);
    assert_eq!(failed.as_array().unwrap().len(), 1);
    assert_eq!(failed[0]["pipeline_id"], "PIPE-1231");

    let production = deployments_json(&t, &["--environment", "production"]);
    for record in production.as_array().unwrap() {
        assert_eq!(record["environment"], "production");
    }
}

#[test]
fn test_list_rejects_unknown_status() {
    let t = Test::init();

    let output = t.deploy_list(&["--status", "cancelled"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown deployment status");
}

#[test]
fn test_group_by_commit_shows_promotion_history() {
    let t = Test::init();

    let output = t.deploy_list(&["--group-by-commit"]);
    assert_success(&output);
    assert_stdout_contains(&output, "commit def5678");

    // Three environments share commit def5678.
    let grouped_output = t.deploy_list(&["--group-by-commit", "--json"]);
    assert_success(&grouped_output);
    let grouped: serde_json::Value = serde_json::from_str(&stdout(&grouped_output)).unwrap();
    let group = grouped
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["commit"] == "def5678")
        .unwrap();
    assert_eq!(group["deployments"].as_array().unwrap().len(), 3);
}

#[test]
fn test_pending_lists_the_approval_gate() {
    let t = Test::init();

    let output = t.deploy_pending(&[]);
    assert_success(&output);
    assert_stdout_contains(&output, "PIPE-1235");
    assert_stdout_contains(&output, "opsdeck deploy approve");
}

#[test]
fn test_show_displays_record_details() {
    let t = Test::init();

    let output = t.deploy_show("PIPE-1235", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "prod-rds-stack");
    assert_stdout_contains(&output, "Jane Smith");
    assert_stdout_contains(&output, "approval required");
}

#[test]
fn test_show_unknown_pipeline() {
    let t = Test::init();

    let output = t.deploy_show("PIPE-0000", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no deployment found");
    assert_stdout_contains(&output, "opsdeck deploy list");
}

#[test]
fn test_approve_moves_pending_to_running() {
    let t = Test::init();

    let output = t.deploy_approve("PIPE-1235");
    assert_success(&output);
    assert_stdout_contains(&output, "now running");

    // Persisted across invocations.
    let output = t.deploy_show("PIPE-1235", &["--json"]);
    let record: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(record["status"], "running");
    assert!(record["decided_by"].is_string());
}

#[test]
fn test_double_approval_fails() {
    let t = Test::init();

    assert_success(&t.deploy_approve("PIPE-1235"));

    let output = t.deploy_approve("PIPE-1235");
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot approve");
    assert_stderr_contains(&output, "running");
}

#[test]
fn test_approve_completed_deployment_fails() {
    let t = Test::init();

    let output = t.deploy_approve("PIPE-1234");
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot approve");
}

#[test]
fn test_reject_requires_reason_when_not_interactive() {
    let t = Test::init();

    let output = t
        .cmd()
        .args(["deploy", "reject", "PIPE-1235"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "non-empty reason");
}

#[test]
fn test_reject_moves_pending_to_failed() {
    let t = Test::init();

    let output = t.deploy_reject("PIPE-1235", "schema change unreviewed");
    assert_success(&output);
    assert_stdout_contains(&output, "now failed");

    let output = t.deploy_show("PIPE-1235", &["--json"]);
    let record: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(record["status"], "failed");
    assert_eq!(record["failure_reason"], "schema change unreviewed");
}

#[test]
fn test_reject_running_deployment_fails() {
    let t = Test::init();

    let output = t.deploy_reject("PIPE-1230", "too risky");
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot reject");
}

#[test]
fn test_trigger_production_defaults_to_approval_gate() {
    let t = Test::init();

    let output = t.deploy_trigger("org/infra", "production", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "pending_approval");
    assert_stdout_contains(&output, "awaiting approval");
}

#[test]
fn test_trigger_dev_starts_running() {
    let t = Test::init();

    let output = t.deploy_trigger("org/infra", "dev", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "running");
    assert_stdout_excludes(&output, "awaiting approval");
}

#[test]
fn test_trigger_no_approval_overrides_policy() {
    let t = Test::init();

    let output = t.deploy_trigger("org/infra", "production", &["--no-approval"]);
    assert_success(&output);
    assert_stdout_contains(&output, "running");
}

#[test]
fn test_trigger_rejects_malformed_param() {
    let t = Test::init();

    let output = t.deploy_trigger("org/infra", "dev", &["--param", "no-separator"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "key=value");

    // No record was created by the failed trigger.
    let records = deployments_json(&t, &[]);
    assert_eq!(records.as_array().unwrap().len(), 6);
}

#[test]
fn test_trigger_rejects_unknown_environment() {
    let t = Test::init();

    let output = t.deploy_trigger("org/infra", "qa", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown environment");
}

#[test]
fn test_full_lifecycle_trigger_approve_complete() {
    let t = Test::init();

    // Trigger into the approval gate.
    let output = t.deploy_trigger("org/infra", "production", &["--param", "stack=edge-stack"]);
    assert_success(&output);
    let out = stdout(&output);
    let pipeline_id = out
        .lines()
        .find(|l| l.contains("triggered"))
        .and_then(|l| l.split_whitespace().last())
        .expect("triggered pipeline id in output")
        .to_string();
    assert!(pipeline_id.starts_with("PIPE-"));

    // Approve → running.
    let output = t.deploy_approve(&pipeline_id);
    assert_success(&output);
    assert_stdout_contains(&output, "now running");

    // External success → success.
    let output = t.deploy_complete(&pipeline_id, &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "now success");

    // Visible in the success listing.
    let successes = deployments_json(&t, &["--status", "success"]);
    assert!(successes
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["pipeline_id"] == pipeline_id.as_str()));
}

#[test]
fn test_complete_failed_outcome() {
    let t = Test::init();

    let output = t.deploy_complete("PIPE-1230", &["--failed"]);
    assert_success(&output);
    assert_stdout_contains(&output, "now failed");
}

#[test]
fn test_complete_pending_deployment_fails() {
    let t = Test::init();

    let output = t.deploy_complete("PIPE-1235", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot complete");
}

#[test]
fn test_status_shows_pending_approvals() {
    let t = Test::init();

    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "pending approval");
    assert_stdout_contains(&output, "PIPE-1235");
}
