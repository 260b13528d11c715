//! `opsdeck deploy` - deployment listing, approval, and trigger.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use dialoguer::{Confirm, Input};

use crate::cli::output;
use crate::core::clock::SystemClock;
use crate::core::config::Config;
use crate::core::constants;
use crate::core::deploy::{
    provider_from_config, CompletionOutcome, DeploymentFilter, DeploymentRecord,
    DeploymentRegistry, DeploymentStatus, Environment, SortOrder,
};
use crate::error::{RegistryError, Result};

fn open_registry(config: &Config) -> Result<DeploymentRegistry> {
    let clock = Arc::new(SystemClock);
    let provider = provider_from_config(config, clock.clone());
    DeploymentRegistry::open(Path::new(constants::STATE_DIR), provider, clock)
}

fn operator() -> String {
    whoami::username()
}

fn prompt_io(e: dialoguer::Error) -> crate::error::Error {
    let dialoguer::Error::IO(io) = e;
    io.into()
}

fn record_rows(records: &[&DeploymentRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.pipeline_id.clone(),
                output::status_cell(r.status.as_str()),
                r.environment.to_string(),
                r.stack_name.clone(),
                r.commit_hash.clone(),
                r.author.clone(),
                r.triggered_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect()
}

const RECORD_HEADERS: &[&str] = &[
    "PIPELINE",
    "STATUS",
    "ENV",
    "STACK",
    "COMMIT",
    "AUTHOR",
    "TRIGGERED",
];

fn print_records(records: &[&DeploymentRecord]) {
    if records.is_empty() {
        output::dimmed("no deployments match");
    } else {
        output::table(RECORD_HEADERS, &record_rows(records));
    }
}

fn warn_fallback(registry: &DeploymentRegistry) {
    if registry.data_source().is_fallback() {
        println!();
        output::warn(&format!("data source: {}", registry.data_source()));
    }
}

/// List tracked deployments.
pub fn list(
    environment: Option<&str>,
    status: Option<&str>,
    asc: bool,
    group_by_commit: bool,
    json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let registry = open_registry(&config)?;

    let filter = DeploymentFilter {
        environment: environment.map(str::parse).transpose()?,
        status: status.map(str::parse).transpose()?,
    };
    let order = if asc {
        SortOrder::OldestFirst
    } else {
        SortOrder::NewestFirst
    };

    if group_by_commit {
        let grouped = registry.grouped_by_commit();
        if json {
            let value: Vec<serde_json::Value> = grouped
                .iter()
                .map(|(commit, records)| {
                    serde_json::json!({
                        "commit": commit,
                        "deployments": records,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        output::section("Promotion History");
        for (commit, records) in &grouped {
            output::header(&format!("commit {}", commit));
            print_records(records);
            println!();
        }
        warn_fallback(&registry);
        return Ok(());
    }

    let records = registry.list(&filter, order);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    output::section("Deployments");
    print_records(&records);
    warn_fallback(&registry);

    Ok(())
}

/// List deployments waiting at the approval gate.
pub fn pending(json: bool) -> Result<()> {
    let config = Config::load()?;
    let registry = open_registry(&config)?;
    let pending = registry.pending();

    if json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
        return Ok(());
    }

    output::section("Pending Approvals");
    if pending.is_empty() {
        output::dimmed("nothing waiting for approval");
    } else {
        print_records(&pending);
        println!();
        output::hint("approve with: opsdeck deploy approve <pipeline-id>");
        output::hint("reject with:  opsdeck deploy reject <pipeline-id> --reason \"...\"");
    }
    warn_fallback(&registry);

    Ok(())
}

/// Show one deployment in full.
pub fn show(pipeline_id: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let registry = open_registry(&config)?;
    let record = registry.get(pipeline_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    output::section(&format!("Deployment {}", record.pipeline_id));
    output::kv("pipeline", &record.pipeline_name);
    output::kv("status", output::status_cell(record.status.as_str()));
    output::kv("environment", record.environment);
    output::kv("stack", &record.stack_name);
    output::kv(
        "commit",
        format!("{} — {}", record.commit_hash, record.commit_message),
    );
    output::kv("author", &record.author);
    output::kv("triggered", record.triggered_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(completed_at) = record.completed_at {
        output::kv("completed", completed_at.format("%Y-%m-%d %H:%M:%S"));
    }
    output::kv("approval required", record.approval_required);
    if let Some(decided_by) = &record.decided_by {
        output::kv("decided by", decided_by);
    }
    if let Some(reason) = &record.failure_reason {
        output::kv("failure reason", reason);
    }
    if let Some(url) = &record.change_url {
        output::kv("change", url);
    }
    if let Some(url) = &record.pipeline_url {
        output::kv("pipeline log", url);
    }

    Ok(())
}

/// Approve a pending deployment.
pub fn approve(pipeline_id: &str, yes: bool) -> Result<()> {
    let config = Config::load()?;
    let mut registry = open_registry(&config)?;

    // Surface NotFound/InvalidTransition before prompting.
    let record = registry.get(pipeline_id)?;

    if !yes && console::user_attended() {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Approve {} → {} ({})?",
                record.pipeline_id, record.environment, record.stack_name
            ))
            .default(false)
            .interact()
            .map_err(prompt_io)?;
        if !proceed {
            output::dimmed("approval aborted");
            return Ok(());
        }
    }

    let approved = registry.approve(pipeline_id, &operator())?;

    output::success(&format!(
        "approved {}: now {}",
        approved.pipeline_id, approved.status
    ));

    Ok(())
}

/// Reject a pending deployment.
pub fn reject(pipeline_id: &str, reason: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let mut registry = open_registry(&config)?;

    registry.get(pipeline_id)?;

    let reason = match reason {
        Some(reason) => reason.to_string(),
        None if console::user_attended() => Input::new()
            .with_prompt("Rejection reason")
            .interact_text()
            .map_err(prompt_io)?,
        None => {
            return Err(RegistryError::EmptyReason {
                pipeline_id: pipeline_id.to_string(),
            }
            .into())
        }
    };

    let rejected = registry.reject(pipeline_id, &reason, &operator())?;

    output::success(&format!(
        "rejected {}: now {}",
        rejected.pipeline_id, rejected.status
    ));

    Ok(())
}

/// Trigger a new pipeline execution.
pub fn trigger(
    repo: &str,
    branch: &str,
    environment: &str,
    params: &[String],
    require_approval: bool,
    no_approval: bool,
) -> Result<()> {
    let config = Config::load()?;
    let mut registry = open_registry(&config)?;

    let environment: Environment = environment.parse()?;
    let parameters = parse_params(params)?;

    let approval_required = if require_approval {
        true
    } else if no_approval {
        false
    } else {
        config.approval_default(environment)
    };

    let record = registry.trigger(
        repo,
        branch,
        environment,
        &parameters,
        approval_required,
        &operator(),
    )?;

    output::success(&format!("triggered {}", record.pipeline_id));
    output::kv("environment", record.environment);
    output::kv("stack", &record.stack_name);
    output::kv("status", output::status_cell(record.status.as_str()));
    if let Some(url) = &record.pipeline_url {
        output::kv("pipeline log", url);
    }
    if record.status == DeploymentStatus::PendingApproval {
        println!();
        output::hint(&format!(
            "awaiting approval — run: opsdeck deploy approve {}",
            record.pipeline_id
        ));
    }

    Ok(())
}

/// Record the external completion event for a running deployment.
pub fn complete(pipeline_id: &str, failed: bool) -> Result<()> {
    let config = Config::load()?;
    let mut registry = open_registry(&config)?;

    let outcome = if failed {
        CompletionOutcome::Failed
    } else {
        CompletionOutcome::Succeeded
    };
    let record = registry.record_completion(pipeline_id, outcome)?;

    output::success(&format!(
        "recorded completion of {}: now {}",
        record.pipeline_id, record.status
    ));

    Ok(())
}

/// Parse repeated `key=value` flags into a parameter map.
fn parse_params(params: &[String]) -> Result<BTreeMap<String, String>> {
    let mut parsed = BTreeMap::new();
    for raw in params {
        let Some((key, value)) = raw.split_once('=') else {
            return Err(RegistryError::InvalidParameters(format!(
                "expected key=value, got '{}'",
                raw
            ))
            .into());
        };
        parsed.insert(key.to_string(), value.to_string());
    }
    Ok(parsed)
}
