//! Deployment registry: source of truth for pipeline deployment records.
//!
//! Seeds from the configured provider on first open, persists every
//! mutation to the state file, and never deletes a record — the history
//! is the audit trail.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::core::clock::Clock;
use crate::core::cloud::DataSource;
use crate::core::constants;
use crate::core::deploy::provider::PipelineProvider;
use crate::core::deploy::record::{
    CompletionOutcome, DeploymentRecord, DeploymentStatus, Environment,
};
use crate::core::types::{CommitHash, PipelineId};
use crate::error::{RegistryError, Result};

/// Filter for deployment listings. Empty filter matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentFilter {
    /// Only deployments targeting this environment.
    pub environment: Option<Environment>,
    /// Only deployments in this state.
    pub status: Option<DeploymentStatus>,
}

impl DeploymentFilter {
    fn matches(&self, record: &DeploymentRecord) -> bool {
        self.environment.map_or(true, |e| record.environment == e)
            && self.status.map_or(true, |s| record.status == s)
    }
}

/// Listing order. Ties on trigger time always break by ascending pipeline
/// id, in both directions, so equal-timestamp records never swap places
/// between views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recent trigger first (the default).
    #[default]
    NewestFirst,
    /// Oldest trigger first.
    OldestFirst,
}

/// Tracks deployment lifecycles and enforces the approval gate.
pub struct DeploymentRegistry {
    records: BTreeMap<PipelineId, DeploymentRecord>,
    provider: Box<dyn PipelineProvider>,
    path: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

impl DeploymentRegistry {
    /// Open the registry backed by a state file under `state_dir`.
    ///
    /// Loads existing records, or seeds from the provider and writes the
    /// initial state when none exist yet.
    ///
    /// # Errors
    ///
    /// `RegistryError` for unreadable or malformed state, and provider
    /// failures wrapped with the seeding operation.
    pub fn open(
        state_dir: &Path,
        provider: Box<dyn PipelineProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let path = state_dir.join(constants::DEPLOYMENTS_FILE);
        let mut registry = Self {
            records: BTreeMap::new(),
            provider,
            path: Some(path.clone()),
            clock,
        };

        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(RegistryError::ReadState)?;
            let records: Vec<DeploymentRecord> =
                serde_json::from_str(&contents).map_err(RegistryError::ParseState)?;
            debug!(path = %path.display(), count = records.len(), "deployment state loaded");
            registry.records = records
                .into_iter()
                .map(|r| (r.pipeline_id.clone(), r))
                .collect();
        } else {
            registry.seed()?;
            registry.save()?;
        }

        Ok(registry)
    }

    /// Open an unpersisted registry seeded from the provider.
    pub fn in_memory(provider: Box<dyn PipelineProvider>, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut registry = Self {
            records: BTreeMap::new(),
            provider,
            path: None,
            clock,
        };
        registry.seed()?;
        Ok(registry)
    }

    fn seed(&mut self) -> Result<()> {
        let records = self
            .provider
            .list_recent(constants::SEED_DEPLOYMENT_LIMIT)
            .map_err(|e| RegistryError::Provider {
                operation: "list_recent",
                reason: e.to_string(),
            })?;
        debug!(count = records.len(), source = %self.provider.data_source(), "registry seeded");
        self.records = records
            .into_iter()
            .map(|r| (r.pipeline_id.clone(), r))
            .collect();
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(RegistryError::WriteState)?;
        }
        let records: Vec<&DeploymentRecord> = self.records.values().collect();
        let contents = serde_json::to_string_pretty(&records).map_err(RegistryError::ParseState)?;
        std::fs::write(path, contents).map_err(RegistryError::WriteState)?;
        Ok(())
    }

    /// Where this registry's records come from.
    pub fn data_source(&self) -> DataSource {
        self.provider.data_source()
    }

    /// Number of tracked deployments.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no deployments are tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up one deployment.
    ///
    /// # Errors
    ///
    /// `RegistryError::NotFound` when the pipeline id is unknown.
    pub fn get(&self, pipeline_id: &str) -> Result<&DeploymentRecord> {
        self.records
            .get(pipeline_id)
            .ok_or_else(|| RegistryError::NotFound(pipeline_id.to_string()).into())
    }

    /// Filtered listing ordered by trigger time.
    ///
    /// Default order is most recent first; ties on `triggered_at` break by
    /// ascending pipeline id in both directions.
    pub fn list(&self, filter: &DeploymentFilter, order: SortOrder) -> Vec<&DeploymentRecord> {
        let mut records: Vec<&DeploymentRecord> = self
            .records
            .values()
            .filter(|r| filter.matches(r))
            .collect();
        records.sort_by(|a, b| match order {
            SortOrder::NewestFirst => b
                .triggered_at
                .cmp(&a.triggered_at)
                .then_with(|| a.pipeline_id.cmp(&b.pipeline_id)),
            SortOrder::OldestFirst => a
                .triggered_at
                .cmp(&b.triggered_at)
                .then_with(|| a.pipeline_id.cmp(&b.pipeline_id)),
        });
        records
    }

    /// Deployments waiting at the approval gate, most recent first.
    pub fn pending(&self) -> Vec<&DeploymentRecord> {
        self.list(
            &DeploymentFilter {
                status: Some(DeploymentStatus::PendingApproval),
                ..Default::default()
            },
            SortOrder::NewestFirst,
        )
    }

    /// Promotion history: records grouped by commit hash.
    ///
    /// Groups are ordered by their most recent trigger (newest group
    /// first); within a group records run oldest first, the order the
    /// change moved through environments.
    pub fn grouped_by_commit(&self) -> Vec<(CommitHash, Vec<&DeploymentRecord>)> {
        let mut groups: BTreeMap<&CommitHash, Vec<&DeploymentRecord>> = BTreeMap::new();
        for record in self.records.values() {
            groups.entry(&record.commit_hash).or_default().push(record);
        }

        let mut grouped: Vec<(CommitHash, Vec<&DeploymentRecord>)> = groups
            .into_iter()
            .map(|(commit, mut records)| {
                records.sort_by(|a, b| {
                    a.triggered_at
                        .cmp(&b.triggered_at)
                        .then_with(|| a.pipeline_id.cmp(&b.pipeline_id))
                });
                (commit.clone(), records)
            })
            .collect();
        grouped.sort_by(|a, b| {
            let newest = |records: &[&DeploymentRecord]| {
                records.iter().map(|r| r.triggered_at).max()
            };
            newest(&b.1).cmp(&newest(&a.1)).then_with(|| a.0.cmp(&b.0))
        });
        grouped
    }

    /// Approve a pending deployment.
    ///
    /// Checks the transition guard, notifies the provider, then mutates
    /// and persists — a provider failure leaves the record untouched.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidTransition`, or a wrapped provider failure.
    pub fn approve(&mut self, pipeline_id: &str, decided_by: &str) -> Result<DeploymentRecord> {
        let record = self.get(pipeline_id)?;
        if record.status != DeploymentStatus::PendingApproval {
            return Err(RegistryError::InvalidTransition {
                pipeline_id: pipeline_id.to_string(),
                from: record.status.to_string(),
                event: "approve",
            }
            .into());
        }

        self.provider
            .approve(pipeline_id)
            .map_err(|e| RegistryError::Provider {
                operation: "approve",
                reason: e.to_string(),
            })?;

        let record = self
            .records
            .get_mut(pipeline_id)
            .ok_or_else(|| RegistryError::NotFound(pipeline_id.to_string()))?;
        record.approve(decided_by)?;
        let approved = record.clone();
        self.save()?;

        debug!(pipeline_id, decided_by, "deployment approved");
        Ok(approved)
    }

    /// Reject a pending deployment with a reason.
    ///
    /// # Errors
    ///
    /// `NotFound`, `EmptyReason`, `InvalidTransition`, or a wrapped
    /// provider failure. No partial mutation on error.
    pub fn reject(
        &mut self,
        pipeline_id: &str,
        reason: &str,
        decided_by: &str,
    ) -> Result<DeploymentRecord> {
        let record = self.get(pipeline_id)?;
        if reason.trim().is_empty() {
            return Err(RegistryError::EmptyReason {
                pipeline_id: pipeline_id.to_string(),
            }
            .into());
        }
        if record.status != DeploymentStatus::PendingApproval {
            return Err(RegistryError::InvalidTransition {
                pipeline_id: pipeline_id.to_string(),
                from: record.status.to_string(),
                event: "reject",
            }
            .into());
        }

        self.provider
            .reject(pipeline_id, reason)
            .map_err(|e| RegistryError::Provider {
                operation: "reject",
                reason: e.to_string(),
            })?;

        let now = self.clock.now();
        let record = self
            .records
            .get_mut(pipeline_id)
            .ok_or_else(|| RegistryError::NotFound(pipeline_id.to_string()))?;
        record.reject(reason, decided_by, now)?;
        let rejected = record.clone();
        self.save()?;

        debug!(pipeline_id, decided_by, "deployment rejected");
        Ok(rejected)
    }

    /// Trigger a new pipeline execution.
    ///
    /// Parameters are validated before any state is created; the record
    /// starts in `pending_approval` when `approval_required` is set,
    /// otherwise `running`.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` for malformed input (no record is created),
    /// or a wrapped provider failure.
    pub fn trigger(
        &mut self,
        repository: &str,
        branch: &str,
        environment: Environment,
        parameters: &BTreeMap<String, String>,
        approval_required: bool,
        requested_by: &str,
    ) -> Result<DeploymentRecord> {
        validate_trigger(repository, branch, parameters)?;

        let receipt = self
            .provider
            .trigger(repository, branch, environment, parameters)
            .map_err(|e| RegistryError::Provider {
                operation: "trigger",
                reason: e.to_string(),
            })?;
        if self.records.contains_key(&receipt.pipeline_id) {
            // Records are audit state; a reused id must never overwrite one.
            return Err(RegistryError::Provider {
                operation: "trigger",
                reason: format!("provider reused pipeline id '{}'", receipt.pipeline_id),
            }
            .into());
        }

        let stack_name = parameters.get("stack").cloned().unwrap_or_else(|| {
            let repo_tail = repository.rsplit('/').next().unwrap_or(repository);
            format!("{}-{}", environment, repo_tail)
        });
        let record = DeploymentRecord {
            pipeline_id: receipt.pipeline_id.clone(),
            pipeline_name: format!("Deploy {}", repository),
            status: if approval_required {
                DeploymentStatus::PendingApproval
            } else {
                DeploymentStatus::Running
            },
            environment,
            stack_name,
            commit_hash: receipt.commit_hash,
            commit_message: format!("manual trigger of {}@{}", repository, branch),
            author: requested_by.to_string(),
            triggered_at: self.clock.now(),
            completed_at: None,
            approval_required,
            change_url: None,
            pipeline_url: receipt.pipeline_url,
            decided_by: None,
            failure_reason: None,
        };

        self.records
            .insert(record.pipeline_id.clone(), record.clone());
        self.save()?;

        debug!(
            pipeline_id = %record.pipeline_id,
            environment = %environment,
            approval_required,
            "pipeline triggered"
        );
        Ok(record)
    }

    /// Record the external completion event for a running deployment.
    ///
    /// # Errors
    ///
    /// `NotFound` or `InvalidTransition`.
    pub fn record_completion(
        &mut self,
        pipeline_id: &str,
        outcome: CompletionOutcome,
    ) -> Result<DeploymentRecord> {
        let now = self.clock.now();
        let record = self
            .records
            .get_mut(pipeline_id)
            .ok_or_else(|| RegistryError::NotFound(pipeline_id.to_string()))?;
        record.complete(outcome, now)?;
        let completed = record.clone();
        self.save()?;

        debug!(pipeline_id, status = %completed.status, "deployment completed");
        Ok(completed)
    }
}

/// Validate trigger input before any state exists.
fn validate_trigger(
    repository: &str,
    branch: &str,
    parameters: &BTreeMap<String, String>,
) -> Result<()> {
    if repository.trim().is_empty() {
        return Err(RegistryError::InvalidParameters("repository must not be empty".into()).into());
    }
    if branch.trim().is_empty() {
        return Err(RegistryError::InvalidParameters("branch must not be empty".into()).into());
    }
    for (key, value) in parameters {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || "_-.".contains(c)) {
            return Err(RegistryError::InvalidParameters(format!(
                "parameter key '{}' must be alphanumeric with '_', '-' or '.'",
                key
            ))
            .into());
        }
        if value.is_empty() {
            return Err(RegistryError::InvalidParameters(format!(
                "parameter '{}' has an empty value",
                key
            ))
            .into());
        }
    }
    Ok(())
}
