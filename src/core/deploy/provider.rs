//! Pipeline provider seam.
//!
//! The registry talks to its CI/CD provider through [`PipelineProvider`].
//! A live provider (GitHub Actions, GitLab CI, ...) is an external
//! collaborator; when no provider credential is configured the bundled
//! [`FixedProvider`] serves a fixed, clearly-labeled record set so the
//! console keeps working. Callers distinguish the two via
//! [`DataSource`].

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use crate::core::clock::Clock;
use crate::core::cloud::DataSource;
use crate::core::config::Config;
use crate::core::deploy::record::{DeploymentRecord, DeploymentStatus, Environment};
use crate::core::types::PipelineId;
use crate::error::Result;

/// What a provider returns for a freshly triggered pipeline.
#[derive(Debug, Clone)]
pub struct TriggerReceipt {
    /// Id assigned to the new pipeline execution.
    pub pipeline_id: PipelineId,
    /// Link to the pipeline log, if the provider exposes one.
    pub pipeline_url: Option<String>,
    /// Commit the pipeline will deploy (branch head at trigger time).
    pub commit_hash: String,
}

/// Narrow interface to a CI/CD provider.
pub trait PipelineProvider {
    /// Most recent deployment descriptors, newest first.
    fn list_recent(&self, limit: usize) -> Result<Vec<DeploymentRecord>>;

    /// Signal approval of a pending pipeline to the provider.
    fn approve(&self, pipeline_id: &str) -> Result<()>;

    /// Signal rejection of a pending pipeline to the provider.
    fn reject(&self, pipeline_id: &str, reason: &str) -> Result<()>;

    /// Start a new pipeline execution.
    fn trigger(
        &self,
        repository: &str,
        branch: &str,
        environment: Environment,
        parameters: &BTreeMap<String, String>,
    ) -> Result<TriggerReceipt>;

    /// Where this provider's records come from.
    fn data_source(&self) -> DataSource;
}

/// Select a provider from configuration.
///
/// No live provider client ships with this crate; every configured kind
/// currently resolves to the fallback record set, and the data-source
/// flag says so.
pub fn provider_from_config(config: &Config, clock: Arc<dyn Clock>) -> Box<dyn PipelineProvider> {
    let kind = config
        .provider
        .as_ref()
        .map(|p| p.kind.as_str())
        .unwrap_or("fallback");
    let has_token = config
        .provider
        .as_ref()
        .is_some_and(|p| p.token().is_some());
    debug!(kind, has_token, "selecting pipeline provider");

    Box::new(FixedProvider::new(clock))
}

/// Fallback provider serving a fixed, illustrative deployment history.
pub struct FixedProvider {
    clock: Arc<dyn Clock>,
    triggered: Cell<u64>,
}

impl FixedProvider {
    /// Create a fallback provider; timestamps are derived from the clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            triggered: Cell::new(0),
        }
    }
}

impl PipelineProvider for FixedProvider {
    fn list_recent(&self, limit: usize) -> Result<Vec<DeploymentRecord>> {
        let now = self.clock.now();
        let record = |pipeline_id: &str,
                      status: DeploymentStatus,
                      environment: Environment,
                      stack_name: &str,
                      commit_hash: &str,
                      commit_message: &str,
                      author: &str,
                      triggered_mins_ago: i64,
                      completed_mins_ago: Option<i64>,
                      approval_required: bool| {
            DeploymentRecord {
                pipeline_id: pipeline_id.to_string(),
                pipeline_name: "Deploy Infrastructure".to_string(),
                status,
                environment,
                stack_name: stack_name.to_string(),
                commit_hash: commit_hash.to_string(),
                commit_message: commit_message.to_string(),
                author: author.to_string(),
                triggered_at: now - Duration::minutes(triggered_mins_ago),
                completed_at: completed_mins_ago.map(|m| now - Duration::minutes(m)),
                approval_required,
                change_url: approval_required
                    .then(|| "https://pipelines.example.com/changes/456".to_string()),
                pipeline_url: Some(format!(
                    "https://pipelines.example.com/runs/{}",
                    pipeline_id.trim_start_matches("PIPE-")
                )),
                decided_by: None,
                failure_reason: None,
            }
        };

        let mut records = vec![
            record(
                "PIPE-1234",
                DeploymentStatus::Success,
                Environment::Production,
                "prod-vpc-stack",
                "abc1234",
                "Add production VPC with 3 AZs",
                "John Doe",
                120,
                Some(105),
                false,
            ),
            record(
                "PIPE-1235",
                DeploymentStatus::PendingApproval,
                Environment::Production,
                "prod-rds-stack",
                "def5678",
                "Add production RDS with read replicas",
                "Jane Smith",
                30,
                None,
                true,
            ),
            record(
                "PIPE-1233",
                DeploymentStatus::Success,
                Environment::Staging,
                "staging-app-stack",
                "def5678",
                "Add production RDS with read replicas",
                "Jane Smith",
                45,
                Some(35),
                false,
            ),
            record(
                "PIPE-1232",
                DeploymentStatus::Success,
                Environment::Dev,
                "dev-test-stack",
                "def5678",
                "Add production RDS with read replicas",
                "Jane Smith",
                60,
                Some(50),
                false,
            ),
            record(
                "PIPE-1231",
                DeploymentStatus::Failed,
                Environment::Dev,
                "dev-failed-stack",
                "ghi9012",
                "Update security groups",
                "Bob Wilson",
                180,
                Some(175),
                false,
            ),
            record(
                "PIPE-1230",
                DeploymentStatus::Running,
                Environment::Staging,
                "staging-update-stack",
                "jkl3456",
                "Update Lambda functions",
                "Alice Johnson",
                10,
                None,
                false,
            ),
        ];
        records.truncate(limit);
        Ok(records)
    }

    fn approve(&self, pipeline_id: &str) -> Result<()> {
        // Nothing to notify; the registry's record is the only state.
        debug!(pipeline_id, "fallback provider acknowledged approval");
        Ok(())
    }

    fn reject(&self, pipeline_id: &str, reason: &str) -> Result<()> {
        debug!(pipeline_id, reason, "fallback provider acknowledged rejection");
        Ok(())
    }

    fn trigger(
        &self,
        repository: &str,
        branch: &str,
        environment: Environment,
        _parameters: &BTreeMap<String, String>,
    ) -> Result<TriggerReceipt> {
        let n = self.triggered.get();
        self.triggered.set(n + 1);

        // Ids stay unique across console sessions: the clock seeds the
        // range, the counter separates triggers within one session.
        let base = 9000 + self.clock.now().timestamp_millis().unsigned_abs() % 900_000;
        let pipeline_id = format!("PIPE-{}", base + n);
        debug!(
            pipeline_id,
            repository,
            branch,
            environment = %environment,
            "fallback provider triggered pipeline"
        );
        Ok(TriggerReceipt {
            pipeline_url: Some(format!(
                "https://pipelines.example.com/runs/{}",
                base + n
            )),
            // Synthetic branch-head hash, stable per trigger ordinal.
            commit_hash: format!("{:07x}", (base + n + 1).wrapping_mul(0x9e3779b1) & 0xfff_ffff),
            pipeline_id,
        })
    }

    fn data_source(&self) -> DataSource {
        DataSource::Fallback
    }
}
