//! Deployment records and the approval state machine.
//!
//! Transition table:
//!
//! ```text
//! pending_approval --approve--> running
//! pending_approval --reject---> failed      (requires non-empty reason)
//! running --------- success --> success
//! running --------- failure --> failed
//! ```
//!
//! `success` and `failed` are terminal. Every other transition attempt
//! fails with `InvalidTransition` and leaves the record untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{CommitHash, PipelineId, StackName};
use crate::error::{Error, RegistryError, Result};

/// Lifecycle state of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Running,
    Success,
    Failed,
    PendingApproval,
}

impl DeploymentStatus {
    /// The snake_case state name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::PendingApproval => "pending_approval",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "pending_approval" => Ok(Self::PendingApproval),
            other => Err(RegistryError::InvalidParameters(format!(
                "unknown deployment status '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Deployment target environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Staging,
    Production,
}

impl Environment {
    /// The lowercase environment name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(RegistryError::InvalidParameters(format!(
                "unknown environment '{}' (expected dev, staging, or production)",
                other
            ))
            .into()),
        }
    }
}

/// Outcome reported by the external completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Succeeded,
    Failed,
}

/// One tracked pipeline execution.
///
/// Created when a pipeline is triggered; mutated only through the
/// transition methods; retained indefinitely for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Unique pipeline execution id.
    pub pipeline_id: PipelineId,
    /// Pipeline display name.
    pub pipeline_name: String,
    /// Current lifecycle state.
    pub status: DeploymentStatus,
    /// Target environment.
    pub environment: Environment,
    /// Target stack.
    pub stack_name: StackName,
    /// Source commit. Several records may share one commit as a change is
    /// promoted through environments.
    pub commit_hash: CommitHash,
    /// Source commit message.
    pub commit_message: String,
    /// Commit author or triggering operator.
    pub author: String,
    /// When the pipeline was triggered.
    pub triggered_at: DateTime<Utc>,
    /// When the pipeline reached a terminal state, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether this execution had to pass the approval gate.
    #[serde(default)]
    pub approval_required: bool,
    /// Link to the change description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_url: Option<String>,
    /// Link to the pipeline log, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_url: Option<String>,
    /// Operator who approved or rejected, if a decision was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    /// Rejection reason or failure detail, if the deployment failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl DeploymentRecord {
    /// Approve a pending deployment, moving it to `running`.
    ///
    /// # Errors
    ///
    /// `RegistryError::InvalidTransition` unless the record is in
    /// `pending_approval`; the record is left unchanged on error, so a
    /// double-approval fails loudly instead of being absorbed.
    pub fn approve(&mut self, decided_by: &str) -> Result<()> {
        if self.status != DeploymentStatus::PendingApproval {
            return Err(self.invalid_transition("approve"));
        }
        self.status = DeploymentStatus::Running;
        self.decided_by = Some(decided_by.to_string());
        Ok(())
    }

    /// Reject a pending deployment with a reason, moving it to `failed`.
    ///
    /// # Errors
    ///
    /// `RegistryError::EmptyReason` for a blank reason,
    /// `RegistryError::InvalidTransition` unless the record is in
    /// `pending_approval`. No field changes on error.
    pub fn reject(&mut self, reason: &str, decided_by: &str, now: DateTime<Utc>) -> Result<()> {
        if reason.trim().is_empty() {
            return Err(RegistryError::EmptyReason {
                pipeline_id: self.pipeline_id.clone(),
            }
            .into());
        }
        if self.status != DeploymentStatus::PendingApproval {
            return Err(self.invalid_transition("reject"));
        }
        self.status = DeploymentStatus::Failed;
        self.completed_at = Some(now);
        self.decided_by = Some(decided_by.to_string());
        self.failure_reason = Some(reason.trim().to_string());
        Ok(())
    }

    /// Record the external completion event for a running deployment.
    ///
    /// # Errors
    ///
    /// `RegistryError::InvalidTransition` unless the record is `running`.
    pub fn complete(&mut self, outcome: CompletionOutcome, now: DateTime<Utc>) -> Result<()> {
        if self.status != DeploymentStatus::Running {
            return Err(self.invalid_transition("complete"));
        }
        self.status = match outcome {
            CompletionOutcome::Succeeded => DeploymentStatus::Success,
            CompletionOutcome::Failed => DeploymentStatus::Failed,
        };
        self.completed_at = Some(now);
        Ok(())
    }

    fn invalid_transition(&self, event: &'static str) -> Error {
        RegistryError::InvalidTransition {
            pipeline_id: self.pipeline_id.clone(),
            from: self.status.to_string(),
            event,
        }
        .into()
    }
}
