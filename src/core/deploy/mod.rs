//! Deployment registry.
//!
//! Tracks pipeline deployments through their lifecycle and enforces the
//! approval gate in front of production changes. The registry is the
//! source of truth; the CI/CD provider behind it is an external
//! collaborator with a fixed fallback when none is configured.

mod provider;
mod record;
mod registry;

pub use provider::{provider_from_config, FixedProvider, PipelineProvider, TriggerReceipt};
pub use record::{CompletionOutcome, DeploymentRecord, DeploymentStatus, Environment};
pub use registry::{DeploymentFilter, DeploymentRegistry, SortOrder};
