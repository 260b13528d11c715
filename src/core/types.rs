//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A cloud account identifier (e.g. "sandbox", "prod-121000000001").
pub type AccountId = String;

/// A pipeline execution identifier assigned by the CI/CD provider.
pub type PipelineId = String;

/// A source commit hash (short or full form).
pub type CommitHash = String;

/// An infrastructure stack name (e.g. "prod-vpc-stack").
pub type StackName = String;
