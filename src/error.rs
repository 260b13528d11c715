//! Error types.
//!
//! A top-level [`Error`] wraps one sub-enum per domain so callers can match
//! on the failure class without string inspection. Collaborator failures
//! (cloud calls, pipeline provider calls) are wrapped with the operation
//! name and target rather than passed through opaquely.

use thiserror::Error;

/// Top-level error for all opsdeck operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("not initialized: run `opsdeck init` first")]
    NotInitialized,

    #[error("already initialized: .opsdeck.toml exists")]
    AlreadyInitialized,

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("missing config field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Credential resolution errors. Always carry the account id so the
/// presentation layer can scope the warning to the affected panel.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("no credentials configured for account '{account}'")]
    Missing { account: String },

    #[error("invalid credentials for account '{account}': {reason}")]
    Invalid { account: String, reason: String },
}

/// Session resolution errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("'{0}' is not a concrete region: region-scoped operations need a specific region")]
    InvalidRegion(String),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("region '{region}' is not enabled for account '{account}'")]
    RegionNotEnabled { account: String, region: String },

    #[error("failed to build client for {account}/{region}: {reason}")]
    BuildFailed {
        account: String,
        region: String,
        reason: String,
    },
}

/// Cloud control-plane call errors, wrapped with the failing operation
/// and the account/region it targeted.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("cloud call '{operation}' failed for {account}/{region}: {reason}")]
    Call {
        operation: &'static str,
        account: String,
        region: String,
        reason: String,
    },
}

/// Result cache errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Two unrelated loaders produced the same cache key. Composite keys
    /// make this unreachable through the normal API; surfacing it instead
    /// of recomputing keeps the bug visible.
    #[error("cache key collision on '{key}': stored value has a different type")]
    KeyCollision { key: String },
}

/// Deployment registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no deployment found for pipeline '{0}'")]
    NotFound(String),

    #[error("cannot {event} pipeline '{pipeline_id}': deployment is in state '{from}'")]
    InvalidTransition {
        pipeline_id: String,
        from: String,
        event: &'static str,
    },

    #[error("rejection of pipeline '{pipeline_id}' requires a non-empty reason")]
    EmptyReason { pipeline_id: String },

    #[error("invalid trigger parameters: {0}")]
    InvalidParameters(String),

    #[error("pipeline provider call '{operation}' failed: {reason}")]
    Provider {
        operation: &'static str,
        reason: String,
    },

    #[error("failed to read deployment state: {0}")]
    ReadState(#[source] std::io::Error),

    #[error("failed to write deployment state: {0}")]
    WriteState(#[source] std::io::Error),

    #[error("deployment state parse error: {0}")]
    ParseState(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
