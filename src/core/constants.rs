//! Constants used throughout opsdeck.
//!
//! Centralizes magic strings and configuration values.

/// Configuration file name (.opsdeck.toml).
pub const CONFIG_FILE: &str = ".opsdeck.toml";

/// Local state directory (.opsdeck).
pub const STATE_DIR: &str = ".opsdeck";

/// Deployment registry state file, inside [`STATE_DIR`].
pub const DEPLOYMENTS_FILE: &str = "deployments.json";

/// Default freshness window for cached inventory reads, in seconds.
pub const DEFAULT_INVENTORY_TTL_SECS: u64 = 300;

/// How many records the registry requests when seeding from a provider.
pub const SEED_DEPLOYMENT_LIMIT: usize = 10;

/// Region sentinels that mean "all regions" and are rejected by
/// region-scoped operations.
pub const REGION_WILDCARDS: &[&str] = &["all", "*", "any"];

/// Gitignore entries to keep local state out of version control.
pub const GITIGNORE_ENTRIES: &[&str] = &[".opsdeck/"];
