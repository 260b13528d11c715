//! Configuration file management.
//!
//! Handles reading, writing, and validating `.opsdeck.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use crate::core::account::{Account, Region};
use crate::core::constants;
use crate::core::deploy::Environment;
use crate::core::types::AccountId;
use crate::error::{ConfigError, Result, SessionError};

/// Project configuration stored in `.opsdeck.toml`
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Metadata about the console configuration
    pub opsdeck: Meta,
    /// Configured cloud accounts
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Map of credential profile names to credential material
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialProfile>,
    /// Optional CI/CD pipeline provider configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,
    /// Per-environment approval defaults (environment name → approval required).
    ///
    /// Consulted when a trigger does not state approval explicitly;
    /// environments absent from the table fall back to the built-in policy
    /// (production requires approval, everything else does not).
    #[serde(default)]
    pub approval: BTreeMap<String, bool>,
    /// Result cache settings
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Metadata section of the configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    /// Configuration version
    pub version: String,
}

/// Credential profile: inline key material or environment indirection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialProfile {
    /// Inline access key id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Inline secret key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    /// Environment variable prefix to resolve keys from instead of inline
    /// values (`<PREFIX>_ACCESS_KEY_ID`, `<PREFIX>_SECRET_ACCESS_KEY`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

/// CI/CD pipeline provider configuration.
///
/// When no token resolves, the deployment registry seeds from a fixed,
/// clearly-labeled illustrative record set instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider kind: "fallback" (default), "github", "gitlab".
    pub kind: String,
    /// Environment variable holding the provider API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl ProviderConfig {
    /// Resolve the provider token from the configured environment variable.
    pub fn token(&self) -> Option<String> {
        self.token_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|t| !t.is_empty())
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Freshness window for cached inventory reads, in seconds.
    pub inventory_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            inventory_ttl_secs: constants::DEFAULT_INVENTORY_TTL_SECS,
        }
    }
}

impl Config {
    /// Create a new empty configuration with current version
    pub fn new() -> Self {
        Self {
            opsdeck: Meta {
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            accounts: Vec::new(),
            credentials: BTreeMap::new(),
            provider: None,
            approval: BTreeMap::new(),
            cache: CacheSettings::default(),
        }
    }

    /// Path to the configuration file in the current directory
    pub fn config_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Check if a configuration file exists in the current directory
    pub fn exists() -> bool {
        Self::config_path().exists()
    }

    /// Load configuration from `.opsdeck.toml`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if the file doesn't exist,
    /// or `ConfigError::Parse` if the TOML is malformed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotInitialized.into());
        }
        let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        debug!(
            accounts = config.accounts.len(),
            profiles = config.credentials.len(),
            "config loaded"
        );

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to `.opsdeck.toml`
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file write fails.
    pub fn save(&self) -> Result<()> {
        debug!("saving config");

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(Self::config_path(), contents)?;

        Ok(())
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownAccount` if no account matches.
    pub fn account(&self, id: &str) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| SessionError::UnknownAccount(id.to_string()).into())
    }

    /// Ids of all configured accounts, in configuration order.
    pub fn account_ids(&self) -> Vec<AccountId> {
        self.accounts.iter().map(|a| a.id.clone()).collect()
    }

    /// Default approval requirement for an environment.
    ///
    /// The `[approval]` table wins; absent an entry, production requires
    /// approval and other environments do not.
    pub fn approval_default(&self, environment: Environment) -> bool {
        self.approval
            .get(environment.as_str())
            .copied()
            .unwrap_or(environment == Environment::Production)
    }

    /// Validate the configuration structure and contents
    ///
    /// Checks:
    /// - Version field is present
    /// - Account ids are non-empty and unique
    /// - Every account references an existing credential profile
    /// - Every account has at least one concrete (non-wildcard) region
    /// - Approval table keys name known environments
    /// - Cache TTL is non-zero
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` or `ConfigError::MissingField` on validation failure.
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        if self.opsdeck.version.is_empty() {
            return Err(ConfigError::MissingField { field: "version" }.into());
        }

        let mut seen = std::collections::BTreeSet::new();
        for account in &self.accounts {
            if account.id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "accounts",
                    reason: "account id must not be empty".to_string(),
                }
                .into());
            }
            if !seen.insert(&account.id) {
                return Err(ConfigError::InvalidValue {
                    field: "accounts",
                    reason: format!("duplicate account id '{}'", account.id),
                }
                .into());
            }
            if !self.credentials.contains_key(&account.credentials) {
                return Err(ConfigError::InvalidValue {
                    field: "accounts",
                    reason: format!(
                        "account '{}' references unknown credential profile '{}'",
                        account.id, account.credentials
                    ),
                }
                .into());
            }
            if account.regions.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "accounts",
                    reason: format!("account '{}' has no regions", account.id),
                }
                .into());
            }
            for region in &account.regions {
                if Region::parse(region).is_err() {
                    return Err(ConfigError::InvalidValue {
                        field: "accounts",
                        reason: format!(
                            "account '{}' lists non-concrete region '{}'",
                            account.id, region
                        ),
                    }
                    .into());
                }
            }
        }

        for environment in self.approval.keys() {
            if environment.parse::<Environment>().is_err() {
                return Err(ConfigError::InvalidValue {
                    field: "approval",
                    reason: format!("unknown environment '{}'", environment),
                }
                .into());
            }
        }

        if self.cache.inventory_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.inventory_ttl_secs",
                reason: "freshness window must be non-zero".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Starter configuration written by `opsdeck init`.
    ///
    /// Ships two illustrative accounts backed by a placeholder credential
    /// profile, a fallback pipeline provider, and the default approval
    /// policy. All of it is meant to be edited.
    pub fn starter() -> Self {
        let mut config = Self::new();

        config.credentials.insert(
            "demo".to_string(),
            CredentialProfile {
                access_key_id: Some("AKIA0DEMO0PLACEHOLDER".to_string()),
                secret_access_key: Some("demo-secret-edit-me".to_string()),
                env: None,
            },
        );
        config.accounts.push(Account {
            id: "sandbox".to_string(),
            name: "Sandbox".to_string(),
            credentials: "demo".to_string(),
            regions: vec!["us-east-1".to_string(), "eu-west-1".to_string()],
        });
        config.accounts.push(Account {
            id: "production".to_string(),
            name: "Production".to_string(),
            credentials: "demo".to_string(),
            regions: vec![
                "us-east-1".to_string(),
                "us-west-2".to_string(),
                "eu-west-1".to_string(),
            ],
        });
        config.provider = Some(ProviderConfig {
            kind: "fallback".to_string(),
            token_env: None,
        });
        config.approval.insert("production".to_string(), true);
        config.approval.insert("staging".to_string(), false);
        config.approval.insert("dev".to_string(), false);

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensure `.gitignore` contains entries to keep local state out of git.
///
/// Adds the `.opsdeck/` state directory if not already present.
///
/// # Errors
///
/// Returns error if file operations fail.
pub fn ensure_gitignore() -> Result<()> {
    let gitignore = std::path::Path::new(".gitignore");

    let existing = if gitignore.exists() {
        std::fs::read_to_string(gitignore)?
    } else {
        String::new()
    };

    let mut updated = existing.clone();
    for entry in constants::GITIGNORE_ENTRIES {
        if !existing.lines().any(|l| l.trim() == *entry) {
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(entry);
            updated.push('\n');
        }
    }

    if updated != existing {
        std::fs::write(gitignore, updated)?;
    }

    Ok(())
}
