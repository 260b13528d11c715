//! Credential store abstraction.
//!
//! Resolves an account id to credential material. The bundled
//! implementation reads profiles from `.opsdeck.toml`, either inline or
//! indirected through environment variables; other backends (instance
//! metadata, an external vault) implement [`CredentialStore`].

use std::collections::BTreeMap;
use std::fmt;

use crate::core::config::{Config, CredentialProfile};
use crate::core::types::AccountId;
use crate::error::{CredentialError, Result};

/// Static credential material for one account.
#[derive(Clone)]
pub struct Credentials {
    /// Access key identifier.
    pub access_key_id: String,
    /// Secret key.
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Credential lookup trait.
pub trait CredentialStore {
    /// Resolve credential material for an account.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` carrying the account id when credentials
    /// are missing or unresolvable.
    fn credentials(&self, account_id: &AccountId) -> Result<Credentials>;
}

/// Credential store backed by the configuration file.
#[derive(Debug)]
pub struct ConfigCredentials {
    profiles: BTreeMap<String, CredentialProfile>,
    by_account: BTreeMap<AccountId, String>,
}

impl ConfigCredentials {
    /// Build a store from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let by_account = config
            .accounts
            .iter()
            .map(|a| (a.id.clone(), a.credentials.clone()))
            .collect();
        Self {
            profiles: config.credentials.clone(),
            by_account,
        }
    }
}

impl CredentialStore for ConfigCredentials {
    fn credentials(&self, account_id: &AccountId) -> Result<Credentials> {
        let profile_name =
            self.by_account
                .get(account_id)
                .ok_or_else(|| CredentialError::Missing {
                    account: account_id.clone(),
                })?;
        let profile = self
            .profiles
            .get(profile_name)
            .ok_or_else(|| CredentialError::Missing {
                account: account_id.clone(),
            })?;
        profile.resolve(account_id)
    }
}

impl CredentialProfile {
    /// Resolve this profile into credential material.
    ///
    /// Inline values win; otherwise the `env` prefix is consulted
    /// (`<PREFIX>_ACCESS_KEY_ID` / `<PREFIX>_SECRET_ACCESS_KEY`).
    pub fn resolve(&self, account_id: &AccountId) -> Result<Credentials> {
        if let (Some(access_key_id), Some(secret_access_key)) =
            (&self.access_key_id, &self.secret_access_key)
        {
            return Ok(Credentials {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
            });
        }

        if let Some(prefix) = &self.env {
            let read = |suffix: &str| {
                std::env::var(format!("{}_{}", prefix, suffix)).map_err(|_| {
                    CredentialError::Invalid {
                        account: account_id.clone(),
                        reason: format!("environment variable {}_{} is not set", prefix, suffix),
                    }
                })
            };
            return Ok(Credentials {
                access_key_id: read("ACCESS_KEY_ID")?,
                secret_access_key: read("SECRET_ACCESS_KEY")?,
            });
        }

        Err(CredentialError::Invalid {
            account: account_id.clone(),
            reason: "profile has neither inline keys nor an env prefix".to_string(),
        }
        .into())
    }
}
