//! Per-(account, region) session cache.
//!
//! Dozens of independent panels ask for "a session for this account in
//! this region"; authenticating each time would dominate every
//! interaction. The manager hands out shared handles keyed by
//! `(account_id, region)` and rebuilds them only after explicit
//! invalidation (credential rotation, user-triggered reconnect).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::account::{Account, Region};
use crate::core::cloud::{ClientFactory, CloudApi, DataSource};
use crate::core::credentials::CredentialStore;
use crate::core::types::AccountId;
use crate::error::{Result, SessionError};

/// An authenticated client bound to exactly one (account, region) pair.
///
/// Owned by the session cache; callers hold a shared reference and never
/// mutate it. Invariant: at most one live handle exists per key within a
/// session.
pub struct SessionHandle {
    account: AccountId,
    region: Region,
    client: Arc<dyn CloudApi>,
}

impl SessionHandle {
    /// Account this handle authenticates as.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Region this handle is bound to.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// The underlying control-plane client.
    pub fn client(&self) -> &dyn CloudApi {
        self.client.as_ref()
    }

    /// Where this handle's data comes from.
    pub fn data_source(&self) -> DataSource {
        self.client.data_source()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("account", &self.account)
            .field("region", &self.region)
            .field("data_source", &self.data_source())
            .finish()
    }
}

/// Resolves accounts to ready-to-use session handles, caching per
/// (account, region) pair.
pub struct SessionManager {
    accounts: BTreeMap<AccountId, Account>,
    store: Box<dyn CredentialStore>,
    factory: Box<dyn ClientFactory>,
    handles: HashMap<(AccountId, Region), Arc<SessionHandle>>,
}

impl SessionManager {
    /// Create a manager over a set of accounts.
    pub fn new(
        accounts: impl IntoIterator<Item = Account>,
        store: Box<dyn CredentialStore>,
        factory: Box<dyn ClientFactory>,
    ) -> Self {
        Self {
            accounts: accounts.into_iter().map(|a| (a.id.clone(), a)).collect(),
            store,
            factory,
            handles: HashMap::new(),
        }
    }

    /// Look up a known account.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownAccount` if the id is not configured.
    pub fn account(&self, account_id: &str) -> Result<&Account> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| SessionError::UnknownAccount(account_id.to_string()).into())
    }

    /// All known accounts, ordered by id.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Number of live cached sessions.
    pub fn session_count(&self) -> usize {
        self.handles.len()
    }

    /// Resolve a session handle for an account in a region.
    ///
    /// On a cache hit the existing handle is returned; on a miss a new
    /// client is built from the account's credentials and cached. The
    /// region is already concrete by construction ([`Region::parse`]
    /// rejects wildcards before a caller can get here).
    ///
    /// # Errors
    ///
    /// `SessionError::UnknownAccount` / `RegionNotEnabled` for bad targets,
    /// `CredentialError` when the account's credentials don't resolve, and
    /// `SessionError::BuildFailed` wrapping factory failures with the
    /// account/region context.
    pub fn resolve(&mut self, account_id: &str, region: &Region) -> Result<Arc<SessionHandle>> {
        let account = self
            .accounts
            .get(account_id)
            .ok_or_else(|| SessionError::UnknownAccount(account_id.to_string()))?;
        if !account.region_enabled(region) {
            return Err(SessionError::RegionNotEnabled {
                account: account_id.to_string(),
                region: region.to_string(),
            }
            .into());
        }

        let key = (account.id.clone(), region.clone());
        if let Some(handle) = self.handles.get(&key) {
            debug!(account = %account_id, region = %region, "session cache hit");
            return Ok(Arc::clone(handle));
        }

        let credentials = self.store.credentials(&account.id)?;
        let client = self
            .factory
            .build(&credentials, region)
            .map_err(|e| SessionError::BuildFailed {
                account: account_id.to_string(),
                region: region.to_string(),
                reason: e.to_string(),
            })?;

        let handle = Arc::new(SessionHandle {
            account: account.id.clone(),
            region: region.clone(),
            client,
        });
        self.handles.insert(key, Arc::clone(&handle));
        debug!(account = %account_id, region = %region, "session built and cached");

        Ok(handle)
    }

    /// Drop cached handle(s) for an account: one region, or all of them.
    ///
    /// Returns the number of handles removed. The next `resolve` for a
    /// dropped key re-authenticates. Used when credentials are rotated or
    /// on an explicit reconnect.
    pub fn invalidate(&mut self, account_id: &str, region: Option<&Region>) -> usize {
        let before = self.handles.len();
        match region {
            Some(region) => {
                self.handles
                    .remove(&(account_id.to_string(), region.clone()));
            }
            None => self.handles.retain(|(id, _), _| id != account_id),
        }
        let removed = before - self.handles.len();
        debug!(account = %account_id, removed, "sessions invalidated");
        removed
    }
}
