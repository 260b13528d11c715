//! Per-session context.
//!
//! One `SessionContext` exists per interactive session and owns that
//! session's mutable state: the session cache and the result cache. Every
//! core operation takes the context explicitly — there is no process-global
//! state, so running many sessions in one process cannot leak cached
//! credentials or cached reads between users.

use std::sync::Arc;
use std::time::Duration;

use crate::core::account::Region;
use crate::core::cache::{CacheKey, ResultCache};
use crate::core::clock::{Clock, SystemClock};
use crate::core::cloud::{DataSource, DemoCloudFactory, Instance, Stack};
use crate::core::config::Config;
use crate::core::credentials::ConfigCredentials;
use crate::core::session::SessionManager;
use crate::error::{CloudError, Result};

/// Loader identities for the inventory reads this context memoizes.
const LOADER_INSTANCES: &str = "cloud.instances";
const LOADER_STACKS: &str = "cloud.stacks";

/// Mutable state of one interactive session.
pub struct SessionContext {
    sessions: SessionManager,
    cache: ResultCache,
    inventory_ttl: Duration,
}

impl SessionContext {
    /// Build a context from configuration with the default (system) clock
    /// and the fallback cloud backend.
    pub fn from_config(config: &Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let sessions = SessionManager::new(
            config.accounts.iter().cloned(),
            Box::new(ConfigCredentials::from_config(config)),
            Box::new(DemoCloudFactory::new(Arc::clone(&clock))),
        );
        Self::with_parts(
            sessions,
            clock,
            Duration::from_secs(config.cache.inventory_ttl_secs),
        )
    }

    /// Assemble a context from explicit parts (used by tests to inject
    /// clocks, credential stores, and client factories).
    pub fn with_parts(
        sessions: SessionManager,
        clock: Arc<dyn Clock>,
        inventory_ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            cache: ResultCache::new(clock),
            inventory_ttl,
        }
    }

    /// The session manager.
    pub fn sessions(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    /// The result cache.
    pub fn cache(&mut self) -> &mut ResultCache {
        &mut self.cache
    }

    /// Freshness window applied to inventory reads.
    pub fn inventory_ttl(&self) -> Duration {
        self.inventory_ttl
    }

    /// Cache key for an account/region instance listing.
    pub fn instances_key(account_id: &str, region: &Region) -> CacheKey {
        CacheKey::new(LOADER_INSTANCES, &[account_id, region.as_str()])
    }

    /// Cache key for an account/region stack listing.
    pub fn stacks_key(account_id: &str, region: &Region) -> CacheKey {
        CacheKey::new(LOADER_STACKS, &[account_id, region.as_str()])
    }

    /// List compute instances for an account/region, memoized for the
    /// configured TTL.
    pub fn instances(&mut self, account_id: &str, region: &Region) -> Result<Vec<Instance>> {
        let session = self.sessions.resolve(account_id, region)?;
        let key = Self::instances_key(account_id, region);
        let ttl = self.inventory_ttl;
        self.cache.get_or_load(key, ttl, || {
            session
                .client()
                .list_instances()
                .map_err(|e| wrap_call("list_instances", account_id, region, e))
        })
    }

    /// List infrastructure stacks for an account/region, memoized for the
    /// configured TTL.
    pub fn stacks(&mut self, account_id: &str, region: &Region) -> Result<Vec<Stack>> {
        let session = self.sessions.resolve(account_id, region)?;
        let key = Self::stacks_key(account_id, region);
        let ttl = self.inventory_ttl;
        self.cache.get_or_load(key, ttl, || {
            session
                .client()
                .list_stacks()
                .map_err(|e| wrap_call("list_stacks", account_id, region, e))
        })
    }

    /// Where the data for an account/region comes from.
    pub fn data_source(&mut self, account_id: &str, region: &Region) -> Result<DataSource> {
        Ok(self.sessions.resolve(account_id, region)?.data_source())
    }

    /// Drop cached read results: specific keys, or everything.
    ///
    /// Returns the number of entries removed.
    pub fn refresh(&mut self, keys: Option<&[CacheKey]>) -> usize {
        self.cache.invalidate(keys)
    }
}

fn wrap_call(
    operation: &'static str,
    account_id: &str,
    region: &Region,
    source: crate::error::Error,
) -> crate::error::Error {
    CloudError::Call {
        operation,
        account: account_id.to_string(),
        region: region.to_string(),
        reason: source.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::core::account::Account;
    use crate::core::clock::ManualClock;
    use crate::core::cloud::{ClientFactory, CloudApi};
    use crate::core::credentials::{CredentialStore, Credentials};
    use crate::core::types::AccountId;
    use crate::error::Error;

    struct OpenCredentials;

    impl CredentialStore for OpenCredentials {
        fn credentials(&self, _: &AccountId) -> Result<Credentials> {
            Ok(Credentials {
                access_key_id: "AKIATEST".to_string(),
                secret_access_key: "secret".to_string(),
            })
        }
    }

    struct CountingCloud {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl CloudApi for CountingCloud {
        fn list_instances(&self) -> Result<Vec<Instance>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(std::io::Error::other("connection reset").into());
            }
            Ok(Vec::new())
        }
        fn list_stacks(&self) -> Result<Vec<Stack>> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }
        fn data_source(&self) -> DataSource {
            DataSource::Fallback
        }
    }

    struct CountingCloudFactory {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl ClientFactory for CountingCloudFactory {
        fn build(&self, _: &Credentials, _: &Region) -> Result<Arc<dyn CloudApi>> {
            Ok(Arc::new(CountingCloud {
                calls: Rc::clone(&self.calls),
                fail: self.fail,
            }))
        }
    }

    fn context(fail: bool) -> (SessionContext, Rc<Cell<usize>>, Arc<ManualClock>) {
        let calls = Rc::new(Cell::new(0));
        let clock = Arc::new(ManualClock::epoch());
        let sessions = SessionManager::new(
            vec![Account {
                id: "sandbox".to_string(),
                name: "Sandbox".to_string(),
                credentials: "demo".to_string(),
                regions: vec!["us-east-1".to_string()],
            }],
            Box::new(OpenCredentials),
            Box::new(CountingCloudFactory {
                calls: Rc::clone(&calls),
                fail,
            }),
        );
        let ctx = SessionContext::with_parts(
            sessions,
            clock.clone() as Arc<dyn Clock>,
            Duration::from_secs(300),
        );
        (ctx, calls, clock)
    }

    #[test]
    fn test_repeat_reads_hit_cache() {
        let (mut ctx, calls, _) = context(false);
        let region = Region::parse("us-east-1").unwrap();

        ctx.instances("sandbox", &region).unwrap();
        ctx.instances("sandbox", &region).unwrap();

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_reads_reload_after_ttl() {
        let (mut ctx, calls, clock) = context(false);
        let region = Region::parse("us-east-1").unwrap();

        ctx.instances("sandbox", &region).unwrap();
        clock.advance(chrono::Duration::seconds(301));
        ctx.instances("sandbox", &region).unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_instances_and_stacks_do_not_share_entries() {
        let (mut ctx, calls, _) = context(false);
        let region = Region::parse("us-east-1").unwrap();

        ctx.instances("sandbox", &region).unwrap();
        ctx.stacks("sandbox", &region).unwrap();
        ctx.instances("sandbox", &region).unwrap();
        ctx.stacks("sandbox", &region).unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_refresh_forces_reload() {
        let (mut ctx, calls, _) = context(false);
        let region = Region::parse("us-east-1").unwrap();

        ctx.instances("sandbox", &region).unwrap();
        ctx.refresh(None);
        ctx.instances("sandbox", &region).unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_remote_failure_is_wrapped_with_context() {
        let (mut ctx, _, _) = context(true);
        let region = Region::parse("us-east-1").unwrap();

        let err = ctx.instances("sandbox", &region).unwrap_err();

        match err {
            Error::Cloud(CloudError::Call {
                operation,
                account,
                region,
                ..
            }) => {
                assert_eq!(operation, "list_instances");
                assert_eq!(account, "sandbox");
                assert_eq!(region, "us-east-1");
            }
            other => panic!("expected wrapped cloud error, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_in_one_key_leaves_others_cached() {
        let (mut ctx, calls, _) = context(true);
        let region = Region::parse("us-east-1").unwrap();

        // Stacks succeed even while instances fail.
        ctx.stacks("sandbox", &region).unwrap();
        assert!(ctx.instances("sandbox", &region).is_err());
        ctx.stacks("sandbox", &region).unwrap();

        // One stacks load, one failed instances load, no reload of stacks.
        assert_eq!(calls.get(), 2);
    }
}
