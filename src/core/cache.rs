//! TTL result cache.
//!
//! Memoizes expensive idempotent reads for a bounded freshness window so
//! repeat panel visits within one session feel instantaneous. The cache is
//! an explicit object composed by the caller; it never wraps functions and
//! never interprets the values it stores.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::clock::Clock;
use crate::error::{CacheError, Result};

/// Composite cache key: loader identity plus its effective arguments.
///
/// Two unrelated loaders can never collide because the loader name is part
/// of the key, and arguments are kept as a tuple rather than concatenated
/// into a delimited string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    loader: &'static str,
    args: Vec<String>,
}

impl CacheKey {
    /// Build a key from a loader name and its arguments.
    pub fn new(loader: &'static str, args: &[&str]) -> Self {
        Self {
            loader,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// The loader identity part of the key.
    pub fn loader(&self) -> &'static str {
        self.loader
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.loader, self.args.join(", "))
    }
}

struct Entry {
    value: Box<dyn Any>,
    created_at: DateTime<Utc>,
    ttl: Duration,
}

impl Entry {
    fn fresh_at(&self, now: DateTime<Utc>) -> bool {
        // A clock that moved backwards counts as fresh rather than panicking.
        now.signed_duration_since(self.created_at)
            .to_std()
            .map(|elapsed| elapsed < self.ttl)
            .unwrap_or(true)
    }
}

/// Session-scoped memoization of expensive reads.
///
/// Owned by one `SessionContext`; partitioning per session is by
/// construction, not by key namespacing.
pub struct ResultCache {
    entries: HashMap<CacheKey, Entry>,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    /// Create an empty cache driven by the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    /// Return the cached value for `key`, or run `loader` and cache its
    /// result for `ttl`.
    ///
    /// The loader runs at most once per freshness window; it is not
    /// invoked on a hit. A failed load propagates to the caller and is
    /// never cached, so the next call retries.
    ///
    /// # Errors
    ///
    /// Loader errors pass through unchanged. `CacheError::KeyCollision`
    /// signals that a stored value under this key has a different type —
    /// two loaders sharing a key, which composite keys are meant to make
    /// impossible.
    pub fn get_or_load<T, F>(&mut self, key: CacheKey, ttl: Duration, loader: F) -> Result<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> Result<T>,
    {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(&key) {
            if entry.fresh_at(now) {
                debug!(key = %key, "cache hit");
                return entry
                    .value
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or_else(|| CacheError::KeyCollision { key: key.to_string() }.into());
            }
            debug!(key = %key, "cache entry expired");
        } else {
            debug!(key = %key, "cache miss");
        }

        let value = loader()?;
        self.entries.insert(
            key,
            Entry {
                value: Box::new(value.clone()),
                created_at: now,
                ttl,
            },
        );
        Ok(value)
    }

    /// Clear specific keys, or the whole cache if none are given.
    ///
    /// Safe to call with keys that were never populated. Returns the
    /// number of entries removed.
    pub fn invalidate(&mut self, keys: Option<&[CacheKey]>) -> usize {
        let before = self.entries.len();
        match keys {
            Some(keys) => {
                for key in keys {
                    self.entries.remove(key);
                }
            }
            None => self.entries.clear(),
        }
        let removed = before - self.entries.len();
        debug!(removed, "cache invalidated");
        removed
    }

    /// Whether a key currently holds a fresh entry.
    pub fn is_fresh(&self, key: &CacheKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.fresh_at(self.clock.now()))
    }

    /// Number of stored entries, fresh or expired.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
