//! Account and region types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::constants;
use crate::core::types::AccountId;
use crate::error::{Error, Result, SessionError};

/// A logical cloud account with its own credentials and enabled regions.
///
/// Immutable once loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Human-readable display name.
    pub name: String,
    /// Name of the credential profile used to authenticate.
    pub credentials: String,
    /// Regions this account may be used in.
    pub regions: Vec<String>,
}

impl Account {
    /// Check whether a region is enabled for this account.
    pub fn region_enabled(&self, region: &Region) -> bool {
        self.regions.iter().any(|r| r == region.as_str())
    }
}

/// A concrete region identifier.
///
/// Construction goes through [`Region::parse`], which rejects wildcard
/// sentinels ("all", "*", "any") and empty strings: region-scoped
/// operations are meaningless without a specific region, and silently
/// substituting a default would hide the caller's mistake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region(String);

impl Region {
    /// Parse a region string, rejecting non-concrete values.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRegion` for empty or wildcard input.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionError::InvalidRegion(raw.to_string()).into());
        }
        if constants::REGION_WILDCARDS
            .iter()
            .any(|w| trimmed.eq_ignore_ascii_case(w))
        {
            return Err(SessionError::InvalidRegion(trimmed.to_string()).into());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The region string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
