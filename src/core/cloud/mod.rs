//! Cloud control-plane client seam.
//!
//! The core never talks to a cloud API directly: it asks a
//! [`ClientFactory`] for a handle and calls the narrow [`CloudApi`]
//! surface on it. A real SDK-backed client is an external collaborator;
//! what ships here is the deterministic fallback used when no live
//! backend is configured.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `CloudApi` trait
//! 2. Implement `ClientFactory` to build it from credential material
//! 3. Report an honest `DataSource` so callers can label the data

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::account::Region;
use crate::core::credentials::Credentials;
use crate::core::types::StackName;
use crate::error::{Error, RegistryError, Result};

mod demo;

pub use demo::{DemoCloud, DemoCloudFactory};

/// Where a data set came from.
///
/// Fallback data is illustrative and must never be mistaken for live
/// inventory; callers can always distinguish the two via this flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// A live provider/control-plane backend.
    Live,
    /// The bundled fixed record set.
    Fallback,
}

impl DataSource {
    /// True for the bundled illustrative data set.
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Fallback => f.write_str("fallback (illustrative data)"),
        }
    }
}

/// Lifecycle state of a compute instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    Running,
    Stopped,
    Pending,
    Stopping,
}

impl InstanceState {
    /// The lowercase state name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Pending => "pending",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            "pending" => Ok(Self::Pending),
            "stopping" => Ok(Self::Stopping),
            other => Err(RegistryError::InvalidParameters(format!(
                "unknown instance state '{}'",
                other
            ))
            .into()),
        }
    }
}

/// One compute instance row.
#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    /// Instance identifier.
    pub id: String,
    /// Name tag, or "unnamed".
    pub name: String,
    /// Lifecycle state.
    pub state: InstanceState,
    /// Instance size/class.
    pub instance_type: String,
    /// Environment tag.
    pub environment: String,
    /// Availability zone.
    pub availability_zone: String,
    /// Private address.
    pub private_ip: String,
    /// Public address, if any.
    pub public_ip: Option<String>,
    /// Launch timestamp.
    pub launched_at: DateTime<Utc>,
}

/// One infrastructure stack row.
#[derive(Debug, Clone, Serialize)]
pub struct Stack {
    /// Stack name.
    pub name: StackName,
    /// Provider-reported status (e.g. "CREATE_COMPLETE").
    pub status: String,
    /// Number of resources in the stack.
    pub resources: u32,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Narrow read surface of the cloud control plane.
///
/// A handle is bound to one (account, region) pair at build time; the
/// session layer owns handle lifecycle and reuse.
pub trait CloudApi {
    /// List compute instances visible to this handle.
    fn list_instances(&self) -> Result<Vec<Instance>>;

    /// List infrastructure stacks visible to this handle.
    fn list_stacks(&self) -> Result<Vec<Stack>>;

    /// Where this handle's data comes from.
    fn data_source(&self) -> DataSource;
}

/// Opaque factory building an authenticated client handle.
pub trait ClientFactory {
    /// Build a client bound to the given region.
    ///
    /// # Errors
    ///
    /// Implementations surface authentication/connectivity failures here;
    /// the session layer wraps them with account/region context.
    fn build(&self, credentials: &Credentials, region: &Region) -> Result<Arc<dyn CloudApi>>;
}
