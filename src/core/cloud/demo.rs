//! Deterministic fallback inventory.
//!
//! Serves a fixed, clearly-labeled data set derived from the region name,
//! so the console stays usable (and demonstrable) without live cloud
//! access. The shape of the data varies per region but never between two
//! calls for the same region.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::core::account::Region;
use crate::core::clock::Clock;
use crate::core::cloud::{
    ClientFactory, CloudApi, DataSource, Instance, InstanceState, Stack,
};
use crate::core::credentials::Credentials;
use crate::error::Result;

const INSTANCE_TYPES: &[&str] = &["t3.medium", "m5.large", "c5.xlarge", "r5.large"];
const ENVIRONMENTS: &[&str] = &["production", "staging", "dev"];
const STATES: &[InstanceState] = &[
    InstanceState::Running,
    InstanceState::Running,
    InstanceState::Stopped,
    InstanceState::Running,
    InstanceState::Pending,
];

/// Fallback cloud client bound to one region.
pub struct DemoCloud {
    region: Region,
    built_at: DateTime<Utc>,
}

impl DemoCloud {
    /// Create a fallback client for a region, timestamped at build time.
    pub fn new(region: Region, built_at: DateTime<Utc>) -> Self {
        Self { region, built_at }
    }

    // Stable per-region seed so the same region always shows the same rows.
    fn seed(&self) -> usize {
        self.region
            .as_str()
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
    }
}

impl CloudApi for DemoCloud {
    fn list_instances(&self) -> Result<Vec<Instance>> {
        let seed = self.seed();
        let count = 3 + seed % 4;

        let instances = (0..count)
            .map(|i| {
                let environment = ENVIRONMENTS[(seed + i) % ENVIRONMENTS.len()];
                Instance {
                    id: format!("i-{:08x}{:04x}", seed as u32, i),
                    name: format!("{}-app-{:02}", environment, i + 1),
                    state: STATES[(seed + i) % STATES.len()],
                    instance_type: INSTANCE_TYPES[(seed + i) % INSTANCE_TYPES.len()].to_string(),
                    environment: environment.to_string(),
                    availability_zone: format!("{}{}", self.region, ['a', 'b', 'c'][i % 3]),
                    private_ip: format!("10.0.{}.{}", i, 10 + (seed + i) % 200),
                    public_ip: (environment == "production")
                        .then(|| format!("54.12.{}.{}", i, 20 + (seed + i) % 200)),
                    launched_at: self.built_at - Duration::days(3 + (seed as i64 + i as i64) % 90),
                }
            })
            .collect();

        debug!(region = %self.region, count, "demo inventory served");
        Ok(instances)
    }

    fn list_stacks(&self) -> Result<Vec<Stack>> {
        let seed = self.seed();
        let count = 2 + seed % 3;

        let stacks = (0..count)
            .map(|i| {
                let environment = ENVIRONMENTS[(seed + i) % ENVIRONMENTS.len()];
                Stack {
                    name: format!("{}-{}-stack", environment, ["vpc", "app", "data", "edge"][i % 4]),
                    status: if (seed + i) % 7 == 0 {
                        "UPDATE_IN_PROGRESS".to_string()
                    } else {
                        "CREATE_COMPLETE".to_string()
                    },
                    resources: (8 + (seed + i) * 5 % 40) as u32,
                    updated_at: self.built_at - Duration::hours(2 + (seed as i64 + i as i64) % 72),
                }
            })
            .collect();

        Ok(stacks)
    }

    fn data_source(&self) -> DataSource {
        DataSource::Fallback
    }
}

/// Factory producing [`DemoCloud`] handles.
///
/// Accepts any credential material: the fallback backend authenticates
/// nothing, it only mirrors the factory contract of a real backend.
pub struct DemoCloudFactory {
    clock: Arc<dyn Clock>,
}

impl DemoCloudFactory {
    /// Create a factory stamping handles with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl ClientFactory for DemoCloudFactory {
    fn build(&self, _credentials: &Credentials, region: &Region) -> Result<Arc<dyn CloudApi>> {
        debug!(region = %region, "building fallback cloud client");
        Ok(Arc::new(DemoCloud::new(region.clone(), self.clock.now())))
    }
}
