//! `opsdeck status` - one-screen configuration and deployment overview.

use std::path::Path;
use std::sync::Arc;

use crate::cli::output;
use crate::core::clock::SystemClock;
use crate::core::config::Config;
use crate::core::constants;
use crate::core::deploy::{provider_from_config, DeploymentRegistry, DeploymentStatus};
use crate::error::Result;

/// Show a quick overview of accounts and deployment state.
pub fn execute() -> Result<()> {
    let config = Config::load()?;

    output::section("Opsdeck");
    output::kv("config", constants::CONFIG_FILE);
    output::kv("accounts", config.accounts.len());
    for account in &config.accounts {
        output::list_item(&format!(
            "{} ({}) — {}",
            account.id,
            account.name,
            account.regions.join(", ")
        ));
    }
    output::kv(
        "provider",
        config
            .provider
            .as_ref()
            .map(|p| p.kind.clone())
            .unwrap_or_else(|| "fallback".to_string()),
    );
    output::kv(
        "inventory ttl",
        format!("{}s", config.cache.inventory_ttl_secs),
    );

    let clock = Arc::new(SystemClock);
    let provider = provider_from_config(&config, clock.clone());
    let registry = DeploymentRegistry::open(Path::new(constants::STATE_DIR), provider, clock)?;

    output::section("Deployments");
    output::kv("tracked", registry.len());
    output::kv("data source", registry.data_source());

    let count = |status: DeploymentStatus| {
        registry
            .list(
                &crate::core::deploy::DeploymentFilter {
                    status: Some(status),
                    environment: None,
                },
                Default::default(),
            )
            .len()
    };
    output::kv("running", count(DeploymentStatus::Running));
    output::kv("succeeded", count(DeploymentStatus::Success));
    output::kv("failed", count(DeploymentStatus::Failed));

    let pending = registry.pending();
    output::kv("pending approval", pending.len());
    if !pending.is_empty() {
        println!();
        for record in &pending {
            output::warn(&format!(
                "{} — {} to {} by {}",
                record.pipeline_id, record.stack_name, record.environment, record.author
            ));
        }
        output::hint("review with: opsdeck deploy pending");
    }

    Ok(())
}
