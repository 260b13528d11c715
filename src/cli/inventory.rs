//! `opsdeck inventory` - resource inventory views.

use crate::cli::output;
use crate::core::account::Region;
use crate::core::cloud::InstanceState;
use crate::core::config::Config;
use crate::core::context::SessionContext;
use crate::error::Result;

/// List compute instances for an account/region.
pub fn instances(
    account_id: &str,
    region: &str,
    state: Option<&str>,
    environment: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let region = Region::parse(region)?;
    let state: Option<InstanceState> = state.map(str::parse).transpose()?;

    let mut ctx = SessionContext::from_config(&config);
    let mut instances = ctx.instances(account_id, &region)?;

    if let Some(state) = state {
        instances.retain(|i| i.state == state);
    }
    if let Some(environment) = environment {
        instances.retain(|i| i.environment == environment);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&instances)?);
        return Ok(());
    }

    let source = ctx.data_source(account_id, &region)?;
    output::section(&format!("Instances — {} / {}", account_id, region));

    if instances.is_empty() {
        output::dimmed("no instances match");
    } else {
        let running = instances
            .iter()
            .filter(|i| i.state == InstanceState::Running)
            .count();
        output::kv("total", instances.len());
        output::kv("running", running);
        println!();

        let rows: Vec<Vec<String>> = instances
            .iter()
            .map(|i| {
                vec![
                    i.id.clone(),
                    i.name.clone(),
                    i.state.to_string(),
                    i.instance_type.clone(),
                    i.environment.clone(),
                    i.availability_zone.clone(),
                    i.private_ip.clone(),
                ]
            })
            .collect();
        output::table(
            &["ID", "NAME", "STATE", "TYPE", "ENV", "AZ", "PRIVATE IP"],
            &rows,
        );
    }

    if source.is_fallback() {
        println!();
        output::warn(&format!("data source: {}", source));
    }

    Ok(())
}

/// List infrastructure stacks for an account/region.
pub fn stacks(account_id: &str, region: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let region = Region::parse(region)?;

    let mut ctx = SessionContext::from_config(&config);
    let stacks = ctx.stacks(account_id, &region)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stacks)?);
        return Ok(());
    }

    let source = ctx.data_source(account_id, &region)?;
    output::section(&format!("Stacks — {} / {}", account_id, region));

    if stacks.is_empty() {
        output::dimmed("no stacks found");
    } else {
        let rows: Vec<Vec<String>> = stacks
            .iter()
            .map(|s| {
                vec![
                    s.name.clone(),
                    s.status.clone(),
                    s.resources.to_string(),
                    s.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect();
        output::table(&["NAME", "STATUS", "RESOURCES", "UPDATED"], &rows);
    }

    if source.is_fallback() {
        println!();
        output::warn(&format!("data source: {}", source));
    }

    Ok(())
}
