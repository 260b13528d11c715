//! `opsdeck console` - interactive panel loop.
//!
//! Keeps one `SessionContext` alive across panel renders, so repeat
//! visits to an inventory panel within the freshness window come from
//! cache instead of re-querying the control plane. Panels are a tagged
//! enum dispatched through a lookup table, not string-matched names.

use std::path::Path;
use std::sync::Arc;

use dialoguer::Select;

use crate::cli::output;
use crate::core::account::Region;
use crate::core::clock::SystemClock;
use crate::core::cloud::InstanceState;
use crate::core::config::Config;
use crate::core::constants;
use crate::core::context::SessionContext;
use crate::core::deploy::{provider_from_config, DeploymentRegistry};
use crate::core::types::AccountId;
use crate::error::Result;

/// Console panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Overview,
    Instances,
    Stacks,
    Deployments,
    PendingApprovals,
    SwitchTarget,
    Refresh,
    Quit,
}

type RenderFn = fn(&mut ConsoleState) -> Result<()>;

/// Panel lookup table: variant → label → render function.
const PANELS: &[(Panel, &str, RenderFn)] = &[
    (Panel::Overview, "Overview", render_overview),
    (Panel::Instances, "Instances", render_instances),
    (Panel::Stacks, "Stacks", render_stacks),
    (Panel::Deployments, "Deployments", render_deployments),
    (
        Panel::PendingApprovals,
        "Pending approvals",
        render_pending,
    ),
    (
        Panel::SwitchTarget,
        "Switch account/region",
        switch_target,
    ),
    (Panel::Refresh, "Refresh cached data", refresh),
    (Panel::Quit, "Quit", |_| Ok(())),
];

struct ConsoleState {
    config: Config,
    ctx: SessionContext,
    registry: DeploymentRegistry,
    target: Option<(AccountId, Region)>,
}

fn prompt_io(e: dialoguer::Error) -> crate::error::Error {
    let dialoguer::Error::IO(io) = e;
    io.into()
}

/// Run the interactive console until the user quits.
pub fn execute() -> Result<()> {
    if !console::user_attended() {
        output::error("the interactive console needs a terminal");
        output::hint("use one-shot commands instead, e.g. opsdeck inventory instances");
        return Ok(());
    }

    let config = Config::load()?;
    let clock = Arc::new(SystemClock);
    let provider = provider_from_config(&config, clock.clone());
    let registry = DeploymentRegistry::open(Path::new(constants::STATE_DIR), provider, clock)?;
    let ctx = SessionContext::from_config(&config);

    let mut state = ConsoleState {
        config,
        ctx,
        registry,
        target: None,
    };

    output::header("opsdeck console");
    output::dimmed("cached reads stay fresh for the configured TTL; refresh to reload");

    loop {
        println!();
        let labels: Vec<&str> = PANELS.iter().map(|(_, label, _)| *label).collect();
        let choice = Select::new()
            .with_prompt("Panel")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_io)?;

        let (panel, _, render) = &PANELS[choice];
        if *panel == Panel::Quit {
            return Ok(());
        }

        // A failing panel reports and returns to the menu; it must not
        // take down the session or the other panels' cached data.
        if let Err(e) = render(&mut state) {
            output::error(&e.to_string());
        }
    }
}

fn require_target(state: &mut ConsoleState) -> Result<(AccountId, Region)> {
    if let Some(target) = &state.target {
        return Ok(target.clone());
    }
    switch_target(state)?;
    state
        .target
        .clone()
        .ok_or_else(|| crate::error::ConfigError::MissingField { field: "accounts" }.into())
}

fn switch_target(state: &mut ConsoleState) -> Result<()> {
    if state.config.accounts.is_empty() {
        output::warn("no accounts configured");
        return Ok(());
    }

    let account_labels: Vec<String> = state
        .config
        .accounts
        .iter()
        .map(|a| format!("{} ({})", a.id, a.name))
        .collect();
    let account_idx = Select::new()
        .with_prompt("Account")
        .items(&account_labels)
        .default(0)
        .interact()
        .map_err(prompt_io)?;
    let account = &state.config.accounts[account_idx];

    let region_idx = Select::new()
        .with_prompt("Region")
        .items(&account.regions)
        .default(0)
        .interact()
        .map_err(prompt_io)?;
    let region = Region::parse(&account.regions[region_idx])?;

    output::success(&format!("target set to {} / {}", account.id, region));
    state.target = Some((account.id.clone(), region));
    Ok(())
}

fn render_overview(state: &mut ConsoleState) -> Result<()> {
    output::section("Overview");
    output::kv("accounts", state.config.accounts.len());
    output::kv("live sessions", state.ctx.sessions().session_count());
    output::kv("cached reads", state.ctx.cache().len());
    output::kv("deployments", state.registry.len());
    output::kv("pending approval", state.registry.pending().len());
    output::kv("data source", state.registry.data_source());
    Ok(())
}

fn render_instances(state: &mut ConsoleState) -> Result<()> {
    let (account, region) = require_target(state)?;
    let cached = state
        .ctx
        .cache()
        .is_fresh(&SessionContext::instances_key(&account, &region));
    let instances = state.ctx.instances(&account, &region)?;

    output::section(&format!("Instances — {} / {}", account, region));
    if cached {
        output::dimmed("(served from cache)");
    }
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
                i.availability_zone.clone(),
            ]
        })
        .collect();
    output::table(&["ID", "NAME", "STATE", "TYPE", "AZ"], &rows);
    Ok(())
}

fn render_stacks(state: &mut ConsoleState) -> Result<()> {
    let (account, region) = require_target(state)?;
    let stacks = state.ctx.stacks(&account, &region)?;

    output::section(&format!("Stacks — {} / {}", account, region));
    let rows: Vec<Vec<String>> = stacks
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.status.clone(),
                s.resources.to_string(),
            ]
        })
        .collect();
    output::table(&["NAME", "STATUS", "RESOURCES"], &rows);
    Ok(())
}

fn render_deployments(state: &mut ConsoleState) -> Result<()> {
    output::section("Deployments");
    let records = state.registry.list(&Default::default(), Default::default());
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.pipeline_id.clone(),
                output::status_cell(r.status.as_str()),
                r.environment.to_string(),
                r.stack_name.clone(),
                r.triggered_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    output::table(&["PIPELINE", "STATUS", "ENV", "STACK", "TRIGGERED"], &rows);
    Ok(())
}

fn render_pending(state: &mut ConsoleState) -> Result<()> {
    output::section("Pending Approvals");
    let pending = state.registry.pending();
    if pending.is_empty() {
        output::dimmed("nothing waiting for approval");
        return Ok(());
    }
    for record in &pending {
        output::warn(&format!(
            "{} — {} to {} by {}",
            record.pipeline_id, record.stack_name, record.environment, record.author
        ));
    }
    output::hint("decide with: opsdeck deploy approve/reject <pipeline-id>");
    Ok(())
}

fn refresh(state: &mut ConsoleState) -> Result<()> {
    let removed = state.ctx.refresh(None);
    output::success(&format!("cleared {} cached read(s)", removed));
    Ok(())
}
