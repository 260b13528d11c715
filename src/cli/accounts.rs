//! `opsdeck accounts` - account listing and session reconnect.

use crate::cli::output;
use crate::core::account::Region;
use crate::core::config::Config;
use crate::core::context::SessionContext;
use crate::error::Result;

/// List configured accounts.
pub fn list(json: bool) -> Result<()> {
    let config = Config::load()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.accounts)?);
        return Ok(());
    }

    if config.accounts.is_empty() {
        output::dimmed("no accounts configured");
        output::hint("edit .opsdeck.toml to add accounts");
        return Ok(());
    }

    output::section("Accounts");
    let rows: Vec<Vec<String>> = config
        .accounts
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.name.clone(),
                a.credentials.clone(),
                a.regions.join(", "),
            ]
        })
        .collect();
    output::table(&["ID", "NAME", "CREDENTIALS", "REGIONS"], &rows);

    Ok(())
}

/// List enabled regions for one account.
pub fn regions(account_id: &str) -> Result<()> {
    let config = Config::load()?;
    let account = config.account(account_id)?;

    output::header(&format!("Regions for {}", account.name));
    for region in &account.regions {
        output::list_item(region);
    }

    Ok(())
}

/// Drop cached sessions for an account and build a fresh one.
///
/// Within an interactive console this forces re-authentication after a
/// credential rotation; as a one-shot command it doubles as a
/// connectivity probe.
pub fn reconnect(account_id: &str, region: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let account = config.account(account_id)?.clone();
    let mut ctx = SessionContext::from_config(&config);

    let region = match region {
        Some(raw) => Region::parse(raw)?,
        None => {
            // Probe the first enabled region when none was named.
            let first = account.regions.first().cloned().unwrap_or_default();
            Region::parse(&first)?
        }
    };

    ctx.sessions().invalidate(account_id, Some(&region));
    let handle = ctx.sessions().resolve(account_id, &region)?;

    output::success(&format!("reconnected {} in {}", account_id, region));
    output::kv("data source", handle.data_source());

    Ok(())
}
