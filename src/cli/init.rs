//! `opsdeck init` - write a starter configuration.

use crate::cli::output;
use crate::core::config::{self, Config};
use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Initialize opsdeck in the current directory.
///
/// Writes a starter `.opsdeck.toml` with illustrative accounts and the
/// default approval policy, and keeps the local state directory out of
/// git.
pub fn execute(force: bool) -> Result<()> {
    if Config::exists() && !force {
        return Err(ConfigError::AlreadyInitialized.into());
    }

    let config = Config::starter();
    config.save()?;
    config::ensure_gitignore()?;

    output::success("initialized opsdeck");
    output::kv("config", constants::CONFIG_FILE);
    output::kv("accounts", config.accounts.len());
    output::kv("provider", "fallback (illustrative data)");
    println!();
    output::hint("edit .opsdeck.toml to add your accounts and credentials");
    output::hint("run: opsdeck status");

    Ok(())
}
