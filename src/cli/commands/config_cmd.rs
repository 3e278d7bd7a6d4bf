//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use super::setup;
use crate::core::config::CONFIG_KEYS;
use crate::engine::Context;

/// Keys whose values `list` does not print.
const MASKED_KEYS: &[&str] = &["client_secret"];

/// Get a configuration value.
pub fn get(_ctx: &Context, key: &str) -> Result<()> {
    let config = setup::load_config()?;
    // Unset keys print nothing.
    if let Some(value) = config.file.get(key)? {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = setup::load_config()?;
    config.file.set(key, value)?;
    let path = config.save().context("Failed to write config")?;

    if !ctx.quiet {
        let shown = if MASKED_KEYS.contains(&key) { "(hidden)" } else { value };
        println!("Set {} = {} in {}", key, shown, path.display());
    }
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    let config = setup::load_config()?;

    if !ctx.quiet {
        match config.loaded_from() {
            Some(path) => println!("# Configuration ({})", path.display()),
            None => println!("# Configuration (defaults)"),
        }
    }
    for key in CONFIG_KEYS {
        println!("{} = {}", key, describe(key, config.file.get(key)?));
    }
    Ok(())
}

fn describe(key: &str, value: Option<String>) -> String {
    match value {
        None => "(not set)".to_string(),
        Some(_) if MASKED_KEYS.contains(&key) => "(set)".to_string(),
        Some(value) => value,
    }
}
