//! config command - Get, set, or list configuration values

use super::load_config;
use crate::core::config::schema::KEYS;
use crate::core::config::{Config, ConfigFile};
use crate::engine::Context;
use anyhow::{bail, Context as _, Result};

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let config = load_config(ctx)?;
    match config.get(key) {
        Ok(Some(value)) => println!("{}", value),
        // Key exists but has no value - exit silently
        Ok(None) => {}
        Err(_) => bail!("Unknown configuration key: {} (known: {})", key, KEYS.join(", ")),
    }
    Ok(())
}

/// Set a configuration value in the global or project file.
pub fn set(ctx: &Context, key: &str, value: &str, project: bool) -> Result<()> {
    let config = load_config(ctx)?;

    let written = if project {
        let dir = ctx.working_dir()?;
        let mut file = config.project.clone().unwrap_or_default();
        file.set_key(key, value)?;
        Config::write_project(&dir, &file).context("Failed to write project config")?
    } else {
        let mut file: ConfigFile = config.global.clone();
        file.set_key(key, value)?;
        match config.global_config_loaded_from() {
            // Keep writing to whichever global file was found.
            Some(path) => {
                let path = path.to_path_buf();
                Config::write_to(&path, &file).context("Failed to write global config")?;
                path
            }
            None => Config::write_global(&file).context("Failed to write global config")?,
        }
    };

    if !ctx.quiet {
        println!("Set {} = {} ({})", key, value, written.display());
    }
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;

    if !ctx.quiet {
        println!("# Configuration");
        match config.global_config_loaded_from() {
            Some(path) => println!("# global:  {}", path.display()),
            None => println!("# global:  (none)"),
        }
        match config.project_config_loaded_from() {
            Some(path) => println!("# project: {}", path.display()),
            None => println!("# project: (none)"),
        }
    }

    for key in KEYS {
        match config.get(key)? {
            Some(value) => println!("{} = {}", key, value),
            None => println!("{} = (not set)", key),
        }
    }
    Ok(())
}
