//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use papyr_config::Config;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    let config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    let contents = config.to_toml_string().context("Failed to render config")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    if !paths.config_file.exists() {
        println!("{}", "(no config file, showing defaults)".dimmed());
    }
    println!("{}", contents);

    Ok(())
}

pub fn path() -> Result<()> {
    let paths = get_paths()?;
    println!("{}", paths.config_file.display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = get_paths()?;

    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    config
        .set(key, value)
        .with_context(|| format!("Cannot set {}", key))?;
    config.save_to(&paths.config_file).context("Failed to save config")?;

    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);

    Ok(())
}
