//! Config command implementation.
//!
//! Manages CLI configuration.

use anyhow::Result;
use curator_ops::Config;

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("Graph Curator Configuration");
    println!("{:-<40}", "");

    for key in Config::keys() {
        let value = config.get(key).unwrap_or_else(|| "(not set)".to_string());
        println!("{:<28} {}", key, value);
    }

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    if config.get(key).is_none() {
        anyhow::bail!(
            "Unknown config key: {}. Valid keys: {}",
            key,
            Config::keys().join(", ")
        );
    }

    config.set(key, value)?;
    config.save()?;
    println!("Set {} to: {}", key, value);
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    match config.get(key) {
        Some(value) => println!("{}", value),
        None => anyhow::bail!("Unknown config key: {}", key),
    }
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
