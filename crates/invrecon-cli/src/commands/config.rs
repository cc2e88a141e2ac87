//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use tracing::debug;

use invrecon_core::EngineConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "matching.min_base_score")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(&key),
        ConfigCommand::Set { key, value } => set_config(&key, &value),
        ConfigCommand::Path => show_path(),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invrecon")
        .join("config.json")
}

/// Engine configuration from `--config`, else the default file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<EngineConfig> {
    if let Some(path) = config_path {
        return EngineConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config {}", default_path.display());
        Ok(EngineConfig::from_file(&default_path)?)
    } else {
        Ok(EngineConfig::default())
    }
}

fn show_config() -> anyhow::Result<()> {
    if !default_config_path().exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let config = load_config(None)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = EngineConfig::default();
    config.save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

/// Top-level sections of `EngineConfig`; keys are `<section>.<field>`.
const SECTIONS: [&str; 4] = ["scan", "matching", "validation", "totals"];

fn split_key(key: &str) -> anyhow::Result<(&str, &str)> {
    match key.split_once('.') {
        Some((section, field)) if SECTIONS.contains(&section) && !field.contains('.') => {
            Ok((section, field))
        }
        _ => anyhow::bail!(
            "Configuration key must be <section>.<field> with section one of {}: {}",
            SECTIONS.join(", "),
            key
        ),
    }
}

fn config_value(config: &EngineConfig, key: &str) -> anyhow::Result<serde_json::Value> {
    let (section, field) = split_key(key)?;
    serde_json::to_value(config)?
        .get(section)
        .and_then(|s| s.get(field))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
}

/// Copy of `config` with one field replaced, checked by `EngineConfig::validate`.
fn with_value(config: &EngineConfig, key: &str, value: &str) -> anyhow::Result<EngineConfig> {
    let (section, field) = split_key(key)?;

    // Numbers and booleans parse as JSON, anything else is kept as a string
    let parsed_value: serde_json::Value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    let mut json = serde_json::to_value(config)?;
    match json.get_mut(section).and_then(|s| s.as_object_mut()) {
        Some(fields) if fields.contains_key(field) => {
            fields.insert(field.to_string(), parsed_value);
        }
        _ => anyhow::bail!("Configuration key not found: {}", key),
    }

    let updated: EngineConfig = serde_json::from_value(json)
        .with_context(|| format!("Invalid value for {}", key))?;
    updated.validate()?;
    Ok(updated)
}

fn get_config(key: &str) -> anyhow::Result<()> {
    let config = load_config(None)?;
    println!("{}", serde_json::to_string_pretty(&config_value(&config, key)?)?);

    Ok(())
}

fn set_config(key: &str, value: &str) -> anyhow::Result<()> {
    let config_path = default_config_path();

    let config = if config_path.exists() {
        EngineConfig::from_file(&config_path)?
    } else {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        EngineConfig::default()
    };

    let config = with_value(&config, key, value)?;
    config.save(&config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&config_value(&config, key)?)?
    );

    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'invrecon config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_key_requires_known_section() {
        assert_eq!(
            split_key("matching.min_base_score").unwrap(),
            ("matching", "min_base_score")
        );
        assert!(split_key("min_base_score").is_err());
        assert!(split_key("ocr.detection_threshold").is_err());
        assert!(split_key("scan.block_window.extra").is_err());
    }

    #[test]
    fn test_with_value_updates_one_field() {
        let config = with_value(&EngineConfig::default(), "scan.block_window", "20").unwrap();
        assert_eq!(config.scan.block_window, 20);
        assert_eq!(
            config_value(&config, "scan.block_window").unwrap(),
            serde_json::json!(20)
        );
        assert_eq!(config.matching.min_base_score, 0.75);
    }

    #[test]
    fn test_with_value_rejects_unknown_and_invalid() {
        let config = EngineConfig::default();
        assert!(with_value(&config, "scan.no_such_field", "1").is_err());
        assert!(with_value(&config, "matching.min_base_score", "1.5").is_err());
        assert!(with_value(&config, "scan.block_window", "many").is_err());
    }
}
