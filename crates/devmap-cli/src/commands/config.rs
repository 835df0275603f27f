//! `devmap config`: inspect configuration values.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: &GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.print(&value)?;
        }

        ConfigCommands::List => {
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            let path = global.config.clone().unwrap_or_else(AppConfig::config_path);
            output.print(&path.display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let value = match key {
        "synthesis.category_policy" => Some(config.synthesis.category_policy.to_string()),
        "synthesis.check_collisions" => Some(config.synthesis.check_collisions.to_string()),
        "synthesis.workers" => Some(config.batch_options().workers.to_string()),
        "output.no_color" => Some(config.output.no_color.to_string()),
        "output.format" => Some(config.output.format.clone()),
        "storage.output_dir" => Some(config.storage.output_dir.display().to_string()),
        _ => plc_offset(config, key),
    };

    value.ok_or_else(|| CliError::ConfigError {
        message: format!("Unknown config key: '{key}'"),
        source: None,
    })
}

/// `plcs.<id>.<space>`
fn plc_offset(config: &AppConfig, key: &str) -> Option<String> {
    let rest = key.strip_prefix("plcs.")?;
    let (plc, space) = rest.split_once('.')?;
    config.plcs.get(plc)?.get(space).map(u32::to_string)
}
