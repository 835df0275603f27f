//! `devmap init`: create a starter configuration file.

use std::path::PathBuf;

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::{AppConfig, LOCAL_CONFIG},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Write [`AppConfig::starter`] to the chosen location.
pub fn execute(args: InitArgs, global: &GlobalArgs, output: OutputManager) -> CliResult<()> {
    let config_path = target_path(&args, global);
    output.info(&format!("Initialising configuration at {}", config_path.display()))?;

    if config_path.exists() && !args.force {
        return Err(CliError::ConfigExists { path: config_path });
    }

    let toml = toml::to_string_pretty(&AppConfig::starter()).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise starter config: {e}"),
        source: Some(Box::new(e)),
    })?;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    std::fs::write(&config_path, toml)
        .with_cli_context(|| format!("Failed to write config to '{}'", config_path.display()))?;

    output.success(&format!("Configuration created at {}", config_path.display()))?;
    output.info("Edit the [plcs.1] offsets before running 'devmap generate'")?;

    Ok(())
}

/// `--config` wins, then `--local`, then the per-user location.
fn target_path(args: &InitArgs, global: &GlobalArgs) -> PathBuf {
    match (&global.config, args.local) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from(LOCAL_CONFIG),
        (None, false) => AppConfig::config_path(),
    }
}
