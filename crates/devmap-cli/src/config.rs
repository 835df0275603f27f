//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables, `DEVMAP__SECTION__KEY` (e.g. `DEVMAP__PLCS__1__TIMER=2000`)
//! 3. Config file (`--config`, or the per-user location if it exists)
//! 4. Built-in defaults (always present)
//!
//! # File format
//!
//! ```toml
//! [synthesis]
//! category_policy = "strict"    # strict | treat-as-step
//! check_collisions = true
//! # workers = 4                 # default: CPU count
//!
//! [output]
//! no_color = false
//! format = "auto"               # auto | human | plain | json
//!
//! [storage]
//! output_dir = "devmap-out"
//!
//! [plcs.1]
//! process_timer = 1000
//! timer = 2000
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use devmap_adapters::StaticOffsetProvider;
use devmap_core::{
    application::BatchOptions,
    domain::{CategoryPolicy, DeviceSpace},
    error::DevmapResult,
};

/// File name used by `devmap init --local`.
pub const LOCAL_CONFIG: &str = ".devmap.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Batch behaviour.
    pub synthesis: SynthesisConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Where mappings are written.
    pub storage: StorageConfig,
    /// Offset tables keyed by PLC id, then by device space name.
    pub plcs: BTreeMap<String, BTreeMap<String, u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub category_policy: CategoryPolicy,
    pub check_collisions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            category_policy: CategoryPolicy::Strict,
            check_collisions: true,
            workers: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("devmap-out"),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then file, then environment.
    ///
    /// An explicit `config_file` must exist; the per-user file is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_with(&path, required, Self::environment())
    }

    /// `DEVMAP__SECTION__KEY` variables, e.g. `DEVMAP__PLCS__1__TIMER=2000`.
    fn environment() -> Environment {
        Environment::with_prefix("DEVMAP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(path: &Path, required: bool, env: Environment) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to build default configuration")?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Starter configuration written by `devmap init`: defaults plus one
    /// example PLC table.
    pub fn starter() -> Self {
        let mut config = Self::default();
        config.plcs.insert(
            "1".into(),
            DeviceSpace::ALL
                .iter()
                .map(|space| (space.as_str().to_owned(), 0))
                .collect(),
        );
        config
    }

    /// Path to the per-user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.devmap.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "devmap", "devmap")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    /// Offset provider over the `[plcs]` tables.
    pub fn offset_provider(&self) -> DevmapResult<StaticOffsetProvider> {
        StaticOffsetProvider::from_named(self.plcs.clone())
    }

    /// Batch options from `[synthesis]`; callers apply CLI overrides on top.
    pub fn batch_options(&self) -> BatchOptions {
        let defaults = BatchOptions::default();
        BatchOptions {
            workers: self.synthesis.workers.unwrap_or(defaults.workers),
            check_collisions: self.synthesis.check_collisions,
            dry_run: false,
            policy: self.synthesis.category_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use devmap_core::application::ports::OffsetProvider;
    use tempfile::TempDir;

    use super::*;

    /// The real prefix, read from `vars` instead of the process environment.
    fn env(vars: &[(&str, &str)]) -> Environment {
        AppConfig::environment().source(Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        ))
    }

    #[test]
    fn default_policy_is_strict() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.synthesis.category_policy, CategoryPolicy::Strict);
        assert!(cfg.synthesis.check_collisions);
        assert!(cfg.plcs.is_empty());
    }

    #[test]
    fn default_no_color_is_false() {
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn missing_optional_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_with(&dir.path().join("absent.toml"), false, env(&[])).unwrap();
        assert_eq!(cfg.storage.output_dir, PathBuf::from("devmap-out"));
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devmap.toml");
        fs::write(
            &path,
            r#"
[synthesis]
category_policy = "treat-as-step"
workers = 3

[plcs.2]
process_timer = 4000
timer = 8000
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_with(&path, true, env(&[])).unwrap();
        assert_eq!(cfg.synthesis.category_policy, CategoryPolicy::TreatAsStep);
        assert!(cfg.synthesis.check_collisions);

        let options = cfg.batch_options();
        assert_eq!(options.workers, 3);
        assert_eq!(options.policy, CategoryPolicy::TreatAsStep);

        let provider = cfg.offset_provider().unwrap();
        assert_eq!(provider.plc_ids().unwrap(), vec![2]);
        assert_eq!(
            provider.offsets_for(2).unwrap().get(DeviceSpace::Timer),
            Some(8000)
        );
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devmap.toml");
        fs::write(&path, "[synthesis]\nworkers = 3\n").unwrap();

        let cfg = AppConfig::load_with(
            &path,
            true,
            env(&[
                ("DEVMAP__SYNTHESIS__WORKERS", "5"),
                ("DEVMAP__SYNTHESIS__CHECK_COLLISIONS", "false"),
                ("OTHER__SYNTHESIS__WORKERS", "9"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.synthesis.workers, Some(5));
        assert!(!cfg.synthesis.check_collisions);
    }

    #[test]
    fn starter_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::starter()).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, AppConfig::starter());
        assert!(back.offset_provider().is_ok());
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
