//! Command handlers, one module per subcommand.

use std::path::Path;

use devmap_adapters::{JsonMappingRepository, TomlProjectRepository};
use devmap_core::application::{BatchOptions, MappingService};
use tracing::debug;

use crate::{
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod completions;
pub mod config;
pub mod diff;
pub mod generate;
pub mod init;
pub mod offsets;

/// Wire the file-backed adapters and the configured offset tables into a
/// [`MappingService`].
pub(crate) fn mapping_service(
    project: &Path,
    out_dir: &Path,
    config: &AppConfig,
    options: BatchOptions,
) -> CliResult<MappingService> {
    if out_dir.is_file() {
        return Err(CliError::InvalidInput {
            message: format!("output path '{}' is a file, not a directory", out_dir.display()),
            source: None,
        });
    }

    let definitions = TomlProjectRepository::open(project)?;
    debug!(
        root = %definitions.root().display(),
        categories = ?definitions.categories(),
        "Definition source ready"
    );

    let offsets = config.offset_provider()?;

    Ok(MappingService::new(
        Box::new(definitions),
        Box::new(JsonMappingRepository::new(out_dir)),
        Box::new(offsets),
        options,
    ))
}
