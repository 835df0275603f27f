//! What can go wrong in a `devmap` invocation, and how it is reported.
//!
//! Every command returns [`CliResult`]. `main` turns a [`CliError`] into a
//! stderr report ([`CliError::report`]) and an exit code
//! ([`CliError::exit_code`]).

use std::error::Error as _;
use std::io;
use std::path::PathBuf;

use owo_colors::{OwoColorize, Style};
use thiserror::Error;

use devmap_core::error::{DevmapError, ErrorCategory as CoreCategory};

pub type CliResult<T> = Result<T, CliError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum CliError {
    /// A flag value that clap accepted but the command cannot use.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Neither `--plc` nor the `[plcs]` table named a PLC.
    #[error("No PLCs selected")]
    NoPlcs,

    #[error("Configuration already exists at {}", path.display())]
    ConfigExists { path: PathBuf },

    /// Unknown config key, or a config that cannot be serialised.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Raised by the mapping service or an adapter.
    #[error(transparent)]
    Core(#[from] DevmapError),

    /// All PLC batches ran, but some records were skipped.
    #[error("{record_errors} record(s) could not be mapped")]
    BatchIncomplete { record_errors: usize },

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialise {what}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// How an error is classified for exit codes and log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    /// The run finished, minus some records.
    PartialFailure,
    Internal,
}

impl From<io::Error> for CliError {
    fn from(source: io::Error) -> Self {
        Self::IoError {
            message: source.to_string(),
            source,
        }
    }
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Core(core) => core.suggestions(),

            Self::InvalidInput { .. } => {
                vec!["See 'devmap <command> --help' for accepted values".into()]
            }

            Self::NoPlcs => vec![
                "Pass one or more --plc <ID>, or add an offset table to the config:".into(),
                "  [plcs.1]".into(),
                "  process_timer = 1000".into(),
                "  timer = 2000".into(),
                "'devmap init' writes a starter config".into(),
            ],

            Self::ConfigExists { .. } => vec![
                "Re-run with --force to overwrite it".into(),
                "'devmap config list' shows what it contains".into(),
            ],

            Self::ConfigError { .. } => vec![
                "Known keys: synthesis.category_policy, synthesis.check_collisions, \
                 synthesis.workers, output.no_color, output.format, storage.output_dir, \
                 plcs.<id>.<space>"
                    .into(),
                "'devmap config path' shows which file is in use".into(),
            ],

            Self::BatchIncomplete { .. } => vec![
                "The records listed above were skipped; all others were written".into(),
                "Fix those definitions and run generate again".into(),
                "--policy treat-as-step accepts unknown category codes as step timers".into(),
            ],

            Self::IoError { .. } => vec!["Check that the output directory is writable".into()],

            Self::Serialization { .. } => vec!["This is a bug in devmap; please report it".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::InvalidInput { .. } | Self::ConfigExists { .. } => ErrorCategory::UserError,
            Self::NoPlcs | Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::BatchIncomplete { .. } => ErrorCategory::PartialFailure,
            Self::IoError { .. } | Self::Serialization { .. } => ErrorCategory::Internal,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Internal => 1,
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::PartialFailure => 5,
        }
    }

    /// Multi-line report for stderr: the message, its cause chain when
    /// `verbose`, then suggestions.
    pub fn report(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: Style| -> String {
            if color {
                text.style(style).to_string()
            } else {
                text.to_owned()
            }
        };

        let mut out = format!(
            "\n{}\n  {}\n",
            paint("\u{2717} Error:", Style::new().red().bold()),
            paint(&self.to_string(), Style::new().red())
        );

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                let line = format!("caused by: {err}");
                out.push_str(&format!("  {}\n", paint(&line, Style::new().dimmed())));
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str(&format!(
                "\n{}\n",
                paint("Suggestions:", Style::new().yellow().bold())
            ));
            for suggestion in suggestions {
                out.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            out.push_str(&format!(
                "\n{}\n",
                paint("Run with -v for the full cause chain.", Style::new().dimmed())
            ));
        }

        out
    }

    /// Emit one event at a level matching the category.
    pub fn log(&self) {
        let category = self.category();
        match category {
            ErrorCategory::Internal | ErrorCategory::Configuration => {
                tracing::error!(?category, error = %self, "Command failed");
            }
            ErrorCategory::UserError | ErrorCategory::NotFound | ErrorCategory::PartialFailure => {
                tracing::warn!(?category, error = %self, "Command failed");
            }
        }
        if let Some(cause) = self.source() {
            tracing::debug!(%cause, "Underlying cause");
        }
    }
}

/// Attach a context message when converting foreign errors at a call site.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, context: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, io::Error> {
    fn with_cli_context<F, S>(self, context: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| CliError::IoError {
            message: context().into(),
            source,
        })
    }
}

impl<T> IntoCli<T> for Result<T, DevmapError> {
    /// Core errors already say what failed; the context is only logged.
    fn with_cli_context<F, S>(self, context: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| {
            tracing::debug!(context = %context().into(), "Core call failed");
            CliError::Core(e)
        })
    }
}
