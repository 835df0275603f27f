//! Flags shared by every `devmap` subcommand.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum, builder::FalseyValueParser};

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Log more: `-v` batch summaries, `-vv` per-file and per-worker
    /// detail, `-vvv` everything including dependencies.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors and machine-readable reports.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Never emit ANSI colour codes (also set by any non-empty `NO_COLOR`).
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Read settings from FILE instead of the per-user config.
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        env = "DEVMAP_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// Presentation of command output; `json` also switches logs to JSON.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output_format: OutputFormat,
}

/// How results are presented on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `human` on a terminal, `plain` when piped.
    #[default]
    Auto,
    /// Coloured tables with status symbols.
    Human,
    /// Tables without colour.
    Plain,
    /// One JSON document per command.
    Json,
}

impl OutputFormat {
    /// Resolve `Auto` against whether stdout is a terminal.
    pub fn resolve(self, stdout_is_tty: bool) -> Self {
        match self {
            Self::Auto if stdout_is_tty => Self::Human,
            Self::Auto => Self::Plain,
            other => other,
        }
    }
}
