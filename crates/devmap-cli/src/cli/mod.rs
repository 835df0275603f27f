//! Command-line surface of `devmap`: subcommands, their flags and help.
//!
//! Doc comments double as `--help` text. Nothing here touches the service
//! or the filesystem.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use devmap_core::domain::{CategoryPolicy, PlcId};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

const AFTER_HELP: &str = "\
EXAMPLES:
  devmap generate --project line-a/ --plc 1 --plc 2
  devmap generate --project line-a.toml --dry-run --format json
  devmap diff --project line-a/ --plc 1
  devmap offsets
  devmap completions bash > /usr/share/bash-completion/completions/devmap";

/// PLC device address synthesis for process timers.
///
/// Reads process-step and timer definitions from TOML, assigns each timer
/// a process address (T/ST) and a timer register (ZR) using per-PLC
/// offsets, and writes one mapping file per PLC.
#[derive(Debug, Parser)]
#[command(
    name = "devmap",
    version,
    author,
    about,
    long_about,
    after_help = AFTER_HELP,
    arg_required_else_help = true,
    subcommand_required = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synthesize and store device mappings for one or more PLCs.
    #[command(
        visible_alias = "gen",
        after_help = "EXAMPLES:\n  devmap generate -p line-a/              # every configured PLC\n  \
                      devmap generate -p line-a/ --plc 3      # one PLC\n  \
                      devmap generate -p line-a/ --dry-run --format json"
    )]
    Generate(GenerateArgs),

    /// Show what `generate` would change in a stored mapping file.
    Diff(DiffArgs),

    /// List the configured PLC offset tables.
    #[command(visible_alias = "ls")]
    Offsets(OffsetsArgs),

    /// Write a starter configuration file.
    ///
    /// Goes to `--config` if given, `./.devmap.toml` with `--local`, and
    /// the per-user config location otherwise.
    Init(InitArgs),

    /// Print a shell completion script.
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Project `.toml` file, or a directory searched for them.
    #[arg(short, long, value_name = "PATH")]
    pub project: PathBuf,

    /// PLC to generate for; repeatable. Defaults to every configured PLC.
    #[arg(long = "plc", value_name = "ID")]
    pub plcs: Vec<PlcId>,

    /// Directory for `plc-<id>.json` [default: storage.output_dir]
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Synthesize and report without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Skip the duplicate-address check.
    #[arg(long)]
    pub no_collision_check: bool,

    /// Synthesis threads per PLC [default: synthesis.workers, else CPU count]
    #[arg(
        short = 'j',
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub workers: Option<u16>,

    /// How unknown timer category codes are handled.
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Project `.toml` file, or a directory searched for them.
    #[arg(short, long, value_name = "PATH")]
    pub project: PathBuf,

    #[arg(long, value_name = "ID")]
    pub plc: PlcId,

    /// Directory holding stored mappings [default: storage.output_dir]
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

#[derive(Debug, Args)]
pub struct OffsetsArgs {
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
}

/// Command-line spelling of [`CategoryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Report the record as an error.
    Strict,
    /// Address it as a step timer (ST).
    #[value(alias = "lenient")]
    TreatAsStep,
}

impl From<PolicyArg> for CategoryPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => Self::Strict,
            PolicyArg::TreatAsStep => Self::TreatAsStep,
        }
    }
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write `./.devmap.toml` instead of the per-user file.
    #[arg(long)]
    pub local: bool,

    /// Replace a file that already exists.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value, e.g. `synthesis.workers` or `plcs.1.timer`.
    Get { key: String },
    /// Print the effective configuration as TOML.
    List,
    /// Print which config file is read.
    Path,
}
