//! Tracing subscriber setup for the `devmap` binary.
//!
//! The library crates emit events; this is the only place a subscriber is
//! installed. Logs always go to stderr so stdout stays clean for reports.
//!
//! | Flags      | devmap crates | everything else |
//! |------------|---------------|-----------------|
//! | `--quiet`  | ERROR         | ERROR           |
//! | (none)     | WARN          | WARN            |
//! | `-v`       | INFO          | WARN            |
//! | `-vv`      | DEBUG         | WARN            |
//! | `-vvv`     | TRACE         | INFO            |
//!
//! A set `RUST_LOG` replaces the table entirely. With
//! `--output-format json` events are written as JSON lines.

use std::io::IsTerminal as _;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{GlobalArgs, OutputFormat};

const CRATES: [&str; 3] = ["devmap", "devmap_core", "devmap_adapters"];

pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::try_new(directives(args))?,
    };

    let layer = if args.output_format == OutputFormat::Json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(args.verbose >= 3)
            // Batch workers log concurrently.
            .with_thread_ids(args.verbose >= 2)
            .with_ansi(!args.no_color && std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {e}"))
}

/// Level for the devmap crates.
fn own_level(args: &GlobalArgs) -> LevelFilter {
    match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

/// Level for dependencies; only opened up at `-vvv`.
fn base_level(args: &GlobalArgs) -> LevelFilter {
    match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, v) if v >= 3 => LevelFilter::INFO,
        _ => LevelFilter::WARN,
    }
}

fn directives(args: &GlobalArgs) -> String {
    let own = own_level(args);
    let mut parts = vec![base_level(args).to_string().to_lowercase()];
    parts.extend(CRATES.iter().map(|krate| format!("{krate}={own}").to_lowercase()));
    parts.join(",")
}
