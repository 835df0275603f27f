//! Terminal output for command results.
//!
//! Results go to stdout through [`OutputManager`]; logs and error reports
//! go to stderr elsewhere. Status lines are dropped in quiet mode, errors
//! and JSON documents never are.

use std::io::{self, IsTerminal};

use clap::ValueEnum;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use crate::cli::{
    ReportFormat,
    global::{GlobalArgs, OutputFormat},
};
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

const PROGRESS_TEMPLATE: &str = "{spinner} [{bar:30}] {pos}/{len} {msg}";

pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    color: bool,
    term: Term,
}

impl OutputManager {
    /// `--output-format` wins unless it is `auto`, in which case
    /// `output.format` from the config is consulted before the TTY check.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => {
                OutputFormat::from_str(&config.output.format, true).unwrap_or(OutputFormat::Auto)
            }
            explicit => explicit,
        };
        let format = requested.resolve(io::stdout().is_terminal());

        Self {
            format,
            quiet: args.quiet,
            color: format == OutputFormat::Human && !args.no_color && !config.output.no_color,
            term: Term::stdout(),
        }
    }

    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.status('\u{2713}', Style::new().green(), msg, false)
    }

    /// Shown even with `--quiet`.
    pub fn error(&self, msg: &str) -> io::Result<()> {
        self.status('\u{2717}', Style::new().red(), msg, true)
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.status('\u{26a0}', Style::new().yellow(), msg, false)
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.status('\u{2139}', Style::new().blue(), msg, false)
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.color {
            self.term.write_line(&text.cyan().bold().to_string())
        } else {
            self.term.write_line(text)
        }
    }

    /// Pretty-printed JSON document, written regardless of `--quiet`.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> CliResult<()> {
        let text = serde_json::to_string_pretty(value).map_err(|source| CliError::Serialization {
            what: "report",
            source,
        })?;
        self.term.write_line(&text)?;
        Ok(())
    }

    /// Bar over per-PLC batches, drawn on stderr.
    ///
    /// Hidden for a single unit of work and whenever output is not
    /// human-facing.
    pub fn progress(&self, len: u64) -> ProgressBar {
        if self.quiet || self.format != OutputFormat::Human || len < 2 {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }

    /// A command's own `--format` wins; otherwise JSON follows the global
    /// format and everything else is a table.
    pub fn report_format(&self, requested: Option<ReportFormat>) -> ReportFormat {
        match (requested, self.format) {
            (Some(explicit), _) => explicit,
            (None, OutputFormat::Json) => ReportFormat::Json,
            (None, _) => ReportFormat::Table,
        }
    }

    fn status(&self, symbol: char, style: Style, msg: &str, always: bool) -> io::Result<()> {
        if self.quiet && !always {
            return Ok(());
        }
        let line = if self.color {
            format!("{} {}", symbol.style(style.bold()), msg.style(style))
        } else {
            format!("{symbol} {msg}")
        };
        self.term.write_line(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;

    fn manager(format: OutputFormat, no_color: bool, config: &AppConfig) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color,
            config: None,
            output_format: format,
        };
        OutputManager::new(&args, config)
    }

    #[test]
    fn colour_needs_human_format() {
        let config = AppConfig::default();
        assert!(manager(OutputFormat::Human, false, &config).color);
        assert!(!manager(OutputFormat::Human, true, &config).color);
        assert!(!manager(OutputFormat::Plain, false, &config).color);
    }

    #[test]
    fn config_can_disable_colour() {
        let config = AppConfig {
            output: OutputConfig {
                no_color: true,
                format: "human".into(),
            },
            ..AppConfig::default()
        };
        assert!(!manager(OutputFormat::Auto, false, &config).color);
    }

    #[test]
    fn config_format_applies_when_flag_is_auto() {
        let config = AppConfig {
            output: OutputConfig {
                no_color: false,
                format: "json".into(),
            },
            ..AppConfig::default()
        };
        let out = manager(OutputFormat::Auto, false, &config);
        assert_eq!(out.format, OutputFormat::Json);
        assert_eq!(out.report_format(None), ReportFormat::Json);
        assert_eq!(out.report_format(Some(ReportFormat::Table)), ReportFormat::Table);
    }

    #[test]
    fn flag_beats_config_format() {
        let config = AppConfig {
            output: OutputConfig {
                no_color: false,
                format: "json".into(),
            },
            ..AppConfig::default()
        };
        let out = manager(OutputFormat::Plain, false, &config);
        assert_eq!(out.report_format(None), ReportFormat::Table);
    }

    #[test]
    fn quiet_keeps_errors() {
        let args = GlobalArgs {
            verbose: 0,
            quiet: true,
            no_color: true,
            config: None,
            output_format: OutputFormat::Plain,
        };
        let out = OutputManager::new(&args, &AppConfig::default());
        assert!(out.print("dropped").is_ok());
        assert!(out.error("kept").is_ok());
    }

    #[test]
    fn single_batch_has_no_progress_bar() {
        let out = manager(OutputFormat::Human, true, &AppConfig::default());
        assert!(out.progress(1).is_hidden());
        assert!(manager(OutputFormat::Plain, true, &AppConfig::default())
            .progress(5)
            .is_hidden());
    }
}
