//! `devmap generate`: synthesize and store mappings for one or more PLCs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use devmap_core::{
    application::{BatchOptions, BatchReport},
    domain::{PlcId, Severity},
    error::DevmapError,
};

use crate::{
    cli::{GenerateArgs, ReportFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// JSON document printed by `--format json`.
#[derive(Debug, Serialize)]
struct GenerateSummary<'a> {
    started_at: DateTime<Utc>,
    project: &'a Path,
    out_dir: &'a Path,
    dry_run: bool,
    reports: &'a [BatchReport],
    failures: Vec<PlcFailure>,
}

#[derive(Debug, Serialize)]
struct PlcFailure {
    plc_id: PlcId,
    message: String,
    suggestions: Vec<String>,
}

pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let started_at = Utc::now();
    let options = batch_options(&args, &config);
    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| config.storage.output_dir.clone());

    let service = super::mapping_service(&args.project, &out_dir, &config, options)?;
    let plcs = select_plcs(&args.plcs, || Ok(service.configured_plcs()?))?;
    info!(plcs = ?plcs, workers = options.workers, "Generating mappings");

    let progress = output.progress(plcs.len() as u64);
    let mut reports = Vec::with_capacity(plcs.len());
    let mut failures: Vec<(PlcId, DevmapError)> = Vec::new();

    for &plc_id in &plcs {
        progress.set_message(format!("PLC {plc_id}"));
        match service.generate(plc_id) {
            Ok(report) => reports.push(report),
            Err(err) => {
                warn!(plc_id, error = %err, "Batch aborted");
                failures.push((plc_id, err));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    match output.report_format(args.format) {
        ReportFormat::Json => {
            let summary = GenerateSummary {
                started_at,
                project: &args.project,
                out_dir: &out_dir,
                dry_run: options.dry_run,
                reports: &reports,
                failures: failures
                    .iter()
                    .map(|(plc_id, err)| PlcFailure {
                        plc_id: *plc_id,
                        message: err.to_string(),
                        suggestions: err.suggestions(),
                    })
                    .collect(),
            };
            output.json(&summary)?;
        }
        ReportFormat::Table => {
            for report in &reports {
                print_report(&output, report, &out_dir, options.dry_run)?;
            }
            for (plc_id, err) in &failures {
                output.error(&format!("PLC {plc_id}: {err}"))?;
            }
        }
    }

    outcome(&reports, failures)
}

/// `[synthesis]` settings with this invocation's flags applied on top.
fn batch_options(args: &GenerateArgs, config: &AppConfig) -> BatchOptions {
    let mut options = config.batch_options();
    if let Some(workers) = args.workers {
        options.workers = usize::from(workers);
    }
    if let Some(policy) = args.policy {
        options.policy = policy.into();
    }
    if args.no_collision_check {
        options.check_collisions = false;
    }
    options.dry_run = args.dry_run;
    options
}

/// Explicit `--plc` ids in first-seen order, else every configured PLC.
fn select_plcs<F>(requested: &[PlcId], configured: F) -> CliResult<Vec<PlcId>>
where
    F: FnOnce() -> CliResult<Vec<PlcId>>,
{
    let plcs = if requested.is_empty() {
        configured()?
    } else {
        let mut seen = Vec::with_capacity(requested.len());
        for &id in requested {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    };

    if plcs.is_empty() {
        return Err(CliError::NoPlcs);
    }
    Ok(plcs)
}

/// A failed PLC outranks record-level errors; the first failure decides
/// the exit code.
fn outcome(reports: &[BatchReport], failures: Vec<(PlcId, DevmapError)>) -> CliResult<()> {
    if let Some((_, err)) = failures.into_iter().next() {
        return Err(err.into());
    }

    let record_errors: usize = reports.iter().map(BatchReport::error_count).sum();
    if record_errors > 0 {
        return Err(CliError::BatchIncomplete { record_errors });
    }
    Ok(())
}

fn print_report(
    output: &OutputManager,
    report: &BatchReport,
    out_dir: &Path,
    dry_run: bool,
) -> CliResult<()> {
    output.header(&format!("PLC {}", report.plc_id))?;

    if report.records.is_empty() {
        output.print("  (no mappings)")?;
    } else {
        output.print(&format!(
            "  {:>6}  {:>6}  {:<10}  {:<10}  {}",
            "STEP", "TIMER", "PROCESS", "REGISTER", "NAME"
        ))?;
        for record in &report.records {
            let key = record.key();
            output.print(&format!(
                "  {:>6}  {:>6}  {:<10}  {:<10}  {}",
                key.step_id,
                key.timer_id,
                record.process_address().to_string(),
                record.timer_address().to_string(),
                record.name()
            ))?;
        }
    }

    for problem in report.errors.iter() {
        let line = format!(
            "{} {}: {}",
            problem.kind(),
            problem.record_id(),
            problem.message()
        );
        match problem.severity() {
            Severity::Error => output.error(&line)?,
            Severity::Warning => output.warning(&line)?,
        }
    }

    if dry_run {
        output.info(&format!(
            "{} mapping(s) synthesized (dry run, nothing written)",
            report.records.len()
        ))?;
    } else {
        let target: PathBuf = out_dir.join(format!("plc-{}.json", report.plc_id));
        output.success(&format!(
            "{} mapping(s) written to {}",
            report.persisted,
            target.display()
        ))?;
    }
    Ok(())
}
