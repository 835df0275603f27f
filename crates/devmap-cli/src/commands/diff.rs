//! `devmap diff`: compare stored mappings with a fresh synthesis.

use devmap_core::domain::{DeviceMappingRecord, Severity};

use crate::{
    cli::{DiffArgs, ReportFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Differences are informational; the exit code is 0 whether or not the
/// stored file is current.
pub fn execute(args: DiffArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let mut options = config.batch_options();
    if let Some(policy) = args.policy {
        options.policy = policy.into();
    }
    options.dry_run = true;

    let out_dir = args.out.unwrap_or_else(|| config.storage.output_dir.clone());
    let service = super::mapping_service(&args.project, &out_dir, &config, options)?;
    let report = service.diff(args.plc)?;

    if output.report_format(args.format) == ReportFormat::Json {
        return output.json(&report);
    }

    output.header(&format!("PLC {}", report.plc_id))?;

    if report.diff.is_empty() {
        output.success("Stored mappings are up to date")?;
    } else {
        for record in &report.diff.added {
            output.print(&format!("+ {}", describe(record)))?;
        }
        for record in &report.diff.removed {
            output.print(&format!("- {}", describe(record)))?;
        }
        for change in &report.diff.changed {
            output.print(&format!(
                "~ {} -> {}",
                describe(&change.before),
                describe(&change.after)
            ))?;
        }
        output.info(&format!(
            "{} added, {} removed, {} changed",
            report.diff.added.len(),
            report.diff.removed.len(),
            report.diff.changed.len()
        ))?;
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

    Ok(())
}

fn describe(record: &DeviceMappingRecord) -> String {
    let key = record.key();
    format!(
        "step {} timer {}: {} {} ({})",
        key.step_id,
        key.timer_id,
        record.process_address(),
        record.timer_address(),
        record.name()
    )
}
