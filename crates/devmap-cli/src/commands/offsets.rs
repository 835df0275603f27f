//! `devmap offsets`: list configured PLC offset tables.

use std::collections::BTreeMap;

use serde::Serialize;

use devmap_adapters::StaticOffsetProvider;
use devmap_core::domain::{DomainValidator, PlcId};

use crate::{
    cli::{OffsetsArgs, ReportFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct OffsetTable {
    plc_id: PlcId,
    offsets: BTreeMap<&'static str, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<String>,
}

pub fn execute(args: OffsetsArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let provider = config.offset_provider()?;
    let tables = tables(&provider);

    if output.report_format(args.format) == ReportFormat::Json {
        return output.json(&tables);
    }

    if tables.is_empty() {
        output.warning("No PLC offset tables configured")?;
        output.info("Add a [plcs.<id>] table or run 'devmap init'")?;
        return Ok(());
    }

    output.header("Configured PLCs:")?;
    for table in &tables {
        let spaces = table
            .offsets
            .iter()
            .map(|(space, offset)| format!("{space}={offset}"))
            .collect::<Vec<_>>()
            .join(", ");
        output.print(&format!("  PLC {:<4} {}", table.plc_id, spaces))?;
        if let Some(problem) = &table.problem {
            output.warning(&format!("  PLC {}: {problem}", table.plc_id))?;
        }
    }

    Ok(())
}

fn tables(provider: &StaticOffsetProvider) -> Vec<OffsetTable> {
    provider
        .iter()
        .map(|(plc_id, set)| OffsetTable {
            plc_id,
            offsets: set.iter().map(|(space, offset)| (space.as_str(), offset)).collect(),
            problem: DomainValidator::validate_offsets(set, plc_id)
                .err()
                .map(|e| e.to_string()),
        })
        .collect()
}
