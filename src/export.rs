use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::model::{AgreementLevel, IrrReport};
use crate::table::{DataTable, KEY_COLUMN};
use crate::util::{ensure_directory, write_json_pretty};

pub const REPORT_SHEET: &str = "irr_report.csv";
pub const SUMMARY_SHEET: &str = "irr_summary.csv";
pub const DISAGREEMENTS_SHEET: &str = "irr_disagreements.csv";
pub const REPORT_JSON: &str = "irr_report.json";

/// Write the report as three CSV sheets plus the typed JSON form. Returns the
/// path of the full report sheet.
pub fn write_report_sheets(output_dir: &Path, report: &IrrReport) -> Result<PathBuf> {
    ensure_directory(output_dir)?;

    let report_path = output_dir.join(REPORT_SHEET);
    let mut full = csv_writer(&report_path)?;
    full.write_record([
        "Category",
        "LLM Present Count",
        "Reference Present Count",
        "Difference",
        "Matches",
        "Total Documents",
        "Percent Agreement",
        "Gwet AC1",
        "Disagreement Count",
        "Disagreements",
    ])
    .context("failed to write report header")?;
    for row in &report.rows {
        full.write_record([
            row.category.clone(),
            row.llm_present_count.to_string(),
            row.reference_present_count.to_string(),
            row.difference.to_string(),
            row.matches.to_string(),
            row.total_documents.to_string(),
            format!("{:.1}", row.percent_agreement),
            row.gwet_ac1.cell(),
            row.disagreement_count().to_string(),
            joined_disagreements(&row.disagreements),
        ])
        .with_context(|| format!("failed to write report row: {}", row.category))?;
    }
    full.flush().context("failed to flush report sheet")?;

    let summary_path = output_dir.join(SUMMARY_SHEET);
    let mut summary = csv_writer(&summary_path)?;
    summary
        .write_record(["Metric", "Value"])
        .context("failed to write summary header")?;
    let buckets = [
        (AgreementLevel::Excellent, report.summary.excellent),
        (AgreementLevel::Good, report.summary.good),
        (AgreementLevel::Moderate, report.summary.moderate),
        (AgreementLevel::Fair, report.summary.fair),
        (AgreementLevel::Poor, report.summary.poor),
        (AgreementLevel::VeryPoor, report.summary.very_poor),
    ];
    summary
        .write_record([
            "Total Categories".to_string(),
            report.summary.total_categories.to_string(),
        ])
        .context("failed to write summary total")?;
    for (level, count) in buckets {
        summary
            .write_record([level.label().to_string(), count.to_string()])
            .context("failed to write summary bucket")?;
    }
    let average = report
        .summary
        .average_ac1
        .map(|value| format!("{value:.4}"))
        .unwrap_or_else(|| "N/A".to_string());
    summary
        .write_record(["Average AC1 Score".to_string(), average])
        .context("failed to write summary average")?;
    summary.flush().context("failed to flush summary sheet")?;

    let disagreements_path = output_dir.join(DISAGREEMENTS_SHEET);
    let mut disagreements = csv_writer(&disagreements_path)?;
    disagreements
        .write_record(["Category", "Disagreement Count", "Disagreements"])
        .context("failed to write disagreements header")?;
    for row in report.rows.iter().filter(|row| !row.disagreements.is_empty()) {
        disagreements
            .write_record([
                row.category.clone(),
                row.disagreement_count().to_string(),
                joined_disagreements(&row.disagreements),
            ])
            .with_context(|| format!("failed to write disagreement row: {}", row.category))?;
    }
    disagreements
        .flush()
        .context("failed to flush disagreements sheet")?;

    write_json_pretty(&output_dir.join(REPORT_JSON), report)?;

    info!(output_dir = %output_dir.display(), "report sheets written");
    Ok(report_path)
}

/// Persist a coding table (the `extract` command's output) as CSV that the
/// `report` command can load back.
pub fn write_coding_table_csv(path: &Path, table: &DataTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let mut writer = csv_writer(path)?;
    let mut header = vec![KEY_COLUMN.to_string()];
    header.extend(table.columns.iter().cloned());
    writer
        .write_record(&header)
        .context("failed to write coding table header")?;

    for row in &table.rows {
        let mut record = vec![row.key.clone()];
        record.extend(
            table
                .columns
                .iter()
                .map(|column| row.value(column).to_string()),
        );
        writer
            .write_record(&record)
            .with_context(|| format!("failed to write coding table row: {}", row.key))?;
    }

    writer.flush().context("failed to flush coding table")?;
    Ok(())
}

fn csv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path)
        .with_context(|| format!("failed to create csv file: {}", path.display()))
}

fn joined_disagreements(disagreements: &[String]) -> String {
    if disagreements.is_empty() {
        "None".to_string()
    } else {
        disagreements.join("; ")
    }
}
