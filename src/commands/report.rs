use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::info;

use crate::align::{AlignmentStrategy, align};
use crate::cli::ReportArgs;
use crate::export::write_report_sheets;
use crate::model::{InputDigest, ReportCounts, ReportRunManifest};
use crate::normalize::{KeyMap, check_column_parity, strip_category_headers};
use crate::report::build_report;
use crate::schema::CategorySchema;
use crate::table::DataTable;
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: ReportArgs) -> Result<()> {
    let started_ts = Utc::now();
    let run_id = format!("irr-{}", utc_compact_string(started_ts));
    let mut warnings: Vec<String> = Vec::new();

    let schema = match &args.schema_path {
        Some(path) => CategorySchema::from_json_file(path)?,
        None => CategorySchema::default_rubric(),
    };
    let key_map = match &args.key_map_path {
        Some(path) => KeyMap::from_json_file(path)?,
        None => KeyMap::default_submissions(),
    };

    let mut llm = DataTable::load(&args.llm_data)
        .with_context(|| format!("failed to load LLM table: {}", args.llm_data.display()))?;
    let mut reference = DataTable::load(&args.reference_data).with_context(|| {
        format!(
            "failed to load reference table: {}",
            args.reference_data.display()
        )
    })?;
    info!(
        llm_rows = llm.len(),
        llm_columns = llm.columns.len(),
        reference_rows = reference.len(),
        reference_columns = reference.columns.len(),
        "coding tables loaded"
    );

    let keys_remapped = key_map.apply(&mut llm);
    let removed_llm = strip_category_headers(&mut llm);
    let removed_reference = strip_category_headers(&mut reference);

    check_column_parity(&llm, &reference)?;

    let alignment = align(&mut llm, &mut reference);
    if alignment.strategy == AlignmentStrategy::Positional {
        warnings.push(
            "primary key-based alignment failed; used position-based fallback".to_string(),
        );
    }
    if !alignment.keys_match {
        warnings.push(
            "document keys still differ after alignment; comparison is positional only"
                .to_string(),
        );
    }
    if alignment.dropped_rows > 0 {
        warnings.push(format!(
            "{} rows beyond the common document count were dropped",
            alignment.dropped_rows
        ));
    }

    let report = build_report(
        &llm,
        &reference,
        &schema,
        alignment.clone(),
        now_utc_string(),
        &mut warnings,
    );
    if report.rows.is_empty() {
        bail!(
            "no category could be computed from {} schema categories; report would be empty",
            schema.len()
        );
    }

    let report_path = write_report_sheets(&args.output_dir, &report)?;

    let manifest = ReportRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        generated_at: now_utc_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        inputs: vec![
            InputDigest {
                path: args.llm_data.display().to_string(),
                sha256: sha256_file(&args.llm_data)?,
            },
            InputDigest {
                path: args.reference_data.display().to_string(),
                sha256: sha256_file(&args.reference_data)?,
            },
        ],
        output_dir: args.output_dir.display().to_string(),
        alignment,
        counts: ReportCounts {
            documents: report.total_documents,
            indicator_columns: llm.columns.len(),
            header_columns_removed: removed_llm.len() + removed_reference.len(),
            keys_remapped,
            categories_total: schema.len(),
            categories_reported: report.rows.len(),
            categories_skipped: schema.len() - report.rows.len(),
            ac1_errors: report
                .rows
                .iter()
                .filter(|row| row.gwet_ac1.score().is_none())
                .count(),
        },
        warnings: warnings.clone(),
    };
    write_json_pretty(&args.output_dir.join("irr_run_manifest.json"), &manifest)?;

    info!(
        report = %report_path.display(),
        categories = report.rows.len(),
        average_ac1 = ?report.summary.average_ac1,
        warnings = warnings.len(),
        "IRR analysis completed"
    );

    Ok(())
}
