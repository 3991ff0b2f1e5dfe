use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::cli::ExtractArgs;
use crate::export::write_coding_table_csv;
use crate::extract::extract_table;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

#[derive(Debug, Clone, Serialize)]
struct ExtractionManifest {
    manifest_version: u32,
    run_id: String,
    generated_at: String,
    tool_version: String,
    json_dir: String,
    output_path: String,
    documents: usize,
    files_processed: Vec<String>,
    files_skipped: Vec<String>,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let run_id = format!("extract-{}", utc_compact_string(Utc::now()));

    let (table, stats) = extract_table(&args.json_dir)?;
    write_coding_table_csv(&args.output_path, &table)?;

    let manifest_path = args
        .output_path
        .parent()
        .map(|parent| parent.join("extraction_manifest.json"))
        .unwrap_or_else(|| "extraction_manifest.json".into());
    write_json_pretty(
        &manifest_path,
        &ExtractionManifest {
            manifest_version: 1,
            run_id,
            generated_at: now_utc_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            json_dir: args.json_dir.display().to_string(),
            output_path: args.output_path.display().to_string(),
            documents: table.len(),
            files_processed: stats.processed,
            files_skipped: stats.skipped,
        },
    )?;

    info!(
        output = %args.output_path.display(),
        documents = table.len(),
        "coding table extracted"
    );

    Ok(())
}
