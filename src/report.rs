use tracing::{info, warn};

use crate::agreement::gwets_ac1;
use crate::align::AlignmentOutcome;
use crate::collapse::{ColumnPartition, collapse_table};
use crate::model::{Ac1Value, CategoryReportRow, IrrReport, IrrSummary};
use crate::schema::CategorySchema;
use crate::table::DataTable;

/// Build the per-category report over two aligned, normalized tables.
///
/// Categories whose indicator columns are absent from the common vocabulary
/// are skipped; a failed AC1 computation marks only that row. Both conditions
/// land in `warnings`, never abort the report. A report with zero rows is the
/// caller's distinguishable empty-report condition.
pub fn build_report(
    llm: &DataTable,
    reference: &DataTable,
    schema: &CategorySchema,
    alignment: AlignmentOutcome,
    generated_at: String,
    warnings: &mut Vec<String>,
) -> IrrReport {
    let total_documents = llm.len();
    let mut rows = Vec::with_capacity(schema.len());

    for category in &schema.categories {
        let existing: Vec<String> = category
            .columns
            .iter()
            .filter(|column| llm.contains_column(column) && reference.contains_column(column))
            .cloned()
            .collect();
        if existing.is_empty() {
            warn!(category = %category.name, "no indicator columns present in either source; skipping");
            warnings.push(format!(
                "category unavailable: {} (no indicator columns in common)",
                category.name
            ));
            continue;
        }

        let partition = ColumnPartition::new(&existing);
        let llm_judgments = collapse_table(llm, &partition);
        let reference_judgments = collapse_table(reference, &partition);

        let matches = llm_judgments
            .iter()
            .zip(&reference_judgments)
            .filter(|(a, b)| a == b)
            .count();
        let percent_agreement = if total_documents == 0 {
            0.0
        } else {
            round1(100.0 * matches as f64 / total_documents as f64)
        };

        let llm_present_count = llm_judgments.iter().filter(|&&present| present).count();
        let reference_present_count = reference_judgments
            .iter()
            .filter(|&&present| present)
            .count();

        let gwet_ac1 = match gwets_ac1(&llm_judgments, &reference_judgments) {
            Ok(score) => Ac1Value::Score(score),
            Err(err) => {
                warn!(category = %category.name, error = %err, "AC1 computation failed");
                warnings.push(format!("AC1 computation failed for {}: {err}", category.name));
                Ac1Value::error()
            }
        };

        let disagreements: Vec<String> = llm
            .rows
            .iter()
            .zip(llm_judgments.iter().zip(&reference_judgments))
            .filter(|(_, (a, b))| a != b)
            .map(|(row, (a, b))| {
                format!(
                    "{} (LLM={}, Reference={})",
                    row.key,
                    u8::from(*a),
                    u8::from(*b)
                )
            })
            .collect();

        rows.push(CategoryReportRow {
            category: category.name.clone(),
            llm_present_count,
            reference_present_count,
            difference: llm_present_count.abs_diff(reference_present_count),
            matches,
            total_documents,
            percent_agreement,
            gwet_ac1,
            disagreements,
        });
    }

    let summary = IrrSummary::from_rows(&rows);
    info!(
        categories = rows.len(),
        skipped = schema.len() - rows.len(),
        documents = total_documents,
        "report built"
    );

    IrrReport {
        generated_at,
        total_documents,
        document_keys: llm.keys(),
        alignment,
        rows,
        summary,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
