use crate::schema::is_negation_column;
use crate::table::{DataTable, DocumentRecord};

/// A category's indicator columns split into positive indicators and
/// explicit "not mentioned" negation indicators.
#[derive(Debug, Clone)]
pub struct ColumnPartition {
    pub positive: Vec<String>,
    pub negation: Vec<String>,
}

impl ColumnPartition {
    pub fn new(columns: &[String]) -> Self {
        let (negation, positive) = columns
            .iter()
            .cloned()
            .partition(|column| is_negation_column(column));
        Self { positive, negation }
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negation.is_empty()
    }
}

/// Collapse one document's indicator values into a single presence judgment.
///
/// Present means: any positive indicator is set, OR negation indicators exist
/// and all of them are unset. The second arm deliberately reads "not
/// explicitly not-mentioned" as presence; that double negative is load-bearing
/// for the existing report semantics even when no positive indicator backs it
/// up. A category with no indicator columns at all is never present.
pub fn category_present(row: &DocumentRecord, partition: &ColumnPartition) -> bool {
    let any_positive = partition
        .positive
        .iter()
        .any(|column| row.value(column));
    let all_negations_false = partition
        .negation
        .iter()
        .all(|column| !row.value(column));

    any_positive || (!partition.negation.is_empty() && all_negations_false)
}

/// Per-document judgments for one rater, in the table's row order.
pub fn collapse_table(table: &DataTable, partition: &ColumnPartition) -> Vec<bool> {
    table
        .rows
        .iter()
        .map(|row| category_present(row, partition))
        .collect()
}
