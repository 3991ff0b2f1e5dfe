use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::error::IrrError;
use crate::schema::is_category_header;
use crate::table::DataTable;

/// Static lookup from the extractor's free-text document identifiers to the
/// reference tool's canonical `"<ordinal> : <name>"` keys. Applied to the LLM
/// table before alignment.
#[derive(Debug, Clone)]
pub struct KeyMap {
    entries: HashMap<String, String>,
}

impl KeyMap {
    /// Built-in mapping for the plastics-treaty submission set.
    pub fn default_submissions() -> Self {
        let entries = [
            ("United States of America", "11 : USA"),
            ("Bosnia and Herzegovina", "2 : Bosnia and Herzegovina"),
            ("Saudi Arabia", "9 : Saudi Arabia"),
            ("Principality of Monaco", "7 : Monaco"),
            ("Islamic Republic of Iran", "6 : Iran"),
            ("Cambodia", "4 : Cambodia"),
            ("Brazil", "3 : Brazil"),
            ("The Russian Federation", "8 : Russia"),
            ("URUGUAY", "10 : Uruguay"),
            ("COOK ISLANDS", "5 : Cook Islands"),
            ("European Union", "1 : EU"),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read key map file: {}", path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse key map file: {}", path.display()))?;
        Ok(Self { entries })
    }

    /// Unmapped keys pass through unchanged.
    pub fn canonical(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn apply(&self, table: &mut DataTable) -> usize {
        let mut remapped = 0;
        for row in &mut table.rows {
            let canonical = self.canonical(&row.key);
            if canonical != row.key {
                row.key = canonical;
                remapped += 1;
            }
        }
        remapped
    }
}

/// Remove category section-header columns, which carry no coding decision.
/// Returns the removed column names for logging and the run manifest.
pub fn strip_category_headers(table: &mut DataTable) -> Vec<String> {
    let headers: Vec<String> = table
        .columns
        .iter()
        .filter(|column| is_category_header(column))
        .cloned()
        .collect();

    if !headers.is_empty() {
        table.drop_columns(&headers);
        debug!(removed = headers.len(), "stripped category header columns");
    }

    headers
}

/// After stripping, both raters must expose the same indicator vocabulary;
/// a category-by-category comparison is meaningless otherwise.
pub fn check_column_parity(llm: &DataTable, reference: &DataTable) -> Result<(), IrrError> {
    let llm_columns = llm.column_set();
    let reference_columns = reference.column_set();

    if llm_columns == reference_columns {
        info!(columns = llm_columns.len(), "indicator columns match across raters");
        return Ok(());
    }

    Err(IrrError::SchemaMismatch {
        llm_only: llm_columns.difference(&reference_columns).cloned().collect(),
        reference_only: reference_columns.difference(&llm_columns).cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DocumentRecord;

    fn table(columns: &[&str], keys: &[&str]) -> DataTable {
        DataTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: keys
                .iter()
                .map(|key| {
                    DocumentRecord::new(
                        *key,
                        columns.iter().map(|c| (c.to_string(), false)),
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn key_map_remaps_known_identifiers_and_passes_unknown_through() {
        let map = KeyMap::default_submissions();
        assert_eq!(map.canonical("European Union"), "1 : EU");
        assert_eq!(map.canonical("URUGUAY"), "10 : Uruguay");
        assert_eq!(map.canonical("Atlantis"), "Atlantis");
    }

    #[test]
    fn key_map_apply_counts_remapped_rows() {
        let map = KeyMap::default_submissions();
        let mut coded = table(&["A : x"], &["Brazil", "3 : Brazil", "Atlantis"]);
        let remapped = map.apply(&mut coded);
        assert_eq!(remapped, 1);
        assert_eq!(coded.keys(), vec!["3 : Brazil", "3 : Brazil", "Atlantis"]);
    }

    #[test]
    fn strip_removes_only_header_columns() {
        let mut coded = table(
            &[
                "A : C1 Objectives - end plastic pollution",
                "B : Mentioned with time frame",
                "AK : C8 Value chain",
                "AL : 1. Upstream",
            ],
            &["1 : EU"],
        );

        let removed = strip_category_headers(&mut coded);
        assert_eq!(removed.len(), 2);
        assert_eq!(
            coded.columns,
            vec![
                "B : Mentioned with time frame".to_string(),
                "AL : 1. Upstream".to_string()
            ]
        );
    }

    #[test]
    fn column_parity_reports_both_directions() {
        let llm = table(&["A", "B"], &["1 : EU"]);
        let reference = table(&["A", "C"], &["1 : EU"]);

        let err = check_column_parity(&llm, &reference).expect_err("columns differ");
        match err {
            IrrError::SchemaMismatch {
                llm_only,
                reference_only,
            } => {
                assert_eq!(llm_only, vec!["B".to_string()]);
                assert_eq!(reference_only, vec!["C".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn column_parity_accepts_identical_sets_in_any_order() {
        let llm = table(&["A", "B"], &["1 : EU"]);
        let reference = table(&["B", "A"], &["1 : EU"]);
        check_column_parity(&llm, &reference).expect("same sets should pass");
    }
}
