use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::table::DataTable;

/// Keys with no leading integer sort after every numbered key.
pub const UNORDERED_KEY_SENTINEL: u32 = 999;

static LEADING_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)").expect("leading index pattern is a fixed literal"));

/// Which alignment phase produced the final ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStrategy {
    KeySort,
    Positional,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentOutcome {
    pub strategy: AlignmentStrategy,
    pub keys_match: bool,
    pub dropped_rows: usize,
}

/// Extract the numeric prefix of a document key like `"10 : Uruguay"`.
pub fn document_index(key: &str) -> u32 {
    LEADING_INDEX
        .captures(key)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
        .unwrap_or(UNORDERED_KEY_SENTINEL)
}

/// Bring both tables into one index-paired document order.
///
/// Primary phase sorts both tables by the numeric key prefix. If the sorted
/// key sequences still differ, the fallback reorders the reference table by
/// the LLM table's key positions (best effort, keys missing from the LLM
/// table sort last). Extra rows beyond the common length are dropped.
pub fn align(llm: &mut DataTable, reference: &mut DataTable) -> AlignmentOutcome {
    llm.rows.sort_by_key(|row| document_index(&row.key));
    reference.rows.sort_by_key(|row| document_index(&row.key));

    let mut strategy = AlignmentStrategy::KeySort;
    if llm.keys() != reference.keys() {
        warn!("key-sorted document lists differ; falling back to position-based alignment");
        strategy = AlignmentStrategy::Positional;

        let positions: HashMap<String, usize> = llm
            .keys()
            .into_iter()
            .enumerate()
            .map(|(position, key)| (key, position))
            .collect();
        reference.rows.sort_by_key(|row| {
            positions
                .get(&row.key)
                .copied()
                .unwrap_or(UNORDERED_KEY_SENTINEL as usize)
        });
    }

    let common_len = llm.len().min(reference.len());
    let dropped_rows = llm.len().max(reference.len()) - common_len;
    llm.rows.truncate(common_len);
    reference.rows.truncate(common_len);

    let keys_match = llm.keys() == reference.keys();
    if keys_match {
        info!(documents = common_len, strategy = ?strategy, "documents aligned");
    } else {
        warn!(
            documents = common_len,
            "document keys still differ after positional alignment; comparison is positional only"
        );
    }

    AlignmentOutcome {
        strategy,
        keys_match,
        dropped_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DocumentRecord;

    fn table(keys: &[&str]) -> DataTable {
        DataTable {
            columns: vec!["A".to_string()],
            rows: keys
                .iter()
                .map(|key| DocumentRecord::new(*key, [("A".to_string(), false)]))
                .collect(),
        }
    }

    #[test]
    fn document_index_extracts_leading_digits() {
        assert_eq!(document_index("10 : Uruguay"), 10);
        assert_eq!(document_index("1 : EU"), 1);
        assert_eq!(document_index("Atlantis"), UNORDERED_KEY_SENTINEL);
        assert_eq!(document_index(""), UNORDERED_KEY_SENTINEL);
    }

    #[test]
    fn key_sort_orders_both_tables_numerically() {
        let mut llm = table(&["10 : Uruguay", "2 : Bosnia and Herzegovina", "1 : EU"]);
        let mut reference = table(&["2 : Bosnia and Herzegovina", "1 : EU", "10 : Uruguay"]);

        let outcome = align(&mut llm, &mut reference);
        assert_eq!(outcome.strategy, AlignmentStrategy::KeySort);
        assert!(outcome.keys_match);
        assert_eq!(
            llm.keys(),
            vec!["1 : EU", "2 : Bosnia and Herzegovina", "10 : Uruguay"]
        );
        assert_eq!(llm.keys(), reference.keys());
    }

    #[test]
    fn aligning_identically_ordered_tables_is_a_no_op() {
        let keys = ["1 : EU", "2 : Bosnia and Herzegovina", "3 : Brazil"];
        let mut llm = table(&keys);
        let mut reference = table(&keys);

        let outcome = align(&mut llm, &mut reference);
        assert_eq!(outcome.strategy, AlignmentStrategy::KeySort);
        assert!(outcome.keys_match);
        assert_eq!(outcome.dropped_rows, 0);
        assert_eq!(llm.keys(), keys.to_vec());
        assert_eq!(reference.keys(), keys.to_vec());
    }

    #[test]
    fn positional_fallback_engages_when_key_sets_differ() {
        let mut llm = table(&["Alpha", "Beta", "Gamma"]);
        let mut reference = table(&["Beta", "Gamma", "Alpha"]);

        let outcome = align(&mut llm, &mut reference);
        assert_eq!(outcome.strategy, AlignmentStrategy::Positional);
        assert!(outcome.keys_match);
        assert_eq!(reference.keys(), llm.keys());
    }

    #[test]
    fn positional_fallback_sorts_unknown_keys_last() {
        let mut llm = table(&["Alpha", "Beta"]);
        let mut reference = table(&["Delta", "Beta", "Alpha"]);

        let outcome = align(&mut llm, &mut reference);
        assert_eq!(outcome.strategy, AlignmentStrategy::Positional);
        assert_eq!(outcome.dropped_rows, 1);
        assert_eq!(llm.len(), reference.len());
        assert_eq!(reference.keys(), vec!["Alpha", "Beta"]);
        assert!(outcome.keys_match);
    }

    #[test]
    fn row_count_mismatch_truncates_to_common_length() {
        let mut llm = table(&["1 : EU", "2 : Bosnia and Herzegovina", "3 : Brazil"]);
        let mut reference = table(&["1 : EU", "2 : Bosnia and Herzegovina"]);

        let outcome = align(&mut llm, &mut reference);
        assert_eq!(outcome.dropped_rows, 1);
        assert_eq!(llm.len(), 2);
        assert_eq!(reference.len(), 2);
    }
}
