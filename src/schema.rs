use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One rubric category: a human-readable label plus the indicator columns
/// that jointly encode its state for a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySchema {
    pub categories: Vec<CategoryDef>,
}

impl CategorySchema {
    /// The built-in plastics-treaty rubric (C1 through C11), in report order.
    pub fn default_rubric() -> Self {
        let categories = [
            (
                "C1: End plastic pollution",
                vec![
                    "B : Mentioned with time frame",
                    "C : Mentioned, no time frame",
                    "D : Not mentioned",
                ],
            ),
            (
                "C2: Reduce production of plastics",
                vec![
                    "F : Mentioned with specification",
                    "G : Mentioned, no specification",
                    "H : Not mentioned",
                ],
            ),
            (
                "C3: Benefits of plastics",
                vec!["J : Mentioned", "K : Not mentioned"],
            ),
            (
                "C4: Protect human health",
                vec!["M : Mentioned", "N : Not mentioned"],
            ),
            (
                "C5: Protect biodiversity and environment",
                vec!["P : Mentioned", "Q : Not mentioned"],
            ),
            (
                "C10: Time horizon of implementation",
                vec!["S : Not relevant", "T : Not specified", "U : Specified"],
            ),
            (
                "C11: Stringency of measure",
                vec!["W : High", "X : Low", "Y : Non relevant"],
            ),
            (
                "C6: Addressing full life cycle",
                vec!["AA : Mentioned", "AB : Not mentioned", "AC : Partial mention"],
            ),
            (
                "C7: Other objectives",
                vec![
                    "AE : Circular economy",
                    "AF : Climate change",
                    "AG : ESM",
                    "AH : Mentioned",
                    "AI : Not mentioned",
                    "AJ : Sustainable production",
                ],
            ),
            (
                "C8: Value chain",
                vec![
                    "AL : 1. Upstream",
                    "AM : 2. Midstream",
                    "AN : 3. Downstream",
                    "AO : 4. Cross value chain",
                ],
            ),
            (
                "C9: Type of measure",
                vec!["AQ : Instrument", "AR : Target"],
            ),
        ];

        Self {
            categories: categories
                .into_iter()
                .map(|(name, columns)| CategoryDef {
                    name: name.to_string(),
                    columns: columns.into_iter().map(str::to_string).collect(),
                })
                .collect(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file: {}", path.display()))?;
        let schema: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse schema file: {}", path.display()))?;
        if schema.categories.is_empty() {
            bail!("schema file defines no categories: {}", path.display());
        }
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A negation indicator records an explicit "not mentioned" judgment rather
/// than a positive coding decision.
pub fn is_negation_column(name: &str) -> bool {
    name.contains("Not mentioned")
}

static CATEGORY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"C\d+\s+Objectives|C\d+\s+Time|C\d+\s+Stringency|C\d+\s+Value|C\d+\s+Type")
        .expect("category header pattern is a fixed literal")
});

/// Section-header columns are organizational, not coding decisions, and are
/// stripped before any agreement computation.
pub fn is_category_header(name: &str) -> bool {
    CATEGORY_HEADER.is_match(name)
}
