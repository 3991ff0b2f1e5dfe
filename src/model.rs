use serde::{Deserialize, Serialize};

use crate::align::AlignmentOutcome;

/// AC1 cell value: a computed score, or the error marker carried in place of
/// one when the computation failed for a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ac1Value {
    Score(f64),
    Error(String),
}

impl Ac1Value {
    pub const ERROR_MARKER: &'static str = "Error";

    pub fn error() -> Self {
        Self::Error(Self::ERROR_MARKER.to_string())
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Score(value) => Some(*value),
            Self::Error(_) => None,
        }
    }

    /// Rendering used in the CSV sheets.
    pub fn cell(&self) -> String {
        match self {
            Self::Score(value) => format!("{value:.4}"),
            Self::Error(marker) => marker.clone(),
        }
    }
}

/// Six-tier agreement quality scale over AC1 scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgreementLevel {
    Excellent,
    Good,
    Moderate,
    Fair,
    Poor,
    VeryPoor,
}

impl AgreementLevel {
    pub fn for_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Excellent
        } else if score >= 0.6 {
            Self::Good
        } else if score >= 0.4 {
            Self::Moderate
        } else if score >= 0.2 {
            Self::Fair
        } else if score >= 0.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent Agreement (AC1 >= 0.8)",
            Self::Good => "Good Agreement (0.6 <= AC1 < 0.8)",
            Self::Moderate => "Moderate Agreement (0.4 <= AC1 < 0.6)",
            Self::Fair => "Fair Agreement (0.2 <= AC1 < 0.4)",
            Self::Poor => "Poor Agreement (0.0 <= AC1 < 0.2)",
            Self::VeryPoor => "Very Poor Agreement (AC1 < 0.0)",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReportRow {
    pub category: String,
    pub llm_present_count: usize,
    pub reference_present_count: usize,
    pub difference: usize,
    pub matches: usize,
    pub total_documents: usize,
    pub percent_agreement: f64,
    pub gwet_ac1: Ac1Value,
    pub disagreements: Vec<String>,
}

impl CategoryReportRow {
    pub fn disagreement_count(&self) -> usize {
        self.disagreements.len()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrrSummary {
    pub total_categories: usize,
    pub excellent: usize,
    pub good: usize,
    pub moderate: usize,
    pub fair: usize,
    pub poor: usize,
    pub very_poor: usize,
    pub average_ac1: Option<f64>,
}

impl IrrSummary {
    pub fn from_rows(rows: &[CategoryReportRow]) -> Self {
        let mut summary = Self {
            total_categories: rows.len(),
            ..Self::default()
        };

        let scores: Vec<f64> = rows.iter().filter_map(|row| row.gwet_ac1.score()).collect();
        for score in &scores {
            match AgreementLevel::for_score(*score) {
                AgreementLevel::Excellent => summary.excellent += 1,
                AgreementLevel::Good => summary.good += 1,
                AgreementLevel::Moderate => summary.moderate += 1,
                AgreementLevel::Fair => summary.fair += 1,
                AgreementLevel::Poor => summary.poor += 1,
                AgreementLevel::VeryPoor => summary.very_poor += 1,
            }
        }

        if !scores.is_empty() {
            summary.average_ac1 = Some(scores.iter().sum::<f64>() / scores.len() as f64);
        }

        summary
    }
}

/// The full typed report; its JSON form is the regenerable source for any
/// presentation-layer derivative (charts, dashboards).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrReport {
    pub generated_at: String,
    pub total_documents: usize,
    pub document_keys: Vec<String>,
    pub alignment: AlignmentOutcome,
    pub rows: Vec<CategoryReportRow>,
    pub summary: IrrSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputDigest {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportCounts {
    pub documents: usize,
    pub indicator_columns: usize,
    pub header_columns_removed: usize,
    pub keys_remapped: usize,
    pub categories_total: usize,
    pub categories_reported: usize,
    pub categories_skipped: usize,
    pub ac1_errors: usize,
}

/// Audit record written next to the report outputs for every run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub tool_version: String,
    pub inputs: Vec<InputDigest>,
    pub output_dir: String,
    pub alignment: AlignmentOutcome,
    pub counts: ReportCounts,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, ac1: Ac1Value) -> CategoryReportRow {
        CategoryReportRow {
            category: name.to_string(),
            llm_present_count: 0,
            reference_present_count: 0,
            difference: 0,
            matches: 0,
            total_documents: 0,
            percent_agreement: 0.0,
            gwet_ac1: ac1,
            disagreements: Vec::new(),
        }
    }

    #[test]
    fn bucket_boundaries_are_left_inclusive() {
        assert_eq!(AgreementLevel::for_score(1.0), AgreementLevel::Excellent);
        assert_eq!(AgreementLevel::for_score(0.8), AgreementLevel::Excellent);
        assert_eq!(AgreementLevel::for_score(0.79), AgreementLevel::Good);
        assert_eq!(AgreementLevel::for_score(0.6), AgreementLevel::Good);
        assert_eq!(AgreementLevel::for_score(0.4), AgreementLevel::Moderate);
        assert_eq!(AgreementLevel::for_score(0.2), AgreementLevel::Fair);
        assert_eq!(AgreementLevel::for_score(0.0), AgreementLevel::Poor);
        assert_eq!(AgreementLevel::for_score(-0.01), AgreementLevel::VeryPoor);
    }

    #[test]
    fn summary_counts_numeric_rows_only() {
        let rows = vec![
            row("a", Ac1Value::Score(0.9)),
            row("b", Ac1Value::Score(0.5)),
            row("c", Ac1Value::error()),
            row("d", Ac1Value::Score(-0.2)),
        ];

        let summary = IrrSummary::from_rows(&rows);
        assert_eq!(summary.total_categories, 4);
        assert_eq!(summary.excellent, 1);
        assert_eq!(summary.moderate, 1);
        assert_eq!(summary.very_poor, 1);
        let average = summary.average_ac1.expect("three numeric scores");
        assert!((average - (0.9 + 0.5 - 0.2) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn summary_average_is_absent_without_numeric_scores() {
        let rows = vec![row("a", Ac1Value::error())];
        let summary = IrrSummary::from_rows(&rows);
        assert_eq!(summary.average_ac1, None);
    }

    #[test]
    fn ac1_value_serializes_untagged() {
        let score = serde_json::to_string(&Ac1Value::Score(0.5)).expect("serialize score");
        assert_eq!(score, "0.5");
        let marker = serde_json::to_string(&Ac1Value::error()).expect("serialize marker");
        assert_eq!(marker, "\"Error\"");

        let back: Ac1Value = serde_json::from_str("0.5").expect("deserialize score");
        assert_eq!(back, Ac1Value::Score(0.5));
        let back: Ac1Value = serde_json::from_str("\"Error\"").expect("deserialize marker");
        assert_eq!(back, Ac1Value::error());
    }
}
