use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions callers must distinguish. Non-fatal conditions
/// (alignment fallback, skipped categories, per-category AC1 failures) are
/// accumulated as run warnings instead of surfacing here.
#[derive(Debug, Error)]
pub enum IrrError {
    #[error("failed to load input table {path}: {reason}")]
    InputLoad { path: PathBuf, reason: String },

    #[error(
        "indicator columns differ after normalization (only in LLM: [{}]; only in reference: [{}])",
        .llm_only.join(", "),
        .reference_only.join(", ")
    )]
    SchemaMismatch {
        llm_only: Vec<String>,
        reference_only: Vec<String>,
    },

    #[error("cannot compute agreement over an empty document sequence")]
    EmptyInput,
}

impl IrrError {
    pub fn input_load(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::InputLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
