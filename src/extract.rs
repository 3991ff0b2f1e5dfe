use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{info, warn};

use crate::table::{DataTable, DocumentRecord};

/// A value pulled out of an extractor JSON document. Total over every input
/// shape: an absent path or an unusable node is `Missing`, never a panic.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Bool(bool),
    Str(String),
    List(Vec<String>),
    Missing,
}

impl Extracted {
    pub fn as_bool(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Str(value) => value,
            _ => "",
        }
    }

    pub fn as_list(&self) -> &[String] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }
}

/// Walk a path of field names through nested JSON. Leaf nodes wrapped in the
/// extractor's `{value, location, reasoning}` envelope unwrap to their
/// `value`.
pub fn extract(root: &Value, path: &[&str]) -> Extracted {
    let mut current = root;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return Extracted::Missing,
        }
    }
    classify(unwrap_envelope(current))
}

fn unwrap_envelope(node: &Value) -> &Value {
    node.get("value").unwrap_or(node)
}

fn classify(node: &Value) -> Extracted {
    match node {
        Value::Bool(value) => Extracted::Bool(*value),
        Value::String(value) => Extracted::Str(value.clone()),
        Value::Number(value) => Extracted::Str(value.to_string()),
        Value::Array(items) => Extracted::List(
            items
                .iter()
                .map(unwrap_envelope)
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        _ => Extracted::Missing,
    }
}

/// Indicator columns of the extracted coding table, in sheet order. The
/// single-letter prefixes mirror the reference tool's column labels; the
/// section-header columns (A, E, I, ...) are stripped again during
/// normalization.
pub const COLUMN_ORDER: [&str; 44] = [
    "A : C1 Objectives - end plastic pollution",
    "B : Mentioned with time frame",
    "C : Mentioned, no time frame",
    "D : Not mentioned",
    "E : C2 Objectives - reduce production of plastics",
    "F : Mentioned with specification",
    "G : Mentioned, no specification",
    "H : Not mentioned",
    "I : C3 Objectives - benefits of plastics",
    "J : Mentioned",
    "K : Not mentioned",
    "L : C4 Objectives - protect human health",
    "M : Mentioned",
    "N : Not mentioned",
    "O : C5 Objectives - protect biodiversity and (marine) environment",
    "P : Mentioned",
    "Q : Not mentioned",
    "R : C10 Time horizon of implementation",
    "S : Not relevant",
    "T : Not specified",
    "U : Specified",
    "V : C11 Stringency of measure",
    "W : High",
    "X : Low",
    "Y : Non relevant",
    "Z : C6 Objectives - addressing the full life cycle of plastics",
    "AA : Mentioned",
    "AB : Not mentioned",
    "AC : Partial mention",
    "AD : C7 Objectives - other objectives",
    "AE : Circular economy",
    "AF : Climate change",
    "AG : ESM",
    "AH : Mentioned",
    "AI : Not mentioned",
    "AJ : Sustainable production",
    "AK : C8 Value chain",
    "AL : 1. Upstream",
    "AM : 2. Midstream",
    "AN : 3. Downstream",
    "AO : 4. Cross value chain",
    "AP : C9 Type of measure",
    "AQ : Instrument",
    "AR : Target",
];

const ECONOMIC_INSTRUMENTS: [&str; 7] = [
    "tax_incentives",
    "subsidies",
    "penalties",
    "trading_systems",
    "deposit_systems",
    "public_procurement",
    "rd_funding",
];

const REGULATORY_INSTRUMENTS: [&str; 11] = [
    "bans",
    "moratoriums",
    "performance_standards",
    "mandatory_infrastructure",
    "certification",
    "labelling",
    "action_plans",
    "reporting",
    "trade_requirements",
    "epr",
    "just_transition",
];

const SOFT_INSTRUMENTS: [&str; 9] = [
    "voluntary_certification",
    "voluntary_labelling",
    "monitoring",
    "information_guidance",
    "education",
    "expert_groups",
    "research_promotion",
    "harmonization",
    "knowledge_sharing",
];

pub fn submission_key(doc: &Value) -> String {
    match extract(doc, &["submission_metadata", "country"]) {
        Extracted::Str(country) if !country.is_empty() => country,
        _ => "Unknown".to_string(),
    }
}

/// Derive the full indicator row for one extracted submission, in
/// `COLUMN_ORDER`.
pub fn submission_indicators(doc: &Value) -> Vec<(String, bool)> {
    let mentioned = |path: &[&str]| -> bool {
        let mut full = path.to_vec();
        full.push("mentioned");
        extract(doc, &full).as_bool()
    };

    let ep = mentioned(&["objectives", "end_plastic_pollution"]);
    let ep_timeframe =
        extract(doc, &["objectives", "end_plastic_pollution", "timeframe_specified"]).as_bool();

    let reduce = mentioned(&["objectives", "reduce_production"]);
    let reduce_specified =
        extract(doc, &["objectives", "reduce_production", "specification_provided"]).as_bool();

    let benefits = mentioned(&["objectives", "benefits_of_plastics"]);
    let health = mentioned(&["objectives", "protect_human_health"]);
    let biodiversity = mentioned(&["objectives", "protect_biodiversity"]);

    let timeframe = extract(doc, &["implementation", "timeframe", "specified"]).as_bool();
    let stringency = extract(doc, &["implementation", "stringency", "level"]);

    let lifecycle = mentioned(&["objectives", "lifecycle_approach"]);
    let lifecycle_full =
        extract(doc, &["objectives", "lifecycle_approach", "coverage"]).as_str() == "Full lifecycle";

    let other = extract(doc, &["objectives", "other_objectives"]);
    let other_objectives = other.as_list();
    let has_other = !other_objectives.is_empty();
    let contains = |keyword: &str| {
        other_objectives
            .iter()
            .any(|item| item.to_lowercase().contains(keyword))
    };

    let upstream = mentioned(&["value_chain", "upstream", "feedstock"])
        || mentioned(&["value_chain", "upstream", "production"]);
    let midstream = mentioned(&["value_chain", "midstream", "design"])
        || mentioned(&["value_chain", "midstream", "product_production"])
        || mentioned(&["value_chain", "midstream", "distribution"])
        || mentioned(&["value_chain", "midstream", "consumption"]);
    let downstream = mentioned(&["value_chain", "downstream", "collection"])
        || mentioned(&["value_chain", "downstream", "waste_management"])
        || mentioned(&["value_chain", "downstream", "recycling"])
        || mentioned(&["value_chain", "downstream", "legacy_plastic"]);
    let cross = mentioned(&["value_chain", "cross_value_chain", "emissions"])
        || mentioned(&["value_chain", "cross_value_chain", "microplastic_leakage"]);

    let has_targets = extract(doc, &["measures", "targets", "present"]).as_bool();
    let instrument_group = |category: &str, keys: &[&str]| {
        keys.iter()
            .any(|&key| mentioned(&["measures", category, key]))
    };
    let has_instruments = instrument_group("economic_instruments", &ECONOMIC_INSTRUMENTS)
        || instrument_group("regulatory_instruments", &REGULATORY_INSTRUMENTS)
        || instrument_group("soft_instruments", &SOFT_INSTRUMENTS);

    let values = [
        ep,
        ep && ep_timeframe,
        ep && !ep_timeframe,
        !ep,
        reduce,
        reduce && reduce_specified,
        reduce && !reduce_specified,
        !reduce,
        benefits,
        benefits,
        !benefits,
        health,
        health,
        !health,
        biodiversity,
        biodiversity,
        !biodiversity,
        true,
        false,
        !timeframe,
        timeframe,
        true,
        stringency.as_str() == "High",
        stringency.as_str() == "Low",
        stringency.as_str().is_empty(),
        lifecycle,
        lifecycle && lifecycle_full,
        !lifecycle,
        lifecycle && !lifecycle_full,
        has_other,
        contains("circular"),
        contains("climate"),
        contains("sound management"),
        has_other,
        !has_other,
        contains("sustainable production"),
        true,
        upstream,
        midstream,
        downstream,
        cross,
        has_instruments || has_targets,
        has_instruments,
        has_targets,
    ];

    COLUMN_ORDER
        .iter()
        .zip(values)
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionStats {
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Build the LLM-side coding table from a directory of extracted submission
/// JSON files. Unparseable files are skipped with a warning; zero usable
/// files is fatal.
pub fn extract_table(json_dir: &Path) -> Result<(DataTable, ExtractionStats)> {
    let mut paths: Vec<_> = fs::read_dir(json_dir)
        .with_context(|| format!("failed to read json directory: {}", json_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        bail!("no json files found in {}", json_dir.display());
    }

    let mut stats = ExtractionStats::default();
    let mut rows = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let doc: Value = match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(anyhow::Error::from))
        {
            Ok(doc) => doc,
            Err(err) => {
                warn!(file = %name, error = %err, "skipping unreadable submission file");
                stats.skipped.push(name);
                continue;
            }
        };

        let key = submission_key(&doc);
        rows.push(DocumentRecord::new(key, submission_indicators(&doc)));
        stats.processed.push(name);
    }

    if rows.is_empty() {
        bail!(
            "none of the {} json files in {} could be parsed",
            paths.len(),
            json_dir.display()
        );
    }

    info!(
        processed = stats.processed.len(),
        skipped = stats.skipped.len(),
        "extracted coding table from submissions"
    );

    let table = DataTable {
        columns: COLUMN_ORDER.iter().map(|name| name.to_string()).collect(),
        rows,
    };
    Ok((table, stats))
}
