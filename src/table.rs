use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::IrrError;

/// Canonical name for the document-key column after loading. Source files may
/// call it `country`, leave it unnamed, or use pandas' `Unnamed: 0`.
pub const KEY_COLUMN: &str = "document";

/// One coded document: its key plus one boolean per indicator column.
/// Immutable after normalization.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub key: String,
    values: HashMap<String, bool>,
}

impl DocumentRecord {
    pub fn new(key: impl Into<String>, values: impl IntoIterator<Item = (String, bool)>) -> Self {
        Self {
            key: key.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Missing columns read as false (absence is a coded "not mentioned").
    pub fn value(&self, column: &str) -> bool {
        self.values.get(column).copied().unwrap_or(false)
    }

    fn remove_column(&mut self, column: &str) {
        self.values.remove(column);
    }
}

/// One rater's coding table: ordered indicator columns (key column excluded)
/// and one record per document.
#[derive(Debug, Clone)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<DocumentRecord>,
}

impl DataTable {
    /// Load a coding table from CSV or from the first worksheet of an
    /// XLSX/XLS workbook, chosen by file extension.
    pub fn load(path: &Path) -> Result<Self, IrrError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let (header, raw_rows) = match extension.as_str() {
            "xlsx" | "xls" | "ods" => read_workbook(path)?,
            _ => read_csv(path)?,
        };

        Self::from_raw(header, raw_rows, path)
    }

    fn from_raw(
        header: Vec<String>,
        raw_rows: Vec<Vec<String>>,
        path: &Path,
    ) -> Result<Self, IrrError> {
        if header.is_empty() {
            return Err(IrrError::input_load(path, "table has no header row"));
        }
        if raw_rows.is_empty() {
            return Err(IrrError::input_load(path, "table has no data rows"));
        }

        let key_index = resolve_key_index(&header);
        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != key_index)
            .map(|(_, name)| name.trim().to_string())
            .collect();
        if columns.is_empty() {
            return Err(IrrError::input_load(path, "table has no indicator columns"));
        }

        let mut rows = Vec::with_capacity(raw_rows.len());
        for raw_row in raw_rows {
            let key = raw_row
                .get(key_index)
                .map(|cell| cell.trim().to_string())
                .unwrap_or_default();
            if key.is_empty() {
                continue;
            }

            let values = header
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != key_index)
                .map(|(index, name)| {
                    let cell = raw_row.get(index).map(String::as_str).unwrap_or("");
                    (name.trim().to_string(), parse_cell_bool(cell))
                });
            rows.push(DocumentRecord::new(key, values));
        }

        if rows.is_empty() {
            return Err(IrrError::input_load(path, "table has no keyed data rows"));
        }

        debug!(
            path = %path.display(),
            rows = rows.len(),
            columns = columns.len(),
            "loaded coding table"
        );
        Ok(Self { columns, rows })
    }

    pub fn keys(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.key.clone()).collect()
    }

    pub fn column_set(&self) -> BTreeSet<String> {
        self.columns.iter().cloned().collect()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn drop_columns(&mut self, names: &[String]) {
        self.columns.retain(|column| !names.contains(column));
        for row in &mut self.rows {
            for name in names {
                row.remove_column(name);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), IrrError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| IrrError::input_load(path, err.to_string()))?;

    let header = reader
        .headers()
        .map_err(|err| IrrError::input_load(path, err.to_string()))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<String>>();

    let mut raw_rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| IrrError::input_load(path, err.to_string()))?;
        raw_rows.push(record.iter().map(str::to_string).collect());
    }

    Ok((header, raw_rows))
}

fn read_workbook(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), IrrError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|err| IrrError::input_load(path, err.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IrrError::input_load(path, "workbook has no worksheets"))?
        .map_err(|err| IrrError::input_load(path, err.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .map(|cells| cells.iter().map(cell_to_string).collect::<Vec<String>>())
        .unwrap_or_default();
    let raw_rows = rows
        .map(|cells| cells.iter().map(cell_to_string).collect())
        .collect();

    Ok((header, raw_rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Bool(value) => value.to_string(),
        other => other.to_string(),
    }
}

/// The key column is whichever header matches the canonical or source-side
/// naming; an unnamed or `Unnamed: 0` first column (NVivo exports routed
/// through pandas) also counts. Falls back to the first column.
fn resolve_key_index(header: &[String]) -> usize {
    header
        .iter()
        .position(|name| {
            let trimmed = name.trim();
            trimmed.eq_ignore_ascii_case(KEY_COLUMN)
                || trimmed.eq_ignore_ascii_case("country")
                || trimmed.is_empty()
                || trimmed == "Unnamed: 0"
        })
        .unwrap_or(0)
}

/// Coerce a raw cell to a boolean judgment. Recognizes booleans, yes/no, and
/// numerics (non-zero is true); empty or unrecognized cells read as false.
pub fn parse_cell_bool(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" => true,
        "false" | "no" | "n" => false,
        other => other.parse::<f64>().map(|value| value != 0.0).unwrap_or(false),
    }
}
