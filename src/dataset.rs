//! Loading and holding the raw clinical dataset.
//!
//! The dataset is read once at startup and is immutable afterwards. Cells
//! keep their raw typed form (`Num`, `Str`, or `Missing`) so the
//! conditioner can decide per column whether it is numeric or categorical,
//! the way a dataframe library would infer dtypes.
use std::fmt;
use std::path::Path;

use anyhow::Context;

use crate::error::LoadError;

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Str(String),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view: `Num` directly, `Str` via parse.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(v) => Some(*v),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
            Value::Missing => None,
        }
    }

    /// String form used for categorical-domain comparisons. Whole numbers
    /// render without a fractional part so `Num(2.0)` matches the declared
    /// domain value `"2"`.
    pub fn field_string(&self) -> String {
        match self {
            Value::Num(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", *v as i64),
            Value::Num(v) => format!("{}", v),
            Value::Str(s) => s.clone(),
            Value::Missing => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.field_string())
    }
}

/// The in-memory table: ordered column names plus rows of raw values.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// First `n` rows, for dataset previews.
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// All values of one column, in row order.
    pub fn column(&self, index: usize) -> Vec<Value> {
        self.rows.iter().map(|row| row[index].clone()).collect()
    }
}

fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => Value::Num(v),
        Err(_) => Value::Str(trimmed.to_string()),
    }
}

fn read_table(path: &Path) -> anyhow::Result<(Vec<String>, Vec<Vec<Value>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open dataset {}", path.display()))?;

    let headers = reader.headers().context("Failed to read header row")?.clone();
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        let mut row: Vec<Value> = record.iter().map(parse_cell).collect();
        // Ragged short rows pad out as missing values.
        row.resize(columns.len(), Value::Missing);
        rows.push(row);
    }

    Ok((columns, rows))
}

/// Read a CSV file with a header row into a [`Dataset`].
///
/// One-shot: no retries. Missing file, unreadable contents, and empty
/// tables all come back as typed [`LoadError`]s for the caller to turn
/// into a degraded state.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let (columns, rows) =
        read_table(path).map_err(|e| LoadError::Unavailable(format!("{:#}", e)))?;

    if rows.is_empty() {
        return Err(LoadError::Empty);
    }

    log::info!(
        "Loaded dataset {} ({} rows, {} columns)",
        path.display(),
        rows.len(),
        columns.len()
    );
    Ok(Dataset::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cell_types() {
        assert_eq!(parse_cell("63"), Value::Num(63.0));
        assert_eq!(parse_cell("2.3"), Value::Num(2.3));
        assert_eq!(parse_cell("abc"), Value::Str("abc".to_string()));
        assert_eq!(parse_cell(""), Value::Missing);
        assert_eq!(parse_cell("  "), Value::Missing);
    }

    #[test]
    fn field_string_renders_whole_numbers_plainly() {
        assert_eq!(Value::Num(2.0).field_string(), "2");
        assert_eq!(Value::Num(2.5).field_string(), "2.5");
        assert_eq!(Value::Str("x".to_string()).field_string(), "x");
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = load_dataset("/nonexistent/heart.csv").unwrap_err();
        assert!(matches!(err, LoadError::Unavailable(_)));
    }
}
