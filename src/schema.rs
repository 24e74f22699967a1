//! Categorical domains and the fixed feature schema.
//!
//! The schema is the correctness contract between training and inference:
//! every prediction input is projected into exactly the encoded column
//! order computed at training time — missing columns zero-fill, unknown
//! fields drop, order is enforced.
use std::collections::BTreeMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::dataset::Value;

/// Ordered table of categorical columns and their valid string-encoded
/// values. Order matters twice: the first value of a column is the
/// deterministic repair fallback, and request validation reports against
/// the declared set.
#[derive(Debug, Clone)]
pub struct DomainTable {
    entries: Vec<(String, Vec<String>)>,
}

impl DomainTable {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// The fixed domains of the heart-disease dataset.
    pub fn heart_disease() -> Self {
        let domain = |name: &str, values: &[&str]| {
            (
                name.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        };
        Self::new(vec![
            domain("Sex", &["0", "1"]),
            domain("CP", &["0", "1", "2", "3"]),
            domain("Fbs", &["0", "1"]),
            domain("Restecg", &["0", "1", "2"]),
            domain("Exang", &["0", "1"]),
            domain("Slope", &["0", "1", "2"]),
            domain("CA", &["0", "1", "2", "3", "4"]),
            domain("Thal", &["0", "1", "2", "3"]),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn valid_values(&self, column: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, values)| values.as_slice())
    }

    /// Deterministic repair value: the first declared valid value.
    pub fn fallback(&self, column: &str) -> Option<&str> {
        self.valid_values(column)
            .and_then(|values| values.first())
            .map(|v| v.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.valid_values(column).is_some()
    }
}

/// The raw input fields the prediction form is expected to supply, and
/// that the trained schema must cover for the service to come up ready.
pub fn expected_fields() -> [&'static str; 13] {
    [
        "Age", "Sex", "CP", "Trestbps", "Chol", "Fbs", "Restecg", "Thalach", "Exang", "Oldpeak",
        "Slope", "CA", "Thal",
    ]
}

/// Where an encoded column draws its value from at projection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnSource {
    /// A numeric passthrough of the named original column.
    Numeric(String),
    /// A one-hot indicator: 1 when the named column equals `category`.
    Indicator { column: String, category: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedColumn {
    pub name: String,
    pub source: ColumnSource,
}

/// The fixed feature schema computed once from the training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    original_columns: Vec<String>,
    encoded: Vec<EncodedColumn>,
}

impl FeatureSchema {
    pub fn new(original_columns: Vec<String>, encoded: Vec<EncodedColumn>) -> Self {
        Self {
            original_columns,
            encoded,
        }
    }

    /// Feature columns as they appear in the raw dataset, target excluded.
    pub fn original_columns(&self) -> &[String] {
        &self.original_columns
    }

    /// Encoded column names, in the exact order every model and the scaler
    /// operate on.
    pub fn encoded_columns(&self) -> Vec<String> {
        self.encoded.iter().map(|c| c.name.clone()).collect()
    }

    pub fn n_encoded(&self) -> usize {
        self.encoded.len()
    }

    pub fn has_original(&self, column: &str) -> bool {
        self.original_columns.iter().any(|c| c == column)
    }

    /// Project a raw record into the encoded vector shape.
    ///
    /// Fields absent from the record contribute 0 to their encoded
    /// columns; fields not in the schema never appear. The result always
    /// has exactly `n_encoded()` entries in schema order.
    pub fn project(&self, record: &BTreeMap<String, Value>) -> Array1<f64> {
        let values = self
            .encoded
            .iter()
            .map(|col| match &col.source {
                ColumnSource::Numeric(column) => record
                    .get(column)
                    .and_then(|v| v.as_num())
                    .unwrap_or(0.0),
                ColumnSource::Indicator { column, category } => match record.get(column) {
                    Some(value) if value.field_string() == *category => 1.0,
                    _ => 0.0,
                },
            })
            .collect::<Vec<f64>>();
        Array1::from_vec(values)
    }
}
