//! Feature conditioning: imputation, categorical-domain repair, target
//! separation, and one-hot encoding.
//!
//! The conditioner is the only stage allowed to rewrite cell values. Its
//! output fixes the feature schema for the lifetime of the process.
use ndarray::{Array1, Array2};

use crate::dataset::{Dataset, Value};
use crate::error::SchemaError;
use crate::schema::{ColumnSource, DomainTable, EncodedColumn, FeatureSchema};

/// Conditioned training data plus the schema it was encoded under.
#[derive(Debug, Clone)]
pub struct Conditioned {
    pub features: Array2<f64>,
    pub target: Array1<f64>,
    pub schema: FeatureSchema,
}

/// Condition a loaded dataset into numeric training form.
pub fn condition(
    dataset: &Dataset,
    target_column: &str,
    domains: &DomainTable,
) -> Result<Conditioned, SchemaError> {
    let target_idx = dataset
        .column_index(target_column)
        .ok_or_else(|| SchemaError::TargetMissing(target_column.to_string()))?;

    let mut rows: Vec<Vec<Value>> = dataset.rows().to_vec();

    impute_missing(dataset.columns(), &mut rows);
    repair_domains(dataset.columns(), &mut rows, domains);

    let target = extract_target(&rows, target_idx)?;

    let feature_indices: Vec<usize> = (0..dataset.n_cols()).filter(|&i| i != target_idx).collect();
    let original_columns: Vec<String> = feature_indices
        .iter()
        .map(|&i| dataset.columns()[i].clone())
        .collect();

    let encoded = build_encoded_columns(dataset.columns(), &rows, &feature_indices);
    let features = encode_features(&rows, &encoded, dataset.columns());

    log::info!(
        "Conditioned {} rows: {} original feature columns, {} encoded",
        rows.len(),
        original_columns.len(),
        encoded.len()
    );

    Ok(Conditioned {
        features,
        target,
        schema: FeatureSchema::new(original_columns, encoded),
    })
}

/// A column is numeric when every non-missing cell parsed as a number.
fn column_is_numeric(rows: &[Vec<Value>], idx: usize) -> bool {
    rows.iter()
        .all(|row| matches!(row[idx], Value::Num(_) | Value::Missing))
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent non-missing value; ties break to the value first seen in
/// column order.
fn mode(rows: &[Vec<Value>], idx: usize) -> Option<Value> {
    let mut counts: Vec<(Value, usize)> = Vec::new();
    for row in rows {
        let value = &row[idx];
        if value.is_missing() {
            continue;
        }
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.clone(), 1)),
        }
    }
    // Strictly-greater comparison so ties keep the first-seen value.
    let mut best: Option<(Value, usize)> = None;
    for (value, count) in counts {
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

fn impute_missing(columns: &[String], rows: &mut [Vec<Value>]) {
    for (idx, name) in columns.iter().enumerate() {
        let n_missing = rows.iter().filter(|row| row[idx].is_missing()).count();
        if n_missing == 0 {
            continue;
        }

        let fill = if column_is_numeric(rows, idx) {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|row| row[idx].as_num())
                .collect();
            match median(values) {
                Some(m) => Value::Num(m),
                None => {
                    log::warn!("Column '{}' has no observed values; filling with 0", name);
                    Value::Num(0.0)
                }
            }
        } else {
            match mode(rows, idx) {
                Some(m) => m,
                None => Value::Str(String::new()),
            }
        };

        for row in rows.iter_mut() {
            if row[idx].is_missing() {
                row[idx] = fill.clone();
            }
        }
        log::debug!("Imputed {} missing values in column '{}'", n_missing, name);
    }
}

/// Replace out-of-domain values with the column's fixed fallback (the
/// first declared valid value). A column that needed any repair is
/// rewritten in string form, so it one-hot encodes downstream; a fully
/// in-domain numeric column is left untouched.
fn repair_domains(columns: &[String], rows: &mut [Vec<Value>], domains: &DomainTable) {
    for (column, valid) in domains.iter() {
        let Some(idx) = columns.iter().position(|c| c == column) else {
            continue;
        };
        let in_domain = |v: &Value| valid.iter().any(|ok| *ok == v.field_string());

        if rows.iter().all(|row| in_domain(&row[idx])) {
            continue;
        }

        let fallback = domains
            .fallback(column)
            .unwrap_or_default()
            .to_string();
        let mut repaired = 0usize;
        for row in rows.iter_mut() {
            let s = row[idx].field_string();
            row[idx] = if valid.iter().any(|ok| *ok == s) {
                Value::Str(s)
            } else {
                repaired += 1;
                Value::Str(fallback.clone())
            };
        }
        log::warn!(
            "Column '{}': replaced {} out-of-domain values with '{}'",
            column,
            repaired,
            fallback
        );
    }
}

fn extract_target(rows: &[Vec<Value>], target_idx: usize) -> Result<Array1<f64>, SchemaError> {
    let mut target = Vec::with_capacity(rows.len());
    for (row_idx, row) in rows.iter().enumerate() {
        let value = &row[target_idx];
        match value.as_num() {
            Some(v) if v == 0.0 || v == 1.0 => target.push(v),
            _ => {
                return Err(SchemaError::TargetNotBinary {
                    row: row_idx,
                    value: value.field_string(),
                })
            }
        }
    }
    Ok(Array1::from_vec(target))
}

/// Expansion plan: numeric columns pass through, categorical columns turn
/// into one indicator per category, categories in first-seen row order.
/// Expanded columns replace their source in place.
fn build_encoded_columns(
    columns: &[String],
    rows: &[Vec<Value>],
    feature_indices: &[usize],
) -> Vec<EncodedColumn> {
    let mut encoded = Vec::new();
    for &idx in feature_indices {
        let name = &columns[idx];
        if column_is_numeric(rows, idx) {
            encoded.push(EncodedColumn {
                name: name.clone(),
                source: ColumnSource::Numeric(name.clone()),
            });
        } else {
            let mut categories: Vec<String> = Vec::new();
            for row in rows {
                let s = row[idx].field_string();
                if !categories.contains(&s) {
                    categories.push(s);
                }
            }
            for category in categories {
                encoded.push(EncodedColumn {
                    name: format!("{}_{}", name, category),
                    source: ColumnSource::Indicator {
                        column: name.clone(),
                        category,
                    },
                });
            }
        }
    }
    encoded
}

fn encode_features(
    rows: &[Vec<Value>],
    encoded: &[EncodedColumn],
    columns: &[String],
) -> Array2<f64> {
    let col_index = |name: &str| {
        columns
            .iter()
            .position(|c| c == name)
            .expect("encoded column references a dataset column")
    };

    let mut data = Vec::with_capacity(rows.len() * encoded.len());
    for row in rows {
        for col in encoded {
            let value = match &col.source {
                ColumnSource::Numeric(column) => {
                    row[col_index(column)].as_num().unwrap_or(0.0)
                }
                ColumnSource::Indicator { column, category } => {
                    if row[col_index(column)].field_string() == *category {
                        1.0
                    } else {
                        0.0
                    }
                }
            };
            data.push(value);
        }
    }

    Array2::from_shape_vec((rows.len(), encoded.len()), data)
        .expect("row-major encode matches declared shape")
}
