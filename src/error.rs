use std::error::Error;
use std::fmt;

/// Failure to read the dataset source at startup.
#[derive(Debug)]
pub enum LoadError {
    /// The file is missing, unreadable, or not parseable as CSV.
    Unavailable(String),
    /// The file parsed to a table with no data rows.
    Empty,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Unavailable(reason) => write!(f, "Dataset unavailable: {}", reason),
            LoadError::Empty => write!(f, "Dataset contains no rows"),
        }
    }
}

impl Error for LoadError {}

/// Failure to condition the dataset into a trainable form.
#[derive(Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// The designated target column is absent.
    TargetMissing(String),
    /// A target value is neither 0 nor 1.
    TargetNotBinary { row: usize, value: String },
    /// The conditioned feature columns do not cover the expected fields.
    MissingFields(Vec<String>),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaError::TargetMissing(column) => {
                write!(f, "Target column '{}' not found in dataset", column)
            }
            SchemaError::TargetNotBinary { row, value } => {
                write!(f, "Target value '{}' at row {} is not 0 or 1", value, row)
            }
            SchemaError::MissingFields(fields) => {
                write!(f, "Dataset is missing expected columns: {}", fields.join(", "))
            }
        }
    }
}

impl Error for SchemaError {}

/// Per-model fit or predict failure. The trainer isolates these so one
/// model cannot abort the rest of the slate.
#[derive(Debug)]
pub enum ModelError {
    NotFitted,
    Shape { expected: String, actual: String },
    Fit(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::NotFitted => write!(f, "Model has not been fitted"),
            ModelError::Shape { expected, actual } => {
                write!(f, "Shape mismatch: expected {}, got {}", expected, actual)
            }
            ModelError::Fit(reason) => write!(f, "Model fit failed: {}", reason),
        }
    }
}

impl Error for ModelError {}

/// Whole-slate training failure.
#[derive(Debug)]
pub enum TrainError {
    /// No slate member could be fitted at all.
    NoModels,
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrainError::NoModels => write!(f, "No model in the slate could be trained"),
        }
    }
}

impl Error for TrainError {}

/// Request-scoped prediction failure. Only `Invalid` carries a message
/// meant for the end user; the field name identifies the offending input.
#[derive(Debug)]
pub enum PredictError {
    /// Training never completed; the service is permanently degraded.
    NotReady,
    /// A request field failed validation.
    Invalid { field: String, reason: String },
    /// An unexpected failure inside reconstruction, scaling, or the model.
    Internal(String),
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PredictError::NotReady => write!(f, "Prediction unavailable: model not trained"),
            PredictError::Invalid { field, reason } => {
                write!(f, "Invalid value for {}: {}", field, reason)
            }
            PredictError::Internal(reason) => write!(f, "Prediction failed: {}", reason),
        }
    }
}

impl Error for PredictError {}
