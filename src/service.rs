//! The process-wide decision-support service.
//!
//! `RiskService::initialize` runs the whole pipeline once, synchronously:
//! load, condition, split/scale, train, select. Whatever it produces is
//! read-only for the rest of the process; `predict` takes `&self` and is
//! safe to call from concurrent request handlers. A failed stage leaves
//! the service permanently degraded rather than panicking the host.
use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::conditioner;
use crate::config::PipelineConfig;
use crate::dataset::{load_dataset, Dataset, Value};
use crate::error::{PredictError, SchemaError};
use crate::models::factory;
use crate::schema::{expected_fields, DomainTable, FeatureSchema};
use crate::split::{train_test_split, StandardScaler};
use crate::trainer::{train_models, ModelRegistry};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Outcome of a single prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Class-1 probability in [0, 1].
    pub probability: f64,
    /// 1 iff `probability >= threshold`.
    pub predicted_class: u8,
}

/// Why initialization could not complete. A degraded service stays up but
/// answers every prediction with [`PredictError::NotReady`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedReason {
    DatasetUnavailable(String),
    SchemaMismatch(String),
    TrainingFailed(String),
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DegradedReason::DatasetUnavailable(reason) => {
                write!(f, "dataset unavailable: {}", reason)
            }
            DegradedReason::SchemaMismatch(reason) => write!(f, "schema mismatch: {}", reason),
            DegradedReason::TrainingFailed(reason) => write!(f, "training failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Degraded(DegradedReason),
}

struct TrainedState {
    schema: FeatureSchema,
    scaler: StandardScaler,
    registry: ModelRegistry,
    x_test_scaled: Array2<f64>,
    y_test: Array1<f64>,
}

pub struct RiskService {
    domains: DomainTable,
    dataset: Option<Dataset>,
    state: Option<TrainedState>,
    degraded: Option<DegradedReason>,
}

impl RiskService {
    /// Run the full training pipeline. Never fails outright: every stage
    /// error is captured as a [`DegradedReason`].
    pub fn initialize(config: PipelineConfig) -> Self {
        let domains = DomainTable::heart_disease();

        let dataset = match load_dataset(&config.dataset_path) {
            Ok(dataset) => dataset,
            Err(err) => {
                log::warn!("Startup degraded: {}", err);
                return Self::degraded(
                    domains,
                    None,
                    DegradedReason::DatasetUnavailable(err.to_string()),
                );
            }
        };

        let conditioned =
            match conditioner::condition(&dataset, &config.target_column, &domains) {
                Ok(conditioned) => conditioned,
                Err(err) => {
                    log::warn!("Startup degraded: {}", err);
                    return Self::degraded(
                        domains,
                        Some(dataset),
                        DegradedReason::SchemaMismatch(err.to_string()),
                    );
                }
            };

        let missing: Vec<String> = expected_fields()
            .iter()
            .filter(|field| !conditioned.schema.has_original(field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            let err = SchemaError::MissingFields(missing);
            log::warn!("Startup degraded: {}", err);
            return Self::degraded(
                domains,
                Some(dataset),
                DegradedReason::SchemaMismatch(err.to_string()),
            );
        }

        let split = train_test_split(
            &conditioned.features,
            &conditioned.target,
            config.test_fraction,
            config.split_seed,
        );
        let scaler = StandardScaler::fit(&split.x_train);
        let x_train_scaled = scaler.transform(&split.x_train);
        let x_test_scaled = scaler.transform(&split.x_test);
        log::info!(
            "Split {} train / {} test rows over {} encoded columns",
            split.x_train.nrows(),
            split.x_test.nrows(),
            conditioned.schema.n_encoded()
        );

        let slate = factory::build_slate(&config.models);
        let registry = match train_models(
            slate,
            &x_train_scaled,
            &split.y_train,
            &x_test_scaled,
            &split.y_test,
        ) {
            Ok(registry) => registry,
            Err(err) => {
                log::warn!("Startup degraded: {}", err);
                return Self::degraded(
                    domains,
                    Some(dataset),
                    DegradedReason::TrainingFailed(err.to_string()),
                );
            }
        };

        RiskService {
            domains,
            dataset: Some(dataset),
            state: Some(TrainedState {
                schema: conditioned.schema,
                scaler,
                registry,
                x_test_scaled,
                y_test: split.y_test,
            }),
            degraded: None,
        }
    }

    fn degraded(domains: DomainTable, dataset: Option<Dataset>, reason: DegradedReason) -> Self {
        RiskService {
            domains,
            dataset,
            state: None,
            degraded: Some(reason),
        }
    }

    pub fn status(&self) -> Status {
        match &self.degraded {
            Some(reason) => Status::Degraded(reason.clone()),
            None => Status::Ready,
        }
    }

    /// The loaded dataset, when loading succeeded (available even if a
    /// later stage degraded the service).
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn registry(&self) -> Option<&ModelRegistry> {
        self.state.as_ref().map(|s| &s.registry)
    }

    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.state.as_ref().map(|s| &s.schema)
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.state.as_ref().map(|s| &s.scaler)
    }

    /// Scaled test features and their labels, for evaluation views.
    pub fn test_partition(&self) -> Option<(&Array2<f64>, &Array1<f64>)> {
        self.state.as_ref().map(|s| (&s.x_test_scaled, &s.y_test))
    }

    /// Encoded-column importances of the best model, when it exposes them.
    pub fn best_feature_importances(&self) -> Option<Vec<(String, f64)>> {
        let state = self.state.as_ref()?;
        let importances = state.registry.best().classifier().feature_importances()?;
        Some(
            state
                .schema
                .encoded_columns()
                .into_iter()
                .zip(importances)
                .collect(),
        )
    }

    /// Predict heart-disease risk for one raw record.
    ///
    /// Fields outside the trained schema are ignored; schema fields are
    /// validated (categorical domain membership, numeric parseability)
    /// before any reconstruction happens. The record is then projected
    /// into the trained encoded schema, scaled with the fitted scaler,
    /// and scored by the best model. The threshold is inclusive.
    pub fn predict(
        &self,
        fields: &BTreeMap<String, String>,
        threshold: f64,
    ) -> Result<Prediction, PredictError> {
        let state = self.state.as_ref().ok_or(PredictError::NotReady)?;

        let record = self.validate(fields, &state.schema)?;
        let encoded = state.schema.project(&record);
        let scaled = state.scaler.transform_row(&encoded);

        let n = scaled.len();
        let row: Array2<f64> = scaled
            .into_shape((1, n))
            .map_err(|e| PredictError::Internal(e.to_string()))?;

        let proba = state
            .registry
            .best()
            .classifier()
            .predict_proba(&row)
            .map_err(|e| PredictError::Internal(e.to_string()))?;
        let probability = proba
            .get(0)
            .copied()
            .ok_or_else(|| PredictError::Internal("empty prediction".to_string()))?
            .clamp(0.0, 1.0);

        Ok(Prediction {
            probability,
            predicted_class: if probability >= threshold { 1 } else { 0 },
        })
    }

    fn validate(
        &self,
        fields: &BTreeMap<String, String>,
        schema: &FeatureSchema,
    ) -> Result<BTreeMap<String, Value>, PredictError> {
        let mut record = BTreeMap::new();
        for (field, raw) in fields {
            if !schema.has_original(field) {
                continue;
            }
            let raw = raw.trim();
            if let Some(valid) = self.domains.valid_values(field) {
                if !valid.iter().any(|v| v == raw) {
                    return Err(PredictError::Invalid {
                        field: field.clone(),
                        reason: "select a valid option".to_string(),
                    });
                }
                record.insert(field.clone(), Value::Str(raw.to_string()));
            } else {
                let parsed = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| PredictError::Invalid {
                        field: field.clone(),
                        reason: "enter a valid number".to_string(),
                    })?;
                record.insert(field.clone(), Value::Num(parsed));
            }
        }
        Ok(record)
    }
}
