//! heartrisk: model training, selection, and inference for heart-disease
//! decision support.
//!
//! This crate loads a tabular clinical dataset, conditions it (imputation,
//! categorical-domain repair, one-hot encoding), trains a fixed slate of
//! classifiers on a seeded train/test split, selects the best performer by
//! held-out accuracy, and serves schema-safe single-record predictions
//! against that state for the rest of the process lifetime.
//!
//! The design favors small, testable modules behind typed errors: the
//! hosting application constructs one [`service::RiskService`] at startup
//! and shares it read-only with its request handlers.
pub mod conditioner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod service;
pub mod split;
pub mod trainer;
