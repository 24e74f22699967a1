//! End-to-end service tests: startup, degraded states, and the predict
//! boundary contract.
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use heartrisk::config::PipelineConfig;
use heartrisk::error::PredictError;
use heartrisk::service::{RiskService, Status, DEFAULT_THRESHOLD};

const HEADER: &str = "Age,Sex,CP,Trestbps,Chol,Fbs,Restecg,Thalach,Exang,Oldpeak,Slope,CA,Thal,Target";

/// Deterministic synthetic dataset: the target is separable on Thalach, so
/// every slate member can learn it.
fn synthetic_rows(n: usize) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for i in 0..n {
        let age = 40 + (i * 7) % 40;
        let sex = i % 2;
        let cp = i % 4;
        let trestbps = 120 + (i * 3) % 40;
        let chol = 200 + (i * 11) % 100;
        let fbs = (i / 2) % 2;
        let restecg = i % 3;
        let thalach = 120 + (i * 13) % 60;
        let exang = (i / 3) % 2;
        let oldpeak = (i % 30) as f64 / 10.0;
        let slope = i % 3;
        let ca = i % 5;
        let thal = i % 4;
        let target = u8::from(thalach >= 150);
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{:.1},{},{},{},{}\n",
            age, sex, cp, trestbps, chol, fbs, restecg, thalach, exang, oldpeak, slope, ca, thal,
            target
        ));
    }
    out
}

fn write_dataset(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("heartrisk_it_{}", name));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("heart.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn ready_service(name: &str) -> RiskService {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = PipelineConfig {
        dataset_path: write_dataset(name, &synthetic_rows(120)),
        ..PipelineConfig::default()
    };
    let service = RiskService::initialize(config);
    assert_eq!(service.status(), Status::Ready);
    service
}

fn record(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn example_record() -> BTreeMap<String, String> {
    record(&[
        ("Age", "63"),
        ("Sex", "1"),
        ("CP", "3"),
        ("Trestbps", "145"),
        ("Chol", "233"),
        ("Fbs", "1"),
        ("Restecg", "0"),
        ("Thalach", "150"),
        ("Exang", "0"),
        ("Oldpeak", "2.3"),
        ("Slope", "0"),
        ("CA", "0"),
        ("Thal", "1"),
    ])
}

#[test]
fn startup_trains_three_models_and_predicts() {
    let service = ready_service("startup");

    let registry = service.registry().unwrap();
    assert_eq!(registry.entries().len(), 3);
    assert!(registry.entries().iter().all(|e| e.is_fitted()));
    assert!(registry.best().accuracy() > 50.0);

    let prediction = service.predict(&example_record(), DEFAULT_THRESHOLD).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
    assert_eq!(
        prediction.predicted_class,
        u8::from(prediction.probability >= DEFAULT_THRESHOLD)
    );
}

#[test]
fn out_of_domain_categorical_is_rejected_by_name() {
    let service = ready_service("reject_cp");

    let mut fields = example_record();
    fields.insert("CP".to_string(), "9".to_string());

    let err = service.predict(&fields, DEFAULT_THRESHOLD).unwrap_err();
    match err {
        PredictError::Invalid { field, .. } => assert_eq!(field, "CP"),
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn non_numeric_value_for_numeric_field_is_rejected() {
    let service = ready_service("reject_age");

    let mut fields = example_record();
    fields.insert("Age".to_string(), "sixty".to_string());

    let err = service.predict(&fields, DEFAULT_THRESHOLD).unwrap_err();
    match err {
        PredictError::Invalid { field, .. } => assert_eq!(field, "Age"),
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn unknown_fields_are_ignored() {
    let service = ready_service("unknown_fields");

    let mut fields = example_record();
    fields.insert("Bogus".to_string(), "whatever".to_string());

    let with_extra = service.predict(&fields, DEFAULT_THRESHOLD).unwrap();
    let without = service.predict(&example_record(), DEFAULT_THRESHOLD).unwrap();
    assert_eq!(with_extra, without);
}

#[test]
fn sparse_records_still_project_into_the_schema() {
    let service = ready_service("sparse");

    // Only two of thirteen expected fields supplied; the projection
    // zero-fills the rest instead of failing.
    let fields = record(&[("Age", "63"), ("Thalach", "150")]);
    let prediction = service.predict(&fields, DEFAULT_THRESHOLD).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
}

#[test]
fn threshold_is_inclusive_and_monotone() {
    let service = ready_service("threshold");
    let fields = example_record();

    let base = service.predict(&fields, DEFAULT_THRESHOLD).unwrap();
    let mut last_class = 1u8;
    for threshold in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let p = service.predict(&fields, threshold).unwrap();
        assert_eq!(p.probability, base.probability);
        assert!(
            p.predicted_class <= last_class,
            "class rose from {} to {} at threshold {}",
            last_class,
            p.predicted_class,
            threshold
        );
        last_class = p.predicted_class;
    }

    // Exactly at the probability, the threshold is inclusive.
    let at = service.predict(&fields, base.probability).unwrap();
    assert_eq!(at.predicted_class, 1);
}

#[test]
fn two_initializations_agree() {
    let a = ready_service("determinism");
    let b = ready_service("determinism_again");

    let ra = a.registry().unwrap();
    let rb = b.registry().unwrap();
    assert_eq!(ra.best_name(), rb.best_name());

    let names_a: Vec<_> = ra.accuracies();
    let names_b: Vec<_> = rb.accuracies();
    assert_eq!(names_a, names_b);

    let pa = a.predict(&example_record(), DEFAULT_THRESHOLD).unwrap();
    let pb = b.predict(&example_record(), DEFAULT_THRESHOLD).unwrap();
    assert_eq!(pa, pb);
}

#[test]
fn missing_dataset_degrades_and_predicts_not_ready() {
    let config = PipelineConfig {
        dataset_path: PathBuf::from("/nonexistent/heart.csv"),
        ..PipelineConfig::default()
    };
    let service = RiskService::initialize(config);

    match service.status() {
        Status::Degraded(reason) => {
            assert!(reason.to_string().contains("dataset unavailable"));
        }
        Status::Ready => panic!("service should be degraded"),
    }
    assert!(service.registry().is_none());

    let err = service.predict(&example_record(), DEFAULT_THRESHOLD).unwrap_err();
    assert!(matches!(err, PredictError::NotReady));
}

#[test]
fn missing_target_column_degrades_but_keeps_the_dataset() {
    let contents = synthetic_rows(30)
        .lines()
        .map(|line| {
            // Drop the final (Target) column from every line.
            let cut = line.rfind(',').unwrap();
            format!("{}\n", &line[..cut])
        })
        .collect::<String>();
    let config = PipelineConfig {
        dataset_path: write_dataset("no_target", &contents),
        ..PipelineConfig::default()
    };
    let service = RiskService::initialize(config);

    match service.status() {
        Status::Degraded(reason) => assert!(reason.to_string().contains("schema mismatch")),
        Status::Ready => panic!("service should be degraded"),
    }
    // The preview collaborator can still show the table.
    assert!(service.dataset().is_some());
    assert!(matches!(
        service.predict(&example_record(), DEFAULT_THRESHOLD),
        Err(PredictError::NotReady)
    ));
}

#[test]
fn empty_dataset_degrades() {
    let config = PipelineConfig {
        dataset_path: write_dataset("empty", &format!("{}\n", HEADER)),
        ..PipelineConfig::default()
    };
    let service = RiskService::initialize(config);
    assert!(matches!(service.status(), Status::Degraded(_)));
}

#[test]
fn repaired_domain_column_round_trips_through_one_hot() {
    // One Thal value outside its domain forces the column into string
    // form, so it one-hot encodes; prediction must still line up with the
    // trained schema.
    let mut contents = synthetic_rows(119);
    contents.push_str("63,1,3,145,233,1,0,150,0,2.3,0,0,7,1\n");

    let config = PipelineConfig {
        dataset_path: write_dataset("repair", &contents),
        ..PipelineConfig::default()
    };
    let service = RiskService::initialize(config);
    assert_eq!(service.status(), Status::Ready);

    let schema = service.schema().unwrap();
    let encoded = schema.encoded_columns();
    assert!(encoded.iter().any(|c| c.starts_with("Thal_")));
    assert!(encoded.iter().all(|c| c != "Thal_7"));

    let prediction = service.predict(&example_record(), DEFAULT_THRESHOLD).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
}

#[test]
fn concurrent_reads_share_the_service() {
    let service = ready_service("concurrent");
    let fields = example_record();
    let expected = service.predict(&fields, DEFAULT_THRESHOLD).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = &service;
                let fields = &fields;
                scope.spawn(move || service.predict(fields, DEFAULT_THRESHOLD).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn best_model_importances_align_with_the_schema() {
    let service = ready_service("importances");

    // The logistic and forest variants expose importances; gradient
    // boosting does not. Whichever wins, an exposed vector must line up
    // with the encoded columns.
    if let Some(importances) = service.best_feature_importances() {
        let schema = service.schema().unwrap();
        assert_eq!(importances.len(), schema.n_encoded());
        assert!(importances.iter().all(|(_, v)| *v >= 0.0));
    }
}
