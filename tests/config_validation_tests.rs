//! Config Validation Tests
//!
//! Typo detection (unknown keys with suggestions), hard range errors and
//! file loading, exercised independently from the analysis pipeline.

use rotor_sentinel::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use rotor_sentinel::config::{AnalysisConfig, ConfigError};
use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_threshold_warns_with_suggestion() {
    let toml_str = r#"
[detection]
treshold = 0.2
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "detection.treshold");
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("detection.threshold")
    );
}

#[test]
fn misspelled_section_is_reported() {
    let warnings = validate_unknown_keys(
        r#"
[interpretaton]
rms = 1.3
"#,
    );
    assert!(warnings.iter().any(|w| w.field == "interpretaton"));
    assert!(warnings.iter().any(|w| w.field == "interpretaton.rms"));
}

#[test]
fn typo_still_loads_with_defaults() {
    let config = AnalysisConfig::from_toml_str(
        r#"
[signal]
cutof_hz = 80.0
"#,
    )
    .expect("unknown keys must not fail the load");
    assert_eq!(config, AnalysisConfig::default());
}

#[test]
fn every_default_key_is_known() {
    let text = AnalysisConfig::default().to_toml().expect("serialize");
    assert!(validate_unknown_keys(&text).is_empty());
}

#[test]
fn suggestion_needs_a_close_match() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("signal.filter_ordr", &known).as_deref(),
        Some("signal.filter_order")
    );
    assert!(suggest_correction("totally.unrelated.key", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn cutoff_above_nyquist_fails_to_load() {
    let result = AnalysisConfig::from_toml_str(
        r#"
[signal]
sampling_rate_hz = 200.0
cutoff_hz = 150.0
"#,
    );
    match result {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("Nyquist"));
        }
        other => panic!("Expected validation error, got {other:?}"),
    }
}

#[test]
fn filter_order_out_of_range_fails() {
    let mut config = AnalysisConfig::default();
    config.signal.filter_order = 11;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation(_))
    ));
    config.signal.filter_order = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn validation_collects_every_error() {
    let mut config = AnalysisConfig::default();
    config.signal.sampling_rate_hz = -1.0;
    config.detection.threshold = -0.5;
    config.interpretation.kurtosis = 0.0;

    let Err(ConfigError::Validation(errors)) = config.validate() else {
        panic!("Expected validation error");
    };
    assert_eq!(errors.len(), 3, "errors: {errors:?}");
    let rendered = ConfigError::Validation(errors).to_string();
    assert!(rendered.contains("detection.threshold"));
}

#[test]
fn suspicious_values_only_warn() {
    let mut config = AnalysisConfig::default();
    config.interpretation.rms = 0.9;
    assert!(config.validate().is_ok());
    assert_eq!(validate_ranges(&config).len(), 1);
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_reads_all_sections() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"
[signal]
sampling_rate_hz = 2000.0
cutoff_hz = 200.0
filter_order = 2

[detection]
threshold = 0.1

[interpretation]
rms = 1.3
crest_factor = 1.25
kurtosis = 2.0

[storage]
data_dir = "/srv/baselines"
"#
    )
    .expect("write config");

    let config = AnalysisConfig::load_from_file(file.path()).expect("valid config");
    assert!((config.signal.sampling_rate_hz - 2000.0).abs() < f64::EPSILON);
    assert_eq!(config.signal.filter_order, 2);
    assert!((config.detection.threshold - 0.1).abs() < f64::EPSILON);
    assert!((config.interpretation.kurtosis - 2.0).abs() < f64::EPSILON);
    assert_eq!(
        config.storage.data_dir,
        std::path::PathBuf::from("/srv/baselines")
    );
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let result = AnalysisConfig::load_from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(..))));
}

#[test]
fn malformed_toml_is_parse_error_naming_the_file() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "[signal\ncutoff_hz = ").expect("write config");

    match AnalysisConfig::load_from_file(file.path()) {
        Err(e @ ConfigError::Parse(..)) => {
            assert!(e.to_string().contains(&file.path().display().to_string()));
        }
        other => panic!("Expected parse error, got {other:?}"),
    }
}
