//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility checks.
//!
//! The raw TOML is first parsed into a `toml::Value` and its key tree is
//! compared against the known field names, so a typo such as `cutof_hz`
//! is reported instead of silently falling back to the default. Warnings
//! never fail a load; hard range errors live in `AnalysisConfig::validate`.

use std::collections::HashSet;

use super::AnalysisConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of `AnalysisConfig`.
///
/// Kept by hand; a new field in analysis_config.rs must be listed here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    [
        // [signal]
        "signal",
        "signal.sampling_rate_hz",
        "signal.cutoff_hz",
        "signal.filter_order",
        // [detection]
        "detection",
        "detection.threshold",
        // [interpretation]
        "interpretation",
        "interpretation.rms",
        "interpretation.crest_factor",
        "interpretation.kurtosis",
        // [storage]
        "storage",
        "storage.data_dir",
    ]
    .into_iter()
    .collect()
}

/// Recursively collect dotted key paths from a TOML value.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
            keys.push(path);
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3, ties broken alphabetically.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|&(dist, _)| dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation
// ============================================================================

/// Warnings for every key in `raw_toml` that `AnalysisConfig` does not know.
///
/// A document that does not parse yields no warnings; serde reports the
/// syntax error afterwards.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    let mut found = walk_toml_keys(&value, "");
    found.sort();

    found
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Plausibility Checks
// ============================================================================

/// Legal but suspicious settings.
pub fn validate_ranges(config: &AnalysisConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let threshold = config.detection.threshold;
    if threshold >= 1.0 {
        warnings.push(ValidationWarning {
            field: "detection.threshold".to_string(),
            message: format!(
                "detection.threshold = {threshold:.2} only flags features that more than double"
            ),
            suggestion: None,
        });
    }

    let i = &config.interpretation;
    for (field, value) in [
        ("interpretation.rms", i.rms),
        ("interpretation.crest_factor", i.crest_factor),
        ("interpretation.kurtosis", i.kurtosis),
    ] {
        if value > 0.0 && value < 1.0 {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!(
                    "{field} = {value:.2} is below 1.0, the rule fires on unchanged signals"
                ),
                suggestion: None,
            });
        }
    }

    let s = &config.signal;
    if s.filter_order > 8 {
        warnings.push(ValidationWarning {
            field: "signal.filter_order".to_string(),
            message: format!(
                "signal.filter_order = {} gives long edge transients on short recordings",
                s.filter_order
            ),
            suggestion: None,
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("cutoff_hz", "cutoff_hz"), 0);
        assert_eq!(levenshtein("cutof_hz", "cutoff_hz"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [signal]
            cutoff_hz = 40.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"signal".to_string()));
        assert!(keys.contains(&"signal.cutoff_hz".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys(
            r#"
[signal]
cutof_hz = 40.0
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "signal.cutof_hz");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("signal.cutoff_hz"));
        assert!(warnings[0].to_string().contains("did you mean 'signal.cutoff_hz'"));
    }

    #[test]
    fn test_valid_keys_produce_zero_warnings() {
        let warnings = validate_unknown_keys(
            r#"
[signal]
sampling_rate_hz = 2000.0
filter_order = 2

[interpretation]
kurtosis = 1.8

[storage]
data_dir = "/var/lib/baselines"
"#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_garbage_key_has_no_suggestion() {
        let warnings = validate_unknown_keys("completely_unrelated_garbage_key_xyz = 1");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].suggestion.is_none());
    }

    #[test]
    fn test_defaults_are_plausible() {
        assert!(validate_ranges(&AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_low_multiplier_warns() {
        let mut config = AnalysisConfig::default();
        config.interpretation.crest_factor = 0.8;
        config.detection.threshold = 1.5;
        let warnings = validate_ranges(&config);
        assert!(warnings.iter().any(|w| w.field == "interpretation.crest_factor"));
        assert!(warnings.iter().any(|w| w.field == "detection.threshold"));
    }
}
