//! Analysis Configuration - signal, detection and interpretation settings as TOML
//!
//! Every constant the pipeline uses is a field here. Each struct implements
//! `Default` with the values the analysis has always used, so running
//! without a config file gives the stock behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::detection::DEFAULT_THRESHOLD;
use crate::interpretation::{
    DEFAULT_CREST_FACTOR_MULTIPLIER, DEFAULT_KURTOSIS_MULTIPLIER, DEFAULT_RMS_MULTIPLIER,
};
use crate::processing::{
    DEFAULT_CUTOFF_HZ, DEFAULT_FILTER_ORDER, DEFAULT_SAMPLING_RATE_HZ, MAX_FILTER_ORDER,
};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "ROTOR_SENTINEL_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "rotor_sentinel.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an analysis run.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. `$ROTOR_SENTINEL_CONFIG` env var
/// 2. `./rotor_sentinel.toml`
/// 3. Built-in defaults
///
/// The value is passed explicitly into the pipeline, detector and
/// interpreter, so two machines can be analysed with different settings in
/// the same process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Filter and sampling settings
    #[serde(default)]
    pub signal: SignalConfig,

    /// Fault detector settings
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Defect classification multipliers
    #[serde(default)]
    pub interpretation: InterpretationConfig,

    /// Baseline directory
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order:
    /// 1. `$ROTOR_SENTINEL_CONFIG` environment variable
    /// 2. `./rotor_sentinel.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded analysis config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from {CONFIG_ENV_VAR}, falling back"
                        );
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        // 2. Check ./rotor_sentinel.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded analysis config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings (with a suggestion when one is
    /// close) and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all settings for internal consistency.
    ///
    /// Rules:
    /// - Sampling rate and cutoff must be finite and positive
    /// - Cutoff must be below Nyquist
    /// - Filter order must be 1..=10
    /// - Detection threshold and interpretation multipliers must be > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let s = &self.signal;
        if !s.sampling_rate_hz.is_finite() || s.sampling_rate_hz <= 0.0 {
            errors.push(format!(
                "signal.sampling_rate_hz must be > 0, got {}",
                s.sampling_rate_hz
            ));
        }
        if !s.cutoff_hz.is_finite() || s.cutoff_hz <= 0.0 {
            errors.push(format!("signal.cutoff_hz must be > 0, got {}", s.cutoff_hz));
        } else if s.sampling_rate_hz > 0.0 && s.cutoff_hz >= s.nyquist_hz() {
            errors.push(format!(
                "signal.cutoff_hz ({:.1}) must be below Nyquist ({:.1} Hz)",
                s.cutoff_hz,
                s.nyquist_hz()
            ));
        }
        if s.filter_order == 0 || s.filter_order > MAX_FILTER_ORDER {
            errors.push(format!(
                "signal.filter_order must be 1-{MAX_FILTER_ORDER}, got {}",
                s.filter_order
            ));
        }

        Self::check_positive(self.detection.threshold, "detection.threshold", &mut errors);

        let i = &self.interpretation;
        Self::check_positive(i.rms, "interpretation.rms", &mut errors);
        Self::check_positive(i.crest_factor, "interpretation.crest_factor", &mut errors);
        Self::check_positive(i.kurtosis, "interpretation.kurtosis", &mut errors);

        // Suspicious but legal values
        for w in super::validation::validate_ranges(self) {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, catch them explicitly
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} must be a finite number > 0, got {value}"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Signal
// ============================================================================

/// Sampling and low-pass filter settings shared by every channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Recorder sampling rate (Hz)
    pub sampling_rate_hz: f64,
    /// Low-pass cutoff (Hz), must be below Nyquist
    pub cutoff_hz: f64,
    /// Butterworth order
    pub filter_order: usize,
}

impl SignalConfig {
    pub fn nyquist_hz(&self) -> f64 {
        0.5 * self.sampling_rate_hz
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            filter_order: DEFAULT_FILTER_ORDER,
        }
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Fault detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Relative deviation |Δ| / baseline above which a feature is deviant
    pub threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

// ============================================================================
// Interpretation
// ============================================================================

/// Multipliers for the defect rules: a rule fires when
/// `current > baseline * multiplier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpretationConfig {
    /// RMS multiplier (20% increase)
    pub rms: f64,
    /// Crest factor multiplier
    pub crest_factor: f64,
    /// Kurtosis multiplier (50% increase)
    pub kurtosis: f64,
}

impl Default for InterpretationConfig {
    fn default() -> Self {
        Self {
            rms: DEFAULT_RMS_MULTIPLIER,
            crest_factor: DEFAULT_CREST_FACTOR_MULTIPLIER,
            kurtosis: DEFAULT_KURTOSIS_MULTIPLIER,
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Where machine baselines live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Flat directory holding `<machine>_no_fault.csv` files
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("machine_data"),
        }
    }
}
