//! Fault Detector - relative deviation of current features from baseline
//!
//! A monitored feature is deviant when
//!
//! ```text
//! |current − baseline| / baseline > threshold
//! ```
//!
//! The comparison is strict, so a change of exactly `threshold` is still
//! healthy. A zero baseline cannot be evaluated and never flags, and a
//! negative baseline (excess kurtosis below 0) gives a negative ratio that
//! never flags either. Peak-to-peak is extracted upstream but is not
//! compared.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{
    DeviationSet, FaultReportEntry, FeatureBundle, FeatureDeviation, FeatureMap, MonitoredFeature,
};

/// Default relative deviation threshold (15%)
pub const DEFAULT_THRESHOLD: f64 = 0.15;

/// Which of the two feature maps a lookup failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSide {
    Current,
    Baseline,
}

impl std::fmt::Display for FeatureSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Baseline => write!(f, "baseline"),
        }
    }
}

/// Errors shared by the detector and the interpreter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("no {side} features for sensor '{sensor}'")]
    MissingFeature { sensor: String, side: FeatureSide },

    #[error("invalid detection configuration: {0}")]
    Configuration(String),
}

/// Look up a sensor's bundle in both maps.
pub(crate) fn feature_pair<'a>(
    current: &'a FeatureMap,
    baseline: &'a FeatureMap,
    sensor: &str,
) -> Result<(&'a FeatureBundle, &'a FeatureBundle), DetectionError> {
    let missing = |side| DetectionError::MissingFeature {
        sensor: sensor.to_string(),
        side,
    };
    let cur = current.get(sensor).ok_or_else(|| missing(FeatureSide::Current))?;
    let base = baseline.get(sensor).ok_or_else(|| missing(FeatureSide::Baseline))?;
    Ok((cur, base))
}

/// Threshold-based comparison of two feature maps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultDetector {
    threshold: f64,
}

impl Default for FaultDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FaultDetector {
    /// # Errors
    /// [`DetectionError::Configuration`] unless `threshold` is finite and > 0.
    pub fn new(threshold: f64) -> Result<Self, DetectionError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(DetectionError::Configuration(format!(
                "threshold must be a finite number > 0, got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether a single (current, baseline) pair is deviant.
    pub fn is_deviant(&self, current: f64, baseline: f64) -> bool {
        FeatureDeviation::new(current, baseline)
            .relative_change()
            .is_some_and(|change| change > self.threshold)
    }

    /// Compare `current` against `baseline` for each channel.
    ///
    /// Only flagged channels appear in the result, in `channel_names`
    /// order. Each entry carries the pairs for all monitored features.
    pub fn detect<S: AsRef<str>>(
        &self,
        current: &FeatureMap,
        baseline: &FeatureMap,
        channel_names: &[S],
    ) -> Result<Vec<FaultReportEntry>, DetectionError> {
        let mut entries = Vec::new();

        for sensor in channel_names {
            let sensor = sensor.as_ref();
            let (cur, base) = feature_pair(current, baseline, sensor)?;

            let deviant: Vec<MonitoredFeature> = MonitoredFeature::ALL
                .into_iter()
                .filter(|&f| self.is_deviant(cur.get(f), base.get(f)))
                .collect();

            if deviant.is_empty() {
                debug!(sensor, "Within threshold");
                continue;
            }

            let labels: Vec<&str> = deviant.iter().map(|f| f.anomaly_label()).collect();
            let message = format!("Fault detected in {sensor}: {}", labels.join(", "));
            debug!(sensor, deviant = ?deviant, "Sensor flagged");

            entries.push(FaultReportEntry {
                sensor: sensor.to_string(),
                message,
                deviant,
                deviation: DeviationSet::between(cur, base),
            });
        }

        info!(
            evaluated = channel_names.len(),
            flagged = entries.len(),
            threshold = self.threshold,
            "Fault detection complete"
        );
        Ok(entries)
    }
}
