//! Fault Interpreter - maps feature growth to a likely defect
//!
//! Rules are checked in a fixed priority order and the first match wins:
//!
//! | # | Condition                                  | Category                         |
//! |---|--------------------------------------------|----------------------------------|
//! | 1 | kurtosis > baseline kurtosis × kurtosis    | Misalignment / Gear Tooth Crack  |
//! | 2 | crest > baseline crest × crest_factor      | Eccentricity or Local Defect     |
//! | 3 | rms > baseline rms × rms                   | Unbalance or Looseness           |
//! | 4 | otherwise                                  | Defect Unknown                   |
//!
//! The rules are one-directional and multiplicative. They are independent
//! of the detector's symmetric relative-deviation test, so a sensor the
//! detector flagged for a *drop* in RMS is reported as "Defect Unknown".
//!
//! A multiplier is a relative increase over `|baseline|`. For a negative
//! baseline (excess kurtosis of a sinusoid is −1.5) the limit is
//! `baseline × (2 − multiplier)`, so an unchanged signal never matches.

use tracing::debug;

use crate::config::InterpretationConfig;
use crate::detection::{feature_pair, DetectionError};
use crate::types::{
    DefectCategory, DeviationSet, FaultReportEntry, FeatureBundle, FeatureMap, InterpretedEntry,
};

/// Default RMS multiplier (20% increase)
pub const DEFAULT_RMS_MULTIPLIER: f64 = 1.2;

/// Default crest factor multiplier
pub const DEFAULT_CREST_FACTOR_MULTIPLIER: f64 = 1.2;

/// Default kurtosis multiplier (50% increase)
pub const DEFAULT_KURTOSIS_MULTIPLIER: f64 = 1.5;

/// Multipliers used by the rule table.
pub type InterpretationThresholds = InterpretationConfig;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultInterpreter {
    thresholds: InterpretationThresholds,
}

impl FaultInterpreter {
    /// # Errors
    /// [`DetectionError::Configuration`] when a multiplier is not a finite
    /// number > 0.
    pub fn new(thresholds: InterpretationThresholds) -> Result<Self, DetectionError> {
        for (name, value) in [
            ("rms", thresholds.rms),
            ("crest_factor", thresholds.crest_factor),
            ("kurtosis", thresholds.kurtosis),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DetectionError::Configuration(format!(
                    "{name} multiplier must be a finite number > 0, got {value}"
                )));
            }
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &InterpretationThresholds {
        &self.thresholds
    }

    /// Apply the rule table to one pair of bundles.
    pub fn classify(&self, current: &FeatureBundle, baseline: &FeatureBundle) -> DefectCategory {
        let t = &self.thresholds;
        if exceeds(current.kurtosis, baseline.kurtosis, t.kurtosis) {
            DefectCategory::MisalignmentOrGearToothCrack
        } else if exceeds(current.crest_factor, baseline.crest_factor, t.crest_factor) {
            DefectCategory::EccentricityOrLocalDefect
        } else if exceeds(current.rms, baseline.rms, t.rms) {
            DefectCategory::UnbalanceOrLooseness
        } else {
            DefectCategory::Unknown
        }
    }

    /// Classify every sensor in `sensors`, in order.
    pub fn interpret<S: AsRef<str>>(
        &self,
        current: &FeatureMap,
        baseline: &FeatureMap,
        sensors: &[S],
    ) -> Result<Vec<InterpretedEntry>, DetectionError> {
        sensors
            .iter()
            .map(|sensor| {
                let sensor = sensor.as_ref();
                let (cur, base) = feature_pair(current, baseline, sensor)?;
                let category = self.classify(cur, base);
                debug!(sensor, %category, "Sensor interpreted");

                Ok(InterpretedEntry {
                    sensor: sensor.to_string(),
                    category,
                    message: interpretation_message(category),
                    deviation: DeviationSet::between(cur, base),
                })
            })
            .collect()
    }

    /// Classify only the sensors the detector flagged.
    pub fn interpret_flagged(
        &self,
        current: &FeatureMap,
        baseline: &FeatureMap,
        flagged: &[FaultReportEntry],
    ) -> Result<Vec<InterpretedEntry>, DetectionError> {
        let sensors: Vec<&str> = flagged.iter().map(|e| e.sensor.as_str()).collect();
        self.interpret(current, baseline, &sensors)
    }
}

/// `current` grew past `baseline` by more than `multiplier − 1` of its magnitude.
fn exceeds(current: f64, baseline: f64, multiplier: f64) -> bool {
    let limit = if baseline >= 0.0 {
        baseline * multiplier
    } else {
        baseline * (2.0 - multiplier)
    };
    current > limit
}

fn interpretation_message(category: DefectCategory) -> String {
    if category.is_classified() {
        format!("Fault Detected – Type: {category}")
    } else {
        format!("Fault Detected – {category}")
    }
}
