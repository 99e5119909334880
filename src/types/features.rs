//! Per-channel features and processed channel records

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Feature bundles keyed by channel name.
pub type FeatureMap = HashMap<String, FeatureBundle>;

/// Scalar condition indicators of one conditioned channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBundle {
    /// Root-mean-square amplitude (always >= 0)
    pub rms: f64,
    /// max − min
    pub peak_to_peak: f64,
    /// max|x| / RMS, 0 when RMS is 0
    pub crest_factor: f64,
    /// Excess (Fisher) kurtosis, may be negative
    pub kurtosis: f64,
}

impl FeatureBundle {
    /// Value of one of the monitored features.
    pub fn get(&self, feature: MonitoredFeature) -> f64 {
        match feature {
            MonitoredFeature::Rms => self.rms,
            MonitoredFeature::CrestFactor => self.crest_factor,
            MonitoredFeature::Kurtosis => self.kurtosis,
        }
    }
}

/// Features compared against the baseline.
///
/// Peak-to-peak is extracted but deliberately not monitored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonitoredFeature {
    Rms,
    CrestFactor,
    Kurtosis,
}

impl MonitoredFeature {
    /// Evaluation order used in detector messages.
    pub const ALL: [Self; 3] = [Self::Rms, Self::CrestFactor, Self::Kurtosis];

    /// Wording used when this feature is deviant.
    pub fn anomaly_label(self) -> &'static str {
        match self {
            Self::Rms => "RMS deviation",
            Self::CrestFactor => "Crest Factor anomaly",
            Self::Kurtosis => "Kurtosis irregularity",
        }
    }
}

impl std::fmt::Display for MonitoredFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rms => write!(f, "RMS"),
            Self::CrestFactor => write!(f, "CrestFactor"),
            Self::Kurtosis => write!(f, "Kurtosis"),
        }
    }
}

/// A (current, baseline) pair for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureDeviation {
    pub current: f64,
    pub baseline: f64,
}

impl FeatureDeviation {
    pub fn new(current: f64, baseline: f64) -> Self {
        Self { current, baseline }
    }

    /// |current − baseline| / baseline, `None` when the baseline is 0.
    ///
    /// A negative baseline yields a negative ratio, which never exceeds a
    /// positive threshold.
    pub fn relative_change(&self) -> Option<f64> {
        if self.baseline == 0.0 {
            None
        } else {
            Some((self.current - self.baseline).abs() / self.baseline)
        }
    }
}

/// (current, baseline) pairs for all monitored features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationSet {
    pub rms: FeatureDeviation,
    pub crest_factor: FeatureDeviation,
    pub kurtosis: FeatureDeviation,
}

impl DeviationSet {
    pub fn between(current: &FeatureBundle, baseline: &FeatureBundle) -> Self {
        Self {
            rms: FeatureDeviation::new(current.rms, baseline.rms),
            crest_factor: FeatureDeviation::new(current.crest_factor, baseline.crest_factor),
            kurtosis: FeatureDeviation::new(current.kurtosis, baseline.kurtosis),
        }
    }

    pub fn get(&self, feature: MonitoredFeature) -> FeatureDeviation {
        match feature {
            MonitoredFeature::Rms => self.rms,
            MonitoredFeature::CrestFactor => self.crest_factor,
            MonitoredFeature::Kurtosis => self.kurtosis,
        }
    }
}

/// Output of the signal pipeline for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedChannel {
    pub name: String,
    /// Zero-phase low-passed samples, same length as the raw channel
    pub filtered: Vec<f64>,
    /// One-sided frequency bins (Hz), floor(N/2) long
    pub frequencies: Vec<f64>,
    /// |X_k| per bin
    pub magnitudes: Vec<f64>,
    pub features: FeatureBundle,
}

/// Processed channels in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDataset {
    channels: Vec<ProcessedChannel>,
}

impl ProcessedDataset {
    pub fn new(channels: Vec<ProcessedChannel>) -> Self {
        Self { channels }
    }

    pub fn get(&self, name: &str) -> Option<&ProcessedChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn channels(&self) -> &[ProcessedChannel] {
        &self.channels
    }

    pub fn names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name.clone()).collect()
    }

    /// Feature bundles keyed by channel name.
    pub fn feature_map(&self) -> FeatureMap {
        self.channels
            .iter()
            .map(|c| (c.name.clone(), c.features))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl IntoIterator for ProcessedDataset {
    type Item = ProcessedChannel;
    type IntoIter = std::vec::IntoIter<ProcessedChannel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_change() {
        assert_eq!(FeatureDeviation::new(11.5, 10.0).relative_change(), Some(0.15));
        assert_eq!(FeatureDeviation::new(5.0, 0.0).relative_change(), None);
        // Sub-Gaussian kurtosis baselines are negative
        assert_eq!(FeatureDeviation::new(-0.5, -1.0).relative_change(), Some(-0.5));
    }

    #[test]
    fn test_deviation_set_pairs_features() {
        let current = FeatureBundle {
            rms: 2.0,
            peak_to_peak: 9.0,
            crest_factor: 3.0,
            kurtosis: 4.0,
        };
        let baseline = FeatureBundle {
            rms: 1.0,
            peak_to_peak: 1.0,
            crest_factor: 1.5,
            kurtosis: 0.5,
        };
        let set = DeviationSet::between(&current, &baseline);

        assert_eq!(set.get(MonitoredFeature::Rms), FeatureDeviation::new(2.0, 1.0));
        assert_eq!(set.get(MonitoredFeature::CrestFactor), FeatureDeviation::new(3.0, 1.5));
        assert_eq!(set.get(MonitoredFeature::Kurtosis), FeatureDeviation::new(4.0, 0.5));
    }
}
