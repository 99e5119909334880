//! Per-channel signal conditioning
//!
//! Every requested channel goes through the same three stages:
//!
//! ```text
//! raw samples ─► zero-phase low-pass ─► one-sided spectrum
//!                                   └─► RMS / P2P / crest / kurtosis
//! ```
//!
//! The filter is designed once at construction and reused for every
//! channel; nothing is cached between calls, so processing the same
//! dataset twice gives bit-identical output.

use thiserror::Error;
use tracing::{debug, info};

use crate::config::SignalConfig;
use crate::processing::{features, spectrum, LowPassFilter, ProcessingError};
use crate::types::{Dataset, ProcessedChannel, ProcessedDataset};

/// Errors raised while processing a dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("channel '{0}' not found in dataset")]
    MissingChannel(String),

    #[error("processing channel '{name}' failed: {source}")]
    Channel {
        name: String,
        #[source]
        source: ProcessingError,
    },

    #[error("invalid signal configuration: {0}")]
    Configuration(#[from] ProcessingError),
}

/// Filter → spectrum → features, applied channel by channel.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    filter: LowPassFilter,
    sampling_rate_hz: f64,
}

impl SignalPipeline {
    /// Build a pipeline from explicit signal settings.
    pub fn new(config: &SignalConfig) -> Result<Self, PipelineError> {
        let filter = LowPassFilter::butterworth(
            config.filter_order,
            config.cutoff_hz,
            config.sampling_rate_hz,
        )?;
        Ok(Self {
            filter,
            sampling_rate_hz: config.sampling_rate_hz,
        })
    }

    /// Process the named channels, in the order given.
    ///
    /// Fails on the first missing or unprocessable channel; no partial
    /// result is returned.
    pub fn process<S: AsRef<str>>(
        &self,
        dataset: &Dataset,
        channel_names: &[S],
    ) -> Result<ProcessedDataset, PipelineError> {
        let mut processed = Vec::with_capacity(channel_names.len());

        for name in channel_names {
            let name = name.as_ref();
            let samples = dataset
                .samples(name)
                .ok_or_else(|| PipelineError::MissingChannel(name.to_string()))?;

            let channel = self
                .process_channel(name, samples)
                .map_err(|source| PipelineError::Channel {
                    name: name.to_string(),
                    source,
                })?;

            debug!(
                channel = name,
                samples = samples.len(),
                rms = channel.features.rms,
                crest_factor = channel.features.crest_factor,
                kurtosis = channel.features.kurtosis,
                "Channel processed"
            );
            processed.push(channel);
        }

        info!(channels = processed.len(), "Dataset processed");
        Ok(ProcessedDataset::new(processed))
    }

    fn process_channel(
        &self,
        name: &str,
        samples: &[f64],
    ) -> Result<ProcessedChannel, ProcessingError> {
        let filtered = self.filter.apply(samples)?;
        let (frequencies, magnitudes) = spectrum(&filtered, self.sampling_rate_hz)?.into_parts();
        let features = features(&filtered)?;

        Ok(ProcessedChannel {
            name: name.to_string(),
            filtered,
            frequencies,
            magnitudes,
            features,
        })
    }

    pub fn filter(&self) -> &LowPassFilter {
        &self.filter
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq_hz: f64, amplitude: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / 1000.0).sin())
            .collect()
    }

    fn pipeline() -> SignalPipeline {
        SignalPipeline::new(&SignalConfig::default()).expect("default config is valid")
    }

    #[test]
    fn test_process_preserves_order_and_lengths() {
        let dataset = Dataset::new()
            .with_channel("sensor1", sine(10.0, 1.0, 1000))
            .with_channel("sensor2", sine(20.0, 2.0, 999));

        let out = pipeline()
            .process(&dataset, &["sensor2", "sensor1"])
            .expect("processing failed");

        assert_eq!(out.names(), vec!["sensor2", "sensor1"]);
        let s2 = out.get("sensor2").expect("sensor2 present");
        assert_eq!(s2.filtered.len(), 999);
        assert_eq!(s2.frequencies.len(), 499);
        assert_eq!(s2.magnitudes.len(), 499);
    }

    #[test]
    fn test_process_is_deterministic() {
        let dataset = Dataset::new().with_channel("sensor1", sine(30.0, 1.0, 500));
        let p = pipeline();
        let a = p.process(&dataset, &["sensor1"]).expect("first run");
        let b = p.process(&dataset, &["sensor1"]).expect("second run");
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_channel_fails_whole_call() {
        let dataset = Dataset::new().with_channel("sensor1", sine(10.0, 1.0, 100));
        let err = pipeline()
            .process(&dataset, &["sensor1", "sensor9"])
            .expect_err("missing channel must fail");
        assert_eq!(err, PipelineError::MissingChannel("sensor9".to_string()));
    }

    #[test]
    fn test_empty_channel_reports_its_name() {
        let dataset = Dataset::new().with_channel("sensor1", Vec::new());
        let err = pipeline()
            .process(&dataset, &["sensor1"])
            .expect_err("empty channel must fail");
        assert_eq!(
            err,
            PipelineError::Channel {
                name: "sensor1".to_string(),
                source: ProcessingError::EmptyInput,
            }
        );
    }

    #[test]
    fn test_gap_in_channel_fails_instead_of_nan_features() {
        let mut samples = sine(50.0, 1.0, 1000);
        samples[500] = f64::NAN;
        let dataset = Dataset::new().with_channel("sensor1", samples);

        let err = pipeline()
            .process(&dataset, &["sensor1"])
            .expect_err("NaN sample must fail");
        assert_eq!(
            err,
            PipelineError::Channel {
                name: "sensor1".to_string(),
                source: ProcessingError::NonFinite { index: 500 },
            }
        );
    }

    #[test]
    fn test_zero_channel_has_zero_crest_factor() {
        let dataset = Dataset::new().with_channel("sensor1", vec![0.0; 256]);
        let out = pipeline().process(&dataset, &["sensor1"]).expect("processing failed");
        let f = out.get("sensor1").expect("present").features;
        assert_eq!(f.rms, 0.0);
        assert_eq!(f.crest_factor, 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SignalConfig {
            cutoff_hz: 600.0,
            ..SignalConfig::default()
        };
        assert!(matches!(
            SignalPipeline::new(&config),
            Err(PipelineError::Configuration(ProcessingError::Configuration(_)))
        ));
    }
}
