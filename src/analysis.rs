//! Machine analysis: baseline vs current recording in one call
//!
//! ```text
//! baseline ─► SignalPipeline ─┐
//!                             ├─► FaultDetector ─► FaultInterpreter (flagged only)
//! current  ─► SignalPipeline ─┘
//! ```
//!
//! The channels compared are the baseline's sensor columns. Each detector
//! entry is joined with its interpretation into a [`DiagnosedFault`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::detection::{DetectionError, FaultDetector};
use crate::interpretation::FaultInterpreter;
use crate::pipeline::{PipelineError, SignalPipeline};
use crate::storage::{BaselineStore, StoreError};
use crate::types::{Dataset, DefectCategory, DeviationSet, MonitoredFeature};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("machine '{0}' has no baseline, register a no-fault recording first")]
    UnknownMachine(String),

    #[error("baseline has no sensor channels")]
    NoSensorChannels,
}

/// A flagged sensor with its likely cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosedFault {
    pub sensor: String,
    /// Detector message naming the deviant features
    pub message: String,
    pub deviant: Vec<MonitoredFeature>,
    pub category: DefectCategory,
    /// Interpreter message
    pub interpretation: String,
    pub deviation: DeviationSet,
}

/// Result of one machine analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub machine: String,
    pub generated_at: DateTime<Utc>,
    pub threshold: f64,
    pub channels_analyzed: Vec<String>,
    pub faults: Vec<DiagnosedFault>,
}

impl AnalysisReport {
    pub fn is_healthy(&self) -> bool {
        self.faults.is_empty()
    }

    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Machine '{}': {} channel(s) analysed, threshold {:.0}%\n",
            self.machine,
            self.channels_analyzed.len(),
            self.threshold * 100.0
        );
        if self.is_healthy() {
            out.push_str("No fault detected\n");
            return out;
        }
        for fault in &self.faults {
            out.push_str(&format!("{}\n  {}\n", fault.message, fault.interpretation));
            for feature in MonitoredFeature::ALL {
                let d = fault.deviation.get(feature);
                out.push_str(&format!(
                    "    {:<12} current {:>10.4}  baseline {:>10.4}\n",
                    feature.to_string(),
                    d.current,
                    d.baseline
                ));
            }
        }
        out
    }
}

/// Runs the full comparison for one machine.
#[derive(Debug, Clone)]
pub struct MachineAnalyzer {
    pipeline: SignalPipeline,
    detector: FaultDetector,
    interpreter: FaultInterpreter,
}

impl MachineAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            pipeline: SignalPipeline::new(&config.signal)?,
            detector: FaultDetector::new(config.detection.threshold)?,
            interpreter: FaultInterpreter::new(config.interpretation.clone())?,
        })
    }

    /// Compare `current` against `baseline`.
    pub fn analyze(
        &self,
        machine: &str,
        baseline: &Dataset,
        current: &Dataset,
    ) -> Result<AnalysisReport, AnalysisError> {
        let channels = baseline.sensor_names();
        if channels.is_empty() {
            return Err(AnalysisError::NoSensorChannels);
        }

        let baseline_features = self.pipeline.process(baseline, &channels)?.feature_map();
        let current_features = self.pipeline.process(current, &channels)?.feature_map();

        let flagged = self
            .detector
            .detect(&current_features, &baseline_features, &channels)?;
        let interpreted =
            self.interpreter
                .interpret_flagged(&current_features, &baseline_features, &flagged)?;

        let faults: Vec<DiagnosedFault> = flagged
            .into_iter()
            .zip(interpreted)
            .map(|(entry, interpretation)| DiagnosedFault {
                sensor: entry.sensor,
                message: entry.message,
                deviant: entry.deviant,
                category: interpretation.category,
                interpretation: interpretation.message,
                deviation: entry.deviation,
            })
            .collect();

        if faults.is_empty() {
            info!(machine, channels = channels.len(), "No fault detected");
        } else {
            warn!(machine, faults = faults.len(), "Faults detected");
        }

        Ok(AnalysisReport {
            machine: machine.to_string(),
            generated_at: Utc::now(),
            threshold: self.detector.threshold(),
            channels_analyzed: channels,
            faults,
        })
    }

    /// Look up the machine's baseline in `store` and compare `current`.
    pub fn analyze_machine(
        &self,
        store: &BaselineStore,
        machine: &str,
        current: &Dataset,
    ) -> Result<AnalysisReport, AnalysisError> {
        let baseline = store
            .load_baseline(machine)?
            .ok_or_else(|| AnalysisError::UnknownMachine(machine.to_string()))?;
        self.analyze(machine, &baseline, current)
    }
}
