//! Rotor Sentinel: Vibration Fault Analysis
//!
//! Compares a machine's current vibration recording against its no-fault
//! baseline and reports which sensors changed and why.
//!
//! ## Architecture
//!
//! - **Processing**: zero-phase Butterworth low-pass, one-sided spectrum,
//!   scalar features (RMS, peak-to-peak, crest factor, kurtosis), spectrogram
//! - **Signal Pipeline**: filter → spectrum → features per channel
//! - **Fault Detector**: relative deviation of each feature from baseline
//! - **Fault Interpreter**: prioritized rules mapping feature growth to a
//!   likely defect
//! - **Analyzer**: runs the above for one machine and builds a report
//! - **Acquisition / Storage**: CSV recordings and per-machine baselines

pub mod acquisition;
pub mod analysis;
pub mod config;
pub mod detection;
pub mod interpretation;
pub mod pipeline;
pub mod processing;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::AnalysisConfig;

// Re-export the pipeline surface
pub use analysis::{AnalysisError, AnalysisReport, DiagnosedFault, MachineAnalyzer};
pub use detection::{DetectionError, FaultDetector};
pub use interpretation::{FaultInterpreter, InterpretationThresholds};
pub use pipeline::{PipelineError, SignalPipeline};

// Re-export commonly used types
pub use types::{
    Dataset, DefectCategory, FaultReportEntry, FeatureBundle, FeatureMap, InterpretedEntry,
    MonitoredFeature, ProcessedChannel, ProcessedDataset, SensorChannel,
};

// Re-export I/O
pub use acquisition::{load_csv, parse_csv, LoadError};
pub use storage::{BaselineStore, StoreError};
