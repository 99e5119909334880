//! Shared data structures for vibration fault analysis
//!
//! This module defines the core types flowing through the pipeline:
//! - Input: SensorChannel, Dataset (raw samples per sensor)
//! - Processing: FeatureBundle, ProcessedChannel, ProcessedDataset
//! - Detection: MonitoredFeature, FeatureDeviation, FaultReportEntry
//! - Interpretation: DefectCategory, InterpretedEntry

mod dataset;
mod features;
mod report;

pub use dataset::*;
pub use features::*;
pub use report::*;
