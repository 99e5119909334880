//! Signal Pipeline Module
//!
//! Turns a raw [`Dataset`](crate::types::Dataset) into a
//! [`ProcessedDataset`](crate::types::ProcessedDataset): filtered samples,
//! spectrum and features for each requested channel.

mod processor;

pub use processor::{PipelineError, SignalPipeline};
