//! Signal processing module - conditioning, spectra and features for vibration analysis
//!
//! Every function here is pure: same input and configuration, same output,
//! bit for bit. The pipeline relies on that to compare runs across sessions.

mod features;
mod filter;
mod spectrogram;
mod spectrum;

pub use features::{excess_kurtosis, features};
pub use filter::{filter, LowPassFilter, SecondOrderSection};
pub use spectrogram::{spectrogram, Spectrogram, SpectrogramParams};
pub use spectrum::{find_dominant_frequencies, spectrum, Spectrum, SpectrumAnalyzer};

use thiserror::Error;

/// Default sampling rate of the vibration recorders (Hz)
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 1000.0;

/// Default low-pass cutoff (Hz)
pub const DEFAULT_CUTOFF_HZ: f64 = 50.0;

/// Default Butterworth order
pub const DEFAULT_FILTER_ORDER: usize = 4;

/// Highest Butterworth order accepted by the filter designer
pub const MAX_FILTER_ORDER: usize = 10;

/// Errors in signal processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Empty input: signal has no samples")]
    EmptyInput,

    #[error("Non-finite sample at index {index}")]
    NonFinite { index: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Reject empty input and the first NaN or infinite sample.
///
/// A single NaN spreads through the recursive filter to every output
/// sample and every feature, so gaps must be caught before processing.
pub(crate) fn ensure_finite(samples: &[f64]) -> Result<(), ProcessingError> {
    if samples.is_empty() {
        return Err(ProcessingError::EmptyInput);
    }
    match samples.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(ProcessingError::NonFinite { index }),
        None => Ok(()),
    }
}
