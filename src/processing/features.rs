//! Scalar condition indicators of a conditioned signal

use statrs::statistics::Statistics;

use super::{ensure_finite, ProcessingError};
use crate::types::FeatureBundle;

/// Reduce a signal to RMS, peak-to-peak, crest factor and excess kurtosis.
///
/// Crest factor is 0 when RMS is 0, so an all-zero channel yields finite
/// features instead of NaN/Inf. NaN or infinite samples are rejected.
pub fn features(samples: &[f64]) -> Result<FeatureBundle, ProcessingError> {
    ensure_finite(samples)?;

    let rms = Statistics::quadratic_mean(samples);
    let peak_to_peak = Statistics::max(samples) - Statistics::min(samples);
    let crest_factor = if rms == 0.0 {
        0.0
    } else {
        Statistics::abs_max(samples) / rms
    };

    Ok(FeatureBundle {
        rms,
        peak_to_peak,
        crest_factor,
        kurtosis: excess_kurtosis(samples),
    })
}

/// Biased excess kurtosis (Fisher): m4 / m2² − 3, so a normal distribution
/// scores 0. A constant signal (m2 == 0) scores 0.
pub fn excess_kurtosis(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let n = samples.len() as f64;
    let mean = Statistics::mean(samples);
    let (m2, m4) = samples.iter().fold((0.0, 0.0), |(m2, m4), &x| {
        let d2 = (x - mean) * (x - mean);
        (m2 + d2, m4 + d2 * d2)
    });
    let (m2, m4) = (m2 / n, m4 / n);

    if m2 == 0.0 {
        return 0.0;
    }
    m4 / (m2 * m2) - 3.0
}
