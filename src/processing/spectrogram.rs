//! Short-time power spectrum (STFT view)
//!
//! Segments the signal with a periodic Tukey window, removes each segment's
//! mean and reports a one-sided power spectral density per segment. The
//! defaults (256-sample segments, 1/8 overlap, α = 0.25) match the classic
//! `spectrogram` call the dashboard was built around.

use std::f64::consts::PI;

use num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use super::ProcessingError;

/// Segmentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramParams {
    /// Samples per segment; clipped to the signal length
    pub segment_len: usize,
    /// Overlap between segments; `None` means `segment_len / 8`
    pub overlap: Option<usize>,
    /// Tukey taper fraction (0 = rectangular, 1 = Hann)
    pub tukey_alpha: f64,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            segment_len: 256,
            overlap: None,
            tukey_alpha: 0.25,
        }
    }
}

/// Power spectral density per time segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrogram {
    /// Segment centre times (s)
    pub times: Vec<f64>,
    /// Frequency bins (Hz), DC to Nyquist inclusive
    pub frequencies: Vec<f64>,
    /// `power[t][f]` in units²/Hz
    pub power: Vec<Vec<f64>>,
}

/// Compute the spectrogram of a signal.
pub fn spectrogram(
    samples: &[f64],
    sampling_rate_hz: f64,
    params: SpectrogramParams,
) -> Result<Spectrogram, ProcessingError> {
    if samples.is_empty() {
        return Err(ProcessingError::EmptyInput);
    }
    if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
        return Err(ProcessingError::Configuration(format!(
            "sampling rate must be positive, got {sampling_rate_hz}"
        )));
    }
    if !(0.0..=1.0).contains(&params.tukey_alpha) {
        return Err(ProcessingError::Configuration(format!(
            "tukey alpha {} outside [0, 1]",
            params.tukey_alpha
        )));
    }

    let segment_len = params.segment_len.clamp(1, samples.len());
    let overlap = params.overlap.unwrap_or(segment_len / 8);
    if overlap >= segment_len {
        return Err(ProcessingError::Configuration(format!(
            "overlap {overlap} must be smaller than segment length {segment_len}"
        )));
    }
    let step = segment_len - overlap;
    let n_segments = (samples.len() - overlap) / step;

    let window = tukey_periodic(segment_len, params.tukey_alpha);
    let window_energy: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (sampling_rate_hz * window_energy);

    let n_bins = segment_len / 2 + 1;
    let fft = FftPlanner::new().plan_fft_forward(segment_len);

    let frequencies = (0..n_bins)
        .map(|k| k as f64 * sampling_rate_hz / segment_len as f64)
        .collect();

    let mut times = Vec::with_capacity(n_segments);
    let mut power = Vec::with_capacity(n_segments);

    for s in 0..n_segments {
        let start = s * step;
        let segment = &samples[start..start + segment_len];
        let mean = segment.iter().sum::<f64>() / segment_len as f64;

        let mut buffer: Vec<Complex<f64>> = segment
            .iter()
            .zip(window.iter())
            .map(|(&x, &w)| Complex::new((x - mean) * w, 0.0))
            .collect();
        fft.process(&mut buffer);

        let row: Vec<f64> = buffer
            .iter()
            .take(n_bins)
            .enumerate()
            .map(|(k, c)| {
                let nyquist = segment_len % 2 == 0 && k == segment_len / 2;
                let one_sided = if k == 0 || nyquist { 1.0 } else { 2.0 };
                c.norm_sqr() * scale * one_sided
            })
            .collect();

        times.push((start as f64 + segment_len as f64 / 2.0) / sampling_rate_hz);
        power.push(row);
    }

    Ok(Spectrogram {
        times,
        frequencies,
        power,
    })
}

/// Periodic Tukey window of length `len` (symmetric window of `len + 1`
/// with the last point dropped).
fn tukey_periodic(len: usize, alpha: f64) -> Vec<f64> {
    let m = len + 1;
    if alpha <= 0.0 || m < 2 {
        return vec![1.0; len];
    }

    let span = alpha * (m - 1) as f64;
    let width = (span / 2.0).floor() as usize;

    (0..len)
        .map(|n| {
            let x = n as f64;
            if n <= width {
                0.5 * (1.0 + (PI * (-1.0 + 2.0 * x / span)).cos())
            } else if n >= m - width - 1 {
                0.5 * (1.0 + (PI * (-2.0 / alpha + 1.0 + 2.0 * x / span)).cos())
            } else {
                1.0
            }
        })
        .collect()
}
