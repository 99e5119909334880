//! One-sided magnitude spectrum using rustfft
//!
//! The transform runs over the full input length (no zero padding) and keeps
//! the first `floor(N/2)` bins. Magnitudes are raw `|X_k|`; callers apply any
//! normalization or dB scaling themselves.
//!
//! # Example
//!
//! ```ignore
//! let spec = spectrum(&filtered, 1000.0)?;
//! let (peak_hz, peak_mag) = spec.peak().unwrap_or_default();
//! ```

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use super::ProcessingError;

/// One-sided magnitude spectrum of a real signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Frequency bins (Hz), bin k = k * fs / N
    pub frequencies: Vec<f64>,
    /// |X_k| at each bin
    pub magnitudes: Vec<f64>,
    /// Sample rate used
    pub sampling_rate_hz: f64,
}

impl Spectrum {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Frequency and magnitude of the largest bin.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.frequencies
            .iter()
            .zip(self.magnitudes.iter())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(&f, &m)| (f, m))
    }

    /// Split into the `(frequencies, magnitudes)` pair.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.frequencies, self.magnitudes)
    }
}

// ============================================================================
// Standalone Spectrum Function
// ============================================================================

/// Compute the one-sided magnitude spectrum of time-domain samples.
///
/// # Arguments
/// * `samples` - Time-domain samples
/// * `sampling_rate_hz` - Sampling rate in Hz
///
/// # Errors
/// [`ProcessingError::EmptyInput`] for an empty signal,
/// [`ProcessingError::Configuration`] for a non-positive sampling rate.
pub fn spectrum(samples: &[f64], sampling_rate_hz: f64) -> Result<Spectrum, ProcessingError> {
    if samples.is_empty() {
        return Err(ProcessingError::EmptyInput);
    }
    SpectrumAnalyzer::new(samples.len(), sampling_rate_hz)?.compute(samples)
}

// ============================================================================
// Spectrum Analyzer (Pre-planned for repeated use)
// ============================================================================

/// Spectrum analyzer with a pre-planned transform for one signal length.
///
/// Use this when computing many spectra of the same length.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    size: usize,
    sampling_rate_hz: f64,
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("size", &self.size)
            .field("sampling_rate_hz", &self.sampling_rate_hz)
            .finish_non_exhaustive()
    }
}

impl SpectrumAnalyzer {
    /// Plan a forward transform of exactly `size` points.
    pub fn new(size: usize, sampling_rate_hz: f64) -> Result<Self, ProcessingError> {
        if size == 0 {
            return Err(ProcessingError::EmptyInput);
        }
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(ProcessingError::Configuration(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        Ok(Self {
            fft,
            size,
            sampling_rate_hz,
        })
    }

    /// Compute the spectrum of a signal of the planned length.
    pub fn compute(&self, signal: &[f64]) -> Result<Spectrum, ProcessingError> {
        if signal.len() != self.size {
            return Err(ProcessingError::Configuration(format!(
                "analyzer planned for {} samples, got {}",
                self.size,
                signal.len()
            )));
        }

        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);

        let n_positive = self.size / 2;
        let magnitudes: Vec<f64> = buffer.iter().take(n_positive).map(|c| c.norm()).collect();

        Ok(Spectrum {
            frequencies: self.frequency_bins(),
            magnitudes,
            sampling_rate_hz: self.sampling_rate_hz,
        })
    }

    /// Frequency bins for this configuration
    pub fn frequency_bins(&self) -> Vec<f64> {
        let resolution = self.frequency_resolution();
        (0..self.size / 2).map(|i| i as f64 * resolution).collect()
    }

    /// Transform size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Frequency resolution (Hz per bin)
    pub fn frequency_resolution(&self) -> f64 {
        self.sampling_rate_hz / self.size as f64
    }
}

/// Find dominant frequencies in a spectrum using true peak detection.
///
/// Identifies local maxima (bins higher than both neighbours) and returns
/// the top `n_peaks` as (frequency, magnitude), largest first.
pub fn find_dominant_frequencies(spectrum: &Spectrum, n_peaks: usize) -> Vec<(f64, f64)> {
    if spectrum.magnitudes.len() < 3 {
        let mut all: Vec<(f64, f64)> = spectrum
            .frequencies
            .iter()
            .zip(spectrum.magnitudes.iter())
            .map(|(&f, &m)| (f, m))
            .collect();
        all.sort_by(|a, b| b.1.total_cmp(&a.1));
        all.truncate(n_peaks);
        return all;
    }

    let mut peaks: Vec<(f64, f64)> = spectrum
        .magnitudes
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, w)| (spectrum.frequencies[i + 1], w[1]))
        .collect();

    peaks.sort_by(|a, b| b.1.total_cmp(&a.1));
    peaks.truncate(n_peaks);
    peaks
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_spectrum_length_is_half_input() {
        for n in [1, 2, 3, 10, 11, 1000, 1023] {
            let x: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
            let spec = spectrum(&x, 1000.0).expect("spectrum failed");
            assert_eq!(spec.frequencies.len(), n / 2);
            assert_eq!(spec.magnitudes.len(), n / 2);
        }
    }

    #[test]
    fn test_sine_peak_lands_on_its_bin() {
        let fs = 1000.0;
        let samples: Vec<f64> = (0..1000)
            .map(|i| (2.0 * PI * 50.0 * i as f64 / fs).sin())
            .collect();

        let spec = spectrum(&samples, fs).expect("spectrum failed");
        let (peak_freq, peak_mag) = spec.peak().expect("non-empty spectrum");

        assert!((peak_freq - 50.0).abs() < 1e-9);
        // Unscaled DFT: a unit sine over N samples peaks at N/2.
        assert!((peak_mag - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_frequency_bins() {
        let analyzer = SpectrumAnalyzer::new(8, 80.0).expect("valid analyzer");
        assert_eq!(analyzer.frequency_bins(), vec![0.0, 10.0, 20.0, 30.0]);
        assert!((analyzer.frequency_resolution() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_dc_signal() {
        let spec = spectrum(&[2.0; 4], 4.0).expect("spectrum failed");
        assert!((spec.magnitudes[0] - 8.0).abs() < 1e-12);
        assert!(spec.magnitudes[1].abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_bad_rate_rejected() {
        assert_eq!(spectrum(&[], 1000.0), Err(ProcessingError::EmptyInput));
        assert!(matches!(
            spectrum(&[1.0, 2.0], 0.0),
            Err(ProcessingError::Configuration(_))
        ));
    }

    #[test]
    fn test_analyzer_rejects_wrong_length() {
        let analyzer = SpectrumAnalyzer::new(16, 100.0).expect("valid analyzer");
        assert!(analyzer.compute(&[0.0; 8]).is_err());
    }

    #[test]
    fn test_true_peak_detection() {
        let mut magnitudes = vec![0.1; 100];
        magnitudes[10] = 0.5;
        magnitudes[30] = 0.8;
        magnitudes[50] = 0.3;

        let spectrum = Spectrum {
            frequencies: (0..100).map(f64::from).collect(),
            magnitudes,
            sampling_rate_hz: 200.0,
        };

        let peaks = find_dominant_frequencies(&spectrum, 3);

        assert_eq!(peaks.len(), 3);
        assert!((peaks[0].0 - 30.0).abs() < 0.001);
        assert!((peaks[1].0 - 10.0).abs() < 0.001);
        assert!((peaks[2].0 - 50.0).abs() < 0.001);
    }
}
