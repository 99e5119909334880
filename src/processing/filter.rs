//! Zero-phase Butterworth low-pass filtering
//!
//! The filter is designed as a cascade of second-order sections (biquads)
//! via the bilinear transform with frequency pre-warping, then run forward
//! and backward over the signal. The backward pass cancels the phase delay
//! of the forward pass, so filtered baseline and current recordings stay
//! sample-aligned for overlay comparison.
//!
//! Edge handling matches the classic `filtfilt` recipe: the signal is
//! extended by odd reflection at both ends and every section starts from
//! its steady state for the first sample, which suppresses start-up
//! transients.
//!
//! # Example
//!
//! ```ignore
//! let lpf = LowPassFilter::butterworth(4, 50.0, 1000.0)?;
//! let clean = lpf.apply(&raw)?;
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{ensure_finite, ProcessingError, MAX_FILTER_ORDER};

// ============================================================================
// Second-Order Section
// ============================================================================

/// A single biquad section.
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
///
/// First-order sections (odd filter orders) are stored with `b2 = a2 = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondOrderSection {
    /// Numerator coefficients [b0, b1, b2]
    pub b: [f64; 3],
    /// Denominator coefficients [a1, a2] (a0 is normalized to 1)
    pub a: [f64; 2],
}

impl SecondOrderSection {
    /// Gain at DC: H(1)
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// Direct Form II Transposed state after an infinitely long unit step.
    ///
    /// Scaling this by the first input sample gives initial conditions that
    /// make the section start "already settled".
    fn unit_step_state(&self) -> [f64; 2] {
        let y = self.dc_gain();
        let d2 = self.b[2] - self.a[1] * y;
        let d1 = self.b[1] - self.a[0] * y + d2;
        [d1, d2]
    }

    /// Run the section over `data` in place, starting from `state`.
    fn run(&self, data: &mut [f64], mut state: [f64; 2]) {
        let [b0, b1, b2] = self.b;
        let [a1, a2] = self.a;
        for x in data.iter_mut() {
            let input = *x;
            let y = b0 * input + state[0];
            state[0] = b1 * input - a1 * y + state[1];
            state[1] = b2 * input - a2 * y;
            *x = y;
        }
    }

    /// Check if this section is stable (poles inside unit circle).
    pub fn is_stable(&self) -> bool {
        self.a[1].abs() < 1.0 && self.a[0].abs() < 1.0 + self.a[1]
    }
}

// ============================================================================
// Low-Pass Filter
// ============================================================================

/// Butterworth low-pass filter, designed once and applied zero-phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowPassFilter {
    sections: Vec<SecondOrderSection>,
    order: usize,
    cutoff_hz: f64,
    sampling_rate_hz: f64,
}

impl LowPassFilter {
    /// Design a Butterworth low-pass filter.
    ///
    /// # Arguments
    /// * `order` - Filter order (1-10)
    /// * `cutoff_hz` - Cutoff frequency in Hz (-3 dB point of one pass)
    /// * `sampling_rate_hz` - Sample rate in Hz
    ///
    /// # Errors
    /// [`ProcessingError::Configuration`] when the order is out of range, the
    /// sampling rate is not positive, or the cutoff is not strictly between 0
    /// and Nyquist.
    pub fn butterworth(
        order: usize,
        cutoff_hz: f64,
        sampling_rate_hz: f64,
    ) -> Result<Self, ProcessingError> {
        if order == 0 || order > MAX_FILTER_ORDER {
            return Err(ProcessingError::Configuration(format!(
                "filter order {order} outside supported range 1-{MAX_FILTER_ORDER}"
            )));
        }
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(ProcessingError::Configuration(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }
        let nyquist = 0.5 * sampling_rate_hz;
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist {
            return Err(ProcessingError::Configuration(format!(
                "cutoff {cutoff_hz} Hz must be within (0, {nyquist}) Hz (Nyquist)"
            )));
        }

        Ok(Self {
            sections: design_butterworth_lowpass(order, cutoff_hz, sampling_rate_hz),
            order,
            cutoff_hz,
            sampling_rate_hz,
        })
    }

    /// Apply the filter forward and backward.
    ///
    /// Output has the same length as the input.
    ///
    /// # Errors
    /// [`ProcessingError::EmptyInput`] for an empty signal,
    /// [`ProcessingError::NonFinite`] if any sample is NaN or infinite.
    pub fn apply(&self, samples: &[f64]) -> Result<Vec<f64>, ProcessingError> {
        ensure_finite(samples)?;

        let pad = self.pad_len().min(samples.len() - 1);
        let mut ext = odd_extend(samples, pad);

        self.run_cascade(&mut ext);
        ext.reverse();
        self.run_cascade(&mut ext);
        ext.reverse();

        Ok(ext[pad..pad + samples.len()].to_vec())
    }

    /// One causal pass through every section, each seeded with its steady
    /// state for the first sample it sees.
    fn run_cascade(&self, data: &mut [f64]) {
        for section in &self.sections {
            let x0 = data[0];
            let [d1, d2] = section.unit_step_state();
            section.run(data, [d1 * x0, d2 * x0]);
        }
    }

    /// Reflection length at each end: three times the transfer-function
    /// coefficient count, as `filtfilt` does for (b, a) designs.
    pub fn pad_len(&self) -> usize {
        3 * (self.order + 1)
    }

    /// Designed sections
    pub fn sections(&self) -> &[SecondOrderSection] {
        &self.sections
    }

    /// Filter order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Cutoff frequency (Hz)
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Sampling rate (Hz)
    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }
}

/// Zero-phase low-pass filter a signal in one call.
///
/// Designs the filter on every call; use [`LowPassFilter`] directly when
/// filtering many channels with the same settings.
pub fn filter(
    samples: &[f64],
    cutoff_hz: f64,
    sampling_rate_hz: f64,
    order: usize,
) -> Result<Vec<f64>, ProcessingError> {
    LowPassFilter::butterworth(order, cutoff_hz, sampling_rate_hz)?.apply(samples)
}

// ============================================================================
// Design
// ============================================================================

/// Butterworth low-pass sections via bilinear transform.
///
/// Analog prototype pole pairs sit at angle (2k+1)π/(2N) from the imaginary
/// axis, giving denominators s² + 2·sin(θ)·s + 1. Odd orders add one
/// first-order section for the real pole at s = -1.
fn design_butterworth_lowpass(
    order: usize,
    cutoff_hz: f64,
    sampling_rate_hz: f64,
) -> Vec<SecondOrderSection> {
    let k = (PI * cutoff_hz / sampling_rate_hz).tan();
    let k2 = k * k;
    let mut sections = Vec::with_capacity(order.div_ceil(2));

    for i in 0..order / 2 {
        let theta = PI * (2 * i + 1) as f64 / (2 * order) as f64;
        let damping = 2.0 * theta.sin();
        let norm = 1.0 / (1.0 + damping * k + k2);

        let b0 = k2 * norm;
        sections.push(SecondOrderSection {
            b: [b0, 2.0 * b0, b0],
            a: [2.0 * (k2 - 1.0) * norm, (1.0 - damping * k + k2) * norm],
        });
    }

    if order % 2 == 1 {
        let norm = 1.0 / (1.0 + k);
        sections.push(SecondOrderSection {
            b: [k * norm, k * norm, 0.0],
            a: [(k - 1.0) * norm, 0.0],
        });
    }

    sections
}

/// Extend a signal by `pad` samples at each end using odd (point) reflection
/// about the end samples.
fn odd_extend(samples: &[f64], pad: usize) -> Vec<f64> {
    let n = samples.len();
    let first = samples[0];
    let last = samples[n - 1];

    let mut ext = Vec::with_capacity(n + 2 * pad);
    ext.extend((1..=pad).rev().map(|i| 2.0 * first - samples[i]));
    ext.extend_from_slice(samples);
    ext.extend((1..=pad).map(|i| 2.0 * last - samples[n - 1 - i]));
    ext
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, amplitude: f64, n: usize, fs: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn test_butterworth_sections_are_stable_with_unity_dc_gain() {
        for order in 1..=MAX_FILTER_ORDER {
            let lpf = LowPassFilter::butterworth(order, 50.0, 1000.0).expect("valid design");
            assert_eq!(lpf.sections().len(), order.div_ceil(2));
            for s in lpf.sections() {
                assert!(s.is_stable(), "order {order} has unstable section {s:?}");
                assert!((s.dc_gain() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_filter_preserves_length() {
        for n in [1, 2, 5, 15, 16, 100, 1001] {
            let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.37).sin()).collect();
            let y = filter(&x, 50.0, 1000.0, 4).expect("filter failed");
            assert_eq!(y.len(), n);
        }
    }

    #[test]
    fn test_filter_is_deterministic() {
        let x: Vec<f64> = (0..777).map(|i| ((i * 31 % 17) as f64 - 8.0) * 0.1).collect();
        let a = filter(&x, 50.0, 1000.0, 4).expect("filter failed");
        let b = filter(&x, 50.0, 1000.0, 4).expect("filter failed");
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_and_constant_input() {
        let zeros = vec![0.0; 256];
        let y = filter(&zeros, 50.0, 1000.0, 4).expect("filter failed");
        assert!(y.iter().all(|v| *v == 0.0));

        let constant = vec![3.5; 256];
        let y = filter(&constant, 50.0, 1000.0, 4).expect("filter failed");
        assert!(y.iter().all(|v| (v - 3.5).abs() < 1e-9));
    }

    #[test]
    fn test_passband_kept_stopband_removed() {
        let fs = 1000.0;
        let low = sine(5.0, 1.0, 2000, fs);
        let high = sine(300.0, 1.0, 2000, fs);

        let low_out = filter(&low, 50.0, fs, 4).expect("filter failed");
        let high_out = filter(&high, 50.0, fs, 4).expect("filter failed");

        assert!((rms(&low_out) / rms(&low) - 1.0).abs() < 0.01);
        assert!(rms(&high_out) / rms(&high) < 0.01);
    }

    #[test]
    fn test_zero_phase_no_time_shift() {
        let fs = 1000.0;
        let x = sine(10.0, 1.0, 1000, fs);
        let y = filter(&x, 50.0, fs, 4).expect("filter failed");

        // Away from the edges the output tracks the input sample-for-sample.
        for i in 200..800 {
            assert!((x[i] - y[i]).abs() < 1e-3, "sample {i}: {} vs {}", x[i], y[i]);
        }
    }

    #[test]
    fn test_cutoff_at_or_above_nyquist_rejected() {
        let x = vec![1.0; 10];
        assert!(matches!(
            filter(&x, 500.0, 1000.0, 4),
            Err(ProcessingError::Configuration(_))
        ));
        assert!(matches!(
            filter(&x, 0.0, 1000.0, 4),
            Err(ProcessingError::Configuration(_))
        ));
        assert!(matches!(
            filter(&x, 50.0, 1000.0, 0),
            Err(ProcessingError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(filter(&[], 50.0, 1000.0, 4), Err(ProcessingError::EmptyInput));
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        let mut x = vec![1.0; 64];
        x[17] = f64::NAN;
        assert_eq!(
            filter(&x, 50.0, 1000.0, 4),
            Err(ProcessingError::NonFinite { index: 17 })
        );

        x[17] = 1.0;
        x[63] = f64::INFINITY;
        assert_eq!(
            filter(&x, 50.0, 1000.0, 4),
            Err(ProcessingError::NonFinite { index: 63 })
        );
    }

    #[test]
    fn test_odd_extend() {
        let ext = odd_extend(&[1.0, 2.0, 4.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 6.0, 7.0]);
    }
}
