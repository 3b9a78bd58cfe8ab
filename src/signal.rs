//! Zero-phase low-pass signal conditioning.
//!
//! This module implements the 2nd-order Butterworth low-pass filter (bilinear
//! transform) that every downstream gait algorithm consumes its inputs
//! through, run forward then backward over the reversed output so the phase
//! delay of the two passes cancels ("filtfilt" behavior).
//!
//! Phase matters here: gait-event detection locates heel strikes by the
//! *position* of acceleration peaks, so a causal filter's group delay would
//! shift every event by a cadence-dependent amount. Zero-phase filtering
//! keeps event timing honest.
//!
//! Acceleration and angular-rate channels must be conditioned identically
//! before any stage consumes them; [`filter_axes`] does both.

/// Low-pass cutoff applied to acceleration and angular-rate channels, Hz.
pub const FILTER_CUTOFF_HZ: f64 = 15.0;

/// Inputs shorter than this pass through unfiltered. Running a 2nd-order
/// IIR filter over a handful of samples is numerically unstable and the
/// result would be meaningless anyway.
pub const MIN_FILTER_SAMPLES: usize = 10;

/// Normalized 2nd-order Butterworth low-pass coefficients.
///
/// Direct-form difference equation:
/// `y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] − a1·y[n-1] − a2·y[n-2]`
/// with `a0` already divided out.
#[derive(Debug, Clone, Copy)]
struct ButterworthCoeffs {
    b: [f64; 3],
    a: [f64; 3],
}

impl ButterworthCoeffs {
    /// Derives low-pass coefficients via the bilinear transform with
    /// frequency pre-warping.
    fn lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let wc = (std::f64::consts::PI * cutoff_hz / sample_rate).tan();
        let k1 = std::f64::consts::SQRT_2 * wc;
        let k2 = wc * wc;

        let a0 = 1.0 + k1 + k2;
        let a1 = 2.0 * (k2 - 1.0);
        let a2 = 1.0 - k1 + k2;

        Self {
            b: [k2 / a0, 2.0 * k2 / a0, k2 / a0],
            a: [1.0, a1 / a0, a2 / a0],
        }
    }
}

/// Single causal (forward) pass of the difference equation.
fn apply_filter(data: &[f64], coeffs: &ButterworthCoeffs) -> Vec<f64> {
    let mut output = vec![0.0; data.len()];
    for i in 0..data.len() {
        let mut y = coeffs.b[0] * data[i];
        if i >= 1 {
            y += coeffs.b[1] * data[i - 1] - coeffs.a[1] * output[i - 1];
        }
        if i >= 2 {
            y += coeffs.b[2] * data[i - 2] - coeffs.a[2] * output[i - 2];
        }
        output[i] = y;
    }
    output
}

/// Zero-phase Butterworth low-pass over one channel.
///
/// Forward pass, reverse, backward pass, reverse again. Inputs shorter than
/// [`MIN_FILTER_SAMPLES`] are returned untouched.
pub fn filtfilt(data: &[f64], cutoff_hz: f64, sample_rate: f64) -> Vec<f64> {
    if data.len() < MIN_FILTER_SAMPLES {
        return data.to_vec();
    }
    let coeffs = ButterworthCoeffs::lowpass(cutoff_hz, sample_rate);

    let mut forward = apply_filter(data, &coeffs);
    forward.reverse();
    let mut backward = apply_filter(&forward, &coeffs);
    backward.reverse();
    backward
}

/// Zero-phase low-pass over a three-axis stream, each axis independently.
///
/// This is the conditioning step applied to both acceleration and
/// angular-rate channels before orientation estimation, event detection,
/// and trajectory reconstruction.
pub fn filter_axes(data: &[[f64; 3]], sample_rate: f64, cutoff_hz: f64) -> Vec<[f64; 3]> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut filtered = vec![[0.0; 3]; data.len()];
    for axis in 0..3 {
        let column: Vec<f64> = data.iter().map(|v| v[axis]).collect();
        let filtered_column = filtfilt(&column, cutoff_hz, sample_rate);
        for (row, value) in filtered.iter_mut().zip(filtered_column) {
            row[axis] = value;
        }
    }
    filtered
}
