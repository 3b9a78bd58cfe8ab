//! Per-Limb Gait Metrics Module.
//!
//! Turns events, angles, and trajectory into clinical-style numbers:
//! - Temporal: cadence, cycle times, stance/swing split
//! - Spatial: step length, foot clearance, circumduction
//! - Angular: flexion/abduction ranges, abnormal swing count
//! - Dynamic: peak vertical load, jerk, stability, turns
//! - Environmental: barometric altitude gain and loss
//!
//! Every function degrades to zero-valued output when its inputs are
//! too sparse to support the computation; none of them panic or error
//! on short data.

use crate::signal;
use crate::stats;
use crate::trajectory::GRAVITY;

/// Z-score beyond which an abduction sample counts as an abnormal swing.
pub const ABNORMAL_SWING_Z_SCORE: f64 = 2.0;
/// Yaw rate that marks a turning motion (deg/s).
pub const TURN_YAW_RATE_THRESHOLD_DEG_S: f64 = 45.0;
/// Minimum duration above the yaw-rate threshold to count a turn (s).
pub const MIN_TURN_DURATION_SECS: f64 = 0.5;
/// Step lengths beyond this are integration artifacts and are discarded (m).
pub const MAX_REASONABLE_STEP_LENGTH_M: f64 = 2.2;
/// Minimum angle samples before range and z-score statistics are trusted.
pub const MIN_ANGLE_SAMPLES: usize = 20;
/// Standard atmosphere reference pressure (hPa).
pub const PRESSURE_STANDARD_ATMOSPHERE_HPA: f64 = 1013.25;
/// Cutoff for smoothing barometric altitude (Hz).
const ALTITUDE_SMOOTH_CUTOFF_HZ: f64 = 1.0;

fn nanos_span_secs(timestamps: &[i64], from: usize, to: usize) -> f64 {
    (timestamps[to] - timestamps[from]) as f64 / 1e9
}

/// Steps per minute over the heel-strike span.
pub fn cadence(timestamps: &[i64], heel_strikes: &[usize]) -> f64 {
    if heel_strikes.len() < 2 {
        return 0.0;
    }
    let span = nanos_span_secs(timestamps, heel_strikes[0], heel_strikes[heel_strikes.len() - 1]);
    if span > 0.0 {
        (heel_strikes.len() - 1) as f64 * 60.0 / span
    } else {
        0.0
    }
}

/// Per-cycle durations between consecutive heel strikes: mean, standard
/// deviation, and the raw series.
pub fn cycle_times(timestamps: &[i64], heel_strikes: &[usize]) -> (f64, f64, Vec<f64>) {
    if heel_strikes.len() < 2 {
        return (0.0, 0.0, Vec::new());
    }
    let cycles: Vec<f64> = heel_strikes
        .windows(2)
        .map(|pair| nanos_span_secs(timestamps, pair[0], pair[1]))
        .collect();
    let avg = stats::mean(&cycles);
    let std = stats::std_dev(&cycles);
    (avg, std, cycles)
}

/// Average stance and swing durations across cycles that contain a toe-off.
///
/// A cycle contributes only when a toe-off falls strictly between its two
/// heel strikes; cycles without one are skipped rather than guessed at.
pub fn stance_swing(
    timestamps: &[i64],
    heel_strikes: &[usize],
    toe_offs: &[usize],
) -> (f64, f64) {
    if heel_strikes.len() < 2 || toe_offs.is_empty() {
        return (0.0, 0.0);
    }
    let mut stance = Vec::new();
    let mut swing = Vec::new();
    for pair in heel_strikes.windows(2) {
        let (hs1, hs2) = (pair[0], pair[1]);
        if let Some(&toe_off) = toe_offs.iter().find(|&&v| v > hs1 && v < hs2) {
            stance.push(nanos_span_secs(timestamps, hs1, toe_off));
            swing.push(nanos_span_secs(timestamps, toe_off, hs2));
        }
    }
    (stats::mean(&stance), stats::mean(&swing))
}

/// Horizontal displacement between consecutive heel strikes: mean,
/// coefficient of variation, and the surviving raw lengths.
///
/// Lengths above [`MAX_REASONABLE_STEP_LENGTH_M`] are integration drift
/// and are dropped before averaging.
pub fn step_lengths(
    positions: &[[f64; 3]],
    heel_strikes: &[usize],
) -> (f64, f64, Vec<f64>) {
    if heel_strikes.len() < 2 || positions.is_empty() {
        return (0.0, 0.0, Vec::new());
    }
    let lengths: Vec<f64> = heel_strikes
        .windows(2)
        .filter_map(|pair| {
            let (i1, i2) = (pair[0], pair[1]);
            if i1 >= positions.len() || i2 >= positions.len() {
                return None;
            }
            let (p1, p2) = (positions[i1], positions[i2]);
            let dx = p2[0] - p1[0];
            let dy = p2[1] - p1[1];
            let distance = (dx * dx + dy * dy).sqrt();
            (distance <= MAX_REASONABLE_STEP_LENGTH_M).then_some(distance)
        })
        .collect();

    if lengths.is_empty() {
        return (0.0, 0.0, Vec::new());
    }
    let mean = stats::mean(&lengths);
    let std = stats::std_dev(&lengths);
    let cv = if mean > 0.0 { std / mean } else { 0.0 };
    (mean, cv, lengths)
}

/// Flexion and abduction ranges as the spread between the 98th and 2nd
/// percentiles, which shrugs off transient angle spikes. Needs at least
/// [`MIN_ANGLE_SAMPLES`] samples per channel.
pub fn angle_ranges(flexion: &[f64], abduction: &[f64]) -> (f64, f64) {
    if flexion.len() < MIN_ANGLE_SAMPLES || abduction.len() < MIN_ANGLE_SAMPLES {
        return (0.0, 0.0);
    }
    let flex_range = stats::percentile(flexion, 98.0) - stats::percentile(flexion, 2.0);
    let abd_range = stats::percentile(abduction, 98.0) - stats::percentile(abduction, 2.0);
    (flex_range, abd_range)
}

/// Count of abduction samples whose z-score exceeds the swing threshold.
pub fn abnormal_swing_count(abduction: &[f64]) -> usize {
    if abduction.len() < MIN_ANGLE_SAMPLES {
        return 0;
    }
    let std = stats::std_dev(abduction);
    if std == 0.0 {
        return 0;
    }
    let mean = stats::mean(abduction);
    abduction
        .iter()
        .filter(|&&a| ((a - mean) / std).abs() > ABNORMAL_SWING_Z_SCORE)
        .count()
}

/// Average foot clearance (peak vertical position) and circumduction
/// (mediolateral spread) over swing windows, each spanning a toe-off to
/// the next heel strike.
pub fn swing_metrics(
    positions: &[[f64; 3]],
    heel_strikes: &[usize],
    toe_offs: &[usize],
) -> (f64, f64) {
    if heel_strikes.len() < 2 || toe_offs.is_empty() || positions.is_empty() {
        return (0.0, 0.0);
    }
    let mut clearances = Vec::new();
    let mut circumductions = Vec::new();
    for pair in heel_strikes.windows(2) {
        let (hs1, hs2) = (pair[0], pair[1]);
        let toe_off = toe_offs.iter().find(|&&v| v > hs1 && v < hs2);
        if let Some(&toe_off) = toe_off {
            if hs2 < positions.len() {
                let window = &positions[toe_off..=hs2];
                let clearance = window
                    .iter()
                    .map(|p| p[2])
                    .fold(f64::NEG_INFINITY, f64::max);
                clearances.push(if clearance.is_finite() { clearance } else { 0.0 });

                let y_min = window.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
                let y_max = window
                    .iter()
                    .map(|p| p[1])
                    .fold(f64::NEG_INFINITY, f64::max);
                circumductions.push(y_max - y_min);
            }
        }
    }
    (stats::mean(&clearances), stats::mean(&circumductions))
}

/// Peak vertical load in multiples of gravity and average jerk magnitude.
///
/// Jerk is the finite difference of world-frame linear acceleration
/// scaled by the sample rate.
pub fn dynamics(linear_acc: &[[f64; 3]], sample_rate: f64) -> (f64, f64) {
    if linear_acc.len() < 2 {
        return (0.0, 0.0);
    }
    let grf_max = linear_acc
        .iter()
        .map(|a| a[2])
        .fold(f64::NEG_INFINITY, f64::max)
        / GRAVITY;

    let jerk: Vec<f64> = linear_acc
        .windows(2)
        .map(|pair| {
            let dx = (pair[1][0] - pair[0][0]) * sample_rate;
            let dy = (pair[1][1] - pair[0][1]) * sample_rate;
            let dz = (pair[1][2] - pair[0][2]) * sample_rate;
            (dx * dx + dy * dy + dz * dz).sqrt()
        })
        .collect();
    (grf_max, stats::mean(&jerk))
}

/// Variance of the filtered acceleration magnitude. Steadier gait means a
/// lower value.
pub fn gait_stability(acc_filt: &[[f64; 3]]) -> f64 {
    let magnitudes: Vec<f64> = acc_filt
        .iter()
        .map(|a| (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt())
        .collect();
    stats::variance(&magnitudes)
}

/// Number of sustained turning events in the yaw angle series.
///
/// A turn is a run where the absolute yaw rate stays above the threshold
/// for at least the minimum duration; a run still open at the end of the
/// series is counted too. Fewer samples than one second of data yields 0.
pub fn detect_turns(yaw_angles: &[f64], sample_rate: f64) -> usize {
    if (yaw_angles.len() as f64) < sample_rate {
        return 0;
    }
    let yaw_rate: Vec<f64> = yaw_angles
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) * sample_rate)
        .collect();
    let min_turn_samples = (MIN_TURN_DURATION_SECS * sample_rate) as usize;

    let mut turn_count = 0;
    let mut in_turn = false;
    let mut turn_start = 0usize;
    for (i, rate) in yaw_rate.iter().enumerate() {
        if rate.abs() > TURN_YAW_RATE_THRESHOLD_DEG_S {
            if !in_turn {
                in_turn = true;
                turn_start = i;
            }
        } else if in_turn {
            if i - turn_start >= min_turn_samples {
                turn_count += 1;
            }
            in_turn = false;
        }
    }
    if in_turn && yaw_rate.len() - turn_start >= min_turn_samples {
        turn_count += 1;
    }
    turn_count
}

/// Barometric altitude above the standard atmosphere reference (m).
pub fn pressure_to_altitude(pressure_hpa: f64) -> f64 {
    44330.0 * (1.0 - (pressure_hpa / PRESSURE_STANDARD_ATMOSPHERE_HPA).powf(1.0 / 5.255))
}

/// Smoothed altitude profile with cumulative gain and loss.
///
/// An all-zero pressure channel means no barometer was present, so the
/// profile is empty and both totals are zero.
pub fn altitude_metrics(pressure_hpa: &[f64], sample_rate: f64) -> (Vec<f64>, f64, f64) {
    if pressure_hpa.iter().all(|&p| p == 0.0) {
        return (Vec::new(), 0.0, 0.0);
    }
    let altitude: Vec<f64> = pressure_hpa
        .iter()
        .map(|&p| pressure_to_altitude(p))
        .collect();
    let smoothed = signal::filtfilt(&altitude, ALTITUDE_SMOOTH_CUTOFF_HZ, sample_rate);

    let mut gain = 0.0;
    let mut loss = 0.0;
    for pair in smoothed.windows(2) {
        let diff = pair[1] - pair[0];
        if diff > 0.0 {
            gain += diff;
        } else {
            loss += -diff;
        }
    }
    (smoothed, gain, loss)
}
