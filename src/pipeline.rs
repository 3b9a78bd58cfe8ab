//! Gait Analysis Pipeline Module.
//!
//! Orchestrates the full data flow from walking segments to limb metrics:
//! 1. **Signal Processing**: zero-phase low-pass filtering of acc and gyro
//! 2. **Orientation**: Madgwick fusion into per-sample quaternions
//! 3. **Event Detection**: heel strikes and toe-offs from acceleration
//! 4. **Trajectory**: ZUPT-corrected strapdown integration
//! 5. **Metrics**: temporal, spatial, angular, and dynamic measures
//!
//! Limbs with too little signal to analyze come back as the zero-valued
//! [`LegMetrics`] sentinel rather than an error; [`AnalysisError`] is
//! reserved for malformed inputs.

use crate::activity;
use crate::events;
use crate::metrics;
use crate::orientation;
use crate::signal;
use crate::symmetry;
use crate::trajectory;
use crate::types::{AnalysisError, FullAnalysis, LegMetrics, LegSide, WalkSegment};

/// Sample rates below this carry too little bandwidth for gait analysis.
pub const MIN_ANALYSIS_SAMPLE_RATE_HZ: f64 = 20.0;

/// Analyze one instrumented limb across its walking segments.
///
/// Returns the sentinel [`LegMetrics`] (check [`LegMetrics::is_insufficient`])
/// when the segments are empty, the sample rate is below
/// [`MIN_ANALYSIS_SAMPLE_RATE_HZ`], or fewer than three heel strikes were
/// found.
pub fn analyze_single_limb(
    segments: &[WalkSegment],
    leg_side: LegSide,
) -> Result<LegMetrics, AnalysisError> {
    let samples: Vec<_> = segments
        .iter()
        .flat_map(|s| s.samples.iter().copied())
        .collect();
    if samples.is_empty() {
        tracing::debug!(?leg_side, "no samples, returning sentinel");
        return Ok(LegMetrics::default());
    }

    let sample_rate = activity::estimate_sample_rate(&samples);
    if sample_rate < MIN_ANALYSIS_SAMPLE_RATE_HZ {
        tracing::debug!(sample_rate, "sample rate too low, returning sentinel");
        return Ok(LegMetrics::default());
    }

    let timestamps: Vec<i64> = samples.iter().map(|s| s.timestamp_nanos).collect();
    let acc: Vec<[f64; 3]> = samples.iter().map(|s| s.acc).collect();
    let gyro: Vec<[f64; 3]> = samples.iter().map(|s| s.gyro).collect();
    let mag: Vec<[f64; 3]> = samples.iter().map(|s| s.mag).collect();
    let pressure: Vec<f64> = samples.iter().map(|s| s.pressure_hpa).collect();

    let acc_filt = signal::filter_axes(&acc, sample_rate, signal::FILTER_CUTOFF_HZ);
    let gyro_filt = signal::filter_axes(&gyro, sample_rate, signal::FILTER_CUTOFF_HZ);

    let quaternions = orientation::estimate_orientation(&acc_filt, &gyro_filt, &mag, sample_rate)?;
    let angles = orientation::euler_angles(&quaternions, leg_side);

    let heel_strikes = events::detect_heel_strikes(&acc_filt, sample_rate);
    if heel_strikes.len() < events::MIN_HEEL_STRIKES {
        tracing::debug!(
            strikes = heel_strikes.len(),
            "too few heel strikes, returning sentinel"
        );
        return Ok(LegMetrics::default());
    }
    let toe_offs = events::detect_toe_offs(&acc_filt, sample_rate);

    let traj = trajectory::reconstruct_trajectory(&quaternions, &acc_filt, &gyro_filt, sample_rate)?;

    let cadence = metrics::cadence(&timestamps, &heel_strikes);
    let (avg_cycle, std_cycle, raw_cycles) = metrics::cycle_times(&timestamps, &heel_strikes);
    let (stance_time, swing_time) = metrics::stance_swing(&timestamps, &heel_strikes, &toe_offs);
    let (step_length_mean, step_length_cv, raw_step_lengths) =
        metrics::step_lengths(&traj.position, &heel_strikes);
    let (flexion_range, abduction_range) = metrics::angle_ranges(&angles.flexion, &angles.abduction);
    let abnormal_swing_count = metrics::abnormal_swing_count(&angles.abduction);
    let gait_stability = metrics::gait_stability(&acc_filt);
    let (foot_clearance, circumduction) =
        metrics::swing_metrics(&traj.position, &heel_strikes, &toe_offs);
    let (grf_max, jerk_avg) = metrics::dynamics(&traj.linear_acc, sample_rate);
    let total_turns = metrics::detect_turns(&angles.yaw, sample_rate);
    let (raw_altitude, total_altitude_gain, total_altitude_loss) =
        metrics::altitude_metrics(&pressure, sample_rate);

    let first_nanos = timestamps[0];
    let raw_timestamps = timestamps
        .iter()
        .map(|&t| (t - first_nanos) as f64 / 1e9)
        .collect();

    tracing::debug!(
        ?leg_side,
        steps = heel_strikes.len(),
        cadence,
        "limb analysis complete"
    );

    Ok(LegMetrics {
        total_steps: heel_strikes.len(),
        cadence,
        avg_gait_cycle: avg_cycle,
        step_asymmetry: if avg_cycle > 0.0 { std_cycle / avg_cycle } else { 0.0 },
        stance_time,
        swing_time,
        step_length_mean,
        step_length_cv,
        gait_stability,
        flexion_range,
        abduction_range,
        abnormal_swing_count,
        foot_clearance,
        circumduction,
        grf_max,
        jerk_avg,
        total_turns,
        total_altitude_gain,
        total_altitude_loss,
        estimated_symmetry_score: 0.0,
        raw_gait_cycles: raw_cycles,
        raw_step_lengths,
        raw_flexion_angles: angles.flexion,
        raw_abduction_angles: angles.abduction,
        raw_yaw_angles: angles.yaw,
        raw_altitude,
        raw_timestamps,
    })
}

/// Run the full analysis for one limb, optionally paired with a second
/// device's segments for the other limb.
///
/// With a remote limb present, metrics are compared with left and right
/// assigned from the side tags. Without one, the local limb gets a
/// symmetry estimate derived from its alternating gait cycles.
pub fn process_full_analysis(
    local_segments: &[WalkSegment],
    leg_side: LegSide,
    remote_segments: Option<&[WalkSegment]>,
    remote_leg_side: Option<LegSide>,
) -> Result<FullAnalysis, AnalysisError> {
    let mut local = analyze_single_limb(local_segments, leg_side)?;
    let remote = match (remote_segments, remote_leg_side) {
        (Some(segments), Some(side)) => Some(analyze_single_limb(segments, side)?),
        _ => None,
    };

    let comparison = remote.as_ref().map(|remote_metrics| {
        let (left, right) = match leg_side {
            LegSide::Left => (&local, remote_metrics),
            LegSide::Right => (remote_metrics, &local),
        };
        symmetry::compare_legs(left, right)
    });

    if remote.is_none() {
        local.estimated_symmetry_score =
            symmetry::estimate_single_leg_symmetry(&local.raw_gait_cycles);
    }

    Ok(FullAnalysis {
        local,
        remote,
        comparison,
    })
}
