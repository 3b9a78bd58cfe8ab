//! Bilateral Symmetry Module.
//!
//! Compares left and right limb metrics:
//! - Per-metric symmetry indices (1.0 is perfect symmetry)
//! - Rank-test p-values over the raw cycle and step-length series
//! - A weighted overall score on a 0-100 scale
//!
//! A single-limb fallback estimates symmetry from alternating gait
//! cycles when no paired device recorded the other leg.

use crate::stats;
use crate::types::{ComparisonMetrics, LegMetrics};

/// Overall-score weights: cycle time and step length dominate, stance
/// and swing split the middle, angles round it out.
const WEIGHT_TIME: f64 = 0.25;
const WEIGHT_STEP_LENGTH: f64 = 0.25;
const WEIGHT_STANCE: f64 = 0.15;
const WEIGHT_SWING: f64 = 0.15;
const WEIGHT_FLEXION: f64 = 0.10;
const WEIGHT_ABDUCTION: f64 = 0.10;

/// Minimum raw cycles before the single-limb estimate is attempted.
const MIN_CYCLES_FOR_ESTIMATE: usize = 4;
/// Neutral score reported when the estimate has too little data.
const NEUTRAL_SYMMETRY_SCORE: f64 = 50.0;

/// Normalized symmetry of a paired scalar metric.
///
/// 1.0 means identical sides; the index falls as the absolute difference
/// grows against the pair's mean. Non-positive pairs are treated as
/// symmetric because neither side produced a measurable value.
pub fn symmetry_index(left: f64, right: f64) -> f64 {
    if left + right > 0.0 {
        1.0 - (left - right).abs() / ((left + right) / 2.0)
    } else {
        1.0
    }
}

fn symmetry_p_value(left: &[f64], right: &[f64]) -> f64 {
    if left.len() > 1 && right.len() > 1 {
        stats::mann_whitney_u_p_value(left, right)
    } else {
        1.0
    }
}

/// Full bilateral comparison of two analyzed limbs.
pub fn compare_legs(left: &LegMetrics, right: &LegMetrics) -> ComparisonMetrics {
    let time_symmetry = symmetry_index(left.avg_gait_cycle, right.avg_gait_cycle);
    let step_length_symmetry = symmetry_index(left.step_length_mean, right.step_length_mean);
    let stance_time_symmetry = symmetry_index(left.stance_time, right.stance_time);
    let swing_time_symmetry = symmetry_index(left.swing_time, right.swing_time);
    let flexion_range_symmetry = symmetry_index(left.flexion_range, right.flexion_range);
    let abduction_range_symmetry = symmetry_index(left.abduction_range, right.abduction_range);

    let overall = (time_symmetry * WEIGHT_TIME
        + step_length_symmetry * WEIGHT_STEP_LENGTH
        + stance_time_symmetry * WEIGHT_STANCE
        + swing_time_symmetry * WEIGHT_SWING
        + flexion_range_symmetry * WEIGHT_FLEXION
        + abduction_range_symmetry * WEIGHT_ABDUCTION)
        * 100.0;

    ComparisonMetrics {
        time_symmetry,
        step_length_symmetry,
        stance_time_symmetry,
        swing_time_symmetry,
        flexion_range_symmetry,
        abduction_range_symmetry,
        time_symmetry_p_value: symmetry_p_value(&left.raw_gait_cycles, &right.raw_gait_cycles),
        step_length_symmetry_p_value: symmetry_p_value(
            &left.raw_step_lengths,
            &right.raw_step_lengths,
        ),
        overall_symmetry_score: overall.clamp(0.0, 100.0),
    }
}

/// Symmetry estimate for a single instrumented limb.
///
/// Consecutive gait cycles alternate which leg leads, so the even- and
/// odd-indexed cycle durations proxy for the two sides. The score is the
/// ratio of the smaller mean to the larger, on a 0-100 scale. Fewer than
/// four cycles returns the neutral midpoint.
pub fn estimate_single_leg_symmetry(raw_gait_cycles: &[f64]) -> f64 {
    if raw_gait_cycles.len() < MIN_CYCLES_FOR_ESTIMATE {
        return NEUTRAL_SYMMETRY_SCORE;
    }
    let even: Vec<f64> = raw_gait_cycles.iter().copied().step_by(2).collect();
    let odd: Vec<f64> = raw_gait_cycles.iter().copied().skip(1).step_by(2).collect();
    if even.is_empty() || odd.is_empty() {
        return NEUTRAL_SYMMETRY_SCORE;
    }
    let avg_even = stats::mean(&even);
    let avg_odd = stats::mean(&odd);
    let larger = avg_even.max(avg_odd);
    if larger <= 0.0 {
        return NEUTRAL_SYMMETRY_SCORE;
    }
    avg_even.min(avg_odd) / larger * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn limb_with(
        avg_gait_cycle: f64,
        step_length_mean: f64,
        stance_time: f64,
        swing_time: f64,
        flexion_range: f64,
        abduction_range: f64,
    ) -> LegMetrics {
        LegMetrics {
            total_steps: 10,
            avg_gait_cycle,
            step_length_mean,
            stance_time,
            swing_time,
            flexion_range,
            abduction_range,
            ..LegMetrics::default()
        }
    }

    #[test]
    fn test_symmetry_index_identical() {
        assert_relative_eq!(symmetry_index(1.2, 1.2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetry_index_asymmetric() {
        // |1-3| / mean(2) = 1.0 → index 0.
        assert_relative_eq!(symmetry_index(1.0, 3.0), 0.0, epsilon = 1e-12);
        // Extreme mismatch goes negative rather than clamping.
        assert!(symmetry_index(0.1, 3.0) < 0.0);
    }

    #[test]
    fn test_symmetry_index_zero_pair() {
        assert_relative_eq!(symmetry_index(0.0, 0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(symmetry_index(-1.0, 0.5), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identical_limbs_score_100() {
        let leg = limb_with(1.1, 0.7, 0.65, 0.45, 42.0, 11.0);
        let cmp = compare_legs(&leg, &leg);
        assert_relative_eq!(cmp.time_symmetry, 1.0, epsilon = 1e-12);
        assert_relative_eq!(cmp.overall_symmetry_score, 100.0, epsilon = 1e-9);
        // Empty raw series fall back to the neutral p-value.
        assert_eq!(cmp.time_symmetry_p_value, 1.0);
    }

    #[test]
    fn test_asymmetric_limbs_score_below_100() {
        let left = limb_with(1.0, 0.7, 0.6, 0.4, 40.0, 10.0);
        let right = limb_with(1.4, 0.5, 0.7, 0.5, 25.0, 18.0);
        let cmp = compare_legs(&left, &right);
        assert!(cmp.overall_symmetry_score < 90.0);
        assert!(cmp.overall_symmetry_score >= 0.0);
        assert!(cmp.time_symmetry < 1.0);
    }

    #[test]
    fn test_score_is_clamped() {
        // Wildly mismatched metrics drive raw indices negative; the
        // reported score must still be in [0, 100].
        let left = limb_with(0.01, 0.01, 0.01, 0.01, 0.1, 0.1);
        let right = limb_with(2.0, 2.0, 2.0, 2.0, 80.0, 40.0);
        let cmp = compare_legs(&left, &right);
        assert!(cmp.overall_symmetry_score >= 0.0);
        assert!(cmp.overall_symmetry_score <= 100.0);
    }

    #[test]
    fn test_p_values_distinguish_distributions() {
        let mut left = limb_with(1.0, 0.7, 0.6, 0.4, 40.0, 10.0);
        let mut right = left.clone();
        left.raw_gait_cycles = (0..20).map(|i| 1.0 + i as f64 * 0.001).collect();
        right.raw_gait_cycles = (0..20).map(|i| 1.5 + i as f64 * 0.001).collect();
        left.raw_step_lengths = left.raw_gait_cycles.clone();
        right.raw_step_lengths = left.raw_step_lengths.clone();

        let cmp = compare_legs(&left, &right);
        // Disjoint cycle distributions: strong evidence of asymmetry.
        assert!(cmp.time_symmetry_p_value < 0.01);
        // Identical step-length samples: no evidence.
        assert!(cmp.step_length_symmetry_p_value > 0.5);
    }

    #[test]
    fn test_single_leg_estimate_balanced() {
        let cycles = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        assert_relative_eq!(estimate_single_leg_symmetry(&cycles), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_leg_estimate_alternating() {
        // Even cycles 1.0 s, odd cycles 1.25 s → 80.
        let cycles = vec![1.0, 1.25, 1.0, 1.25, 1.0, 1.25];
        assert_relative_eq!(estimate_single_leg_symmetry(&cycles), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_leg_estimate_needs_four_cycles() {
        assert_eq!(estimate_single_leg_symmetry(&[1.0, 1.1, 1.0]), 50.0);
        assert_eq!(estimate_single_leg_symmetry(&[]), 50.0);
    }

    #[test]
    fn test_single_leg_estimate_zero_cycles() {
        assert_eq!(estimate_single_leg_symmetry(&[0.0, 0.0, 0.0, 0.0]), 50.0);
    }
}
