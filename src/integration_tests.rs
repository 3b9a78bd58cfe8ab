/// Integration tests for the complete gait analysis pipeline.
/// Exercises realistic walking scenarios end to end, from raw samples
/// through activity detection, limb analysis, and symmetry scoring.

#[cfg(test)]
mod integration_tests {
    use crate::activity::detect_walking_activity;
    use crate::pipeline::process_full_analysis;
    use crate::types::{LegSide, SensorSample, WalkSegment};

    /// Helper: walking profile at a given stride frequency. Gravity plus a
    /// stride oscillation on the accelerometer, a matching periodic
    /// rotation rate, and a slowly descending barometer.
    ///
    /// The 3 m/s² oscillation keeps the normalized peak amplitude well
    /// above the heel-strike threshold even when segmentation trims and
    /// phase-shifts the stream.
    fn walking_profile(duration_secs: f64, stride_hz: f64, sample_rate: f64) -> Vec<SensorSample> {
        let n = (duration_secs * sample_rate) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate;
                let phase = 2.0 * std::f64::consts::PI * stride_hz * t;
                SensorSample::with_all_sensors(
                    (t * 1e9) as i64,
                    [0.3 * phase.cos(), 0.1 * phase.sin(), 9.81 + 3.0 * phase.sin()],
                    [1.5 * phase.sin(), 0.2 * phase.cos(), 0.0],
                    [0.0; 3],
                    1013.25 - t * 0.05,
                )
            })
            .collect()
    }

    /// Helper: quiet standing with mild sensor noise.
    fn standing_profile(duration_secs: f64, sample_rate: f64) -> Vec<SensorSample> {
        let n = (duration_secs * sample_rate) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate;
                // Deterministic sub-threshold wobble.
                let wobble = 0.05 * (t * 13.7).sin();
                SensorSample::new(
                    (t * 1e9) as i64,
                    [wobble, 0.0, 9.81 + wobble],
                    [0.01, 0.0, 0.0],
                )
            })
            .collect()
    }

    #[test]
    fn test_walk_is_segmented_and_analyzed() {
        let samples = walking_profile(6.0, 1.8, 100.0);
        let segments = detect_walking_activity(&samples, 100.0).expect("valid rate");
        assert_eq!(segments.len(), 1, "one continuous walk expected");

        let analysis = process_full_analysis(&segments, LegSide::Left, None, None)
            .expect("well-formed input");
        let local = &analysis.local;
        assert!(!local.is_insufficient());
        assert!(
            local.total_steps >= 9 && local.total_steps <= 11,
            "expected ~10 strides, got {}",
            local.total_steps
        );
        // 1.8 Hz strides: just over 100 strike-to-strike intervals per minute.
        assert!(
            local.cadence > 95.0 && local.cadence < 120.0,
            "cadence {}",
            local.cadence
        );
        assert!(local.avg_gait_cycle > 0.4 && local.avg_gait_cycle < 0.8);
        assert!(local.gait_stability > 0.0);
        assert!(local.jerk_avg > 0.0);
        // Barometer was present, so the altitude profile is populated.
        assert_eq!(local.raw_altitude.len(), local.raw_timestamps.len());
        assert!(local.total_altitude_gain > 0.0);
    }

    #[test]
    fn test_standing_produces_no_segments() {
        let samples = standing_profile(5.0, 100.0);
        let segments = detect_walking_activity(&samples, 100.0).expect("valid rate");
        assert!(segments.is_empty(), "standing must not segment as walking");
    }

    #[test]
    fn test_short_burst_is_discarded() {
        // One second of walking bracketed by stillness is below the
        // minimum segment duration.
        let mut samples = standing_profile(2.0, 100.0);
        let offset = samples.len();
        samples.extend(walking_profile(1.0, 1.8, 100.0).into_iter().map(|mut s| {
            s.timestamp_nanos += (offset as f64 / 100.0 * 1e9) as i64;
            s
        }));
        let segments = detect_walking_activity(&samples, 100.0).expect("valid rate");
        assert!(segments.is_empty());
    }

    #[test]
    fn test_identical_limbs_are_symmetric() {
        let left = WalkSegment {
            samples: walking_profile(6.0, 1.8, 100.0),
        };
        let right = WalkSegment {
            samples: walking_profile(6.0, 1.8, 100.0),
        };
        let analysis = process_full_analysis(
            std::slice::from_ref(&left),
            LegSide::Left,
            Some(std::slice::from_ref(&right)),
            Some(LegSide::Right),
        )
        .expect("well-formed input");

        let comparison = analysis.comparison.expect("comparison present");
        assert!(
            comparison.overall_symmetry_score >= 99.0,
            "identical limbs scored {}",
            comparison.overall_symmetry_score
        );
        assert!((comparison.time_symmetry - 1.0).abs() < 1e-9);
        let remote = analysis.remote.expect("remote metrics present");
        assert_eq!(analysis.local.total_steps, remote.total_steps);
    }

    #[test]
    fn test_asymmetric_limbs_score_lower() {
        // The right limb strides noticeably slower than the left.
        let left = WalkSegment {
            samples: walking_profile(6.0, 1.8, 100.0),
        };
        let right = WalkSegment {
            samples: walking_profile(6.0, 1.2, 100.0),
        };

        let analysis = process_full_analysis(
            std::slice::from_ref(&left),
            LegSide::Left,
            Some(std::slice::from_ref(&right)),
            Some(LegSide::Right),
        )
        .expect("well-formed input");

        let comparison = analysis.comparison.expect("comparison present");
        assert!(
            comparison.overall_symmetry_score < 99.0,
            "mismatched stride rates scored {}",
            comparison.overall_symmetry_score
        );
        assert!(comparison.time_symmetry < 1.0);
    }

    #[test]
    fn test_walk_pause_walk_yields_two_segments() {
        let rate = 100.0;
        let mut samples = walking_profile(4.0, 1.8, rate);
        let mut t_offset = 4.0;
        for s in standing_profile(3.0, rate) {
            let mut s = s;
            s.timestamp_nanos += (t_offset * 1e9) as i64;
            samples.push(s);
        }
        t_offset += 3.0;
        for s in walking_profile(4.0, 1.8, rate) {
            let mut s = s;
            s.timestamp_nanos += (t_offset * 1e9) as i64;
            samples.push(s);
        }

        let segments = detect_walking_activity(&samples, rate).expect("valid rate");
        assert_eq!(segments.len(), 2, "pause must split the walk");

        // Both halves analyze to comparable step counts.
        let first = process_full_analysis(&segments[..1], LegSide::Left, None, None)
            .expect("well-formed input");
        let second = process_full_analysis(&segments[1..], LegSide::Left, None, None)
            .expect("well-formed input");
        assert!(!first.local.is_insufficient());
        assert!(!second.local.is_insufficient());
        let diff = first.local.total_steps.abs_diff(second.local.total_steps);
        assert!(diff <= 2, "step counts diverged: {} vs {}", first.local.total_steps, second.local.total_steps);
    }

    #[test]
    fn test_sentinel_for_insufficient_data_not_error() {
        // A two-second standing segment passes activity thresholds only if
        // forced in manually; the analyzer still degrades without erroring.
        let segment = WalkSegment {
            samples: standing_profile(2.0, 100.0),
        };
        let analysis = process_full_analysis(&[segment], LegSide::Right, None, None)
            .expect("insufficient data is not an error");
        assert!(analysis.local.is_insufficient());
        assert_eq!(analysis.local.estimated_symmetry_score, 50.0);
    }
}
