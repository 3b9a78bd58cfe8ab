//! Walking-activity segmentation.
//!
//! Segments a raw sample stream into contiguous walking windows by
//! thresholding the rolling variance of acceleration magnitude. Standing
//! still, sitting, and phone-handling produce near-constant magnitude
//! (gravity plus sensor noise); walking produces sustained variance from
//! the impact/swing cycle.
//!
//! There is no error path for "no walking found": an empty segment list is
//! a valid, non-fatal outcome that callers surface as "no activity".

use tracing::debug;

use crate::stats;
use crate::types::{AnalysisError, SensorSample, WalkSegment};

/// Rolling-variance window, seconds.
pub const ACTIVITY_WINDOW_SECS: f64 = 1.0;

/// Acceleration-magnitude variance above this marks a sample "active",
/// m²/s⁴. Empirically tuned; do not re-derive.
pub const ACTIVITY_VARIANCE_THRESHOLD: f64 = 0.5;

/// Active runs shorter than this are discarded, seconds.
pub const MIN_WALK_SEGMENT_SECS: f64 = 2.0;

/// Fallback rate when the stream is too short or ambiguous to estimate, Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 100.0;

/// Estimates the nominal sample rate from the timestamp span.
///
/// Fewer than 10 samples, or a span too short to trust, yields the
/// [`DEFAULT_SAMPLE_RATE_HZ`] fallback.
pub fn estimate_sample_rate(samples: &[SensorSample]) -> f64 {
    if samples.len() < 10 {
        return DEFAULT_SAMPLE_RATE_HZ;
    }
    let span_secs =
        (samples[samples.len() - 1].timestamp_nanos - samples[0].timestamp_nanos) as f64 / 1e9;
    if span_secs > 1.0 {
        (samples.len() - 1) as f64 / span_secs
    } else {
        DEFAULT_SAMPLE_RATE_HZ
    }
}

/// Segments a raw stream into disjoint walking windows.
///
/// Each returned segment is longer than [`MIN_WALK_SEGMENT_SECS`]; a
/// trailing partial run is included when long enough. Input shorter than
/// two seconds of samples yields an empty list.
///
/// Fails fast only on a non-finite or non-positive sample rate.
pub fn detect_walking_activity(
    samples: &[SensorSample],
    sample_rate: f64,
) -> Result<Vec<WalkSegment>, AnalysisError> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(AnalysisError::InvalidSampleRate(sample_rate));
    }
    if (samples.len() as f64) < sample_rate * MIN_WALK_SEGMENT_SECS {
        return Ok(Vec::new());
    }

    let window_size = ((ACTIVITY_WINDOW_SECS * sample_rate) as usize).max(1);
    let min_segment_samples = (MIN_WALK_SEGMENT_SECS * sample_rate) as usize;

    let acc_mag: Vec<f64> = samples.iter().map(SensorSample::acc_magnitude).collect();

    // Rolling variance, one window starting at each sample; trailing
    // windows shrink rather than drop.
    let is_active: Vec<bool> = (0..acc_mag.len())
        .map(|i| {
            let end = (i + window_size).min(acc_mag.len());
            stats::variance(&acc_mag[i..end]) > ACTIVITY_VARIANCE_THRESHOLD
        })
        .collect();

    let mut segments = Vec::new();
    let mut in_segment = false;
    let mut start_idx = 0;
    for (i, &active) in is_active.iter().enumerate() {
        if active && !in_segment {
            in_segment = true;
            start_idx = i;
        } else if !active && in_segment {
            in_segment = false;
            if i - start_idx > min_segment_samples {
                segments.push(WalkSegment::new(samples[start_idx..i].to_vec()));
            }
        }
    }
    if in_segment && samples.len() - start_idx > min_segment_samples {
        segments.push(WalkSegment::new(samples[start_idx..].to_vec()));
    }

    debug!(
        segment_count = segments.len(),
        total_samples = samples.len(),
        "walking activity detection complete"
    );
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn samples_at_100hz(count: usize, acc_z: impl Fn(f64) -> f64) -> Vec<SensorSample> {
        (0..count)
            .map(|i| {
                let t = i as f64 / 100.0;
                SensorSample::new((t * 1e9) as i64, [0.0, 0.0, acc_z(t)], [0.0; 3])
            })
            .collect()
    }

    #[test]
    fn test_sample_rate_default_for_short_streams() {
        let samples = samples_at_100hz(5, |_| 9.81);
        assert_eq!(estimate_sample_rate(&samples), DEFAULT_SAMPLE_RATE_HZ);
    }

    #[test]
    fn test_sample_rate_from_timestamps() {
        let samples = samples_at_100hz(500, |_| 9.81);
        assert_relative_eq!(estimate_sample_rate(&samples), 100.0, epsilon = 0.5);
    }

    #[test]
    fn test_sample_rate_ambiguous_span_defaults() {
        // 50 samples crammed into under a second of wall clock.
        let samples: Vec<SensorSample> = (0..50)
            .map(|i| SensorSample::new(i * 1_000_000, [0.0; 3], [0.0; 3]))
            .collect();
        assert_eq!(estimate_sample_rate(&samples), DEFAULT_SAMPLE_RATE_HZ);
    }

    #[test]
    fn test_short_input_yields_no_segments() {
        // Anything shorter than 2 s of samples is never walking.
        let samples = samples_at_100hz(150, |t| 9.81 + 3.0 * (t * 12.0).sin());
        let segments = detect_walking_activity(&samples, 100.0).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_quiet_noise_yields_no_segments() {
        // One second of sub-threshold noise.
        let samples = samples_at_100hz(100, |t| 9.81 + 0.05 * (t * 50.0).sin());
        let segments = detect_walking_activity(&samples, 100.0).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_sustained_walking_detected() {
        // 6 s of strong periodic acceleration.
        let samples = samples_at_100hz(600, |t| {
            9.81 + 3.0 * (2.0 * std::f64::consts::PI * 1.8 * t).sin()
        });
        let segments = detect_walking_activity(&samples, 100.0).unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].len() > 400, "segment too short: {}", segments[0].len());
    }

    #[test]
    fn test_walk_pause_walk_yields_two_segments() {
        let mut samples = Vec::new();
        let walk = |t: f64| 9.81 + 3.0 * (2.0 * std::f64::consts::PI * 1.8 * t).sin();
        // 4 s walk, 5 s still, 4 s walk.
        for i in 0..1300 {
            let t = i as f64 / 100.0;
            let z = if t < 4.0 {
                walk(t)
            } else if t < 9.0 {
                9.81
            } else {
                walk(t)
            };
            samples.push(SensorSample::new((t * 1e9) as i64, [0.0, 0.0, z], [0.0; 3]));
        }
        let segments = detect_walking_activity(&samples, 100.0).unwrap();
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_invalid_sample_rate_fails_fast() {
        let samples = samples_at_100hz(300, |_| 9.81);
        assert_eq!(
            detect_walking_activity(&samples, 0.0).unwrap_err(),
            AnalysisError::InvalidSampleRate(0.0)
        );
        assert!(detect_walking_activity(&samples, f64::NAN).is_err());
    }
}
