//! Core data types for the gait analysis pipeline.
//!
//! This module defines the fundamental types and structures used throughout
//! the gait metric extraction pipeline. All types are created fresh per
//! analysis invocation; there is no cross-call mutable state.
//!
//! Design principle: Types should make intent obvious. If a concept exists,
//! it gets a type. Never pass raw tuples or untyped collections across
//! boundaries.
//!
//! The sentinel contract: every insufficient-data condition degrades to a
//! zero-valued [`LegMetrics`], detectable via [`LegMetrics::is_insufficient`].
//! Only caller contract violations (mismatched channel lengths, a bogus
//! sample rate) surface as [`AnalysisError`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single raw inertial + barometric sample.
///
/// This represents the minimal input contract: three-axis accelerometer,
/// three-axis gyroscope, three-axis magnetometer, barometric pressure, and a
/// monotonic timestamp. The capture layer produces it; the core never
/// interprets it beyond these fields.
///
/// # Units
///
/// - Acceleration: m/s²
/// - Angular velocity: rad/s
/// - Magnetic field: µT
/// - Pressure: hPa
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorSample {
    /// Monotonic timestamp in nanoseconds. Required for temporal ordering.
    pub timestamp_nanos: i64,

    /// Accelerometer reading [x, y, z] in m/s².
    pub acc: [f64; 3],

    /// Gyroscope reading [x, y, z] in rad/s.
    pub gyro: [f64; 3],

    /// Magnetometer reading [x, y, z] in µT. An exact zero vector marks the
    /// reading as unavailable for that sample.
    pub mag: [f64; 3],

    /// Barometric pressure in hPa. Zero marks the channel as absent.
    pub pressure_hpa: f64,
}

impl SensorSample {
    /// Creates a sample with accelerometer and gyroscope only.
    ///
    /// Magnetometer and pressure are zeroed, which downstream stages treat
    /// as "channel unavailable".
    pub fn new(timestamp_nanos: i64, acc: [f64; 3], gyro: [f64; 3]) -> Self {
        Self {
            timestamp_nanos,
            acc,
            gyro,
            mag: [0.0; 3],
            pressure_hpa: 0.0,
        }
    }

    /// Creates a sample with all sensor channels populated.
    pub fn with_all_sensors(
        timestamp_nanos: i64,
        acc: [f64; 3],
        gyro: [f64; 3],
        mag: [f64; 3],
        pressure_hpa: f64,
    ) -> Self {
        Self {
            timestamp_nanos,
            acc,
            gyro,
            mag,
            pressure_hpa,
        }
    }

    /// Magnitude of the acceleration vector in m/s².
    pub fn acc_magnitude(&self) -> f64 {
        let [x, y, z] = self.acc;
        (x * x + y * y + z * z).sqrt()
    }

    /// Magnitude of the angular-rate vector in rad/s.
    pub fn gyro_magnitude(&self) -> f64 {
        let [x, y, z] = self.gyro;
        (x * x + y * y + z * z).sqrt()
    }
}

/// An ordered, time-contiguous run of samples classified as walking.
///
/// Owned by the caller that passes it in; the core never mutates or retains
/// a segment beyond one analysis call.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WalkSegment {
    /// The samples of this segment, in timestamp order.
    pub samples: Vec<SensorSample>,
}

impl WalkSegment {
    /// Creates a segment from a sample run.
    pub fn new(samples: Vec<SensorSample>) -> Self {
        Self { samples }
    }

    /// Number of samples in the segment.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the segment holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Wall-clock span of the segment in seconds. Zero for < 2 samples.
    pub fn duration_secs(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp_nanos - first.timestamp_nanos) as f64 / 1e9
            }
            _ => 0.0,
        }
    }
}

/// Which limb a sample stream was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LegSide {
    /// Left thigh.
    Left,
    /// Right thigh.
    Right,
}

/// The kind of a detected gait event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GaitEventKind {
    /// Foot-ground contact.
    HeelStrike,
    /// Foot-ground release.
    ToeOff,
}

/// A gait event located in a segment's sample stream.
///
/// Heel-strike indices are strictly increasing within a detection run. For a
/// valid cycle exactly one toe-off lies strictly between two consecutive heel
/// strikes; its absence is tolerated, not fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaitEvent {
    /// Index into the segment's sample stream.
    pub sample_index: usize,
    /// Event classification.
    pub kind: GaitEventKind,
}

/// Per-sample trajectory in a segment-local global frame.
///
/// Reset at each segment boundary; there is no cross-segment continuity,
/// which bounds integration drift to a single segment. Used only to derive
/// relative distances within gait cycles, never as absolute navigation.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    /// Gravity-removed acceleration in the global frame, m/s².
    pub linear_acc: Vec<[f64; 3]>,
    /// Integrated velocity, m/s. Forced to zero during stationary samples.
    pub velocity: Vec<[f64; 3]>,
    /// Integrated position, m, starting at the origin.
    pub position: Vec<[f64; 3]>,
}

impl Trajectory {
    /// Number of per-sample entries.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// True when no samples were reconstructed.
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// Per-sample anatomical angles in degrees, derived from the orientation
/// stream. Roll is sign-inverted for the right limb so both sides share one
/// anatomical convention.
#[derive(Debug, Clone, Default)]
pub struct LimbAngles {
    /// Flexion/extension (pitch), degrees.
    pub flexion: Vec<f64>,
    /// Abduction/adduction (roll), degrees.
    pub abduction: Vec<f64>,
    /// Yaw, degrees. Drives turn counting.
    pub yaw: Vec<f64>,
}

impl LimbAngles {
    /// Number of per-sample entries.
    pub fn len(&self) -> usize {
        self.flexion.len()
    }

    /// True when no angles were extracted.
    pub fn is_empty(&self) -> bool {
        self.flexion.is_empty()
    }
}

/// Complete per-limb gait metrics.
///
/// `Default` is the zero-valued sentinel returned for insufficient data.
/// The raw series exist only for presentation; they are skipped during
/// serialization so collaborators persist and transmit scalars only.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegMetrics {
    /// Number of detected heel strikes. Zero means "insufficient data".
    pub total_steps: usize,
    /// Step rate in steps/min.
    pub cadence: f64,
    /// Mean gait-cycle duration in seconds.
    pub avg_gait_cycle: f64,
    /// Cycle-time coefficient of variation (stddev / mean).
    pub step_asymmetry: f64,
    /// Mean stance-phase duration in seconds.
    pub stance_time: f64,
    /// Mean swing-phase duration in seconds.
    pub swing_time: f64,
    /// Mean step length in meters, outlier-filtered.
    pub step_length_mean: f64,
    /// Step-length coefficient of variation.
    pub step_length_cv: f64,
    /// Variance of filtered acceleration magnitude (stability proxy).
    pub gait_stability: f64,
    /// Flexion angle range in degrees (98th − 2nd percentile).
    pub flexion_range: f64,
    /// Abduction angle range in degrees (98th − 2nd percentile).
    pub abduction_range: f64,
    /// Samples whose abduction z-score magnitude exceeds the threshold.
    pub abnormal_swing_count: usize,
    /// Mean peak vertical position during swing phases, meters.
    pub foot_clearance: f64,
    /// Mean mediolateral spread during swing phases, meters.
    pub circumduction: f64,
    /// Peak vertical linear acceleration normalized by gravity.
    pub grf_max: f64,
    /// Mean jerk magnitude in m/s³.
    pub jerk_avg: f64,
    /// Count of sustained yaw-rate excursions.
    pub total_turns: usize,
    /// Summed positive barometric altitude deltas, meters.
    pub total_altitude_gain: f64,
    /// Summed negative barometric altitude deltas, meters.
    pub total_altitude_loss: f64,
    /// Self-symmetry estimate (0-100) filled in single-limb mode.
    pub estimated_symmetry_score: f64,

    /// Per-cycle durations in seconds, for plotting.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_gait_cycles: Vec<f64>,
    /// Surviving per-cycle step lengths in meters.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_step_lengths: Vec<f64>,
    /// Per-sample flexion angles in degrees.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_flexion_angles: Vec<f64>,
    /// Per-sample abduction angles in degrees.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_abduction_angles: Vec<f64>,
    /// Per-sample yaw angles in degrees.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_yaw_angles: Vec<f64>,
    /// Smoothed barometric altitude series in meters.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_altitude: Vec<f64>,
    /// Per-sample time offsets from segment start, seconds.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_timestamps: Vec<f64>,
}

impl LegMetrics {
    /// True when the analysis degraded to the zero-valued sentinel.
    pub fn is_insufficient(&self) -> bool {
        self.total_steps == 0
    }
}

/// Bilateral comparison derived purely from two [`LegMetrics`] snapshots.
/// Carries no raw series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonMetrics {
    /// Gait-cycle duration symmetry index.
    pub time_symmetry: f64,
    /// Step-length symmetry index.
    pub step_length_symmetry: f64,
    /// Stance-time symmetry index.
    pub stance_time_symmetry: f64,
    /// Swing-time symmetry index.
    pub swing_time_symmetry: f64,
    /// Flexion-range symmetry index.
    pub flexion_range_symmetry: f64,
    /// Abduction-range symmetry index.
    pub abduction_range_symmetry: f64,
    /// Mann–Whitney U p-value over raw cycle times.
    pub time_symmetry_p_value: f64,
    /// Mann–Whitney U p-value over raw step lengths.
    pub step_length_symmetry_p_value: f64,
    /// Weighted overall score, clamped to [0, 100].
    pub overall_symmetry_score: f64,
}

impl Default for ComparisonMetrics {
    fn default() -> Self {
        Self {
            time_symmetry: 0.0,
            step_length_symmetry: 0.0,
            stance_time_symmetry: 0.0,
            swing_time_symmetry: 0.0,
            flexion_range_symmetry: 0.0,
            abduction_range_symmetry: 0.0,
            time_symmetry_p_value: 1.0,
            step_length_symmetry_p_value: 1.0,
            overall_symmetry_score: 0.0,
        }
    }
}

/// Result bundle of a full one- or two-limb analysis.
#[derive(Debug, Clone, Default)]
pub struct FullAnalysis {
    /// Metrics for the locally captured limb.
    pub local: LegMetrics,
    /// Metrics for the paired device's limb, when segments were supplied.
    pub remote: Option<LegMetrics>,
    /// Bilateral comparison, present only when both limbs were analyzed.
    pub comparison: Option<ComparisonMetrics>,
}

/// Caller contract violations. Noisy real-world data never lands here;
/// insufficient data degrades to the [`LegMetrics`] sentinel instead.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Per-axis channel arrays must be equally long.
    #[error("mismatched channel lengths: expected {expected}, got {actual}")]
    MismatchedLengths {
        /// Length of the reference channel.
        expected: usize,
        /// Length of the offending channel.
        actual: usize,
    },

    /// Sample rate must be finite and strictly positive.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f64),
}
