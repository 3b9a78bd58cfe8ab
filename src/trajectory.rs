//! Strapdown Trajectory Reconstruction Module.
//!
//! Rebuilds foot trajectory from oriented inertial data:
//! - Gravity removal in the world frame via the orientation estimate
//! - Double integration of linear acceleration (velocity, then position)
//! - ZUPT (Zero Velocity Update) to arrest integration drift
//!
//! A sample counts as stationary when its acceleration magnitude sits
//! near gravity and its rotation rate is low; velocity is clamped to
//! zero for those samples before position integration.

use crate::orientation::Quaternion;
use crate::types::{AnalysisError, Trajectory};

/// Standard gravity (m/s^2).
pub const GRAVITY: f64 = 9.81;
/// Deviation from gravity magnitude below which a sample is stationary (m/s^2).
pub const ZUPT_ACC_THRESHOLD: f64 = 0.5;
/// Rotation rate below which a sample is stationary (rad/s).
pub const ZUPT_GYRO_THRESHOLD: f64 = 1.0;

fn magnitude(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// True when the sample looks motionless enough to zero velocity.
pub fn is_stationary(acc: [f64; 3], gyro: [f64; 3]) -> bool {
    (magnitude(acc) - GRAVITY).abs() < ZUPT_ACC_THRESHOLD
        && magnitude(gyro) < ZUPT_GYRO_THRESHOLD
}

/// Rotate body-frame acceleration into the world frame and remove gravity.
///
/// The orientation quaternions map world to body, so the conjugate takes
/// each acceleration sample back to the world frame before gravity is
/// subtracted from the vertical axis.
pub fn linear_acceleration(
    quaternions: &[Quaternion],
    acc: &[[f64; 3]],
) -> Result<Vec<[f64; 3]>, AnalysisError> {
    if quaternions.len() != acc.len() {
        return Err(AnalysisError::MismatchedLengths {
            expected: quaternions.len(),
            actual: acc.len(),
        });
    }
    Ok(quaternions
        .iter()
        .zip(acc.iter())
        .map(|(q, &a)| {
            let world = q.conjugate().rotate_vector(a);
            [world[0], world[1], world[2] - GRAVITY]
        })
        .collect())
}

/// Reconstruct velocity and position by strapdown integration with ZUPT.
///
/// `acc` and `gyro` are the filtered body-frame signals; `quaternions`
/// is the per-sample orientation estimate. All three channels must have
/// the same length and `sample_rate` must be positive.
pub fn reconstruct_trajectory(
    quaternions: &[Quaternion],
    acc: &[[f64; 3]],
    gyro: &[[f64; 3]],
    sample_rate: f64,
) -> Result<Trajectory, AnalysisError> {
    if !(sample_rate > 0.0) || !sample_rate.is_finite() {
        return Err(AnalysisError::InvalidSampleRate(sample_rate));
    }
    if acc.len() != gyro.len() {
        return Err(AnalysisError::MismatchedLengths {
            expected: acc.len(),
            actual: gyro.len(),
        });
    }
    let linear_acc = linear_acceleration(quaternions, acc)?;
    let dt = 1.0 / sample_rate;

    let mut velocity = vec![[0.0f64; 3]; linear_acc.len()];
    let mut position = vec![[0.0f64; 3]; linear_acc.len()];

    // The first sample anchors the trajectory at the origin.
    for i in 1..linear_acc.len() {
        let mut vel = velocity[i - 1];
        for axis in 0..3 {
            vel[axis] += linear_acc[i][axis] * dt;
        }
        if is_stationary(acc[i], gyro[i]) {
            vel = [0.0; 3];
        }
        velocity[i] = vel;
        for axis in 0..3 {
            position[i][axis] = position[i - 1][axis] + vel[axis] * dt;
        }
    }

    tracing::debug!(
        samples = linear_acc.len(),
        "trajectory reconstructed"
    );

    Ok(Trajectory {
        linear_acc,
        velocity,
        position,
    })
}
