//! Orientation estimation via gradient-descent AHRS fusion.
//!
//! This module provides per-sample attitude estimation by fusing
//! accelerometer, gyroscope, and (when valid) magnetometer data using the
//! Madgwick Attitude and Heading Reference System (AHRS) algorithm: gyro
//! integration corrected by a normalized gradient-descent step that pulls
//! the quaternion toward agreement with the measured gravity and magnetic
//! field directions.
//!
//! Degradation rules:
//! - A zero-vector magnetometer sample falls back to the IMU-only
//!   correction step (accelerometer only) instead of failing.
//! - A zero-vector accelerometer sample skips the correction entirely;
//!   the quaternion advances on gyro integration alone.
//!
//! The running quaternion is an explicit accumulator threaded through the
//! iteration: each sample's estimate depends on the previous one, which
//! forbids parallelism within a segment but leaves independent segments
//! (and the two limbs of a paired analysis) free to run concurrently.
//!
//! Reference: Madgwick, S. O. H. (2010). "An efficient orientation filter
//! for inertial and inertial/magnetic sensor arrays."

use crate::types::{AnalysisError, LegSide, LimbAngles};

/// Gradient-descent step gain. Higher converges faster but chases noise.
pub const MADGWICK_BETA: f64 = 0.1;

/// A unit quaternion (w, x, y, z) representing a 3D rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// Scalar (real) part.
    pub w: f64,
    /// Vector part x.
    pub x: f64,
    /// Vector part y.
    pub y: f64,
    /// Vector part z.
    pub z: f64,
}

impl Quaternion {
    /// Builds a quaternion from components.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Identity rotation.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Scales to unit length. A degenerate near-zero quaternion is left
    /// untouched rather than amplified into NaN.
    pub fn normalize(&mut self) {
        let n = self.norm();
        if n > 1e-12 {
            self.w /= n;
            self.x /= n;
            self.y /= n;
            self.z /= n;
        }
    }

    /// Conjugate; the inverse rotation for unit quaternions.
    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Hamilton product `self * other`.
    pub fn multiply(&self, other: &Self) -> Self {
        Self::new(
            self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        )
    }

    /// Rotates a vector: `q * v * q⁻¹`.
    pub fn rotate_vector(&self, v: [f64; 3]) -> [f64; 3] {
        let p = Self::new(0.0, v[0], v[1], v[2]);
        let rotated = self.multiply(&p).multiply(&self.conjugate());
        [rotated.x, rotated.y, rotated.z]
    }
}

/// Madgwick AHRS accumulator: one running unit quaternion, advanced
/// sample-by-sample.
#[derive(Debug, Clone)]
pub struct MadgwickAhrs {
    quaternion: Quaternion,
    sample_period: f64,
    beta: f64,
}

impl MadgwickAhrs {
    /// Creates a filter for the given sample period (seconds per sample)
    /// and gradient gain.
    pub fn new(sample_period: f64, beta: f64) -> Self {
        Self {
            quaternion: Quaternion::identity(),
            sample_period,
            beta,
        }
    }

    /// Current attitude estimate.
    pub fn quaternion(&self) -> Quaternion {
        self.quaternion
    }

    /// Full MARG update from gyro (rad/s), accelerometer (m/s²), and
    /// magnetometer (µT) readings.
    ///
    /// A zero magnetometer vector delegates to [`Self::update_imu`], which
    /// avoids the NaN that normalizing it would produce.
    pub fn update(&mut self, gyro: [f64; 3], acc: [f64; 3], mag: [f64; 3]) {
        let [gx, gy, gz] = gyro;
        let [ax, ay, az] = acc;
        let [mx, my, mz] = mag;

        if mx == 0.0 && my == 0.0 && mz == 0.0 {
            self.update_imu(gyro, acc);
            return;
        }

        let q0 = self.quaternion.w;
        let q1 = self.quaternion.x;
        let q2 = self.quaternion.y;
        let q3 = self.quaternion.z;

        // Rate of change of quaternion from gyroscope.
        let mut q_dot1 = 0.5 * (-q1 * gx - q2 * gy - q3 * gz);
        let mut q_dot2 = 0.5 * (q0 * gx + q2 * gz - q3 * gy);
        let mut q_dot3 = 0.5 * (q0 * gy - q1 * gz + q3 * gx);
        let mut q_dot4 = 0.5 * (q0 * gz + q1 * gy - q2 * gx);

        // Corrective step only with a valid accelerometer reading.
        if !(ax == 0.0 && ay == 0.0 && az == 0.0) {
            let recip = 1.0 / (ax * ax + ay * ay + az * az).sqrt();
            let ax = ax * recip;
            let ay = ay * recip;
            let az = az * recip;

            let recip = 1.0 / (mx * mx + my * my + mz * mz).sqrt();
            let mx = mx * recip;
            let my = my * recip;
            let mz = mz * recip;

            let _2q0mx = 2.0 * q0 * mx;
            let _2q0my = 2.0 * q0 * my;
            let _2q0mz = 2.0 * q0 * mz;
            let _2q1mx = 2.0 * q1 * mx;
            let _2q0 = 2.0 * q0;
            let _2q1 = 2.0 * q1;
            let _2q2 = 2.0 * q2;
            let _2q3 = 2.0 * q3;
            let _2q0q2 = 2.0 * q0 * q2;
            let _2q2q3 = 2.0 * q2 * q3;
            let q0q0 = q0 * q0;
            let q0q1 = q0 * q1;
            let q0q2 = q0 * q2;
            let q0q3 = q0 * q3;
            let q1q1 = q1 * q1;
            let q1q2 = q1 * q2;
            let q1q3 = q1 * q3;
            let q2q2 = q2 * q2;
            let q2q3 = q2 * q3;
            let q3q3 = q3 * q3;

            // Reference direction of Earth's magnetic field.
            let hx = mx * q0q0 - _2q0my * q3 + _2q0mz * q2 + mx * q1q1 + _2q1 * my * q2
                + _2q1 * mz * q3
                - mx * q2q2
                - mx * q3q3;
            let hy = _2q0mx * q3 + my * q0q0 - _2q0mz * q1 + _2q1mx * q2 - my * q1q1 + my * q2q2
                + _2q2 * mz * q3
                - my * q3q3;
            let _2bx = (hx * hx + hy * hy).sqrt();
            let _2bz = -_2q0mx * q2 + _2q0my * q1 + mz * q0q0 + _2q1mx * q3 - mz * q1q1
                + _2q2 * my * q3
                - mz * q2q2
                + mz * q3q3;
            let _4bx = 2.0 * _2bx;
            let _4bz = 2.0 * _2bz;

            // Gradient-descent corrective step.
            let s0 = -_2q2 * (2.0 * q1q3 - _2q0q2 - ax) + _2q1 * (2.0 * q0q1 + _2q2q3 - ay)
                - _2bz * q2 * (_2bx * (0.5 - q2q2 - q3q3) + _2bz * (q1q3 - q0q2) - mx)
                + (-_2bx * q3 + _2bz * q1)
                    * (_2bx * (q1q2 - q0q3) + _2bz * (q0q1 + q2q3) - my)
                + _2bx * q2 * (_2bx * (q0q2 + q1q3) + _2bz * (0.5 - q1q1 - q2q2) - mz);
            let s1 = _2q3 * (2.0 * q1q3 - _2q0q2 - ax) + _2q0 * (2.0 * q0q1 + _2q2q3 - ay)
                - 4.0 * q1 * (1.0 - 2.0 * q1q1 - 2.0 * q2q2 - az)
                + _2bz * q3 * (_2bx * (0.5 - q2q2 - q3q3) + _2bz * (q1q3 - q0q2) - mx)
                + (_2bx * q2 + _2bz * q0)
                    * (_2bx * (q1q2 - q0q3) + _2bz * (q0q1 + q2q3) - my)
                + (_2bx * q3 - _4bz * q1)
                    * (_2bx * (q0q2 + q1q3) + _2bz * (0.5 - q1q1 - q2q2) - mz);
            let s2 = -_2q0 * (2.0 * q1q3 - _2q0q2 - ax) + _2q3 * (2.0 * q0q1 + _2q2q3 - ay)
                - 4.0 * q2 * (1.0 - 2.0 * q1q1 - 2.0 * q2q2 - az)
                + (-_4bx * q2 - _2bz * q0)
                    * (_2bx * (0.5 - q2q2 - q3q3) + _2bz * (q1q3 - q0q2) - mx)
                + (_2bx * q1 + _2bz * q3)
                    * (_2bx * (q1q2 - q0q3) + _2bz * (q0q1 + q2q3) - my)
                + (_2bx * q0 - _4bz * q2)
                    * (_2bx * (q0q2 + q1q3) + _2bz * (0.5 - q1q1 - q2q2) - mz);
            let s3 = _2q1 * (2.0 * q1q3 - _2q0q2 - ax) + _2q2 * (2.0 * q0q1 + _2q2q3 - ay)
                + (-_4bx * q3 + _2bz * q1)
                    * (_2bx * (0.5 - q2q2 - q3q3) + _2bz * (q1q3 - q0q2) - mx)
                + (-_2bx * q0 + _2bz * q2)
                    * (_2bx * (q1q2 - q0q3) + _2bz * (q0q1 + q2q3) - my)
                + _2bx * q1 * (_2bx * (q0q2 + q1q3) + _2bz * (0.5 - q1q1 - q2q2) - mz);

            // A zero step means the estimate already agrees with the
            // measurements; normalizing it would divide by zero.
            let step_norm = (s0 * s0 + s1 * s1 + s2 * s2 + s3 * s3).sqrt();
            if step_norm > 0.0 {
                q_dot1 -= self.beta * s0 / step_norm;
                q_dot2 -= self.beta * s1 / step_norm;
                q_dot3 -= self.beta * s2 / step_norm;
                q_dot4 -= self.beta * s3 / step_norm;
            }
        }

        self.integrate(q_dot1, q_dot2, q_dot3, q_dot4);
    }

    /// IMU-only update (no magnetometer): gravity alignment alone corrects
    /// pitch and roll; yaw integrates open-loop.
    pub fn update_imu(&mut self, gyro: [f64; 3], acc: [f64; 3]) {
        let [gx, gy, gz] = gyro;
        let [ax, ay, az] = acc;

        let q0 = self.quaternion.w;
        let q1 = self.quaternion.x;
        let q2 = self.quaternion.y;
        let q3 = self.quaternion.z;

        let mut q_dot1 = 0.5 * (-q1 * gx - q2 * gy - q3 * gz);
        let mut q_dot2 = 0.5 * (q0 * gx + q2 * gz - q3 * gy);
        let mut q_dot3 = 0.5 * (q0 * gy - q1 * gz + q3 * gx);
        let mut q_dot4 = 0.5 * (q0 * gz + q1 * gy - q2 * gx);

        if !(ax == 0.0 && ay == 0.0 && az == 0.0) {
            let recip = 1.0 / (ax * ax + ay * ay + az * az).sqrt();
            let ax = ax * recip;
            let ay = ay * recip;
            let az = az * recip;

            let _2q0 = 2.0 * q0;
            let _2q1 = 2.0 * q1;
            let _2q2 = 2.0 * q2;
            let _2q3 = 2.0 * q3;
            let _4q0 = 4.0 * q0;
            let _4q1 = 4.0 * q1;
            let _4q2 = 4.0 * q2;
            let _8q1 = 8.0 * q1;
            let _8q2 = 8.0 * q2;
            let q0q0 = q0 * q0;
            let q1q1 = q1 * q1;
            let q2q2 = q2 * q2;
            let q3q3 = q3 * q3;

            let s0 = _4q0 * q2q2 + _2q2 * ax + _4q0 * q1q1 - _2q1 * ay;
            let s1 = _4q1 * q3q3 - _2q3 * ax + 4.0 * q0q0 * q1 - _2q0 * ay - _4q1
                + _8q1 * q1q1
                + _8q1 * q2q2
                + _4q1 * az;
            let s2 = 4.0 * q0q0 * q2 + _2q0 * ax + _4q2 * q3q3 - _2q3 * ay - _4q2
                + _8q2 * q1q1
                + _8q2 * q2q2
                + _4q2 * az;
            let s3 = 4.0 * q1q1 * q3 - _2q1 * ax + 4.0 * q2q2 * q3 - _2q2 * ay;

            let step_norm = (s0 * s0 + s1 * s1 + s2 * s2 + s3 * s3).sqrt();
            if step_norm > 0.0 {
                q_dot1 -= self.beta * s0 / step_norm;
                q_dot2 -= self.beta * s1 / step_norm;
                q_dot3 -= self.beta * s2 / step_norm;
                q_dot4 -= self.beta * s3 / step_norm;
            }
        }

        self.integrate(q_dot1, q_dot2, q_dot3, q_dot4);
    }

    /// Integrates the quaternion rate over one sample period and
    /// renormalizes.
    fn integrate(&mut self, q_dot1: f64, q_dot2: f64, q_dot3: f64, q_dot4: f64) {
        self.quaternion.w += q_dot1 * self.sample_period;
        self.quaternion.x += q_dot2 * self.sample_period;
        self.quaternion.y += q_dot3 * self.sample_period;
        self.quaternion.z += q_dot4 * self.sample_period;
        self.quaternion.normalize();
    }
}

/// Runs the AHRS over a conditioned segment, producing one quaternion per
/// sample. Strictly sequential within the segment.
///
/// Fails fast when the per-channel arrays disagree in length; that is a
/// caller contract violation, not noisy data.
pub fn estimate_orientation(
    acc: &[[f64; 3]],
    gyro: &[[f64; 3]],
    mag: &[[f64; 3]],
    sample_rate: f64,
) -> Result<Vec<Quaternion>, AnalysisError> {
    if sample_rate <= 0.0 || !sample_rate.is_finite() {
        return Err(AnalysisError::InvalidSampleRate(sample_rate));
    }
    if gyro.len() != acc.len() {
        return Err(AnalysisError::MismatchedLengths {
            expected: acc.len(),
            actual: gyro.len(),
        });
    }
    if mag.len() != acc.len() {
        return Err(AnalysisError::MismatchedLengths {
            expected: acc.len(),
            actual: mag.len(),
        });
    }

    let mut ahrs = MadgwickAhrs::new(1.0 / sample_rate, MADGWICK_BETA);
    let mut quaternions = Vec::with_capacity(acc.len());
    for i in 0..acc.len() {
        ahrs.update(gyro[i], acc[i], mag[i]);
        quaternions.push(ahrs.quaternion());
    }
    Ok(quaternions)
}

/// Extracts anatomical Euler angles (degrees) from an orientation stream.
///
/// Pitch maps to flexion/extension, roll to abduction/adduction, yaw to
/// turning. The roll sign is inverted for the right limb so both sides
/// share one anatomical convention.
pub fn euler_angles(quaternions: &[Quaternion], leg_side: LegSide) -> LimbAngles {
    let mut angles = LimbAngles {
        flexion: Vec::with_capacity(quaternions.len()),
        abduction: Vec::with_capacity(quaternions.len()),
        yaw: Vec::with_capacity(quaternions.len()),
    };

    for q in quaternions {
        let (w, x, y, z) = (q.w, q.x, q.y, q.z);

        // Pitch (Y-axis rotation); asin input clamped against rounding.
        let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
        angles.flexion.push(pitch.to_degrees());

        // Roll (X-axis rotation).
        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let roll_deg = roll.to_degrees();
        angles.abduction.push(match leg_side {
            LegSide::Left => roll_deg,
            LegSide::Right => -roll_deg,
        });

        // Yaw (Z-axis rotation).
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));
        angles.yaw.push(yaw.to_degrees());
    }

    angles
}
