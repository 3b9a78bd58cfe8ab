//! Gait Analysis Core Library
//!
//! Converts raw leg-worn IMU recordings into per-limb gait metrics and
//! bilateral symmetry scores.
//!
//! # Design Philosophy
//!
//! This library is built on several core principles:
//!
//! - **Degrade, don't throw**: Too little or too noisy data yields a
//!   zero-valued [`LegMetrics`] sentinel; errors are reserved for caller
//!   contract violations like mismatched channel lengths.
//! - **One pass, owned data**: The engine never retains samples beyond a
//!   single analysis call.
//! - **Deterministic output**: The same segments always produce the same
//!   metrics; there is no hidden state between calls.
//!
//! # Example
//!
//! ```ignore
//! use gait_core::{detect_walking_activity, estimate_sample_rate, process_full_analysis, LegSide};
//!
//! let rate = estimate_sample_rate(&samples);
//! let segments = detect_walking_activity(&samples, rate)?;
//! let analysis = process_full_analysis(&segments, LegSide::Left, None, None)?;
//! println!("steps: {}", analysis.local.total_steps);
//! ```

pub mod activity;
pub mod events;
pub mod metrics;
pub mod orientation;
pub mod pipeline;
pub mod signal;
pub mod stats;
pub mod symmetry;
pub mod trajectory;
pub mod types;

#[cfg(test)]
mod integration_tests;

// Re-export the primary entry points and commonly used types
pub use activity::{detect_walking_activity, estimate_sample_rate};
pub use pipeline::{analyze_single_limb, process_full_analysis};
pub use symmetry::{compare_legs, estimate_single_leg_symmetry};
pub use types::{
    AnalysisError, ComparisonMetrics, FullAnalysis, GaitEvent, GaitEventKind, LegMetrics, LegSide,
    SensorSample, WalkSegment,
};
