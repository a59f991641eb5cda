//! Velocity-integration filter
//!
//! Turns absolute pen positions into an integrated, optionally accelerated
//! cursor position:
//!
//! 1. [`transform`] - device space <-> unit space mapping
//! 2. [`acceleration`] - power-curve velocity warps
//! 3. [`timing`] - monotonic stopwatch and smoothed report interval
//! 4. [`integrator`] - the consume/update state machine tying them together
//!
//! # Architecture
//!
//! ```text
//! Report ──► consume ──► velocity ──► update (per emission tick) ──► Report
//!            (to_unit)               (position += warp(velocity),
//!                                     from_unit)
//! ```

pub mod acceleration;
pub mod integrator;
pub mod settings;
pub mod timing;
pub mod transform;

pub use acceleration::AccelerationCurve;
pub use integrator::{IntegratorPhase, MotionIntegrator};
pub use settings::IntegratorSettings;
pub use timing::{MonotonicStopwatch, ReportIntervalAverage, Stopwatch};
pub use transform::UnitSpace;
