//! Velocity-integrating cursor filter for pen tablet report pipelines
//!
//! Converts absolute pen positions into an integrated, optionally
//! accelerated cursor position that moves relative to where the pen is held
//! instead of following it one-to-one.
//!
//! - [`filter`] - the integrator and its pure building blocks
//! - [`pipeline`] - tokio host that drives consume and update phases
//! - [`report`] - report types flowing through the pipeline
//! - [`replay`] - text recordings of report streams
//! - [`config`] - TOML configuration

pub mod config;
pub mod filter;
pub mod pipeline;
pub mod replay;
pub mod report;

pub use filter::{IntegratorSettings, MotionIntegrator};
pub use report::DeviceReport;
