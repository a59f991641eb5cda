//! Reference host pipeline driving the integrator
//!
//! Runs the two filter phases from one tokio task so `consume` and `update`
//! are never executed concurrently:
//!
//! ```text
//! Reports ─[mpsc]→ filter task ─[mpsc]→ Downstream
//!                   ├ consume on every report
//!                   ├ update on every emission tick
//!                   └ apply_settings on watch change
//! ```
//!
//! 1. [`pipeline_handle`] - spawning, live settings, shutdown
//! 2. [`filter_loop`] - the select loop and range tracking

pub mod filter_loop;
pub mod pipeline_handle;

pub use filter_loop::PipelineStats;
pub use pipeline_handle::{PipelineError, PipelineHandle, PipelineSettings};
