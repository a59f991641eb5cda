//! Pipeline Handle - spawning and lifecycle of the filter task
//!

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::filter_loop::{run_filter_loop, PipelineStats};
use crate::filter::{IntegratorSettings, MotionIntegrator, Stopwatch};
use crate::report::DeviceReport;

/// Scheduling settings of the host pipeline
///
/// # Examples
///
/// ```rust
/// use cursor_integrate::pipeline::PipelineSettings;
///
/// // 500 Hz emission, lenient range detection
/// let settings = PipelineSettings {
///     emission_interval_us: 2000,
///     range_timeout_ms: 250,
///     ..Default::default()
/// };
/// assert_eq!(settings.channel_capacity, 1000);
/// ```
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    // Update phase period, independent of the device report rate
    pub emission_interval_us: u64,
    // Out of range once no positional report arrived for this long
    pub range_timeout_ms: u64,
    pub channel_capacity: usize,
    pub stats_interval_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            emission_interval_us: 1000, // 1 kHz
            range_timeout_ms: 100,
            channel_capacity: 1000,
            stats_interval_secs: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error("Filter task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Handle to a running filter task
///
/// The task ends when the report channel closes, when the downstream
/// receiver is dropped, or on [`shutdown`](Self::shutdown).
pub struct PipelineHandle {
    settings_sender: watch::Sender<IntegratorSettings>,
    cancel: CancellationToken,
    task: JoinHandle<Result<PipelineStats, PipelineError>>,
}

impl PipelineHandle {
    /// Spawns the filter task with a monotonic clock
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        settings: PipelineSettings,
        filter_settings: IntegratorSettings,
        report_receiver: mpsc::Receiver<DeviceReport>,
        output_sender: mpsc::Sender<DeviceReport>,
    ) -> Self {
        let integrator = MotionIntegrator::new(filter_settings);
        Self::spawn_with(settings, integrator, report_receiver, output_sender)
    }

    pub fn spawn_with<W: Stopwatch + 'static>(
        settings: PipelineSettings,
        integrator: MotionIntegrator<W>,
        report_receiver: mpsc::Receiver<DeviceReport>,
        output_sender: mpsc::Sender<DeviceReport>,
    ) -> Self {
        info!("Spawning filter pipeline with settings: {:?}", settings);

        let (settings_sender, settings_receiver) = watch::channel(integrator.settings().clone());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_filter_loop(
            integrator,
            settings,
            report_receiver,
            output_sender,
            settings_receiver,
            cancel.clone(),
        ));
        debug!("Filter task spawned");

        Self {
            settings_sender,
            cancel,
            task,
        }
    }

    pub fn update_settings(&self, settings: IntegratorSettings) -> Result<(), PipelineError> {
        debug!("Sending settings update to filter task");
        self.settings_sender
            .send(settings)
            .map_err(|_| PipelineError::ChannelClosed("settings".to_string()))
    }

    /// Stops the filter task and returns its final stats
    pub async fn shutdown(self) -> Result<PipelineStats, PipelineError> {
        info!("Shutting down filter pipeline");
        self.cancel.cancel();
        self.task.await?
    }

    /// Waits for the filter task to end on its own
    pub async fn join(self) -> Result<PipelineStats, PipelineError> {
        self.task.await?
    }
}
