use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::pipeline_handle::{PipelineError, PipelineSettings};
use crate::filter::{IntegratorSettings, MotionIntegrator, Stopwatch};
use crate::report::DeviceReport;

/// Counters of one pipeline run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineStats {
    pub consumed: u64,
    pub emitted: u64,
    pub passed_through: u64,
    pub report_interval_avg_ms: f32,
}

// Marks the device out of range after a gap in positional reports
struct RangeTracker {
    timeout: Duration,
    last_positional: Option<Instant>,
}

impl RangeTracker {
    fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_positional: None,
        }
    }

    fn record(&mut self, report: &DeviceReport) {
        if report.is_positional() {
            self.last_positional = Some(Instant::now());
        }
    }

    fn is_stale(&self) -> bool {
        self.last_positional
            .is_some_and(|last| last.elapsed() > self.timeout)
    }
}

async fn forward(
    output_sender: &mpsc::Sender<DeviceReport>,
    report: DeviceReport,
) -> Result<(), PipelineError> {
    output_sender
        .send(report)
        .await
        .map_err(|_| PipelineError::ChannelClosed("output".to_string()))
}

pub(crate) async fn run_filter_loop<W: Stopwatch>(
    mut integrator: MotionIntegrator<W>,
    settings: PipelineSettings,
    mut report_receiver: mpsc::Receiver<DeviceReport>,
    output_sender: mpsc::Sender<DeviceReport>,
    mut settings_receiver: watch::Receiver<IntegratorSettings>,
    cancel: CancellationToken,
) -> Result<PipelineStats, PipelineError> {
    info!(
        "Starting filter loop with {}us emission interval",
        settings.emission_interval_us
    );

    let mut emission_timer =
        tokio::time::interval(Duration::from_micros(settings.emission_interval_us.max(1)));
    // late ticks are dropped, a burst of catch-up updates would jump the cursor
    emission_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let stats_interval = Duration::from_secs(settings.stats_interval_secs.max(1));
    let mut stats_timer = tokio::time::interval_at(Instant::now() + stats_interval, stats_interval);

    let mut range = RangeTracker::new(Duration::from_millis(settings.range_timeout_ms));
    let mut stats = PipelineStats::default();
    let mut settings_open = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Filter loop cancelled");
                break;
            }

            maybe_report = report_receiver.recv() => {
                let Some(report) = maybe_report else {
                    info!("Report channel closed, stopping filter loop");
                    break;
                };
                stats.consumed += 1;
                range.record(&report);

                if let Some(passthrough) = integrator.consume(report) {
                    debug!(
                        "Forwarding non-positional report '{}' from {}",
                        passthrough,
                        passthrough.timestamp().format("%H:%M:%S.%3f")
                    );
                    stats.passed_through += 1;
                    forward(&output_sender, passthrough).await?;
                }
            }

            _ = emission_timer.tick() => {
                if integrator.is_in_range() && range.is_stale() {
                    debug!("No positional report for {:?}, device out of range", range.timeout);
                    integrator.set_in_range(false);
                }

                if let Some(emitted) = integrator.update() {
                    stats.emitted += 1;
                    forward(&output_sender, emitted).await?;
                }
            }

            changed = settings_receiver.changed(), if settings_open => {
                match changed {
                    Ok(()) => {
                        let new_settings = settings_receiver.borrow_and_update().clone();
                        integrator.apply_settings(new_settings);
                    }
                    Err(_) => {
                        warn!("Settings channel closed, keeping current settings");
                        settings_open = false;
                    }
                }
            }

            _ = stats_timer.tick() => {
                info!(
                    "Filter stats: {} consumed, {} emitted, {} passed through, report interval {:.2}ms",
                    stats.consumed,
                    stats.emitted,
                    stats.passed_through,
                    integrator.report_interval_avg()
                );
            }
        }
    }

    stats.report_interval_avg_ms = integrator.report_interval_avg();
    info!("Filter loop finished: {:?}", stats);
    Ok(stats)
}
