use tracing::{debug, info};

use super::acceleration::AccelerationCurve;
use super::settings::IntegratorSettings;
use super::timing::{MonotonicStopwatch, ReportIntervalAverage, Stopwatch};
use super::transform::UnitSpace;
use crate::report::{DeviceReport, Point};

/// Phase of the consume/update cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorPhase {
    AwaitingReport,
    // a positional report was consumed, updates integrate its velocity
    HasVelocity,
}

/// Integrates absolute pen positions into a relative cursor position
///
/// The host calls [`consume`](Self::consume) for every incoming report and
/// [`update`](Self::update) on its own emission schedule. Each positional
/// report sets the velocity; each update adds that velocity (optionally
/// warped) to the integrated position and emits the report with the
/// position converted back to screen pixels.
///
/// Calls must be serialized by the host. The integrator holds no locks.
///
/// # Examples
///
/// ```rust
/// use cursor_integrate::filter::{IntegratorSettings, MotionIntegrator};
/// use cursor_integrate::report::{DeviceReport, TabletReport};
///
/// let settings = IntegratorSettings {
///     input_sensitivity: 1.0,
///     ..Default::default()
/// };
/// let mut integrator = MotionIntegrator::new(settings);
///
/// assert!(integrator.consume(TabletReport::new(1920.0, 540.0, 0).into()).is_none());
/// let emitted = integrator.update().and_then(|report| report.position()).unwrap();
/// assert!((emitted.x - 1920.0).abs() < 1e-3);
/// assert!((emitted.y - 540.0).abs() < 1e-3);
/// ```
#[derive(Debug)]
pub struct MotionIntegrator<W: Stopwatch = MonotonicStopwatch> {
    settings: IntegratorSettings,
    space: UnitSpace,
    curve: AccelerationCurve,

    // Integrated position and per-tick velocity, both in unit space
    position: Point,
    velocity: Point,

    report_interval: ReportIntervalAverage,
    stopwatch: W,

    // Most recently consumed report, emitted with a rewritten position
    state: Option<DeviceReport>,
    in_range: bool,
}

impl MotionIntegrator<MonotonicStopwatch> {
    pub fn new(settings: IntegratorSettings) -> Self {
        Self::with_stopwatch(settings, MonotonicStopwatch::start())
    }
}

impl Default for MotionIntegrator<MonotonicStopwatch> {
    fn default() -> Self {
        Self::new(IntegratorSettings::default())
    }
}

impl<W: Stopwatch> MotionIntegrator<W> {
    pub fn with_stopwatch(settings: IntegratorSettings, stopwatch: W) -> Self {
        info!("Creating motion integrator with settings: {:?}", settings);
        Self {
            space: UnitSpace::new(settings.screen_width, settings.screen_height),
            curve: settings.acceleration_curve(),
            settings,
            position: Point::zeros(),
            velocity: Point::zeros(),
            report_interval: ReportIntervalAverage::default(),
            stopwatch,
            state: None,
            in_range: true,
        }
    }

    /// Input phase, called once per incoming report.
    ///
    /// Positional reports set the velocity and return `None`. Any other
    /// report is returned unchanged so the host forwards it right away.
    pub fn consume(&mut self, report: DeviceReport) -> Option<DeviceReport> {
        if let Some(near) = report.proximity() {
            debug!("Proximity changed, near: {}", near);
            self.in_range = near;
        }

        match &report {
            DeviceReport::Tablet(tablet) => {
                let delta = self.stopwatch.restart();
                if !self.report_interval.fold(delta) {
                    debug!(
                        "Report gap of {:.1}ms treated as stall, interval average kept at {:.3}ms",
                        delta.as_secs_f32() * 1000.0,
                        self.report_interval.average_ms()
                    );
                }

                self.velocity =
                    self.space.to_unit(tablet.position) * self.settings.input_sensitivity;
                self.in_range = true;
                self.state = Some(report);
                None
            }
            _ => {
                self.state = Some(report.clone());
                Some(report)
            }
        }
    }

    /// Output phase, called on every emission tick.
    ///
    /// Returns `None` without touching the position unless the current
    /// report is positional and the device is in range.
    pub fn update(&mut self) -> Option<DeviceReport> {
        if !self.in_range {
            return None;
        }
        let Some(DeviceReport::Tablet(report)) = self.state.as_mut() else {
            return None;
        };

        self.position += self.curve.apply(self.velocity);
        report.position = self
            .space
            .from_unit(self.position * self.settings.output_sensitivity);

        Some(DeviceReport::Tablet(report.clone()))
    }

    pub fn reset(&mut self) {
        debug!("Resetting integrator state");
        self.position = Point::zeros();
        self.velocity = Point::zeros();
        self.state = None;
    }

    pub fn apply_settings(&mut self, settings: IntegratorSettings) {
        info!("Applying integrator settings: {:?}", settings);
        self.space = UnitSpace::new(settings.screen_width, settings.screen_height);
        self.curve = settings.acceleration_curve();
        self.settings = settings;
    }

    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.settings.screen_width = width;
        self.settings.screen_height = height;
        self.space = UnitSpace::new(width, height);
    }

    pub fn set_input_sensitivity(&mut self, sensitivity: f32) {
        self.settings.input_sensitivity = sensitivity;
    }

    pub fn set_output_sensitivity(&mut self, sensitivity: f32) {
        self.settings.output_sensitivity = sensitivity;
    }

    pub fn set_acceleration(&mut self, enabled: bool, exponent: f32, component_wise: bool) {
        self.settings.apply_acceleration = enabled;
        self.settings.acceleration_exponent = exponent;
        self.settings.apply_acceleration_component_wise = component_wise;
        self.curve = self.settings.acceleration_curve();
    }

    pub fn set_in_range(&mut self, in_range: bool) {
        self.in_range = in_range;
    }

    pub fn is_in_range(&self) -> bool {
        self.in_range
    }

    pub fn settings(&self) -> &IntegratorSettings {
        &self.settings
    }

    pub fn unit_space(&self) -> &UnitSpace {
        &self.space
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn report_interval_avg(&self) -> f32 {
        self.report_interval.average_ms()
    }

    pub fn phase(&self) -> IntegratorPhase {
        match self.state {
            Some(DeviceReport::Tablet(_)) => IntegratorPhase::HasVelocity,
            _ => IntegratorPhase::AwaitingReport,
        }
    }
}
