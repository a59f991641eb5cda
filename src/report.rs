//! Device report types flowing through the filter pipeline
//!
//! Reports are heterogeneous: only [`DeviceReport::Tablet`] carries an
//! absolute position the integrator transforms. Every other shape is
//! forwarded untouched.

use chrono::{DateTime, Local};
use nalgebra::Vector2;
use std::fmt;

/// 2D point or vector, used both in device (pixel) and unit space
pub type Point = Vector2<f32>;

// Report with an absolute pen position
#[derive(Debug, Clone, PartialEq)]
pub struct TabletReport {
    pub position: Point,
    pub pressure: u32,
    pub timestamp: DateTime<Local>,
}

impl TabletReport {
    pub fn new(x: f32, y: f32, pressure: u32) -> Self {
        Self {
            position: Point::new(x, y),
            pressure,
            timestamp: Local::now(),
        }
    }
}

// Auxiliary (express key) button report
#[derive(Debug, Clone, PartialEq)]
pub struct AuxReport {
    pub buttons: u32,
    pub timestamp: DateTime<Local>,
}

impl AuxReport {
    pub fn new(buttons: u32) -> Self {
        Self {
            buttons,
            timestamp: Local::now(),
        }
    }
}

// Proximity change without position data
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityReport {
    pub near_proximity: bool,
    pub timestamp: DateTime<Local>,
}

impl ProximityReport {
    pub fn new(near_proximity: bool) -> Self {
        Self {
            near_proximity,
            timestamp: Local::now(),
        }
    }
}

/// A single sample from the pointing device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceReport {
    Tablet(TabletReport),
    Auxiliary(AuxReport),
    Proximity(ProximityReport),
}

impl DeviceReport {
    /// True for reports exposing a mutable absolute position
    pub fn is_positional(&self) -> bool {
        matches!(self, DeviceReport::Tablet(_))
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            DeviceReport::Tablet(report) => Some(report.position),
            _ => None,
        }
    }

    /// Tracking state carried by the report itself, if any
    pub fn proximity(&self) -> Option<bool> {
        match self {
            DeviceReport::Proximity(report) => Some(report.near_proximity),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        match self {
            DeviceReport::Tablet(report) => report.timestamp,
            DeviceReport::Auxiliary(report) => report.timestamp,
            DeviceReport::Proximity(report) => report.timestamp,
        }
    }
}

impl From<TabletReport> for DeviceReport {
    fn from(report: TabletReport) -> Self {
        DeviceReport::Tablet(report)
    }
}

impl From<AuxReport> for DeviceReport {
    fn from(report: AuxReport) -> Self {
        DeviceReport::Auxiliary(report)
    }
}

impl From<ProximityReport> for DeviceReport {
    fn from(report: ProximityReport) -> Self {
        DeviceReport::Proximity(report)
    }
}

// Same line format the replay parser reads
impl fmt::Display for DeviceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceReport::Tablet(report) => write!(
                f,
                "tablet {:.3} {:.3} {}",
                report.position.x, report.position.y, report.pressure
            ),
            DeviceReport::Auxiliary(report) => write!(f, "aux {:#x}", report.buttons),
            DeviceReport::Proximity(report) => {
                let state = if report.near_proximity { "near" } else { "far" };
                write!(f, "proximity {}", state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_tablet_reports_are_positional() {
        assert!(DeviceReport::from(TabletReport::new(1.0, 2.0, 0)).is_positional());
        assert!(!DeviceReport::from(AuxReport::new(0b10)).is_positional());
        assert!(!DeviceReport::from(ProximityReport::new(true)).is_positional());
    }

    #[test]
    fn proximity_is_read_from_proximity_reports_only() {
        assert_eq!(
            DeviceReport::from(ProximityReport::new(false)).proximity(),
            Some(false)
        );
        assert_eq!(
            DeviceReport::from(TabletReport::new(0.0, 0.0, 0)).proximity(),
            None
        );
    }

    #[test]
    fn display_uses_replay_line_format() {
        let tablet = DeviceReport::from(TabletReport::new(960.0, 540.5, 12));
        assert_eq!(tablet.to_string(), "tablet 960.000 540.500 12");
        assert_eq!(DeviceReport::from(AuxReport::new(5)).to_string(), "aux 0x5");
        assert_eq!(
            DeviceReport::from(ProximityReport::new(false)).to_string(),
            "proximity far"
        );
    }
}
