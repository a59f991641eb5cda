//! Mapping between device space (screen pixels) and unit space
//!
//! Unit space centers X on 0 with a range of roughly [-1, 1]. Y is divided by
//! the screen *width* as well and offset by the aspect ratio, so both axes
//! share one scale and a unit-space step is the same physical length on
//! either axis.

use crate::report::Point;

/// Screen geometry with its cached aspect ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSpace {
    width: f32,
    ratio: f32,
}

impl UnitSpace {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        let width = screen_width as f32;
        Self {
            width,
            ratio: screen_height as f32 / width,
        }
    }

    /// `screen_height / screen_width`
    pub fn aspect_ratio(&self) -> f32 {
        self.ratio
    }

    pub fn to_unit(&self, point: Point) -> Point {
        Point::new(
            (2.0 * point.x / self.width) - 1.0,
            (2.0 * point.y / self.width) - self.ratio,
        )
    }

    pub fn from_unit(&self, point: Point) -> Point {
        Point::new(
            self.width * (point.x + 1.0) / 2.0,
            self.width * (point.y + self.ratio) / 2.0,
        )
    }
}

impl Default for UnitSpace {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}
