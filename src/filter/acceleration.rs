//! Velocity warp curves applied before integrating into position

use crate::report::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum AccelerationCurve {
    /// Velocity is integrated as-is
    #[default]
    Linear,

    /// `sign(v) * |v|^exponent` on each axis independently
    ComponentWise { exponent: f32 },

    /// `v * |v|^(exponent - 1)`, same factor on both axes
    Magnitude { exponent: f32 },
}

impl AccelerationCurve {
    /// Warps one tick of unit-space velocity
    pub fn apply(&self, velocity: Point) -> Point {
        match *self {
            AccelerationCurve::Linear => velocity,
            AccelerationCurve::ComponentWise { exponent } => {
                // exponent on the magnitude only, fractional powers of
                // negative bases would be NaN
                velocity.map(|component| component.abs().powf(exponent).copysign(component))
            }
            AccelerationCurve::Magnitude { exponent } => {
                let speed = velocity.norm();
                // 0^(exponent-1) is infinite for exponents below 1
                if speed == 0.0 {
                    return velocity;
                }
                velocity * speed.powf(exponent - 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_identity() {
        let velocity = Point::new(0.3, -0.2);
        assert_eq!(AccelerationCurve::Linear.apply(velocity), velocity);
    }

    #[test]
    fn component_wise_squares_each_axis() {
        let curve = AccelerationCurve::ComponentWise { exponent: 2.0 };
        let warped = curve.apply(Point::new(0.5, -0.25));
        assert!((warped.x - 0.25).abs() < 1e-6);
        assert!((warped.y + 0.0625).abs() < 1e-6);
    }

    #[test]
    fn component_wise_keeps_sign_for_fractional_exponent() {
        let curve = AccelerationCurve::ComponentWise { exponent: 0.5 };
        let warped = curve.apply(Point::new(-0.04, 0.09));
        assert!((warped.x + 0.2).abs() < 1e-6);
        assert!((warped.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn magnitude_scales_by_speed() {
        let curve = AccelerationCurve::Magnitude { exponent: 2.0 };
        let velocity = Point::new(0.3, 0.4);
        let warped = curve.apply(velocity);
        // |v| = 0.5, so v * 0.5
        assert!((warped - velocity * 0.5).norm() < 1e-6);
    }

    #[test]
    fn magnitude_at_rest_stays_at_rest() {
        let curve = AccelerationCurve::Magnitude { exponent: 0.5 };
        assert_eq!(curve.apply(Point::zeros()), Point::zeros());
    }
}
