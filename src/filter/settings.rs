use serde::{Deserialize, Serialize};

use super::acceleration::AccelerationCurve;

/// Integrator settings, unvalidated outside of [`crate::config::AppConfig::validate`]
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct IntegratorSettings {
    // Screen size in pixels, width also normalizes Y
    pub screen_width: u32,
    pub screen_height: u32,

    pub input_sensitivity: f32,
    pub output_sensitivity: f32,

    // Acceleration
    pub apply_acceleration: bool,
    pub acceleration_exponent: f32,
    pub apply_acceleration_component_wise: bool,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            input_sensitivity: 0.02,
            output_sensitivity: 1.0,
            apply_acceleration: false,
            acceleration_exponent: 2.0,
            apply_acceleration_component_wise: false,
        }
    }
}

impl IntegratorSettings {
    pub fn acceleration_curve(&self) -> AccelerationCurve {
        match (self.apply_acceleration, self.apply_acceleration_component_wise) {
            (false, _) => AccelerationCurve::Linear,
            (true, true) => AccelerationCurve::ComponentWise {
                exponent: self.acceleration_exponent,
            },
            (true, false) => AccelerationCurve::Magnitude {
                exponent: self.acceleration_exponent,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_surface() {
        let settings = IntegratorSettings::default();
        assert_eq!(settings.screen_width, 1920);
        assert_eq!(settings.screen_height, 1080);
        assert_eq!(settings.input_sensitivity, 0.02);
        assert_eq!(settings.output_sensitivity, 1.0);
        assert!(!settings.apply_acceleration);
        assert_eq!(settings.acceleration_exponent, 2.0);
        assert!(!settings.apply_acceleration_component_wise);
    }

    #[test]
    fn curve_selection() {
        let mut settings = IntegratorSettings {
            apply_acceleration_component_wise: true,
            ..Default::default()
        };
        assert_eq!(settings.acceleration_curve(), AccelerationCurve::Linear);

        settings.apply_acceleration = true;
        settings.acceleration_exponent = 1.5;
        assert_eq!(
            settings.acceleration_curve(),
            AccelerationCurve::ComponentWise { exponent: 1.5 }
        );

        settings.apply_acceleration_component_wise = false;
        assert_eq!(
            settings.acceleration_curve(),
            AccelerationCurve::Magnitude { exponent: 1.5 }
        );
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let settings: IntegratorSettings =
            toml::from_str("screen_width = 2560\napply_acceleration = true").unwrap();
        assert_eq!(settings.screen_width, 2560);
        assert_eq!(settings.screen_height, 1080);
        assert!(settings.apply_acceleration);
    }
}
