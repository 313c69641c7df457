use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::*;
use crate::errors::ConfigError;
use crate::utils::vector3d::Vector3;

/// Top-level simulation settings, normally read from a YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Scheduler and integration rate in Hz.
    pub frame_rate: u32,
    /// Simulated seconds to run; `None` runs until stopped.
    pub duration: Option<f64>,
    pub aircraft: AircraftConfig,
}

/// Mass properties, aerodynamic coefficients and initial conditions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AircraftConfig {
    pub name: String,

    pub mass: f64,
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,

    pub wing_area: f64,
    pub air_density: f64,
    pub c_l_0: f64,
    pub c_l_alpha: f64,
    pub c_d_0: f64,
    pub c_d_alpha: f64,

    pub max_thrust: f64,

    pub roll_authority: f64,
    pub pitch_authority: f64,
    pub yaw_authority: f64,

    pub initial_altitude: f64,
    pub initial_airspeed: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            frame_rate: DEFAULT_FRAME_RATE,
            duration: None,
            aircraft: AircraftConfig::default(),
        }
    }
}

impl Default for AircraftConfig {
    fn default() -> Self {
        AircraftConfig {
            name: "trainer".to_string(),
            mass: AIRCRAFT_MASS,
            ixx: INERTIA_ROLL,
            iyy: INERTIA_PITCH,
            izz: INERTIA_YAW,
            wing_area: WING_AREA,
            air_density: AIR_DENSITY_SEA_LEVEL,
            c_l_0: LIFT_COEFFICIENT_ZERO,
            c_l_alpha: LIFT_CURVE_SLOPE,
            c_d_0: DRAG_COEFFICIENT_ZERO,
            c_d_alpha: DRAG_ALPHA_FACTOR,
            max_thrust: MAX_THRUST,
            roll_authority: ROLL_AUTHORITY,
            pitch_authority: PITCH_AUTHORITY,
            yaw_authority: YAW_AUTHORITY,
            initial_altitude: INITIAL_ALTITUDE,
            initial_airspeed: INITIAL_AIRSPEED,
        }
    }
}

impl SimConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn frame_period(&self) -> f64 {
        1.0 / f64::from(self.frame_rate)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "frame_rate",
                value: self.frame_rate.to_string(),
            });
        }
        if let Some(duration) = self.duration {
            if !(duration.is_finite() && duration > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name: "duration",
                    value: duration.to_string(),
                });
            }
        }
        self.aircraft.validate()
    }
}

impl AircraftConfig {
    pub fn inertia_principal(&self) -> Vector3 {
        Vector3::new(self.ixx, self.iyy, self.izz)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let strictly_positive = [
            ("mass", self.mass),
            ("ixx", self.ixx),
            ("iyy", self.iyy),
            ("izz", self.izz),
            ("wing_area", self.wing_area),
            ("air_density", self.air_density),
        ];
        for (name, value) in strictly_positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    value: value.to_string(),
                });
            }
        }
        if !(self.max_thrust.is_finite() && self.max_thrust >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "max_thrust",
                value: self.max_thrust.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.duration, None);
        assert_eq!(config.aircraft.mass, 1000.0);
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let yaml = "frame_rate: 30\nduration: 12.5\naircraft:\n  mass: 1200.0\n  max_thrust: 8000.0\n";
        let config = SimConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.duration, Some(12.5));
        assert_eq!(config.aircraft.mass, 1200.0);
        assert_eq!(config.aircraft.max_thrust, 8000.0);
        assert_eq!(config.aircraft.wing_area, WING_AREA);
    }

    #[test]
    fn test_zero_frame_rate_rejected() {
        let result = SimConfig::from_yaml("frame_rate: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "frame_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result = SimConfig::from_yaml("duration: -1.0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "duration",
                ..
            })
        ));
    }

    #[test]
    fn test_non_positive_mass_rejected() {
        let result = SimConfig::from_yaml("aircraft:\n  mass: 0.0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "mass", .. })
        ));
    }

    #[test]
    fn test_malformed_yaml_reports_parse_error() {
        let result = SimConfig::from_yaml("frame_rate: [not, a, number]\n");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let result = SimConfig::from_file("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }
}
