use crate::{
    config::AircraftConfig,
    state_model::{aircraft_state::AircraftState, controls::ControlInputs, forces::ForcesMoments},
    utils::vector3d::Vector3,
};

/// Quasi-linear lift/drag polar with a throttle-proportional thrust and
/// linear control-surface moments.
#[derive(Debug, Clone, PartialEq)]
pub struct Aerodynamics {
    pub lift_coefficient_zero: f64,
    pub lift_curve_slope: f64,
    pub drag_coefficient_zero: f64,
    pub drag_alpha_factor: f64,
    pub wing_area: f64,
    pub air_density: f64,
    pub max_thrust: f64,
    pub control_authority: Vector3,
}

impl Aerodynamics {
    pub fn from_config(config: &AircraftConfig) -> Self {
        Aerodynamics {
            lift_coefficient_zero: config.c_l_0,
            lift_curve_slope: config.c_l_alpha,
            drag_coefficient_zero: config.c_d_0,
            drag_alpha_factor: config.c_d_alpha,
            wing_area: config.wing_area,
            air_density: config.air_density,
            max_thrust: config.max_thrust,
            control_authority: Vector3::new(
                config.roll_authority,
                config.pitch_authority,
                config.yaw_authority,
            ),
        }
    }

    /// Body-axis forces and moments for the given state and control set.
    pub fn calculate_forces_moments(
        &self,
        state: &AircraftState,
        controls: &ControlInputs,
    ) -> ForcesMoments {
        let alpha = state.angle_of_attack();
        let forward_speed = state.velocity_body.x;

        let lift = self.calculate_lift(forward_speed, alpha);
        let drag = self.calculate_drag(forward_speed, alpha);
        let thrust = self.calculate_thrust(controls);

        let aerodynamic = ForcesMoments::new(
            Vector3::new(-drag, 0.0, -lift),
            Vector3::new(
                controls.aileron() * self.control_authority.x,
                controls.elevator() * self.control_authority.y,
                controls.rudder() * self.control_authority.z,
            ),
        );
        let propulsive = ForcesMoments::new(Vector3::new(thrust, 0.0, 0.0), Vector3::ZERO);

        aerodynamic + propulsive
    }

    /// Never negative, whatever the angle of attack.
    pub fn calculate_lift(&self, forward_speed: f64, angle_of_attack: f64) -> f64 {
        let dynamic_pressure = self.calculate_dynamic_pressure(forward_speed);
        let lift_coefficient =
            self.lift_coefficient_zero + self.lift_curve_slope * angle_of_attack;
        let lift = lift_coefficient * dynamic_pressure * self.wing_area;

        lift.max(0.0)
    }

    pub fn calculate_drag(&self, forward_speed: f64, angle_of_attack: f64) -> f64 {
        let dynamic_pressure = self.calculate_dynamic_pressure(forward_speed);
        let drag_coefficient =
            self.drag_coefficient_zero + self.drag_alpha_factor * angle_of_attack.powi(2);

        drag_coefficient * dynamic_pressure * self.wing_area
    }

    pub fn calculate_thrust(&self, controls: &ControlInputs) -> f64 {
        controls.throttle() * self.max_thrust
    }

    /// Throttle setting whose thrust cancels drag in the current state.
    /// Values above 1.0 mean the engine cannot hold the speed.
    pub fn trim_throttle(&self, state: &AircraftState) -> f64 {
        if self.max_thrust <= 0.0 {
            return 0.0;
        }
        let drag = self.calculate_drag(state.velocity_body.x, state.angle_of_attack());
        drag / self.max_thrust
    }

    fn calculate_dynamic_pressure(&self, forward_speed: f64) -> f64 {
        0.5 * self.air_density * forward_speed.powi(2)
    }
}
