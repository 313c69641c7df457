use crate::{
    state_model::{aircraft_state::AircraftState, forces::ForcesMoments},
    utils::vector3d::Vector3,
};

/// Time derivatives of the integrated quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateDerivative {
    pub velocity_body: Vector3,
    pub rates_body: Vector3,
    pub euler: Vector3,
    pub position_ned: Vector3,
}

/// Evaluates every derivative at the given state.
///
/// Attitude rates are the body rates taken directly as Euler rates, and the
/// body-to-NED rotation uses yaw only. Both are small-angle approximations:
/// roll and pitch do not couple into the navigation velocity, and no angle is
/// ever wrapped, so large attitudes drift away from physical meaning.
pub fn calculate_derivatives(state: &AircraftState, forces: &ForcesMoments) -> StateDerivative {
    let velocity_dot = forces.force / state.mass();
    let rates_dot = forces.moment.component_div(&state.inertia_principal());

    StateDerivative {
        velocity_body: velocity_dot,
        rates_body: rates_dot,
        euler: state.rates_body,
        position_ned: body_to_ned_yaw_only(state.velocity_body, state.euler.z),
    }
}

/// One explicit (forward) Euler step of length `dt`.
///
/// This is not the semi-implicit variant: attitude advances with the
/// start-of-step rates, not the rates updated in this step, and position with
/// the start-of-step velocity and yaw.
pub fn integrate(state: &mut AircraftState, forces: &ForcesMoments, dt: f64) {
    let derivative = calculate_derivatives(state, forces);

    state.velocity_body = state.velocity_body + derivative.velocity_body * dt;
    state.rates_body = state.rates_body + derivative.rates_body * dt;
    state.euler = state.euler + derivative.euler * dt;
    state.position_ned = state.position_ned + derivative.position_ned * dt;
}

/// Rotates a body-axis vector into NED about the down axis only.
pub fn body_to_ned_yaw_only(body: Vector3, yaw: f64) -> Vector3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vector3::new(
        body.x * cos_yaw - body.y * sin_yaw,
        body.x * sin_yaw + body.y * cos_yaw,
        body.z,
    )
}
