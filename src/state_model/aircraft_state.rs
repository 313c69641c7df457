use crate::utils::vector3d::Vector3;

/// Kinematic state of the aircraft.
///
/// Position is NED (positive Z is down), velocity and rates are body axes
/// (X forward, Z through the belly), attitude is roll/pitch/yaw.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftState {
    pub position_ned: Vector3,
    pub velocity_body: Vector3,
    pub rates_body: Vector3,
    pub euler: Vector3,
    mass: f64,
    inertia_principal: Vector3,
}

impl AircraftState {
    pub fn new(mass: f64, inertia_principal: Vector3) -> Self {
        AircraftState {
            position_ned: Vector3::ZERO,
            velocity_body: Vector3::ZERO,
            rates_body: Vector3::ZERO,
            euler: Vector3::ZERO,
            mass,
            inertia_principal,
        }
    }

    /// Straight and level at `altitude` metres with forward speed `airspeed`.
    pub fn level_flight(mass: f64, inertia_principal: Vector3, altitude: f64, airspeed: f64) -> Self {
        AircraftState {
            position_ned: Vector3::new(0.0, 0.0, -altitude),
            velocity_body: Vector3::new(airspeed, 0.0, 0.0),
            ..AircraftState::new(mass, inertia_principal)
        }
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// (Ixx, Iyy, Izz)
    pub fn inertia_principal(&self) -> Vector3 {
        self.inertia_principal
    }

    pub fn altitude(&self) -> f64 {
        -self.position_ned.z
    }

    pub fn airspeed(&self) -> f64 {
        self.velocity_body.magnitude()
    }

    pub fn angle_of_attack(&self) -> f64 {
        self.velocity_body.z.atan2(self.velocity_body.x)
    }

    pub fn is_finite(&self) -> bool {
        self.position_ned.is_finite()
            && self.velocity_body.is_finite()
            && self.rates_body.is_finite()
            && self.euler.is_finite()
    }
}
