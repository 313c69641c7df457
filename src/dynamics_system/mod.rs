pub mod aerodynamics;
pub mod flight_dynamics;
pub mod integrator;
