pub mod aircraft_state;
pub mod controls;
pub mod forces;
