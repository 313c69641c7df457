pub mod config;
pub mod constants;
pub mod control;
pub mod dynamics_system;
pub mod errors;
pub mod messaging;
pub mod scheduler;
pub mod state_model;
pub mod telemetry_system;
pub mod utils;

pub use config::{AircraftConfig, SimConfig};
pub use constants::*;
pub use control::channel_bridge::{ChannelBridge, HostLink};
pub use control::random_pilot::RandomPilot;
pub use control::sine_pilot::SinePilot;
pub use errors::{ConfigError, SimulationError};

// Re-export commonly used items from messaging
pub use messaging::message::{FrameTelemetry, LifecycleEvent, Message};
pub use messaging::router::{MessageRouter, RouterStats};

// Re-export commonly used items from the state model
pub use state_model::aircraft_state::AircraftState;
pub use state_model::controls::ControlInputs;
pub use state_model::forces::ForcesMoments;

// Re-export commonly used items from dynamics_system
pub use dynamics_system::aerodynamics::Aerodynamics;
pub use dynamics_system::flight_dynamics::FlightDynamics;

// Re-export commonly used items from scheduler
pub use scheduler::clock::{Clock, ManualClock, SystemClock};
pub use scheduler::frame_scheduler::{FrameScheduler, SchedulerState, StopHandle};
pub use scheduler::module::{Component, Module};
pub use scheduler::stats::{Overrun, SchedulerStats};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::flight_recorder::{FlightRecorder, FlightSummary, RecordedEvent, RecorderHandle};

// Re-export commonly used utilities
pub use utils::vector3d::Vector3;
