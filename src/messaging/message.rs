use std::time::Duration;

use crate::state_model::{aircraft_state::AircraftState, controls::ControlInputs};

/// Payloads carried on the simulation topics.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Controls(ControlInputs),
    AircraftState(AircraftState),
    Lifecycle(LifecycleEvent),
    FrameTelemetry(FrameTelemetry),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Started {
        frame_rate: u32,
        duration: Option<f64>,
    },
    Stopped {
        frames: u64,
        simulated_time: f64,
    },
}

/// Published once per simulated second.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTelemetry {
    pub frame: u64,
    pub simulated_time: f64,
    pub tick_cost: Duration,
    pub efficiency_percent: f64,
    pub overrun_count: u64,
}

impl Message {
    pub fn as_controls(&self) -> Option<&ControlInputs> {
        match self {
            Message::Controls(controls) => Some(controls),
            _ => None,
        }
    }

    pub fn as_aircraft_state(&self) -> Option<&AircraftState> {
        match self {
            Message::AircraftState(state) => Some(state),
            _ => None,
        }
    }
}
