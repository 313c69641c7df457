use std::sync::Arc;

use crate::{
    constants::CONTROLS_TOPIC,
    errors::SimulationError,
    messaging::{message::Message, router::MessageRouter},
    scheduler::module::{Component, Module},
    state_model::controls::ControlInputs,
};

/// Simulated seconds between manual and autopilot modes.
pub const MODE_SWITCH_SECONDS: u64 = 10;

/// Stand-in for a host simulator's pilot.
///
/// In manual mode the surfaces follow slow sinusoids; in autopilot mode a
/// fixed gentle-climb setting is held. The mode flips every
/// [`MODE_SWITCH_SECONDS`] of simulated time. A fresh control set is
/// published every frame.
pub struct SinePilot {
    router: Arc<MessageRouter>,
    frame_rate: u32,
    frame_count: u64,
    autopilot: bool,
}

impl SinePilot {
    pub fn new(router: Arc<MessageRouter>, frame_rate: u32) -> Result<Self, SimulationError> {
        if frame_rate == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "pilot frame rate must be positive".to_string(),
            ));
        }
        Ok(SinePilot {
            router,
            frame_rate,
            frame_count: 0,
            autopilot: false,
        })
    }

    pub fn is_autopilot(&self) -> bool {
        self.autopilot
    }

    /// Controls for simulated time `time_s` in the current mode.
    pub fn controls_at(&self, time_s: f64) -> ControlInputs {
        if self.autopilot {
            ControlInputs::new(0.7, 0.1, 0.0, 0.0)
        } else {
            ControlInputs::new(
                0.6 + 0.2 * (time_s * 0.1).sin(),
                0.2 * (time_s * 0.5).sin(),
                0.1 * (time_s * 0.3).sin(),
                0.05 * (time_s * 0.2).sin(),
            )
        }
    }
}

impl Component for SinePilot {
    fn name(&self) -> &str {
        "SinePilot"
    }

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        Some(self)
    }
}

impl Module for SinePilot {
    fn update(&mut self) -> Result<(), SimulationError> {
        self.frame_count += 1;
        let time_s = self.frame_count as f64 / f64::from(self.frame_rate);
        let controls = self.controls_at(time_s);

        if self.frame_count % (MODE_SWITCH_SECONDS * u64::from(self.frame_rate)) == 0 {
            self.autopilot = !self.autopilot;
            log::info!(
                "SinePilot mode: {}",
                if self.autopilot { "AUTOPILOT" } else { "MANUAL" }
            );
        }

        self.router.publish(CONTROLS_TOPIC, Message::Controls(controls));

        if self.frame_count % (2 * u64::from(self.frame_rate)) == 0 {
            log::debug!(
                "SinePilot controls: elevator={:.2}, throttle={:.2}",
                controls.elevator(),
                controls.throttle()
            );
        }

        Ok(())
    }
}
