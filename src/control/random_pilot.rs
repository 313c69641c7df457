use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    constants::CONTROLS_TOPIC,
    errors::SimulationError,
    messaging::{message::Message, router::MessageRouter},
    scheduler::module::{Component, Module},
    state_model::controls::ControlInputs,
};

/// Publishes a random stick input every `interval` frames.
///
/// The generator is seeded, so a given seed replays the same inputs.
pub struct RandomPilot {
    router: Arc<MessageRouter>,
    rng: StdRng,
    interval: u64,
    frame_count: u64,
    last_controls: Option<ControlInputs>,
}

impl RandomPilot {
    pub fn new(router: Arc<MessageRouter>, interval: u64, seed: u64) -> Result<Self, SimulationError> {
        if interval == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "random pilot interval must be at least one frame".to_string(),
            ));
        }
        Ok(RandomPilot {
            router,
            rng: StdRng::seed_from_u64(seed),
            interval,
            frame_count: 0,
            last_controls: None,
        })
    }

    pub fn last_controls(&self) -> Option<ControlInputs> {
        self.last_controls
    }

    fn generate_controls(&mut self) -> ControlInputs {
        ControlInputs::new(
            self.rng.gen_range(0.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-0.5..=0.5),
            0.0,
        )
    }
}

impl Component for RandomPilot {
    fn name(&self) -> &str {
        "RandomPilot"
    }

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        Some(self)
    }
}

impl Module for RandomPilot {
    fn update(&mut self) -> Result<(), SimulationError> {
        self.frame_count += 1;
        if self.frame_count % self.interval != 0 {
            return Ok(());
        }

        let controls = self.generate_controls();
        log::debug!(
            "RandomPilot moved the stick: elevator={:.2}, throttle={:.2}",
            controls.elevator(),
            controls.throttle()
        );
        self.last_controls = Some(controls);
        self.router.publish(CONTROLS_TOPIC, Message::Controls(controls));
        Ok(())
    }
}
