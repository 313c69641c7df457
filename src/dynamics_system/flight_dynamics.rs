use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    config::{AircraftConfig, SimConfig},
    constants::{AIRCRAFT_STATE_TOPIC, CONTROLS_TOPIC},
    errors::SimulationError,
    messaging::{message::Message, router::MessageRouter},
    scheduler::module::{Component, Module},
    state_model::{aircraft_state::AircraftState, controls::ControlInputs, forces::ForcesMoments},
};

use super::{aerodynamics::Aerodynamics, integrator};

/// Rigid-body flight model driven by the frame loop.
///
/// Holds the only live copy of the aircraft state. Controls arrive on the
/// `controls` topic and are stored as a whole snapshot; each `update()` uses
/// the latest snapshot, integrates one step of `1 / update_rate` seconds and
/// publishes a copy of the new state on `aircraft_state`.
pub struct FlightDynamics {
    router: Arc<MessageRouter>,
    state: AircraftState,
    controls: Arc<Mutex<ControlInputs>>,
    aerodynamics: Aerodynamics,
    update_rate: u32,
    dt: f64,
    tick_count: u64,
    diverged: bool,
}

impl FlightDynamics {
    pub fn new(
        router: Arc<MessageRouter>,
        aircraft: &AircraftConfig,
        update_rate: u32,
    ) -> Result<Self, SimulationError> {
        if update_rate == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "update rate must be a positive number of Hz".to_string(),
            ));
        }
        aircraft.validate()?;

        let state = AircraftState::level_flight(
            aircraft.mass,
            aircraft.inertia_principal(),
            aircraft.initial_altitude,
            aircraft.initial_airspeed,
        );
        let controls = Arc::new(Mutex::new(ControlInputs::default()));

        let slot = Arc::clone(&controls);
        router.subscribe(CONTROLS_TOPIC, move |message| match message.as_controls() {
            Some(received) => {
                *lock_controls(&slot) = *received;
                Ok(())
            }
            None => Err(SimulationError::UnexpectedPayload(
                CONTROLS_TOPIC.to_string(),
            )),
        });

        log::info!(
            "FlightDynamics initialised for '{}' at {} Hz (altitude {:.0}m, airspeed {:.1}m/s)",
            aircraft.name,
            update_rate,
            state.altitude(),
            state.airspeed()
        );

        Ok(FlightDynamics {
            router,
            state,
            controls,
            aerodynamics: Aerodynamics::from_config(aircraft),
            update_rate,
            dt: 1.0 / f64::from(update_rate),
            tick_count: 0,
            diverged: false,
        })
    }

    pub fn from_config(router: Arc<MessageRouter>, config: &SimConfig) -> Result<Self, SimulationError> {
        Self::new(router, &config.aircraft, config.frame_rate)
    }

    /// Replaces the current control snapshot.
    pub fn on_controls(&self, controls: ControlInputs) {
        *lock_controls(&self.controls) = controls;
    }

    pub fn controls(&self) -> ControlInputs {
        *lock_controls(&self.controls)
    }

    /// Copy of the live state.
    pub fn state(&self) -> AircraftState {
        self.state.clone()
    }

    /// Overrides the initial conditions. Mass and inertia stay those of the
    /// configured aircraft. Clears a previous divergence.
    pub fn reset_kinematics(&mut self, template: &AircraftState) {
        self.state.position_ned = template.position_ned;
        self.state.velocity_body = template.velocity_body;
        self.state.rates_body = template.rates_body;
        self.state.euler = template.euler;
        self.diverged = false;
    }

    /// True once the state has gone non-finite; the engine then idles until
    /// `reset_kinematics`.
    pub fn is_diverged(&self) -> bool {
        self.diverged
    }

    pub fn aerodynamics(&self) -> &Aerodynamics {
        &self.aerodynamics
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn calculate_forces_moments(&self) -> ForcesMoments {
        self.aerodynamics
            .calculate_forces_moments(&self.state, &self.controls())
    }

    /// Throttle that holds the current forward speed.
    pub fn trim_throttle(&self) -> f64 {
        self.aerodynamics.trim_throttle(&self.state)
    }
}

impl Component for FlightDynamics {
    fn name(&self) -> &str {
        "FlightDynamics"
    }

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        Some(self)
    }
}

impl Module for FlightDynamics {
    fn update(&mut self) -> Result<(), SimulationError> {
        if self.diverged {
            return Ok(());
        }

        let forces_moments = self.calculate_forces_moments();
        integrator::integrate(&mut self.state, &forces_moments, self.dt);
        self.tick_count += 1;

        // Reported once; afterwards the engine idles and publishes nothing.
        if !self.state.is_finite() {
            self.diverged = true;
            return Err(SimulationError::module(
                self.name(),
                format!("state diverged at tick {}", self.tick_count),
            ));
        }

        self.router
            .publish(AIRCRAFT_STATE_TOPIC, Message::AircraftState(self.state.clone()));

        if self.tick_count % u64::from(self.update_rate) == 0 {
            log::debug!(
                "FlightDynamics: altitude={:.0}m, u={:.1}m/s, pitch={:.2}rad",
                self.state.altitude(),
                self.state.velocity_body.x,
                self.state.euler.y
            );
        }

        Ok(())
    }
}

fn lock_controls(slot: &Mutex<ControlInputs>) -> MutexGuard<'_, ControlInputs> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
