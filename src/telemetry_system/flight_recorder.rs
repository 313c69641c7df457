use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    constants::{AIRCRAFT_STATE_TOPIC, CONTROLS_TOPIC},
    errors::SimulationError,
    messaging::router::MessageRouter,
    scheduler::module::{Component, Module},
    state_model::{aircraft_state::AircraftState, controls::ControlInputs},
    utils::vector3d::Vector3,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Controls { time: f64, controls: ControlInputs },
    State { time: f64, position: Vector3, airspeed: f64 },
}

/// Extremes seen over the whole recording.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSummary {
    pub controls_received: u64,
    pub states_received: u64,
    pub max_altitude: f64,
    pub min_altitude: f64,
    pub max_airspeed: f64,
    pub simulation_time: f64,
    pub last_state: Option<AircraftState>,
}

struct RecorderLog {
    events: VecDeque<RecordedEvent>,
    capacity: usize,
    simulation_time: f64,
    summary: FlightSummary,
}

/// Records everything on the `controls` and `aircraft_state` topics.
///
/// Subscriptions do the recording; the frame update only advances the
/// recorder's clock and logs a short report every `report_every` frames.
pub struct FlightRecorder {
    log: Arc<Mutex<RecorderLog>>,
    dt: f64,
    report_every: u64,
    frame_count: u64,
}

impl FlightRecorder {
    pub fn new(router: &MessageRouter, frame_rate: u32, capacity: usize) -> Result<Self, SimulationError> {
        if frame_rate == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "recorder frame rate must be positive".to_string(),
            ));
        }

        let log = Arc::new(Mutex::new(RecorderLog {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            simulation_time: 0.0,
            summary: FlightSummary {
                controls_received: 0,
                states_received: 0,
                max_altitude: f64::MIN,
                min_altitude: f64::MAX,
                max_airspeed: 0.0,
                simulation_time: 0.0,
                last_state: None,
            },
        }));

        let controls_log = Arc::clone(&log);
        router.subscribe(CONTROLS_TOPIC, move |message| {
            let controls = message
                .as_controls()
                .ok_or_else(|| SimulationError::UnexpectedPayload(CONTROLS_TOPIC.to_string()))?;
            lock_log(&controls_log).record_controls(*controls);
            Ok(())
        });

        let state_log = Arc::clone(&log);
        router.subscribe(AIRCRAFT_STATE_TOPIC, move |message| {
            let state = message.as_aircraft_state().ok_or_else(|| {
                SimulationError::UnexpectedPayload(AIRCRAFT_STATE_TOPIC.to_string())
            })?;
            lock_log(&state_log).record_state(state);
            Ok(())
        });

        Ok(FlightRecorder {
            log,
            dt: 1.0 / f64::from(frame_rate),
            report_every: u64::from(frame_rate),
            frame_count: 0,
        })
    }

    /// Read-only view that stays valid after the recorder is handed to a
    /// scheduler.
    pub fn handle(&self) -> RecorderHandle {
        RecorderHandle {
            log: Arc::clone(&self.log),
        }
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.handle().events()
    }

    pub fn summary(&self) -> FlightSummary {
        self.handle().summary()
    }

    pub fn display_summary(&self) {
        self.handle().display_summary()
    }
}

#[derive(Clone)]
pub struct RecorderHandle {
    log: Arc<Mutex<RecorderLog>>,
}

impl RecorderHandle {
    pub fn events(&self) -> Vec<RecordedEvent> {
        lock_log(&self.log).events.iter().cloned().collect()
    }

    pub fn summary(&self) -> FlightSummary {
        let log = lock_log(&self.log);
        FlightSummary {
            simulation_time: log.simulation_time,
            ..log.summary.clone()
        }
    }

    pub fn display_summary(&self) {
        let summary = self.summary();

        println!("\n--- Flight Summary ---");
        println!("Simulated: {}", format_time(summary.simulation_time));
        println!("Control sets received: {}", summary.controls_received);
        println!("States received: {}", summary.states_received);
        if summary.states_received > 0 {
            println!("Max Altitude: {}", format_altitude(summary.max_altitude));
            println!("Min Altitude: {}", format_altitude(summary.min_altitude));
            println!("Max Airspeed: {:.2} m/s", summary.max_airspeed);
        }
        if let Some(state) = &summary.last_state {
            println!(
                "Final position: {} | attitude (deg): roll {:.1}, pitch {:.1}, yaw {:.1}",
                format_vector3(&state.position_ned, 1),
                state.euler.x.to_degrees(),
                state.euler.y.to_degrees(),
                state.euler.z.to_degrees()
            );
        }
    }
}

impl RecorderLog {
    fn push(&mut self, event: RecordedEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn record_controls(&mut self, controls: ControlInputs) {
        self.summary.controls_received += 1;
        let time = self.simulation_time;
        self.push(RecordedEvent::Controls { time, controls });
    }

    fn record_state(&mut self, state: &AircraftState) {
        let altitude = state.altitude();
        let airspeed = state.airspeed();

        let summary = &mut self.summary;
        summary.states_received += 1;
        summary.max_altitude = summary.max_altitude.max(altitude);
        summary.min_altitude = summary.min_altitude.min(altitude);
        summary.max_airspeed = summary.max_airspeed.max(airspeed);
        summary.last_state = Some(state.clone());

        let time = self.simulation_time;
        self.push(RecordedEvent::State {
            time,
            position: state.position_ned,
            airspeed,
        });
    }
}

impl Component for FlightRecorder {
    fn name(&self) -> &str {
        "FlightRecorder"
    }

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        Some(self)
    }
}

impl Module for FlightRecorder {
    fn update(&mut self) -> Result<(), SimulationError> {
        self.frame_count += 1;
        let mut recording = lock_log(&self.log);
        recording.simulation_time += self.dt;

        if self.frame_count % self.report_every == 0 && !recording.events.is_empty() {
            log::info!(
                "FlightRecorder: {} event(s) recorded at {}",
                recording.summary.controls_received + recording.summary.states_received,
                format_time(recording.simulation_time)
            );
            for event in recording.events.iter().rev().take(3) {
                log::debug!("  {}", describe(event));
            }
        }
        Ok(())
    }
}

fn lock_log(log: &Mutex<RecorderLog>) -> MutexGuard<'_, RecorderLog> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn describe(event: &RecordedEvent) -> String {
    match event {
        RecordedEvent::Controls { time, controls } => format!(
            "[{}] CONTROLS elevator={:.2} throttle={:.2}",
            format_time(*time),
            controls.elevator(),
            controls.throttle()
        ),
        RecordedEvent::State {
            time,
            position,
            airspeed,
        } => format!(
            "[{}] STATE {} altitude={} airspeed={:.1} m/s",
            format_time(*time),
            format_vector3(position, 1),
            format_altitude(-position.z),
            airspeed
        ),
    }
}

fn format_vector3(vec: &Vector3, precision: usize) -> String {
    format!(
        "N = {:.precision$} m, E = {:.precision$} m, D = {:.precision$} m",
        vec.x,
        vec.y,
        vec.z,
        precision = precision
    )
}

fn format_time(elapsed_time: f64) -> String {
    if elapsed_time >= 3600.0 {
        let hours = (elapsed_time / 3600.0).floor();
        let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
    } else if elapsed_time >= 60.0 {
        let minutes = (elapsed_time / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}m {:.2}s", minutes, seconds)
    } else {
        format!("{:.2}s", elapsed_time)
    }
}

fn format_altitude(altitude: f64) -> String {
    if altitude.abs() >= 1000.0 {
        format!("{:.2} km", altitude / 1000.0)
    } else {
        format!("{:.2} m", altitude)
    }
}
