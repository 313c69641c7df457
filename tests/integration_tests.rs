use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use flight_simulation::{
    errors::SimulationError, AircraftState, ChannelBridge, Component, ControlInputs,
    FlightDynamics, FlightRecorder, FrameScheduler, HostLink, ManualClock, Message, MessageRouter,
    Module, RecordedEvent, SchedulerState, SimConfig, SinePilot, StopHandle, AIRCRAFT_STATE_TOPIC,
    CONTROLS_TOPIC,
};

// Scheduler on a virtual clock so that pacing never sleeps for real
fn create_test_scheduler(router: &Arc<MessageRouter>, frame_rate: u32) -> FrameScheduler {
    FrameScheduler::new(Arc::clone(router), frame_rate)
        .unwrap()
        .with_clock(ManualClock::new())
}

fn create_test_config(frame_rate: u32) -> SimConfig {
    SimConfig {
        frame_rate,
        ..SimConfig::default()
    }
}

fn collect_states(router: &MessageRouter) -> Arc<Mutex<Vec<AircraftState>>> {
    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&states);
    router.subscribe(AIRCRAFT_STATE_TOPIC, move |message| {
        if let Some(state) = message.as_aircraft_state() {
            sink.lock().unwrap().push(state.clone());
        }
        Ok(())
    });
    states
}

/// Publishes the same control set every frame.
struct FixedPilot {
    router: Arc<MessageRouter>,
    controls: ControlInputs,
}

impl Component for FixedPilot {
    fn name(&self) -> &str {
        "FixedPilot"
    }

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        Some(self)
    }
}

impl Module for FixedPilot {
    fn update(&mut self) -> Result<(), SimulationError> {
        self.router
            .publish(CONTROLS_TOPIC, Message::Controls(self.controls));
        Ok(())
    }
}

/// Burns `cost` of virtual time on its first update only.
struct SlowOnceModule {
    clock: ManualClock,
    cost: Duration,
    updates: u64,
}

impl Component for SlowOnceModule {
    fn name(&self) -> &str {
        "SlowOnce"
    }

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        Some(self)
    }
}

impl Module for SlowOnceModule {
    fn update(&mut self) -> Result<(), SimulationError> {
        self.updates += 1;
        if self.updates == 1 {
            self.clock.advance(self.cost);
        }
        Ok(())
    }
}

/// Requests a stop during its `stop_at`-th update.
struct StoppingModule {
    stop: StopHandle,
    stop_at: u64,
    updates: Arc<Mutex<u64>>,
}

impl Component for StoppingModule {
    fn name(&self) -> &str {
        "Stopping"
    }

    fn as_module(&mut self) -> Option<&mut dyn Module> {
        Some(self)
    }
}

impl Module for StoppingModule {
    fn update(&mut self) -> Result<(), SimulationError> {
        let mut updates = self.updates.lock().unwrap();
        *updates += 1;
        if *updates == self.stop_at {
            self.stop.stop();
        }
        Ok(())
    }
}

struct Listener;

impl Component for Listener {
    fn name(&self) -> &str {
        "Listener"
    }
}

#[test]
fn test_fixed_duration_run_stops_itself() {
    println!("INTEGRATION TEST: Fixed Duration Run");

    let router = Arc::new(MessageRouter::new());
    let mut scheduler = create_test_scheduler(&router, 10);

    let stats = scheduler.run(Some(2.0)).unwrap();

    assert_eq!(stats.frames_processed, 20);
    assert_relative_eq!(stats.simulation_time, 2.0);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert!(!scheduler.is_running());
}

#[test]
fn test_simulated_time_tracks_frame_count() {
    println!("INTEGRATION TEST: Simulated Time");

    let router = Arc::new(MessageRouter::new());
    let mut scheduler = create_test_scheduler(&router, 60);

    let stats = scheduler.run(Some(1.5)).unwrap();

    assert_eq!(stats.frames_processed, 90);
    assert_relative_eq!(
        stats.simulation_time,
        stats.frames_processed as f64 / 60.0,
        epsilon = 1e-12
    );
    assert_relative_eq!(scheduler.simulation_time(), 1.5, epsilon = 1e-9);
}

#[test]
fn test_component_without_update_is_rejected() {
    println!("INTEGRATION TEST: Capability Check");

    let router = Arc::new(MessageRouter::new());
    let mut scheduler = create_test_scheduler(&router, 10);
    scheduler.register(SinePilot::new(Arc::clone(&router), 10).unwrap());

    assert!(!scheduler.register_component(Box::new(Listener)));
    assert_eq!(scheduler.module_count(), 1);
    assert_eq!(scheduler.module_names(), vec!["SinePilot"]);
}

#[test]
fn test_overrun_skips_sleep_and_loop_continues() {
    println!("INTEGRATION TEST: Frame Overrun");

    let router = Arc::new(MessageRouter::new());
    let clock = ManualClock::new();
    let mut scheduler = FrameScheduler::new(Arc::clone(&router), 10)
        .unwrap()
        .with_clock(clock.clone());
    scheduler.register(SlowOnceModule {
        clock: clock.clone(),
        cost: Duration::from_millis(105),
        updates: 0,
    });

    let stats = scheduler.run(Some(0.3)).unwrap();

    assert_eq!(stats.frames_processed, 3);
    assert_eq!(stats.overrun_count, 1);
    assert_eq!(stats.max_overrun, Duration::from_millis(5));
    let overruns = scheduler.overruns();
    assert_eq!(overruns.len(), 1);
    assert_eq!(overruns[0].frame, 1);
    // only the second tick was cheap and not final
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(100)]);
}

#[test]
fn test_stop_from_module_finishes_current_tick() {
    println!("INTEGRATION TEST: Stop Request");

    let router = Arc::new(MessageRouter::new());
    let mut scheduler = create_test_scheduler(&router, 10);
    let first_updates = Arc::new(Mutex::new(0));
    let second_updates = Arc::new(Mutex::new(0));
    scheduler.register(StoppingModule {
        stop: scheduler.stop_handle(),
        stop_at: 3,
        updates: Arc::clone(&first_updates),
    });
    scheduler.register(StoppingModule {
        stop: scheduler.stop_handle(),
        stop_at: u64::MAX,
        updates: Arc::clone(&second_updates),
    });

    let stats = scheduler.run(None).unwrap();

    assert_eq!(stats.frames_processed, 3);
    assert_eq!(*first_updates.lock().unwrap(), 3);
    assert_eq!(*second_updates.lock().unwrap(), 3);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[test]
fn test_stop_from_another_thread_on_wall_clock() {
    println!("INTEGRATION TEST: Cross-Thread Stop");

    let router = Arc::new(MessageRouter::new());
    let mut scheduler = FrameScheduler::new(Arc::clone(&router), 100).unwrap();
    let stop = scheduler.stop_handle();

    let controller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        stop.stop();
    });
    let stats = scheduler.run(None).unwrap();
    controller.join().unwrap();

    assert!(stats.frames_processed > 0);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert!(scheduler.stop_handle().is_stop_requested());
}

#[test]
fn test_controls_arrive_unchanged() {
    println!("INTEGRATION TEST: Controls Round Trip");

    let router = MessageRouter::new();
    let received = Arc::new(Mutex::new(None));
    {
        let received = Arc::clone(&received);
        router.subscribe(CONTROLS_TOPIC, move |message: &Message| {
            *received.lock().unwrap() = message.as_controls().copied();
            Ok(())
        });
    }
    let sent = ControlInputs::new(0.75, -0.25, 0.5, -1.0)
        .with_flaps(0.5)
        .with_gear(0.0);

    let delivered = router.publish(CONTROLS_TOPIC, Message::Controls(sent));

    assert_eq!(delivered, 1);
    assert_eq!(*received.lock().unwrap(), Some(sent));
}

#[test]
fn test_pilot_dynamics_recorder_same_tick() {
    println!("INTEGRATION TEST: Same-Tick Data Flow");

    let config = create_test_config(10);
    let router = Arc::new(MessageRouter::new());
    let states = collect_states(&router);
    let mut scheduler = create_test_scheduler(&router, config.frame_rate);
    let recorder = FlightRecorder::new(&router, config.frame_rate, 100).unwrap();
    let recording = recorder.handle();

    scheduler.register(SinePilot::new(Arc::clone(&router), config.frame_rate).unwrap());
    scheduler.register(FlightDynamics::from_config(Arc::clone(&router), &config).unwrap());
    scheduler.register(recorder);

    scheduler.run(Some(0.1)).unwrap();

    let events = recording.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], RecordedEvent::Controls { time, .. } if time == 0.0));
    assert!(matches!(events[1], RecordedEvent::State { time, .. } if time == 0.0));
    assert_eq!(states.lock().unwrap().len(), 1);

    let summary = recording.summary();
    assert_eq!(summary.controls_received, 1);
    assert_eq!(summary.states_received, 1);
    assert_relative_eq!(summary.simulation_time, 0.1);
}

#[test]
fn test_trim_throttle_holds_airspeed() {
    println!("INTEGRATION TEST: Trimmed Cruise");

    let config = create_test_config(60);
    let router = Arc::new(MessageRouter::new());
    let states = collect_states(&router);
    let dynamics = FlightDynamics::from_config(Arc::clone(&router), &config).unwrap();
    let throttle = dynamics.trim_throttle();
    let mut scheduler = create_test_scheduler(&router, config.frame_rate);
    scheduler.register(FixedPilot {
        router: Arc::clone(&router),
        controls: ControlInputs::new(throttle, 0.0, 0.0, 0.0),
    });
    scheduler.register(dynamics);

    scheduler.run(Some(10.0 / 60.0)).unwrap();

    let states = states.lock().unwrap();
    assert_eq!(states.len(), 10);
    assert_relative_eq!(states[0].velocity_body.x, 50.0, epsilon = 1e-9);
    for state in states.iter() {
        assert_relative_eq!(state.velocity_body.x, 50.0, epsilon = 0.01);
        // lift pushes the aircraft up, never down
        assert!(state.velocity_body.z <= 0.0);
        assert!(state.altitude() >= 1000.0);
    }
}

#[test]
fn test_failing_subscriber_does_not_stop_others() {
    println!("INTEGRATION TEST: Subscriber Isolation");

    let config = create_test_config(10);
    let router = Arc::new(MessageRouter::new());
    router.subscribe(AIRCRAFT_STATE_TOPIC, |_| {
        Err(SimulationError::handler(AIRCRAFT_STATE_TOPIC, "display offline"))
    });
    router.subscribe(AIRCRAFT_STATE_TOPIC, |_| panic!("broken gauge"));
    let states = collect_states(&router);
    let mut scheduler = create_test_scheduler(&router, config.frame_rate);
    scheduler.register(FlightDynamics::from_config(Arc::clone(&router), &config).unwrap());

    let stats = scheduler.run(Some(0.5)).unwrap();

    assert_eq!(stats.frames_processed, 5);
    assert_eq!(stats.module_failures, 0);
    assert_eq!(states.lock().unwrap().len(), 5);
    assert_eq!(router.stats().handler_failures, 10);
}

#[test]
fn test_host_thread_drives_dynamics_through_bridge() {
    println!("INTEGRATION TEST: Host Channel Bridge");

    let config = create_test_config(10);
    let router = Arc::new(MessageRouter::new());
    let (bridge, link) = ChannelBridge::new(Arc::clone(&router), 16);
    let HostLink { controls, states } = link;
    let recorder = FlightRecorder::new(&router, config.frame_rate, 100).unwrap();
    let recording = recorder.handle();

    let host = thread::spawn(move || {
        controls
            .send(ControlInputs::new(0.8, 0.0, 0.0, 0.0))
            .unwrap();
    });
    host.join().unwrap();

    let mut scheduler = create_test_scheduler(&router, config.frame_rate);
    scheduler.register(bridge);
    scheduler.register(FlightDynamics::from_config(Arc::clone(&router), &config).unwrap());
    scheduler.register(recorder);

    let stats = scheduler.run(Some(1.0)).unwrap();

    // the host hung up after one send; reported once, then the bridge idles
    assert_eq!(stats.module_failures, 1);
    assert_eq!(states.try_iter().count(), 10);
    let controls_seen: Vec<f64> = recording
        .events()
        .iter()
        .filter_map(|event| match event {
            RecordedEvent::Controls { controls, .. } => Some(controls.throttle()),
            _ => None,
        })
        .collect();
    assert_eq!(controls_seen, vec![0.8]);
}

#[test]
fn test_scheduler_runs_only_once() {
    println!("INTEGRATION TEST: Single Run");

    let router = Arc::new(MessageRouter::new());
    let mut scheduler = create_test_scheduler(&router, 10);
    scheduler.run(Some(0.2)).unwrap();

    let second = scheduler.run(Some(0.2));

    assert!(matches!(second, Err(SimulationError::InvalidState(_))));
    assert_eq!(scheduler.frame_count(), 2);
}
