use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossbeam_channel::SendTimeoutError;
use flight_simulation::*;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PilotKind {
    /// Smooth sinusoidal inputs with periodic autopilot hold
    Sine,
    /// Random stick inputs every half second
    Random,
    /// Inputs produced on a separate host thread
    Channel,
}

#[derive(Debug, Parser)]
#[command(name = "flight_sim", about = "Fixed-rate flight dynamics harness")]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame rate in Hz (overrides the configuration file)
    #[arg(short, long)]
    frame_rate: Option<u32>,

    /// Simulated seconds to run (overrides the configuration file)
    #[arg(short, long)]
    duration: Option<f64>,

    #[arg(short, long, value_enum, default_value_t = PilotKind::Sine)]
    pilot: PilotKind,

    /// Seed for the random pilot
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(frame_rate) = args.frame_rate {
        config.frame_rate = frame_rate;
    }
    if args.duration.is_some() {
        config.duration = args.duration;
    }
    if config.duration.is_none() {
        config.duration = Some(30.0);
    }
    config.validate()?;

    let router = Arc::new(MessageRouter::new());
    let mut scheduler = FrameScheduler::from_config(Arc::clone(&router), &config)?;

    let mut host_worker = None;
    match args.pilot {
        PilotKind::Sine => {
            scheduler.register(SinePilot::new(Arc::clone(&router), config.frame_rate)?);
        }
        PilotKind::Random => {
            let interval = u64::from(config.frame_rate / 2).max(1);
            scheduler.register(RandomPilot::new(Arc::clone(&router), interval, args.seed)?);
        }
        PilotKind::Channel => {
            let (bridge, link) = ChannelBridge::new(Arc::clone(&router), 16);
            scheduler.register(bridge);
            host_worker = Some(spawn_host(link, config.frame_rate, scheduler.stop_handle()));
        }
    }

    scheduler.register(FlightDynamics::from_config(Arc::clone(&router), &config)?);

    let recorder = FlightRecorder::new(&router, config.frame_rate, 10_000)?;
    let summary_source = recorder.handle();
    scheduler.register(recorder);

    log::info!("Active modules: {:?}", scheduler.module_names());
    let stats = scheduler.run(config.duration)?;

    // Duration stops do not raise the flag; the host thread waits on it.
    scheduler.stop();
    if let Some(worker) = host_worker {
        if worker.join().is_err() {
            log::error!("Host worker thread panicked");
        }
    }

    summary_source.display_summary();
    println!("\n--- Scheduler ---");
    println!("Frames processed: {}", stats.frames_processed);
    println!("Simulated time: {:.2}s", stats.simulation_time);
    println!("Active modules: {}", stats.active_modules);
    println!("Frame rate: {} Hz", stats.frame_rate);
    println!("Module failures: {}", stats.module_failures);
    println!(
        "Overruns: {} (max {:.1}ms)",
        stats.overrun_count,
        stats.max_overrun.as_secs_f64() * 1000.0
    );

    Ok(())
}

/// Stands in for a host simulator: sends controls at the frame rate and
/// drains state snapshots until the frame loop stops.
fn spawn_host(link: HostLink, frame_rate: u32, stop: StopHandle) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let period = Duration::from_secs(1) / frame_rate;
        let mut frame: u64 = 0;
        while !stop.is_stop_requested() {
            frame += 1;
            let t = frame as f64 / f64::from(frame_rate);
            let controls = ControlInputs::new(0.6, 0.1 * (t * 0.5).sin(), 0.0, 0.0);
            match link.controls.send_timeout(controls, period) {
                Ok(()) => {}
                // A stalled frame loop only delays the host; re-check the stop flag.
                Err(SendTimeoutError::Timeout(_)) => continue,
                Err(SendTimeoutError::Disconnected(_)) => break,
            }
            for state in link.states.try_iter() {
                log::trace!("Host received altitude {:.1}m", state.altitude());
            }
            thread::sleep(period);
        }
    })
}
