use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SimConfig;
use crate::constants::{LIFECYCLE_TOPIC, TELEMETRY_TOPIC};
use crate::errors::SimulationError;
use crate::messaging::message::{FrameTelemetry, LifecycleEvent, Message};
use crate::messaging::router::MessageRouter;

use super::clock::{Clock, SystemClock};
use super::module::{Component, Module};
use super::stats::{Overrun, SchedulerStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Cooperative cancellation for a running [`FrameScheduler`].
///
/// Clones are cheap and may be moved into modules or onto other threads. A
/// stop requested mid-tick lets the remaining modules of that tick update,
/// then the loop exits.
#[derive(Debug, Clone)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// A registered participant in the frame loop.
enum Slot {
    Module(Box<dyn Module>),
    Component(Box<dyn Component>),
}

impl Slot {
    fn name(&self) -> &str {
        match self {
            Slot::Module(module) => module.name(),
            Slot::Component(component) => component.name(),
        }
    }

    fn module(&mut self) -> Option<&mut dyn Module> {
        match self {
            Slot::Module(module) => Some(&mut **module),
            Slot::Component(component) => component.as_module(),
        }
    }
}

/// Fixed-rate frame loop.
///
/// Modules update once per tick in registration order. Ticks are paced to the
/// wall clock: a cheap tick sleeps out the rest of its period, an expensive
/// one is recorded as an overrun and the next tick starts immediately.
pub struct FrameScheduler {
    router: Arc<MessageRouter>,
    frame_rate: u32,
    frame_period: Duration,
    modules: Vec<Slot>,
    state: SchedulerState,
    stop: StopHandle,
    clock: Box<dyn Clock>,
    stats: SchedulerStats,
    overruns: VecDeque<Overrun>,
}

impl FrameScheduler {
    pub fn new(router: Arc<MessageRouter>, frame_rate: u32) -> Result<Self, SimulationError> {
        if frame_rate == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "frame rate must be a positive number of Hz".to_string(),
            ));
        }

        let frame_period = Duration::from_secs(1) / frame_rate;
        log::info!(
            "Frame scheduler created: {} Hz, period {:.4}s",
            frame_rate,
            frame_period.as_secs_f64()
        );

        Ok(FrameScheduler {
            router,
            frame_rate,
            frame_period,
            modules: Vec::new(),
            state: SchedulerState::Idle,
            stop: StopHandle {
                requested: Arc::new(AtomicBool::new(false)),
            },
            clock: Box::new(SystemClock::new()),
            stats: SchedulerStats::new(frame_rate, 1.0 / f64::from(frame_rate)),
            overruns: VecDeque::new(),
        })
    }

    pub fn from_config(router: Arc<MessageRouter>, config: &SimConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Self::new(router, config.frame_rate)
    }

    /// Replaces the pacing clock.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Adds a module to the end of the update order.
    pub fn register<M: Module + 'static>(&mut self, module: M) {
        self.push_slot(Slot::Module(Box::new(module)));
    }

    /// Adds a component whose capabilities are only known at runtime.
    /// Components without the update capability are rejected and `false` is
    /// returned.
    pub fn register_component(&mut self, mut component: Box<dyn Component>) -> bool {
        if component.as_module().is_none() {
            log::error!(
                "Rejected '{}': it has no per-frame update",
                component.name()
            );
            return false;
        }

        self.push_slot(Slot::Component(component));
        true
    }

    fn push_slot(&mut self, slot: Slot) {
        log::info!("Module registered: {}", slot.name());
        self.modules.push(slot);
        self.stats.active_modules = self.modules.len();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }

    pub fn frame_count(&self) -> u64 {
        self.stats.frames_processed
    }

    pub fn simulation_time(&self) -> f64 {
        self.stats.simulation_time
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats.clone()
    }

    /// Most recent overruns, oldest first.
    pub fn overruns(&self) -> Vec<Overrun> {
        self.overruns.iter().copied().collect()
    }

    /// Runs the loop until `stop()` is observed or, if given, until
    /// `duration` simulated seconds have elapsed. A scheduler runs once.
    pub fn run(&mut self, duration: Option<f64>) -> Result<SchedulerStats, SimulationError> {
        if self.state != SchedulerState::Idle {
            return Err(SimulationError::InvalidState(format!(
                "run() requires an idle scheduler, found {:?}",
                self.state
            )));
        }
        if let Some(duration) = duration {
            if !(duration.is_finite() && duration > 0.0) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "duration must be positive and finite, got {}",
                    duration
                )));
            }
        }

        self.state = SchedulerState::Running;
        log::info!(
            "Starting simulation: {} module(s), duration {}",
            self.modules.len(),
            duration.map_or("unbounded".to_string(), |d| format!("{}s", d))
        );
        self.router.publish(
            LIFECYCLE_TOPIC,
            Message::Lifecycle(LifecycleEvent::Started {
                frame_rate: self.frame_rate,
                duration,
            }),
        );

        while !self.stop.is_stop_requested() {
            let tick_start = self.clock.now();

            self.update_all_modules();
            self.stats.record_frame();
            self.publish_progress(self.clock.now().saturating_sub(tick_start));

            // Telemetry subscribers run inside the tick and are charged to it.
            let tick_cost = self.clock.now().saturating_sub(tick_start);
            self.stats.record_tick_cost(tick_cost);

            let finished = self.duration_reached(duration);
            if !finished && !self.stop.is_stop_requested() {
                self.enforce_real_time(tick_cost);
            } else if tick_cost > self.frame_period {
                self.record_overrun(tick_cost);
            }

            if finished {
                log::info!(
                    "Duration of {:.2}s reached, stopping simulation",
                    self.stats.simulation_time
                );
                break;
            }
        }

        self.state = SchedulerState::Stopped;
        log::info!(
            "Simulation stopped: {} frame(s), {:.2}s simulated, {} module(s), {} overrun(s)",
            self.stats.frames_processed,
            self.stats.simulation_time,
            self.modules.len(),
            self.stats.overrun_count
        );
        self.router.publish(
            LIFECYCLE_TOPIC,
            Message::Lifecycle(LifecycleEvent::Stopped {
                frames: self.stats.frames_processed,
                simulated_time: self.stats.simulation_time,
            }),
        );

        Ok(self.stats.clone())
    }

    fn update_all_modules(&mut self) {
        for slot in self.modules.iter_mut() {
            let Some(module) = slot.module() else {
                continue;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| module.update())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.stats.module_failures += 1;
                    log::error!("Error in {}.update(): {}", module.name(), e);
                }
                Err(_) => {
                    self.stats.module_failures += 1;
                    log::error!("{}.update() panicked; skipped for this frame", module.name());
                }
            }
        }
    }

    // Tolerates the rounding in frame_count * period so that, for example,
    // 20 frames at 10 Hz satisfy a 2.0s duration.
    fn duration_reached(&self, duration: Option<f64>) -> bool {
        match duration {
            Some(duration) => {
                let tolerance = self.stats.frame_period * 1e-6;
                self.stats.simulation_time + tolerance >= duration
            }
            None => false,
        }
    }

    fn enforce_real_time(&mut self, tick_cost: Duration) {
        if tick_cost < self.frame_period {
            self.clock.sleep(self.frame_period - tick_cost);
        } else if tick_cost > self.frame_period {
            self.record_overrun(tick_cost);
        }
    }

    fn record_overrun(&mut self, tick_cost: Duration) {
        let overrun = Overrun {
            frame: self.stats.frames_processed,
            magnitude: tick_cost - self.frame_period,
        };
        log::warn!(
            "Frame {} late: +{:.1}ms",
            overrun.frame,
            overrun.magnitude.as_secs_f64() * 1000.0
        );
        self.stats.record_overrun(overrun, &mut self.overruns);
    }

    fn publish_progress(&mut self, elapsed: Duration) {
        if self.stats.frames_processed % u64::from(self.frame_rate) != 0 {
            return;
        }

        self.stats.record_tick_cost(elapsed);

        let telemetry = FrameTelemetry {
            frame: self.stats.frames_processed,
            simulated_time: self.stats.simulation_time,
            tick_cost: self.stats.last_tick_cost,
            efficiency_percent: self.stats.efficiency_percent(),
            overrun_count: self.stats.overrun_count,
        };
        log::info!(
            "Frame {} | simulated time {:.1}s | efficiency {:.1}%",
            telemetry.frame,
            telemetry.simulated_time,
            telemetry.efficiency_percent
        );
        self.router
            .publish(TELEMETRY_TOPIC, Message::FrameTelemetry(telemetry));
    }
}
