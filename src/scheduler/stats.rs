//! Frame-loop statistics.
//!
//! Counters are owned by the scheduler and updated once per tick; callers get
//! copies, so they stay readable after the loop has stopped.

use std::collections::VecDeque;
use std::time::Duration;

/// Number of individual overruns kept for inspection.
pub const OVERRUN_HISTORY: usize = 256;

/// A tick that took longer than its frame period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrun {
    pub frame: u64,
    pub magnitude: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerStats {
    pub frames_processed: u64,
    pub simulation_time: f64,
    pub active_modules: usize,
    pub frame_rate: u32,
    pub frame_period: f64,
    pub module_failures: u64,
    pub last_tick_cost: Duration,
    pub overrun_count: u64,
    pub last_overrun: Option<Overrun>,
    pub max_overrun: Duration,
    pub total_overrun: Duration,
}

impl SchedulerStats {
    pub fn new(frame_rate: u32, frame_period: f64) -> Self {
        SchedulerStats {
            frames_processed: 0,
            simulation_time: 0.0,
            active_modules: 0,
            frame_rate,
            frame_period,
            module_failures: 0,
            last_tick_cost: Duration::ZERO,
            overrun_count: 0,
            last_overrun: None,
            max_overrun: Duration::ZERO,
            total_overrun: Duration::ZERO,
        }
    }

    /// Simulated time is a pure function of the frame count.
    pub fn record_frame(&mut self) {
        self.frames_processed += 1;
        self.simulation_time = self.frames_processed as f64 * self.frame_period;
    }

    pub fn record_tick_cost(&mut self, tick_cost: Duration) {
        self.last_tick_cost = tick_cost;
    }

    pub fn record_overrun(&mut self, overrun: Overrun, history: &mut VecDeque<Overrun>) {
        self.overrun_count += 1;
        self.total_overrun += overrun.magnitude;
        self.max_overrun = self.max_overrun.max(overrun.magnitude);
        self.last_overrun = Some(overrun);

        if history.len() == OVERRUN_HISTORY {
            history.pop_front();
        }
        history.push_back(overrun);
    }

    /// Period over cost for the last tick, as a percentage.
    pub fn efficiency_percent(&self) -> f64 {
        let cost = self.last_tick_cost.as_secs_f64();
        if cost > 0.0 {
            self.frame_period / cost * 100.0
        } else {
            100.0
        }
    }
}
