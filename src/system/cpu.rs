//! Delta-based CPU utilization from cumulative kernel tick counters.
//!
//! Each pid keeps a [`CpuBaseline`] with the counters and wall time of its
//! previous observation. The next observation divides the converted tick
//! delta by the elapsed wall time. Baselines for pids missing from the
//! latest enumeration are dropped so that a reused pid starts fresh.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use super::platform::CpuTicks;
use super::timebase::TimeBase;

/// Wall time below which a delta is too noisy to report.
pub const DEFAULT_MIN_WALL_DELTA: Duration = Duration::from_millis(100);
/// Ceiling for a single process, leaving headroom for four busy cores.
pub const DEFAULT_MAX_PERCENT: f64 = 400.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuBaseline {
    pub user_ticks: u64,
    pub system_ticks: u64,
    pub observed_at: Instant,
}

#[derive(Debug)]
pub struct CpuUsageCalculator {
    timebase: TimeBase,
    min_wall_delta: Duration,
    max_percent: f64,
    baselines: HashMap<u32, CpuBaseline>,
}

impl CpuUsageCalculator {
    pub fn new(timebase: TimeBase) -> Self {
        Self::with_limits(timebase, DEFAULT_MIN_WALL_DELTA, DEFAULT_MAX_PERCENT)
    }

    pub fn with_limits(timebase: TimeBase, min_wall_delta: Duration, max_percent: f64) -> Self {
        Self {
            timebase,
            min_wall_delta,
            max_percent: cap_percent(max_percent),
            baselines: HashMap::new(),
        }
    }

    pub fn timebase(&self) -> TimeBase {
        self.timebase
    }

    /// Record an observation for `pid` and return its utilization since the
    /// previous one, in percent of one core.
    ///
    /// Returns 0 for a first observation and for observations closer than
    /// the wall-delta floor. The baseline is replaced in every case.
    pub fn update(&mut self, pid: u32, ticks: CpuTicks, now: Instant) -> f64 {
        let current = CpuBaseline {
            user_ticks: ticks.user,
            system_ticks: ticks.system,
            observed_at: now,
        };
        let Some(previous) = self.baselines.insert(pid, current) else {
            return 0.0;
        };

        let wall = now.saturating_duration_since(previous.observed_at);
        if wall < self.min_wall_delta || wall.is_zero() {
            return 0.0;
        }

        let tick_delta = (i128::from(ticks.user) - i128::from(previous.user_ticks))
            + (i128::from(ticks.system) - i128::from(previous.system_ticks));
        // counters that went backwards belong to a different process
        if tick_delta <= 0 {
            return 0.0;
        }
        let busy_ns = self
            .timebase
            .ticks_to_nanos(u64::try_from(tick_delta).unwrap_or(u64::MAX));
        let percent = busy_ns as f64 / wall.as_nanos() as f64 * 100.0;
        percent.clamp(0.0, self.max_percent)
    }

    /// Drop baselines for pids absent from `alive`; returns how many were evicted.
    pub fn retain_alive(&mut self, alive: &BTreeSet<u32>) -> usize {
        let before = self.baselines.len();
        self.baselines.retain(|pid, _| alive.contains(pid));
        before - self.baselines.len()
    }

    pub fn baseline(&self, pid: u32) -> Option<&CpuBaseline> {
        self.baselines.get(&pid)
    }

    pub fn tracked(&self) -> usize {
        self.baselines.len()
    }
}

/// Ceilings above four cores, or not a number, fall back to the default.
fn cap_percent(max_percent: f64) -> f64 {
    if max_percent.is_nan() {
        return DEFAULT_MAX_PERCENT;
    }
    max_percent.clamp(0.0, DEFAULT_MAX_PERCENT)
}
