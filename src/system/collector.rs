use std::collections::BTreeSet;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, trace};

use super::aggregate::DEFAULT_TOP_N;
use super::category::{Categorizer, CategoryRule};
use super::cpu::{CpuUsageCalculator, DEFAULT_MAX_PERCENT, DEFAULT_MIN_WALL_DELTA};
use super::descriptor;
use super::enumerator;
use super::memory::{MemoryResolver, SysinfoMemory};
use super::platform::{NativeHost, ProcessHost};
use super::process::ProcessRecord;
use super::snapshot::Snapshot;
use super::timebase::TimeBase;

#[derive(Clone, Debug)]
pub struct CollectorOptions {
    pub top_n: usize,
    pub min_wall_delta: Duration,
    pub max_cpu_percent: f64,
    pub category_rules: Vec<CategoryRule>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        CollectorOptions {
            top_n: DEFAULT_TOP_N,
            min_wall_delta: DEFAULT_MIN_WALL_DELTA,
            max_cpu_percent: DEFAULT_MAX_PERCENT,
            category_rules: Vec::new(),
        }
    }
}

/// Runs sampling cycles and owns the per-pid CPU baselines between them.
pub struct Collector {
    host: Box<dyn ProcessHost>,
    memory: Box<dyn MemoryResolver>,
    cpu: CpuUsageCalculator,
    categorizer: Categorizer,
    top_n: usize,
    cycle: u64,
}

impl Collector {
    pub fn new(options: CollectorOptions) -> Self {
        Self::with_parts(NativeHost, SysinfoMemory::new(), options)
    }

    pub fn with_parts<H, M>(host: H, memory: M, options: CollectorOptions) -> Self
    where
        H: ProcessHost,
        M: MemoryResolver,
    {
        let timebase = TimeBase::or_identity(host.timebase());
        debug!(
            numer = timebase.numer,
            denom = timebase.denom,
            "tick time base"
        );
        Collector {
            host: Box::new(host),
            memory: Box::new(memory),
            cpu: CpuUsageCalculator::with_limits(
                timebase,
                options.min_wall_delta,
                options.max_cpu_percent,
            ),
            categorizer: Categorizer::new(options.category_rules),
            top_n: options.top_n,
            cycle: 0,
        }
    }

    pub fn tracked_baselines(&self) -> usize {
        self.cpu.tracked()
    }

    pub fn run_cycle(&mut self) -> Snapshot {
        self.run_cycle_at(Instant::now())
    }

    /// One full enumerate → resolve → measure → categorize → aggregate pass.
    ///
    /// Per-pid failures only shrink the result; the cycle itself cannot fail.
    pub fn run_cycle_at(&mut self, now: Instant) -> Snapshot {
        let _cycle_span = tracing::debug_span!("collector.cycle", cycle = self.cycle + 1).entered();
        let started = Instant::now();
        let taken_at = SystemTime::now();

        let pids = enumerator::list_pids(self.host.as_ref());
        self.memory.begin_cycle(&pids);

        let mut records = Vec::with_capacity(pids.len());
        let mut vanished = 0usize;
        for &pid in &pids {
            match self.sample(pid, now) {
                Some(record) => records.push(record),
                None => {
                    trace!(pid, "process vanished before resolution");
                    vanished += 1;
                }
            }
        }

        let evicted = self.evict_departed(&pids);
        self.cycle += 1;
        let elapsed = started.elapsed();

        debug!(
            cycle = self.cycle,
            enumerated = pids.len(),
            records = records.len(),
            vanished,
            evicted,
            elapsed_ms = elapsed.as_millis() as u64,
            "sampling cycle complete"
        );

        Snapshot::build(self.cycle, taken_at, elapsed, records, self.top_n)
    }

    fn sample(&mut self, pid: u32, now: Instant) -> Option<ProcessRecord> {
        let descriptor = descriptor::resolve(self.host.as_ref(), pid)?;
        // unreadable counters count as idle for this cycle
        let cpu = match self.host.cpu_ticks(pid) {
            Some(ticks) => self.cpu.update(pid, ticks, now),
            None => 0.0,
        };
        let memory = self.memory.memory_usage(pid);
        let category = self
            .categorizer
            .categorize(&descriptor.name, descriptor.bundle_identifier.as_deref());
        Some(ProcessRecord::from_descriptor(
            descriptor, cpu, memory, category,
        ))
    }

    fn evict_departed(&mut self, alive: &BTreeSet<u32>) -> usize {
        self.cpu.retain_alive(alive)
    }
}
