//! Periodic sampling on a background task with single-point snapshot publication.
//!
//! A [`Monitor`] is `Idle` until [`Monitor::start_monitoring`] spawns the
//! sampling loop, and returns to `Idle` once [`Monitor::stop_monitoring`]
//! has joined it. Every cycle, periodic or manual, runs under the same
//! collector lock and publishes through the same `watch` channel, so cycles
//! never interleave and readers only ever see completed snapshots.

use std::panic;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::system::collector::Collector;
use crate::system::kill;
use crate::system::process::ProcessRecord;
use crate::system::snapshot::Snapshot;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
}

struct Shared {
    collector: Mutex<Collector>,
    publisher: watch::Sender<Arc<Snapshot>>,
    interval: Duration,
}

impl Shared {
    fn lock_collector(&self) -> MutexGuard<'_, Collector> {
        // a panicked cycle leaves the baselines usable
        self.collector.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one cycle and publish it while still holding the cycle lock.
    fn cycle_and_publish(&self) -> Arc<Snapshot> {
        let mut collector = self.lock_collector();
        let snapshot = Arc::new(collector.run_cycle());
        self.publisher.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}

/// One running sampling loop and the channel that cancels only that loop.
struct LoopHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct Monitor {
    shared: Arc<Shared>,
    running: Mutex<Option<LoopHandle>>,
}

impl Monitor {
    /// `interval` is the pause between the end of one cycle and the start of
    /// the next; it must be non-zero.
    pub fn new(collector: Collector, interval: Duration) -> Self {
        let (publisher, _) = watch::channel(Arc::new(Snapshot::empty()));
        Monitor {
            shared: Arc::new(Shared {
                collector: Mutex::new(collector),
                publisher,
                interval,
            }),
            running: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn state(&self) -> MonitorState {
        match self.loop_slot().as_ref() {
            Some(handle) if !handle.task.is_finished() => MonitorState::Running,
            _ => MonitorState::Idle,
        }
    }

    /// Spawn the sampling loop on the current tokio runtime.
    ///
    /// Returns `false` if the loop is already running.
    pub fn start_monitoring(&self) -> bool {
        let mut slot = self.loop_slot();
        if let Some(handle) = slot.as_ref()
            && !handle.task.is_finished()
        {
            return false;
        }
        let (cancel, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(sampling_loop(Arc::clone(&self.shared), cancel_rx));
        *slot = Some(LoopHandle { cancel, task });
        true
    }

    /// Request cancellation and wait for the loop to exit.
    ///
    /// A cycle already in progress completes and is published first.
    /// A `start_monitoring` racing with this call starts a fresh loop that
    /// this call leaves running.
    pub async fn stop_monitoring(&self) {
        let Some(handle) = self.loop_slot().take() else {
            return;
        };
        handle.cancel.send_replace(true);
        if let Err(err) = handle.task.await {
            error!(%err, "sampling loop ended abnormally");
        }
    }

    /// Run exactly one cycle outside the periodic schedule and return what it
    /// published. Waits for any cycle already in progress.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let shared = Arc::clone(&self.shared);
        match tokio::task::spawn_blocking(move || shared.cycle_and_publish()).await {
            Ok(snapshot) => snapshot,
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(_) => self.snapshot(),
        }
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.shared.publisher.borrow())
    }

    /// Receiver that is notified on every publication.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.shared.publisher.subscribe()
    }

    pub fn terminate(&self, record: &ProcessRecord) -> bool {
        kill::terminate(record.pid)
    }

    pub fn force_quit(&self, record: &ProcessRecord) -> bool {
        kill::force_quit(record.pid)
    }

    fn loop_slot(&self) -> MutexGuard<'_, Option<LoopHandle>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(handle) = self.loop_slot().take() {
            handle.cancel.send_replace(true);
        }
    }
}

async fn sampling_loop(shared: Arc<Shared>, mut cancel_rx: watch::Receiver<bool>) {
    info!(
        interval_ms = shared.interval.as_millis() as u64,
        "sampling started"
    );
    loop {
        if *cancel_rx.borrow() {
            break;
        }

        let worker = Arc::clone(&shared);
        match tokio::task::spawn_blocking(move || worker.cycle_and_publish()).await {
            Ok(snapshot) => debug!(
                cycle = snapshot.cycle,
                records = snapshot.records.len(),
                "snapshot published"
            ),
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(_) => break,
        }

        if *cancel_rx.borrow() {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(shared.interval) => {}
            changed = cancel_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    info!("sampling stopped");
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    use super::*;
    use crate::system::collector::CollectorOptions;
    use crate::system::memory::MemoryResolver;
    use crate::system::platform::{CpuTicks, ProcessHost};
    use crate::system::timebase::TimeBase;

    struct OneProcessHost;

    impl ProcessHost for OneProcessHost {
        fn list_pids(&self) -> BTreeSet<u32> {
            BTreeSet::from([42])
        }

        fn executable_path(&self, _pid: u32) -> Option<PathBuf> {
            Some(PathBuf::from("/usr/bin/worker"))
        }

        fn cpu_ticks(&self, _pid: u32) -> Option<CpuTicks> {
            Some(CpuTicks::default())
        }

        fn timebase(&self) -> Option<TimeBase> {
            Some(TimeBase::IDENTITY)
        }
    }

    struct NoMemory;

    impl MemoryResolver for NoMemory {
        fn memory_usage(&self, _pid: u32) -> u64 {
            0
        }
    }

    fn monitor(interval: Duration) -> Monitor {
        let collector =
            Collector::with_parts(OneProcessHost, NoMemory, CollectorOptions::default());
        Monitor::new(collector, interval)
    }

    #[test]
    fn starts_idle_with_empty_snapshot() {
        let m = monitor(DEFAULT_INTERVAL);
        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(m.snapshot().cycle, 0);
        assert!(m.snapshot().records.is_empty());
    }

    #[tokio::test]
    async fn refresh_publishes_one_cycle() {
        let m = monitor(DEFAULT_INTERVAL);
        let mut rx = m.subscribe();
        let snap = m.refresh().await;
        assert_eq!(snap.cycle, 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().cycle, 1);
        assert_eq!(m.snapshot().records[0].pid, 42);
        assert_eq!(m.state(), MonitorState::Idle);
    }

    #[tokio::test]
    async fn start_is_idempotent_and_stop_returns_to_idle() {
        let m = monitor(Duration::from_millis(10));
        assert!(m.start_monitoring());
        assert!(!m.start_monitoring());
        assert_eq!(m.state(), MonitorState::Running);

        let mut rx = m.subscribe();
        rx.wait_for(|s| s.cycle >= 2).await.unwrap();

        m.stop_monitoring().await;
        assert_eq!(m.state(), MonitorState::Idle);
        let stopped_at = m.snapshot().cycle;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(m.snapshot().cycle, stopped_at);
    }

    #[tokio::test]
    async fn stop_cuts_the_sleep_short() {
        let m = monitor(Duration::from_secs(3600));
        assert!(m.start_monitoring());
        let mut rx = m.subscribe();
        rx.wait_for(|s| s.cycle == 1).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), m.stop_monitoring())
            .await
            .expect("stop should not wait out the interval");
        assert_eq!(m.snapshot().cycle, 1);
    }

    #[tokio::test]
    async fn can_restart_after_stop() {
        let m = monitor(Duration::from_millis(10));
        assert!(m.start_monitoring());
        m.stop_monitoring().await;
        let before = m.snapshot().cycle;
        assert!(m.start_monitoring());
        let mut rx = m.subscribe();
        rx.wait_for(|s| s.cycle > before).await.unwrap();
        m.stop_monitoring().await;
    }
}
