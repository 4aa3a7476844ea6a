use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use serde::Serialize;

use super::aggregate::{Aggregate, aggregate, empty_groups};
use super::category::Category;
use super::process::ProcessRecord;

/// Immutable result of one completed sampling cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// 0 for the placeholder published before any cycle ran.
    pub cycle: u64,
    pub taken_at: SystemTime,
    pub elapsed: Duration,
    /// Sorted by ascending pid.
    pub records: Vec<ProcessRecord>,
    pub groups: BTreeMap<Category, Vec<ProcessRecord>>,
    pub top_cpu: Vec<ProcessRecord>,
    pub top_memory: Vec<ProcessRecord>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Snapshot {
            cycle: 0,
            taken_at: SystemTime::UNIX_EPOCH,
            elapsed: Duration::ZERO,
            records: Vec::new(),
            groups: empty_groups(),
            top_cpu: Vec::new(),
            top_memory: Vec::new(),
        }
    }

    pub fn build(
        cycle: u64,
        taken_at: SystemTime,
        elapsed: Duration,
        mut records: Vec<ProcessRecord>,
        top_n: usize,
    ) -> Self {
        records.sort_by_key(|r| r.pid);
        let Aggregate {
            groups,
            top_cpu,
            top_memory,
        } = aggregate(&records, top_n);
        Snapshot {
            cycle,
            taken_at,
            elapsed,
            records,
            groups,
            top_cpu,
            top_memory,
        }
    }

    pub fn record(&self, pid: u32) -> Option<&ProcessRecord> {
        self.records
            .binary_search_by_key(&pid, |r| r.pid)
            .ok()
            .map(|i| &self.records[i])
    }

    pub fn total_cpu_percent(&self) -> f64 {
        self.records.iter().map(|r| r.cpu_usage_percent).sum()
    }

    pub fn total_memory_bytes(&self) -> u64 {
        self.records.iter().map(|r| r.memory_usage_bytes).sum()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
