use std::cmp::Ordering;
use std::path::PathBuf;

use serde::Serialize;

use super::category::Category;
use super::descriptor::ProcessDescriptor;

/// One process as observed in a single sampling cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub path: PathBuf,
    pub bundle_identifier: Option<String>,
    pub cpu_usage_percent: f64,
    pub memory_usage_bytes: u64,
    pub category: Category,
}

impl ProcessRecord {
    pub fn from_descriptor(
        descriptor: ProcessDescriptor,
        cpu_usage_percent: f64,
        memory_usage_bytes: u64,
        category: Category,
    ) -> Self {
        ProcessRecord {
            pid: descriptor.pid,
            name: descriptor.name,
            path: descriptor.path,
            bundle_identifier: descriptor.bundle_identifier,
            cpu_usage_percent,
            memory_usage_bytes,
            category,
        }
    }
}

/// Highest CPU first, ties by ascending pid.
pub fn by_cpu_desc(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    b.cpu_usage_percent
        .total_cmp(&a.cpu_usage_percent)
        .then_with(|| a.pid.cmp(&b.pid))
}

/// Highest resident memory first, ties by ascending pid.
pub fn by_memory_desc(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    b.memory_usage_bytes
        .cmp(&a.memory_usage_bytes)
        .then_with(|| a.pid.cmp(&b.pid))
}
