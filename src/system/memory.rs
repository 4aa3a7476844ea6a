use std::collections::BTreeSet;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resident memory lookup, consulted once per pid per cycle.
pub trait MemoryResolver: Send + 'static {
    /// Called once before a cycle's lookups with that cycle's enumeration.
    fn begin_cycle(&mut self, _pids: &BTreeSet<u32>) {}

    /// Resident bytes for `pid`; 0 when the process cannot be queried.
    fn memory_usage(&self, pid: u32) -> u64;
}

/// Resident set sizes read through sysinfo, refreshed in bulk per cycle.
pub struct SysinfoMemory {
    sys: System,
}

impl Default for SysinfoMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoMemory {
    pub fn new() -> Self {
        SysinfoMemory { sys: System::new() }
    }
}

impl MemoryResolver for SysinfoMemory {
    fn begin_cycle(&mut self, _pids: &BTreeSet<u32>) {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
    }

    fn memory_usage(&self, pid: u32) -> u64 {
        self.sys
            .process(Pid::from_u32(pid))
            .map(|process| process.memory())
            .unwrap_or(0)
    }
}
