use std::collections::BTreeSet;
use std::path::PathBuf;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

use super::{CpuTicks, PlatformProcesses};
use crate::system::timebase::TimeBase;

/// Targets without a native tick source: enumerate through sysinfo and report
/// no CPU counters, which samples every process at zero usage.
pub struct Platform;

impl PlatformProcesses for Platform {
    fn list_pids() -> BTreeSet<u32> {
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );
        sys.processes()
            .keys()
            .map(|pid| pid.as_u32())
            .filter(|&pid| pid > 0)
            .collect()
    }

    fn executable_path(pid: u32) -> Option<PathBuf> {
        let mut sys = System::new();
        let pids = [Pid::from_u32(pid)];
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&pids),
            true,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::Always),
        );
        let process = sys.process(pids[0])?;
        match process.exe() {
            Some(exe) => Some(exe.to_path_buf()),
            None => Some(PathBuf::from(process.name())),
        }
    }

    fn cpu_ticks(_pid: u32) -> Option<CpuTicks> {
        None
    }

    fn timebase() -> Option<TimeBase> {
        None
    }
}
