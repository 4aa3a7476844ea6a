use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::descriptor;
use super::timebase::TimeBase;

/// Cumulative kernel CPU counters for one process, in host ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub user: u64,
    pub system: u64,
}

pub trait PlatformProcesses {
    fn list_pids() -> BTreeSet<u32>;
    fn executable_path(pid: u32) -> Option<PathBuf>;
    fn cpu_ticks(pid: u32) -> Option<CpuTicks>;
    fn timebase() -> Option<TimeBase>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod other;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use other as platform_impl;

pub fn list_pids() -> BTreeSet<u32> {
    platform_impl::Platform::list_pids()
}

pub fn executable_path(pid: u32) -> Option<PathBuf> {
    platform_impl::Platform::executable_path(pid)
}

pub fn cpu_ticks(pid: u32) -> Option<CpuTicks> {
    platform_impl::Platform::cpu_ticks(pid)
}

pub fn host_timebase() -> Option<TimeBase> {
    platform_impl::Platform::timebase()
}

/// The OS capabilities one sampling cycle consumes.
///
/// `NativeHost` talks to the running kernel; tests substitute scripted hosts.
pub trait ProcessHost: Send + 'static {
    fn list_pids(&self) -> BTreeSet<u32>;
    fn executable_path(&self, pid: u32) -> Option<PathBuf>;
    fn cpu_ticks(&self, pid: u32) -> Option<CpuTicks>;
    fn timebase(&self) -> Option<TimeBase>;

    /// Stable identifier from the bundle manifest under `bundle_root`.
    fn bundle_identifier(&self, bundle_root: &Path) -> Option<String> {
        descriptor::read_bundle_identifier(bundle_root)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NativeHost;

impl ProcessHost for NativeHost {
    fn list_pids(&self) -> BTreeSet<u32> {
        list_pids()
    }

    fn executable_path(&self, pid: u32) -> Option<PathBuf> {
        executable_path(pid)
    }

    fn cpu_ticks(&self, pid: u32) -> Option<CpuTicks> {
        cpu_ticks(pid)
    }

    fn timebase(&self) -> Option<TimeBase> {
        host_timebase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_do_not_panic_for_current_pid() {
        let pid = std::process::id();
        let _ = executable_path(pid);
        let _ = cpu_ticks(pid);
        let _ = host_timebase();
    }

    #[test]
    fn enumeration_contains_no_zero_pid() {
        assert!(!list_pids().contains(&0));
    }
}
