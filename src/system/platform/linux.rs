use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::{CpuTicks, PlatformProcesses};
use crate::system::timebase::TimeBase;

const NANOS_PER_SEC: u64 = 1_000_000_000;

pub struct Platform;

impl PlatformProcesses for Platform {
    fn list_pids() -> BTreeSet<u32> {
        let Ok(entries) = fs::read_dir("/proc") else {
            return BTreeSet::new();
        };
        entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
            .filter(|&pid| pid > 0)
            .collect()
    }

    fn executable_path(pid: u32) -> Option<PathBuf> {
        let proc_dir = PathBuf::from(format!("/proc/{pid}"));
        // Other users' exe links are unreadable without privileges, so fall
        // back to argv[0] and then comm before giving up on the pid.
        if let Ok(target) = fs::read_link(proc_dir.join("exe")) {
            return Some(strip_deleted_suffix(target));
        }
        if let Some(argv0) = read_argv0(&proc_dir) {
            return Some(argv0);
        }
        let comm = fs::read_to_string(proc_dir.join("comm")).ok()?;
        let comm = comm.trim();
        // kernel threads have no executable; keep comm as a single segment
        (!comm.is_empty()).then(|| PathBuf::from(comm.replace('/', "_")))
    }

    fn cpu_ticks(pid: u32) -> Option<CpuTicks> {
        let contents = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
        parse_stat_ticks(&contents)
    }

    fn timebase() -> Option<TimeBase> {
        // SAFETY: sysconf has no preconditions; -1 and 0 are rejected below.
        let tck = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if tck <= 0 {
            return None;
        }
        TimeBase::new(NANOS_PER_SEC, tck as u64)
    }
}

fn read_argv0(proc_dir: &Path) -> Option<PathBuf> {
    let raw = fs::read(proc_dir.join("cmdline")).ok()?;
    let first = raw.split(|&b| b == 0).next()?;
    let argv0 = std::str::from_utf8(first).ok()?.trim();
    (!argv0.is_empty()).then(|| PathBuf::from(argv0))
}

fn strip_deleted_suffix(target: PathBuf) -> PathBuf {
    match target.to_str().and_then(|s| s.strip_suffix(" (deleted)")) {
        Some(stripped) => PathBuf::from(stripped),
        None => target,
    }
}

/// Pull `utime` and `stime` out of a `/proc/<pid>/stat` line.
pub(crate) fn parse_stat_ticks(contents: &str) -> Option<CpuTicks> {
    // comm may contain spaces and parens, so split after the last ')'
    let after_comm = contents.rfind(')')? + 1;
    let fields: Vec<&str> = contents[after_comm..].split_whitespace().collect();
    // state(0) ppid(1) pgrp(2) session(3) tty_nr(4) tpgid(5) flags(6)
    // minflt(7) cminflt(8) majflt(9) cmajflt(10) utime(11) stime(12)
    Some(CpuTicks {
        user: fields.get(11)?.parse().ok()?,
        system: fields.get(12)?.parse().ok()?,
    })
}
