use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KillResult {
    Success(u32, &'static str),
    Failed(u32, String),
    NotFound(u32),
}

impl KillResult {
    /// Whether the OS accepted the signal. Exit is not awaited.
    pub fn accepted(&self) -> bool {
        matches!(self, KillResult::Success(..))
    }
}

/// Ask `pid` to exit (SIGTERM where signals exist).
pub fn terminate(pid: u32) -> bool {
    send_signal(pid, Signal::Term).accepted()
}

/// Kill `pid` unconditionally (SIGKILL where signals exist).
pub fn force_quit(pid: u32) -> bool {
    send_signal(pid, Signal::Kill).accepted()
}

pub fn send_signal(pid: u32, signal: Signal) -> KillResult {
    if pid == 0 {
        return KillResult::NotFound(pid);
    }
    let mut sys = System::new();
    let pids = [Pid::from_u32(pid)];
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&pids),
        true,
        ProcessRefreshKind::nothing(),
    );
    let result = kill_process(&sys, pid, signal);
    match &result {
        KillResult::Success(pid, signal_name) => info!(pid, signal = *signal_name, "signal sent"),
        KillResult::Failed(pid, reason) => warn!(pid, %reason, "signal rejected"),
        KillResult::NotFound(pid) => warn!(pid, "signal target not found"),
    }
    result
}

pub fn kill_process(sys: &System, pid: u32, signal: Signal) -> KillResult {
    match sys.process(Pid::from_u32(pid)) {
        Some(process) => signal_outcome(pid, signal, process.kill_with(signal)),
        None => KillResult::NotFound(pid),
    }
}

/// Map sysinfo's `kill_with` answer. `None` means the platform has no such signal.
fn signal_outcome(pid: u32, signal: Signal, sent: Option<bool>) -> KillResult {
    let signal_name = signal_name(signal);
    match sent {
        Some(true) => KillResult::Success(pid, signal_name),
        Some(false) => {
            KillResult::Failed(pid, format!("Failed to send {signal_name} to PID {pid}"))
        }
        None => KillResult::Failed(
            pid,
            format!("{signal_name} is not supported on this platform"),
        ),
    }
}

fn signal_name(signal: Signal) -> &'static str {
    match signal {
        Signal::Term => "SIGTERM",
        Signal::Kill => "SIGKILL",
        _ => "signal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonexistent_pid_is_not_accepted() {
        assert!(!terminate(u32::MAX));
        assert!(!force_quit(u32::MAX));
        assert_eq!(send_signal(u32::MAX, Signal::Term), KillResult::NotFound(u32::MAX));
    }

    #[test]
    fn pid_zero_is_never_signalled() {
        assert_eq!(send_signal(0, Signal::Kill), KillResult::NotFound(0));
    }

    #[test]
    fn unsupported_signal_is_a_failure() {
        let result = signal_outcome(42, Signal::Term, None);
        assert!(matches!(result, KillResult::Failed(42, _)));
        assert!(!result.accepted());
        assert!(!signal_outcome(42, Signal::Kill, Some(false)).accepted());
        assert_eq!(
            signal_outcome(42, Signal::Term, Some(true)),
            KillResult::Success(42, "SIGTERM")
        );
    }

    #[cfg(unix)]
    #[test]
    fn signal_names() {
        assert_eq!(signal_name(Signal::Term), "SIGTERM");
        assert_eq!(signal_name(Signal::Kill), "SIGKILL");
        assert_eq!(signal_name(Signal::Hangup), "signal");
    }
}
