use std::collections::BTreeSet;
use std::mem::size_of;
use std::path::PathBuf;

use libproc::libproc::proc_pid::{pidinfo, pidpath};
use libproc::libproc::task_info::TaskInfo;

use super::{CpuTicks, PlatformProcesses};
use crate::system::enumerator::two_phase_list;
use crate::system::timebase::TimeBase;

// <sys/proc_info.h>
const PROC_ALL_PIDS: u32 = 1;

pub struct Platform;

impl PlatformProcesses for Platform {
    fn list_pids() -> BTreeSet<u32> {
        two_phase_list(|buffer| match buffer {
            None => {
                // SAFETY: a null buffer asks only for the required size in bytes.
                let bytes =
                    unsafe { libc::proc_listpids(PROC_ALL_PIDS, 0, std::ptr::null_mut(), 0) };
                (bytes > 0).then(|| bytes as usize / size_of::<libc::c_int>())
            }
            Some(buf) => {
                let capacity = (buf.len() * size_of::<libc::c_int>()) as libc::c_int;
                // SAFETY: buf is a live, exclusively borrowed slice of `capacity` bytes.
                let bytes = unsafe {
                    libc::proc_listpids(PROC_ALL_PIDS, 0, buf.as_mut_ptr().cast(), capacity)
                };
                (bytes >= 0).then(|| bytes as usize / size_of::<libc::c_int>())
            }
        })
    }

    fn executable_path(pid: u32) -> Option<PathBuf> {
        let path = pidpath(pid as i32).ok()?;
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    fn cpu_ticks(pid: u32) -> Option<CpuTicks> {
        let info = pidinfo::<TaskInfo>(pid as i32, 0).ok()?;
        Some(CpuTicks {
            user: info.pti_total_user,
            system: info.pti_total_system,
        })
    }

    #[allow(deprecated)]
    fn timebase() -> Option<TimeBase> {
        let mut info = libc::mach_timebase_info { numer: 0, denom: 0 };
        // SAFETY: info is a valid out-pointer for the duration of the call.
        let rc = unsafe { libc::mach_timebase_info(&mut info) };
        if rc != 0 {
            return None;
        }
        TimeBase::new(u64::from(info.numer), u64::from(info.denom))
    }
}
