use std::collections::BTreeSet;

use super::platform::ProcessHost;

/// Extra entries allocated on the retry after a full buffer.
const RETRY_SLACK: usize = 64;

/// All live process ids reported by `host`, with zero filtered out.
pub fn list_pids<H: ProcessHost + ?Sized>(host: &H) -> BTreeSet<u32> {
    let mut pids = host.list_pids();
    pids.remove(&0);
    pids
}

/// Size-then-fill listing against a kernel call that may race with process churn.
///
/// `query(None)` returns the number of entries the kernel wants room for;
/// `query(Some(buf))` fills `buf` and returns how many entries it wrote. A
/// short fill is authoritative. A completely full buffer may mean the table
/// grew in between, so it is retried once with a fresh size. The retry's
/// result replaces the first fill only if the retry call succeeds.
/// Non-positive entries are discarded.
pub fn two_phase_list<F>(mut query: F) -> BTreeSet<u32>
where
    F: FnMut(Option<&mut [i32]>) -> Option<usize>,
{
    let Some(wanted) = query(None).filter(|&n| n > 0) else {
        return BTreeSet::new();
    };
    let mut buf = vec![0; wanted];
    let Some(written) = query(Some(&mut buf)) else {
        return BTreeSet::new();
    };
    let mut filled = written.min(buf.len());

    if filled == buf.len() {
        let requeried = query(None).unwrap_or(0);
        let mut retry = vec![0; requeried.max(buf.len()) + RETRY_SLACK];
        // a failed retry keeps the first fill
        if let Some(written) = query(Some(&mut retry)) {
            filled = written.min(retry.len());
            buf = retry;
        }
    }

    buf.truncate(filled);
    buf.into_iter()
        .filter(|&pid| pid > 0)
        .map(|pid| pid as u32)
        .collect()
}
