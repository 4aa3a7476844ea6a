use serde::Serialize;

/// Ratio converting kernel CPU ticks to nanoseconds: `ns = ticks * numer / denom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeBase {
    pub numer: u64,
    pub denom: u64,
}

impl TimeBase {
    pub const IDENTITY: TimeBase = TimeBase { numer: 1, denom: 1 };

    /// Returns `None` for a zero numerator or denominator.
    pub fn new(numer: u64, denom: u64) -> Option<Self> {
        if numer == 0 || denom == 0 {
            return None;
        }
        Some(TimeBase { numer, denom })
    }

    /// Degrade to 1:1 when the host cannot supply a ratio.
    pub fn or_identity(queried: Option<TimeBase>) -> Self {
        match queried {
            Some(tb) => tb,
            None => {
                tracing::warn!("host time base unavailable, using 1:1 tick conversion");
                TimeBase::IDENTITY
            }
        }
    }

    pub fn ticks_to_nanos(&self, ticks: u64) -> u64 {
        let ns = ticks as u128 * self.numer as u128 / self.denom as u128;
        u64::try_from(ns).unwrap_or(u64::MAX)
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        TimeBase::IDENTITY
    }
}
