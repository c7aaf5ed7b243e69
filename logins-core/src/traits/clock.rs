//! Time source abstract Trait

use crate::utils::timestamp::{self, Timestamp};

/// Source of "now" for usage metadata
pub trait Clock: Send + Sync {
    /// Current time in microseconds since the Unix epoch
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        timestamp::now_micros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z in microseconds
        assert!(SystemClock.now() > 1_577_836_800_000_000);
    }
}
