use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tick {
    pub frame: u64,
}

/// Soft real-time budget for one pass of perception + decision + actuation.
pub const TICK_MS: u64 = 45;

/// How long the loop idles before re-checking a set pause flag.
pub const PAUSE_BACKOFF_MS: u64 = 1000;

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }

    /// Frames elapsed since `earlier`. Zero if `earlier` is in the future.
    pub fn since(&self, earlier: Tick) -> u64 {
        self.frame.saturating_sub(earlier.frame)
    }
}

/// Time left in the budget after `elapsed`, never negative.
pub fn remaining_budget(budget: Duration, elapsed: Duration) -> Duration {
    budget.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_budget_clamps_to_zero() {
        let budget = Duration::from_millis(TICK_MS);
        assert_eq!(remaining_budget(budget, Duration::from_millis(10)), Duration::from_millis(35));
        assert_eq!(remaining_budget(budget, Duration::from_millis(80)), Duration::ZERO);
    }

    #[test]
    fn since_saturates() {
        let a = Tick { frame: 3 };
        let b = Tick { frame: 10 };
        assert_eq!(b.since(a), 7);
        assert_eq!(a.since(b), 0);
    }
}
