use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How fast simulated time passes relative to the wall clock.
///
/// Applied uniformly to every interval: the engine only ever multiplies
/// real elapsed time by [`Pace::speedup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    /// One simulated minute takes sixty real seconds.
    #[default]
    RealTime,
    /// One simulated minute takes one real second.
    Fast,
}

impl Pace {
    pub fn from_fast(fast: bool) -> Self {
        if fast {
            Pace::Fast
        } else {
            Pace::RealTime
        }
    }

    /// Simulated milliseconds per real millisecond.
    pub fn speedup(&self) -> u64 {
        match self {
            Pace::RealTime => 1,
            Pace::Fast => 60,
        }
    }

    /// Wall-clock time needed to count down `minutes` simulated minutes.
    pub fn real_duration(&self, minutes: u32) -> Duration {
        Duration::from_millis(self.real_ms(u64::from(minutes).saturating_mul(60_000)))
    }

    /// Convert simulated milliseconds to real milliseconds, rounding up so a
    /// countdown never reports done early.
    pub fn real_ms(&self, simulated_ms: u64) -> u64 {
        simulated_ms.div_ceil(self.speedup())
    }

    /// Display refresh cadence.
    pub fn tick_interval(&self) -> Duration {
        match self {
            Pace::RealTime => Duration::from_secs(1),
            Pace::Fast => Duration::from_millis(250),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_minute_is_one_second() {
        assert_eq!(Pace::Fast.real_duration(1), Duration::from_secs(1));
        assert_eq!(Pace::RealTime.real_duration(1), Duration::from_secs(60));
    }

    #[test]
    fn real_ms_rounds_up() {
        assert_eq!(Pace::Fast.real_ms(61), 2);
        assert_eq!(Pace::Fast.real_ms(60), 1);
        assert_eq!(Pace::RealTime.real_ms(61), 61);
    }

    #[test]
    fn from_fast_flag() {
        assert_eq!(Pace::from_fast(true), Pace::Fast);
        assert_eq!(Pace::from_fast(false), Pace::RealTime);
    }
}
