use std::ops::Add;
use std::time::{Duration, Instant};

#[cfg(any(feature = "testing", test))]
use mockall::automock;

/// Abstracts over a monotonic clock so callers can inject a [`FakeClock`] in tests instead of
/// depending on [`Instant::now`] directly.
pub trait InstantClock: Send + Sync {
    type Instant: Copy + Add<Duration, Output = Self::Instant> + Send + Sync;

    fn now(&self) -> Self::Instant;
}

/// Abstracts over wall-clock time, producing the nanosecond timestamps persisted alongside
/// queued and integrated leaves, and stamped onto signed tree heads.
#[cfg_attr(any(feature = "testing", test), automock)]
pub trait WallClock: Send + Sync {
    fn now_nanos(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl InstantClock for SystemClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl WallClock for SystemClock {
    fn now_nanos(&self) -> i64 {
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_nanos_is_positive_and_monotonic_enough() {
        let clock = SystemClock;
        let first = clock.now_nanos();
        let second = clock.now_nanos();
        assert!(first > 0);
        assert!(second >= first);
    }
}
