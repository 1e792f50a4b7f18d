//! Tick pacing and per-tick timing statistics.
//!
//! The control loop runs at a fixed period. [`TickStats`] accumulates
//! O(1) timing figures for the end-of-run report; [`Pacer`] sleeps the
//! loop to its next period boundary. With the `rt` feature the pacer
//! uses `clock_nanosleep(TIMER_ABSTIME)` on `CLOCK_MONOTONIC` for
//! drift-free pacing; without it, plain `std::thread::sleep` against a
//! carried-forward deadline.

use std::time::Duration;

// ─── Tick Statistics ────────────────────────────────────────────────

/// O(1) per-tick timing statistics.
///
/// Updated every tick with no allocation.
#[derive(Debug, Clone)]
pub struct TickStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Last tick duration [ns].
    pub last_ns: i64,
    /// Minimum tick duration [ns].
    pub min_ns: i64,
    /// Maximum tick duration [ns].
    pub max_ns: i64,
    /// Running sum for average computation.
    pub sum_ns: i64,
    /// Ticks that ran past the period budget.
    pub overruns: u64,
}

impl TickStats {
    /// Zeroed stats.
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_ns: 0,
            min_ns: i64::MAX,
            max_ns: 0,
            sum_ns: 0,
            overruns: 0,
        }
    }

    /// Record one tick duration against the period budget. O(1).
    #[inline]
    pub fn record(&mut self, duration_ns: i64, budget_ns: i64) {
        self.tick_count += 1;
        self.last_ns = duration_ns;
        if duration_ns < self.min_ns {
            self.min_ns = duration_ns;
        }
        if duration_ns > self.max_ns {
            self.max_ns = duration_ns;
        }
        self.sum_ns += duration_ns;
        if duration_ns > budget_ns {
            self.overruns += 1;
        }
    }

    /// Average tick duration [ns] (0 before the first tick).
    #[inline]
    pub fn avg_ns(&self) -> i64 {
        if self.tick_count == 0 {
            0
        } else {
            self.sum_ns / self.tick_count as i64
        }
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Pacer ──────────────────────────────────────────────────────────

/// Error establishing or advancing the pacing clock.
#[derive(Debug)]
pub struct PaceError(String);

impl std::fmt::Display for PaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pacing clock error: {}", self.0)
    }
}

impl std::error::Error for PaceError {}

/// Sleeps the control loop to its next period boundary.
///
/// Deadlines are carried forward absolutely, so a long tick shortens
/// the following sleep instead of shifting every later boundary.
#[derive(Debug)]
pub struct Pacer {
    period_ns: i64,
    #[cfg(not(feature = "rt"))]
    next: std::time::Instant,
    #[cfg(feature = "rt")]
    next: nix::sys::time::TimeSpec,
}

impl Pacer {
    /// Pacer whose first boundary is one period from now.
    #[cfg(not(feature = "rt"))]
    pub fn new(period: Duration) -> Result<Self, PaceError> {
        Ok(Self {
            period_ns: period.as_nanos() as i64,
            next: std::time::Instant::now(),
        })
    }

    /// Pacer whose first boundary is one period from now.
    #[cfg(feature = "rt")]
    pub fn new(period: Duration) -> Result<Self, PaceError> {
        use nix::time::{clock_gettime, ClockId};
        let next = clock_gettime(ClockId::CLOCK_MONOTONIC)
            .map_err(|e| PaceError(format!("clock_gettime: {e}")))?;
        Ok(Self {
            period_ns: period.as_nanos() as i64,
            next,
        })
    }

    /// Sleep until the next period boundary.
    #[cfg(not(feature = "rt"))]
    pub fn pace(&mut self) {
        let period = Duration::from_nanos(self.period_ns as u64);
        self.next += period;
        let now = std::time::Instant::now();
        if let Some(remaining) = self.next.checked_duration_since(now) {
            std::thread::sleep(remaining);
        } else {
            // Overran a full boundary: resync instead of sprinting.
            self.next = now;
        }
    }

    /// Sleep until the next period boundary (absolute time).
    #[cfg(feature = "rt")]
    pub fn pace(&mut self) {
        use nix::time::{clock_nanosleep, ClockId, ClockNanosleepFlags};
        self.next = timespec_add_ns(self.next, self.period_ns);
        let _ = clock_nanosleep(
            ClockId::CLOCK_MONOTONIC,
            ClockNanosleepFlags::TIMER_ABSTIME,
            &self.next,
        );
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_stats_basic() {
        let mut stats = TickStats::new();
        assert_eq!(stats.tick_count, 0);
        assert_eq!(stats.avg_ns(), 0);

        stats.record(500_000, 20_000_000);
        assert_eq!(stats.tick_count, 1);
        assert_eq!(stats.last_ns, 500_000);
        assert_eq!(stats.min_ns, 500_000);
        assert_eq!(stats.max_ns, 500_000);
        assert_eq!(stats.avg_ns(), 500_000);
        assert_eq!(stats.overruns, 0);

        stats.record(1_500_000, 20_000_000);
        assert_eq!(stats.min_ns, 500_000);
        assert_eq!(stats.max_ns, 1_500_000);
        assert_eq!(stats.avg_ns(), 1_000_000);
    }

    #[test]
    fn tick_stats_counts_overruns() {
        let mut stats = TickStats::new();
        stats.record(25_000_000, 20_000_000);
        stats.record(5_000_000, 20_000_000);
        stats.record(30_000_000, 20_000_000);
        assert_eq!(stats.overruns, 2);
        assert_eq!(stats.tick_count, 3);
    }

    #[test]
    fn pacer_sleeps_to_the_boundary() {
        let period = Duration::from_millis(5);
        let mut pacer = Pacer::new(period).unwrap();

        let start = std::time::Instant::now();
        pacer.pace();
        pacer.pace();
        // Two boundaries from start; allow generous scheduling slack.
        assert!(start.elapsed() >= Duration::from_millis(8));
    }
}
