//! Debounced bar crossing detector.
//!
//! Turns the continuous "coverage at or above trigger" signal into
//! exactly one discrete event per physical bar. Two independent gates
//! must both open before the next event: the detector re-arms only
//! after coverage drops to the clear threshold (the robot has visibly
//! left the bar), and the cooldown window must have elapsed. Either
//! gate alone is not enough, so a single wide bar can neither double
//! count nor re-trigger while still being crossed.

use porter_common::config::BarConfig;

/// Stateful bar event detector, polled once per control tick.
#[derive(Debug)]
pub struct BarDetector {
    /// Coverage at or above which a bar is present.
    trigger: u8,
    /// Coverage at or below which the bar has been left behind.
    clear: u8,
    /// Sustained-high duration required when immediate firing is off [ms].
    hold_ms: u32,
    /// Cooldown after each fired event [ms].
    cooldown_ms: u32,
    /// Fire on the first armed high tick instead of waiting out the hold.
    immediate: bool,
    /// Eligible to fire; false from a fired event until re-armed.
    armed: bool,
    /// An event fired for the bar currently under the robot.
    latched: bool,
    /// First tick of the current uninterrupted high-coverage streak.
    high_since_ms: Option<u64>,
    /// No event may fire before this instant.
    cooldown_until_ms: u64,
}

impl BarDetector {
    /// Create a detector from the bar configuration.
    pub fn new(config: &BarConfig) -> Self {
        Self {
            trigger: config.trigger_coverage,
            clear: config.clear_coverage,
            hold_ms: config.hold_ms,
            cooldown_ms: config.cooldown_ms,
            immediate: config.immediate_trigger,
            armed: true,
            latched: false,
            high_since_ms: None,
            cooldown_until_ms: 0,
        }
    }

    /// Poll with this tick's coverage. Returns true exactly once per bar.
    pub fn poll(&mut self, coverage: u8, now_ms: u64) -> bool {
        // Re-arming is independent of the cooldown timer.
        if coverage <= self.clear {
            self.armed = true;
            self.latched = false;
        }
        if coverage < self.trigger {
            self.high_since_ms = None;
            return false;
        }

        if now_ms < self.cooldown_until_ms || !self.armed || self.latched {
            return false;
        }

        let since = *self.high_since_ms.get_or_insert(now_ms);
        let sustained_ms = now_ms.saturating_sub(since);

        if self.immediate || sustained_ms >= self.hold_ms as u64 {
            self.latched = true;
            self.armed = false;
            self.cooldown_until_ms = now_ms + self.cooldown_ms as u64;
            self.high_since_ms = None;
            return true;
        }
        false
    }

    /// Drop the cooldown gate; the re-arm gate still applies.
    ///
    /// Called by the mission right after a leave-bar maneuver so the
    /// next bar does not have to wait out a cooldown spent driving.
    pub fn clear_cooldown(&mut self) {
        self.cooldown_until_ms = 0;
    }

    /// Restore the initial state (armed, unlatched, no cooldown).
    pub fn reset(&mut self) {
        self.armed = true;
        self.latched = false;
        self.high_since_ms = None;
        self.cooldown_until_ms = 0;
    }

    /// Eligible to fire once the other gates open.
    #[inline]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// An event has fired for the bar still under the robot.
    #[inline]
    pub const fn is_latched(&self) -> bool {
        self.latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: u64 = 20;

    fn immediate_detector() -> BarDetector {
        BarDetector::new(&BarConfig::default())
    }

    fn hold_detector() -> BarDetector {
        let config = BarConfig {
            immediate_trigger: false,
            ..BarConfig::default()
        };
        BarDetector::new(&config)
    }

    /// Test: one event for coverage that rises and stays high.
    #[test]
    fn long_high_fires_exactly_once() {
        let mut det = immediate_detector();
        let mut fired = 0;
        let mut now = 0;

        for _ in 0..10 {
            if det.poll(0, now) {
                fired += 1;
            }
            now += TICK;
        }
        // 100 ticks of continuous high coverage, far past the cooldown.
        for _ in 0..100 {
            if det.poll(4, now) {
                fired += 1;
            }
            now += TICK;
        }
        assert_eq!(fired, 1);
        assert!(det.is_latched());
        assert!(!det.is_armed());
    }

    /// Test: hold mode ignores flicker shorter than the hold window.
    #[test]
    fn hold_mode_rejects_flicker() {
        let mut det = hold_detector();
        let mut now = 0;

        // Alternate high/low every other tick; 20 ms streaks < 150 ms hold.
        for i in 0..100 {
            let coverage = if i % 2 == 0 { 3 } else { 1 };
            assert!(!det.poll(coverage, now), "flicker fired at tick {i}");
            now += TICK;
        }
    }

    /// Test: hold mode fires once the streak reaches the hold window.
    #[test]
    fn hold_mode_fires_after_sustained_high() {
        let mut det = hold_detector();
        let mut now = 0;
        let mut fired_at = None;

        for i in 0..20 {
            if det.poll(3, now) {
                fired_at = Some(i);
                break;
            }
            now += TICK;
        }
        // 150 ms hold at 20 ms ticks: streak start + 8 ticks.
        assert_eq!(fired_at, Some(8));
    }

    /// Test: dropping and rising again inside the cooldown cannot re-fire.
    #[test]
    fn cooldown_blocks_even_after_clearing() {
        let mut det = immediate_detector();
        assert!(det.poll(3, 0));

        // Leave the bar (re-arms) and hit another high inside cooldown.
        assert!(!det.poll(1, 100));
        assert!(det.is_armed());
        assert!(!det.poll(4, 200), "fired inside cooldown");

        // Past the cooldown the same high fires.
        assert!(det.poll(4, 1200));
    }

    /// Test: elapsed cooldown alone is not enough without clearing.
    #[test]
    fn continuous_high_never_refires() {
        let mut det = immediate_detector();
        assert!(det.poll(3, 0));

        // Coverage never drops; even well past the cooldown no event.
        for i in 1..500u64 {
            assert!(!det.poll(3, i * TICK), "refired at {} ms", i * TICK);
        }
    }

    /// Test: both gates open → second event fires.
    #[test]
    fn second_bar_fires_after_clear_and_cooldown() {
        let mut det = immediate_detector();
        assert!(det.poll(4, 0));
        assert!(!det.poll(1, 500));
        assert!(det.poll(4, 1500));
    }

    /// Test: clear_cooldown removes the timer gate only.
    #[test]
    fn clear_cooldown_skips_the_wait() {
        let mut det = immediate_detector();
        assert!(det.poll(3, 0));

        det.clear_cooldown();
        // Still latched: clearing coverage is required first.
        assert!(!det.poll(3, 20));
        assert!(!det.poll(1, 40));
        assert!(det.poll(3, 60));
    }

    /// Test: reset restores the initial state.
    #[test]
    fn reset_restores_initial_state() {
        let mut det = immediate_detector();
        assert!(det.poll(3, 0));
        det.reset();
        assert!(det.is_armed());
        assert!(!det.is_latched());
        assert!(det.poll(3, 20), "reset detector should fire at once");
    }
}
