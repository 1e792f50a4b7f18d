//! Timed and condition-terminated drive maneuvers.
//!
//! A [`Maneuver`] holds one motion command and re-applies it every tick
//! until its stopping condition is met, then issues a full stop. Three
//! shapes cover everything the mission machine needs: a plain timed
//! burst, the leave-bar creep (forward until line coverage drops), and
//! the U-turn realignment (pivot impulse, then hunt for the outer-pair
//! pattern).

use porter_common::config::{BarConfig, DriveConfig};
use porter_common::hw::driver::Hardware;
use porter_common::hw::types::{MotionCommand, SensorMask};
use porter_common::state::Side;

/// Progress of one maneuver tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverTick {
    /// Stopping condition not yet met; tick again next cycle.
    InProgress,
    /// Maneuver finished and the drive is stopped.
    ///
    /// `timed_out` is true when a bounded condition phase ran out of
    /// time instead of observing its condition.
    Done { timed_out: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Fixed-duration drive.
    Drive { until_ms: u64 },
    /// Forward until coverage drops to the clear level, bounded.
    Clearing {
        deadline_ms: u64,
        clear_coverage: u8,
        extra_ms: u32,
    },
    /// Fixed extra run-out after clearing, e.g. to skip a false
    /// second bar trigger.
    Extra { until_ms: u64, timed_out: bool },
    /// Open-loop pivot burst starting a U-turn.
    Impulse {
        until_ms: u64,
        deadline_ms: Option<u64>,
    },
    /// Rotate in place until the outer-pair pattern appears.
    Hunting { deadline_ms: Option<u64> },
    /// Stopped; result latched.
    Finished { timed_out: bool },
}

/// One drive maneuver, stepped by the owner once per control tick.
#[derive(Debug)]
pub struct Maneuver {
    command: MotionCommand,
    phase: Phase,
}

impl Maneuver {
    /// Run `command` for a fixed duration, then stop.
    pub fn timed(command: MotionCommand, duration_ms: u32, now_ms: u64) -> Self {
        Self {
            command,
            phase: Phase::Drive {
                until_ms: now_ms + duration_ms as u64,
            },
        }
    }

    /// Drive forward off a stop bar until line coverage falls to the
    /// clear level, then run out `extra_ms` more (0 skips the run-out).
    ///
    /// The clearing phase is bounded by `leave_bar_timeout_ms`; running
    /// out the bound still completes the maneuver but flags it.
    pub fn leave_bar(drive: &DriveConfig, bar: &BarConfig, extra_ms: u32, now_ms: u64) -> Self {
        Self {
            command: MotionCommand::forward(drive.speed_straight),
            phase: Phase::Clearing {
                deadline_ms: now_ms + drive.leave_bar_timeout_ms as u64,
                clear_coverage: bar.clear_coverage,
                extra_ms,
            },
        }
    }

    /// U-turn realignment: pivot toward `side` for a fixed impulse,
    /// then keep rotating until exactly the two outer sensors see the
    /// line, then stop.
    ///
    /// Bounded end to end by `realign_timeout_ms` unless the config
    /// selects the unbounded variant.
    pub fn realign(drive: &DriveConfig, side: Side, now_ms: u64) -> Self {
        Self {
            command: MotionCommand::pivot(side, drive.speed_correction),
            phase: Phase::Impulse {
                until_ms: now_ms + drive.uturn_impulse_ms as u64,
                deadline_ms: drive.realign_deadline(now_ms),
            },
        }
    }

    /// Whether the maneuver has stopped the drive and latched a result.
    #[inline]
    pub const fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    /// Advance by one tick, re-applying the motion command.
    ///
    /// `mask` must be the sensor sample for this tick; it is consulted
    /// only by the clearing and hunting phases.
    pub fn tick(&mut self, hw: &mut impl Hardware, mask: SensorMask, now_ms: u64) -> ManeuverTick {
        if let Phase::Finished { timed_out } = self.phase {
            return ManeuverTick::Done { timed_out };
        }
        self.command.apply(hw);

        match self.phase {
            Phase::Drive { until_ms } => {
                if now_ms >= until_ms {
                    return self.finish(hw, false);
                }
            }
            Phase::Clearing {
                deadline_ms,
                clear_coverage,
                extra_ms,
            } => {
                let cleared = mask.coverage() <= clear_coverage;
                let late = now_ms >= deadline_ms;
                if cleared || late {
                    let timed_out = late && !cleared;
                    if extra_ms > 0 {
                        self.phase = Phase::Extra {
                            until_ms: now_ms + extra_ms as u64,
                            timed_out,
                        };
                    } else {
                        return self.finish(hw, timed_out);
                    }
                }
            }
            Phase::Extra { until_ms, timed_out } => {
                if now_ms >= until_ms {
                    return self.finish(hw, timed_out);
                }
            }
            Phase::Impulse {
                until_ms,
                deadline_ms,
            } => {
                if now_ms >= until_ms {
                    self.phase = Phase::Hunting { deadline_ms };
                }
            }
            Phase::Hunting { deadline_ms } => {
                if mask == SensorMask::OUTER_PAIR {
                    return self.finish(hw, false);
                }
                if deadline_ms.is_some_and(|deadline| now_ms >= deadline) {
                    return self.finish(hw, true);
                }
            }
            Phase::Finished { .. } => {}
        }
        ManeuverTick::InProgress
    }

    fn finish(&mut self, hw: &mut impl Hardware, timed_out: bool) -> ManeuverTick {
        MotionCommand::stop().apply(hw);
        self.phase = Phase::Finished { timed_out };
        ManeuverTick::Done { timed_out }
    }
}
