//! Sighting-confirmed approach and grab.
//!
//! The supervisor replaces the unbounded approach busy-wait with a
//! poll-driven three-phase machine: scan the latched frame for a
//! stable centered sighting, close in on the target while
//! line-following, then run the grab chain. Closing is bounded by
//! `approach_timeout_ms` unless the config selects the documented
//! unbounded variant.

use porter_common::config::RobotConfig;
use porter_common::hw::driver::Hardware;
use porter_common::hw::types::{MotionCommand, SensorMask, VisionAxis};

use crate::arm::{ArmSequence, ArmSequencer, TickResult};
use crate::steer;
use crate::vision::ConfirmCounter;

/// Outcome of one supervisor tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproachTick {
    /// Scanning, closing or grabbing; tick again next cycle.
    InProgress,
    /// Grab chain finished; the caller owns the carry-flag flip.
    Grabbed,
    /// Closing ran out its bound; drive stopped, scan restarted.
    TimedOut,
}

/// Externally visible phase, for status displays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproachPhase {
    /// Watching the latched frame for a centered sighting.
    Scanning,
    /// Target confirmed; line-following until it fills the frame.
    Closing,
    /// Running the grab chain.
    Grabbing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Scanning,
    Closing { deadline_ms: Option<u64> },
    Grabbing,
}

/// Poll-driven approach-and-grab machine.
///
/// The scanning phase reads the frame the caller last refreshed via
/// `camera_update`; the closing phase refreshes frames itself and
/// resamples the line through the snapshot it is handed.
#[derive(Debug)]
pub struct ApproachSupervisor {
    confirm: ConfirmCounter,
    arm: ArmSequencer,
    phase: Phase,
}

impl ApproachSupervisor {
    /// Supervisor in the scanning phase with an empty confirm count.
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            confirm: ConfirmCounter::new(config.vision.confirm_threshold),
            arm: ArmSequencer::new(),
            phase: Phase::Scanning,
        }
    }

    /// Current phase.
    #[inline]
    pub const fn phase(&self) -> ApproachPhase {
        match self.phase {
            Phase::Scanning => ApproachPhase::Scanning,
            Phase::Closing { .. } => ApproachPhase::Closing,
            Phase::Grabbing => ApproachPhase::Grabbing,
        }
    }

    /// Consecutive qualifying sightings so far.
    #[inline]
    pub const fn sightings(&self) -> u32 {
        self.confirm.count()
    }

    /// Back to scanning with an empty confirm count.
    pub fn reset(&mut self) {
        self.confirm.reset();
        self.arm.reset();
        self.phase = Phase::Scanning;
    }

    /// Advance the machine by one control tick.
    ///
    /// `snapshot` is the caller's sensor snapshot; the closing phase
    /// resamples the line through it so the owner sees what steered.
    pub fn tick(
        &mut self,
        hw: &mut impl Hardware,
        config: &RobotConfig,
        snapshot: &mut SensorMask,
        target_id: u8,
        now_ms: u64,
    ) -> ApproachTick {
        match self.phase {
            Phase::Scanning => {
                let qualifying = hw.target_detected(target_id)
                    && config
                        .vision
                        .is_centered(hw.target_position(VisionAxis::X, target_id));
                if self.confirm.observe(qualifying) {
                    hw.play_cue();
                    self.phase = Phase::Closing {
                        deadline_ms: config.vision.approach_deadline(now_ms),
                    };
                }
                ApproachTick::InProgress
            }

            Phase::Closing { deadline_ms } => {
                if deadline_ms.is_some_and(|deadline| now_ms >= deadline) {
                    MotionCommand::stop().apply(hw);
                    self.reset();
                    return ApproachTick::TimedOut;
                }

                hw.camera_update();
                let arrived = !hw.target_detected(target_id)
                    || hw.target_position(VisionAxis::Y, target_id) >= config.vision.y_close;
                if arrived {
                    self.phase = Phase::Grabbing;
                    self.arm.start(ArmSequence::Grab, now_ms);
                    // First arm tick halts the drive.
                    return self.tick_arm(hw, config, now_ms);
                }

                *snapshot = SensorMask::sample(hw, config.drive.line_color);
                if let Some(command) = steer::steer(*snapshot, &config.drive) {
                    command.apply(hw);
                }
                ApproachTick::InProgress
            }

            Phase::Grabbing => self.tick_arm(hw, config, now_ms),
        }
    }

    fn tick_arm(&mut self, hw: &mut impl Hardware, config: &RobotConfig, now_ms: u64) -> ApproachTick {
        match self.arm.tick(hw, &config.arm, now_ms) {
            TickResult::InProgress => ApproachTick::InProgress,
            TickResult::Complete => {
                self.reset();
                ApproachTick::Grabbed
            }
        }
    }
}
