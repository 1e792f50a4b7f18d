//! Open-loop timed arm servo sequencer.
//!
//! Grab, drop and home are fixed dwell chains with no position
//! feedback: correctness rests on the configured dwell times covering
//! the physical servo travel. The dwell order and the flag side effects
//! at completion are the contract; tests assert those, not wall time.

use porter_common::config::ArmConfig;
use porter_common::hw::driver::Hardware;
use porter_common::hw::types::MotionCommand;

/// Which servo chain to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmSequence {
    /// Stop, lower, clamp, raise. Ends with the cargo lifted.
    Grab,
    /// Stop, lower, release, raise. Ends with the jaws open.
    Drop,
    /// Raised arm and open jaws in one motion; idempotent setup pose.
    Home,
}

/// Progress of one sequencer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// Mid-sequence; tick again next control cycle.
    InProgress,
    /// Sequence finished (or nothing was running).
    Complete,
}

/// Phase of the running chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArmPhase {
    /// No sequence running.
    Idle,
    /// Just started; the first tick issues the drive halt.
    Starting,
    /// Drive halted, waiting out the pre-motion pause.
    Halting { until_ms: u64 },
    /// Arm commanded to ground level, dwelling.
    Lowering { until_ms: u64 },
    /// Gripper commanded (closed for grab, open for drop), dwelling.
    Gripping { until_ms: u64 },
    /// Arm commanded back up, dwelling.
    Raising { until_ms: u64 },
    /// Home pose commanded, settling.
    Homing { until_ms: u64 },
    /// Chain finished; stays here until reset or restart.
    Done,
}

/// Step-driven executor for the three arm chains.
#[derive(Debug)]
pub struct ArmSequencer {
    phase: ArmPhase,
    sequence: Option<ArmSequence>,
}

impl Default for ArmSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmSequencer {
    /// Sequencer with nothing running.
    pub const fn new() -> Self {
        Self {
            phase: ArmPhase::Idle,
            sequence: None,
        }
    }

    /// Begin a chain. Restarting while active abandons the old chain.
    pub fn start(&mut self, sequence: ArmSequence, _now_ms: u64) {
        self.sequence = Some(sequence);
        self.phase = ArmPhase::Starting;
    }

    /// Whether a chain is mid-flight.
    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self.phase, ArmPhase::Idle | ArmPhase::Done)
    }

    /// The chain currently running, or the last one started.
    #[inline]
    pub const fn sequence(&self) -> Option<ArmSequence> {
        self.sequence
    }

    /// Abandon any running chain.
    pub fn reset(&mut self) {
        self.phase = ArmPhase::Idle;
        self.sequence = None;
    }

    /// Advance the chain by one control tick.
    ///
    /// Servo commands are issued exactly once, at the transition into
    /// the phase that dwells on them.
    pub fn tick(&mut self, hw: &mut impl Hardware, arm: &ArmConfig, now_ms: u64) -> TickResult {
        let Some(sequence) = self.sequence else {
            return TickResult::Complete;
        };

        match self.phase {
            ArmPhase::Idle | ArmPhase::Done => return TickResult::Complete,

            ArmPhase::Starting => match sequence {
                ArmSequence::Grab | ArmSequence::Drop => {
                    MotionCommand::stop().apply(hw);
                    self.phase = ArmPhase::Halting {
                        until_ms: now_ms + arm.halt_pause_ms as u64,
                    };
                }
                ArmSequence::Home => {
                    hw.set_servo(arm.arm_port, arm.arm_raised_deg, arm.home_travel_ms);
                    hw.set_servo(arm.grip_port, arm.grip_open_deg, arm.home_travel_ms);
                    self.phase = ArmPhase::Homing {
                        until_ms: now_ms + arm.home_travel_ms as u64,
                    };
                }
            },

            ArmPhase::Halting { until_ms } => {
                if now_ms >= until_ms {
                    hw.set_servo(arm.arm_port, arm.arm_lowered_deg, arm.travel_ms);
                    self.phase = ArmPhase::Lowering {
                        until_ms: now_ms + arm.dwell_ms as u64,
                    };
                }
            }

            ArmPhase::Lowering { until_ms } => {
                if now_ms >= until_ms {
                    let grip_deg = match sequence {
                        ArmSequence::Grab => arm.grip_closed_deg,
                        _ => arm.grip_open_deg,
                    };
                    hw.set_servo(arm.grip_port, grip_deg, arm.travel_ms);
                    self.phase = ArmPhase::Gripping {
                        until_ms: now_ms + arm.dwell_ms as u64,
                    };
                }
            }

            ArmPhase::Gripping { until_ms } => {
                if now_ms >= until_ms {
                    hw.set_servo(arm.arm_port, arm.arm_raised_deg, arm.travel_ms);
                    self.phase = ArmPhase::Raising {
                        until_ms: now_ms + arm.dwell_ms as u64,
                    };
                }
            }

            ArmPhase::Raising { until_ms } | ArmPhase::Homing { until_ms } => {
                if now_ms >= until_ms {
                    self.phase = ArmPhase::Done;
                    return TickResult::Complete;
                }
            }
        }
        TickResult::InProgress
    }
}
