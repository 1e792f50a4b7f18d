//! Six-waypoint transport mission machine.
//!
//! One [`SmartTransport`] drives a full delivery run: wait on the
//! start bar for the path tag, branch left or right, read the target
//! branch digit at the mid bar, then drop the cargo at whichever
//! branch bar matches. `step` is non-blocking and meant to be called
//! once per control tick; everything longer than a tick runs as an
//! embedded maneuver, vision read or arm chain that the next steps
//! keep advancing.
//!
//! `Done` is absorbing. Only [`SmartTransport::reset`] leaves it, and
//! that restores every piece of run state: waypoint, bar detector,
//! display cache, recorded path and target, faults and trail.

use core::fmt::Write as _;

use tracing::{debug, info, warn};

use porter_common::config::RobotConfig;
use porter_common::hw::driver::Hardware;
use porter_common::hw::types::{MotionCommand, SensorMask};
use porter_common::state::{Side, Waypoint};

use crate::arm::{ArmSequence, ArmSequencer, TickResult};
use crate::bar::BarDetector;
use crate::fault::FaultFlags;
use crate::maneuver::{Maneuver, ManeuverTick};
use crate::steer;
use crate::vision::{DigitPoll, DigitReader, TagDiscriminator, TagPoll};

/// Visited-waypoint breadcrumb capacity; a run visits at most six.
const TRAIL_CAPACITY: usize = 8;

/// Display cache capacity; longest cue is "branch: 255".
const DISPLAY_CAPACITY: usize = 16;

/// Outcome of one mission step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionStep {
    /// Machine ticked; nothing for the owner to sync.
    Running,
    /// Drop chain finished this step; the owner flips the carry flag.
    CargoDropped,
    /// At the absorbing terminal waypoint.
    Complete,
}

/// What the machine is busy with between waypoint advances.
#[derive(Debug)]
enum Activity {
    /// Travelling (line-following), or holding on the start bar.
    Idle,
    /// Reading the path tag on the start bar.
    TagRead(TagDiscriminator),
    /// Reading the target branch digit on the mid bar.
    DigitRead(DigitReader),
    /// Junction pivot toward the recorded path.
    Turning(Maneuver),
    /// Driving off a bar; advance to `to` once clear.
    Leaving {
        maneuver: Maneuver,
        to: Waypoint,
        clear_cooldown: bool,
    },
    /// Delivery: short forward nudge onto the drop spur.
    Nudging(Maneuver),
    /// Delivery: the fixed 90° turn.
    TurningToDrop(Maneuver),
    /// Delivery: reversing onto the drop point.
    Backing(Maneuver),
    /// Delivery: drop chain down to the released cargo.
    Dropping(ArmSequencer),
}

/// The transport mission state machine.
#[derive(Debug)]
pub struct SmartTransport {
    detector: BarDetector,
    activity: Activity,
    waypoint: Waypoint,
    path: Option<Side>,
    target: Option<u8>,
    trail: heapless::Vec<Waypoint, TRAIL_CAPACITY>,
    shown: heapless::String<DISPLAY_CAPACITY>,
    faults: FaultFlags,
}

impl SmartTransport {
    /// Fresh machine holding on the start bar.
    pub fn new(config: &RobotConfig) -> Self {
        let mut trail = heapless::Vec::new();
        let _ = trail.push(Waypoint::Start);
        Self {
            detector: BarDetector::new(&config.bar),
            activity: Activity::Idle,
            waypoint: Waypoint::Start,
            path: None,
            target: None,
            trail,
            shown: heapless::String::new(),
            faults: FaultFlags::empty(),
        }
    }

    /// Current waypoint.
    #[inline]
    pub const fn waypoint(&self) -> Waypoint {
        self.waypoint
    }

    /// Path chosen at the start bar, once read.
    #[inline]
    pub const fn path(&self) -> Option<Side> {
        self.path
    }

    /// Target branch number read at the mid bar, once read.
    #[inline]
    pub const fn target(&self) -> Option<u8> {
        self.target
    }

    /// Faults accumulated during this run.
    #[inline]
    pub const fn faults(&self) -> FaultFlags {
        self.faults
    }

    /// Waypoints visited so far, in order.
    #[inline]
    pub fn trail(&self) -> &[Waypoint] {
        &self.trail
    }

    /// True at the absorbing terminal waypoint.
    #[inline]
    pub const fn is_done(&self) -> bool {
        self.waypoint.is_terminal()
    }

    /// Restore the machine to its initial, pre-run state.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.activity = Activity::Idle;
        self.waypoint = Waypoint::Start;
        self.path = None;
        self.target = None;
        self.trail.clear();
        let _ = self.trail.push(Waypoint::Start);
        self.shown.clear();
        self.faults = FaultFlags::empty();
        info!("transport mission reset");
    }

    /// Advance the mission by one control tick.
    ///
    /// Samples the line once and feeds it to whatever leg or embedded
    /// activity is running. Never blocks.
    pub fn step(&mut self, hw: &mut impl Hardware, config: &RobotConfig, now_ms: u64) -> MissionStep {
        if self.waypoint.is_terminal() {
            return MissionStep::Complete;
        }
        let mask = SensorMask::sample(hw, config.drive.line_color);

        match std::mem::replace(&mut self.activity, Activity::Idle) {
            Activity::Idle => self.step_travel(hw, config, mask, now_ms),

            Activity::TagRead(mut gate) => match gate.poll(hw, now_ms) {
                TagPoll::Pending => {
                    self.activity = Activity::TagRead(gate);
                    MissionStep::Running
                }
                TagPoll::Detected(id) => {
                    let side = if id == config.mission.tag_first {
                        Side::Left
                    } else {
                        Side::Right
                    };
                    self.path = Some(side);
                    info!(tag = id, ?side, "path tag read");
                    match side {
                        Side::Left => self.display(hw, "path: left"),
                        Side::Right => self.display(hw, "path: right"),
                    }
                    self.begin_leave(config, Waypoint::Branch0, true, 0, now_ms);
                    MissionStep::Running
                }
                TagPoll::TimedOut => {
                    // Still on the bar: the next step restarts the read.
                    self.faults |= FaultFlags::TAG_READ_TIMEOUT;
                    warn!("path tag read timed out, retrying");
                    MissionStep::Running
                }
            },

            Activity::DigitRead(mut reader) => match reader.poll(hw, now_ms) {
                DigitPoll::Pending => {
                    self.activity = Activity::DigitRead(reader);
                    MissionStep::Running
                }
                DigitPoll::Stable(value) => {
                    self.set_target(hw, value);
                    self.begin_leave(
                        config,
                        Waypoint::BranchA,
                        false,
                        config.drive.clear_extra_ms,
                        now_ms,
                    );
                    MissionStep::Running
                }
                DigitPoll::TimedOut => {
                    self.faults |= FaultFlags::DIGIT_READ_TIMEOUT;
                    warn!(
                        fallback = config.vision.digit_fallback,
                        "digit read timed out, using fallback"
                    );
                    self.set_target(hw, config.vision.digit_fallback);
                    self.begin_leave(
                        config,
                        Waypoint::BranchA,
                        false,
                        config.drive.clear_extra_ms,
                        now_ms,
                    );
                    MissionStep::Running
                }
            },

            Activity::Turning(mut maneuver) => {
                match maneuver.tick(hw, mask, now_ms) {
                    ManeuverTick::InProgress => self.activity = Activity::Turning(maneuver),
                    ManeuverTick::Done { .. } => {
                        self.begin_leave(config, Waypoint::Mid, true, 0, now_ms);
                    }
                }
                MissionStep::Running
            }

            Activity::Leaving {
                mut maneuver,
                to,
                clear_cooldown,
            } => {
                match maneuver.tick(hw, mask, now_ms) {
                    ManeuverTick::InProgress => {
                        self.activity = Activity::Leaving {
                            maneuver,
                            to,
                            clear_cooldown,
                        };
                    }
                    ManeuverTick::Done { timed_out } => {
                        if timed_out {
                            self.faults |= FaultFlags::BAR_CLEAR_TIMEOUT;
                            warn!(?to, "bar never cleared, proceeding");
                        }
                        if clear_cooldown {
                            self.detector.clear_cooldown();
                        }
                        self.advance(to);
                    }
                }
                MissionStep::Running
            }

            Activity::Nudging(mut maneuver) => {
                match maneuver.tick(hw, mask, now_ms) {
                    ManeuverTick::InProgress => self.activity = Activity::Nudging(maneuver),
                    ManeuverTick::Done { .. } => {
                        self.activity = Activity::TurningToDrop(Maneuver::timed(
                            MotionCommand::pivot(Side::Left, config.drive.speed_straight),
                            config.drive.turn90_pivot_ms,
                            now_ms,
                        ));
                    }
                }
                MissionStep::Running
            }

            Activity::TurningToDrop(mut maneuver) => {
                match maneuver.tick(hw, mask, now_ms) {
                    ManeuverTick::InProgress => self.activity = Activity::TurningToDrop(maneuver),
                    ManeuverTick::Done { .. } => {
                        self.activity = Activity::Backing(Maneuver::timed(
                            MotionCommand::reverse(config.drive.speed_soft),
                            config.drive.backup_ms,
                            now_ms,
                        ));
                    }
                }
                MissionStep::Running
            }

            Activity::Backing(mut maneuver) => {
                match maneuver.tick(hw, mask, now_ms) {
                    ManeuverTick::InProgress => self.activity = Activity::Backing(maneuver),
                    ManeuverTick::Done { .. } => {
                        let mut arm = ArmSequencer::new();
                        arm.start(ArmSequence::Drop, now_ms);
                        self.activity = Activity::Dropping(arm);
                    }
                }
                MissionStep::Running
            }

            Activity::Dropping(mut arm) => match arm.tick(hw, &config.arm, now_ms) {
                TickResult::InProgress => {
                    self.activity = Activity::Dropping(arm);
                    MissionStep::Running
                }
                TickResult::Complete => {
                    self.advance(Waypoint::Done);
                    info!("cargo dropped, mission complete");
                    MissionStep::CargoDropped
                }
            },
        }
    }

    /// One travel tick: watch for the leg's bar event, otherwise steer.
    fn step_travel(
        &mut self,
        hw: &mut impl Hardware,
        config: &RobotConfig,
        mask: SensorMask,
        now_ms: u64,
    ) -> MissionStep {
        match self.waypoint {
            Waypoint::Start => {
                // Hold still until the start bar is under the sensors.
                MotionCommand::stop().apply(hw);
                if mask.coverage() >= config.bar.trigger_coverage {
                    debug!("start bar covered, reading path tag");
                    self.activity = Activity::TagRead(TagDiscriminator::new(
                        config.mission.tag_first,
                        config.mission.tag_second,
                        config.vision.tag_timeout_ms,
                        now_ms,
                    ));
                }
                MissionStep::Running
            }

            Waypoint::Branch0 => {
                if self.detector.poll(mask.coverage(), now_ms) {
                    // Default to left when the tag read never resolved.
                    let side = self.path.unwrap_or(Side::Left);
                    info!(?side, "junction bar hit, pivoting");
                    self.activity = Activity::Turning(Maneuver::timed(
                        MotionCommand::pivot(side, config.drive.speed_straight),
                        config.drive.pivot_ms,
                        now_ms,
                    ));
                } else {
                    self.follow(hw, config, mask);
                }
                MissionStep::Running
            }

            Waypoint::Mid => {
                if self.detector.poll(mask.coverage(), now_ms) {
                    debug!("mid bar hit, reading target digit");
                    MotionCommand::stop().apply(hw);
                    self.activity = Activity::DigitRead(DigitReader::new(
                        config.vision.min_confidence,
                        config.vision.stable_count,
                        config.vision.digit_timeout_ms,
                        now_ms,
                    ));
                } else {
                    self.follow(hw, config, mask);
                }
                MissionStep::Running
            }

            Waypoint::BranchA => {
                if self.detector.poll(mask.coverage(), now_ms) {
                    if self.target == Some(config.mission.branch_first) {
                        info!(branch = config.mission.branch_first, "delivering at first branch");
                        self.begin_delivery(config, now_ms);
                    } else {
                        debug!("first branch not the target, moving on");
                        self.begin_leave(config, Waypoint::BranchB, true, 0, now_ms);
                    }
                } else {
                    self.follow(hw, config, mask);
                }
                MissionStep::Running
            }

            Waypoint::BranchB => {
                if self.detector.poll(mask.coverage(), now_ms) {
                    if self.target == Some(config.mission.branch_second) {
                        info!(branch = config.mission.branch_second, "delivering at second branch");
                        self.begin_delivery(config, now_ms);
                    } else {
                        // Last candidate missed: park with the cargo.
                        warn!(wanted = ?self.target, "no branch matched, parking");
                        MotionCommand::stop().apply(hw);
                        self.advance(Waypoint::Done);
                    }
                } else {
                    self.follow(hw, config, mask);
                }
                MissionStep::Running
            }

            // Terminal waypoint is handled before travel.
            Waypoint::Done => MissionStep::Complete,
        }
    }

    fn follow(&self, hw: &mut impl Hardware, config: &RobotConfig, mask: SensorMask) {
        if let Some(command) = steer::steer(mask, &config.drive) {
            command.apply(hw);
        }
    }

    fn begin_leave(
        &mut self,
        config: &RobotConfig,
        to: Waypoint,
        clear_cooldown: bool,
        extra_ms: u32,
        now_ms: u64,
    ) {
        self.activity = Activity::Leaving {
            maneuver: Maneuver::leave_bar(&config.drive, &config.bar, extra_ms, now_ms),
            to,
            clear_cooldown,
        };
    }

    fn begin_delivery(&mut self, config: &RobotConfig, now_ms: u64) {
        self.activity = Activity::Nudging(Maneuver::timed(
            MotionCommand::forward(config.drive.speed_soft),
            config.drive.nudge_ms,
            now_ms,
        ));
    }

    fn set_target(&mut self, hw: &mut impl Hardware, value: u8) {
        self.target = Some(value);
        info!(branch = value, "target branch set");
        let mut text: heapless::String<DISPLAY_CAPACITY> = heapless::String::new();
        let _ = write!(text, "branch: {value}");
        self.display(hw, &text);
    }

    /// Show `text` unless it is already on the display.
    fn display(&mut self, hw: &mut impl Hardware, text: &str) {
        if self.shown.as_str() != text {
            hw.show_text(text);
            self.shown.clear();
            let _ = self.shown.push_str(text);
        }
    }

    fn advance(&mut self, to: Waypoint) {
        self.waypoint = to;
        let _ = self.trail.push(to);
        self.activity = Activity::Idle;
        debug!(waypoint = ?to, "waypoint advanced");
    }
}
