//! Robot facade: the single mutable context a driver loop talks to.
//!
//! One [`Robot`] owns the hardware handle, the validated configuration
//! and every piece of run state (sensor snapshot, mission phase, carry
//! flag, fault flags) plus the embedded supervisors. All operations go
//! through `&mut self`, so two simulated robots in one test never share
//! anything.
//!
//! Surface operations come in two shapes. Per-tick steps
//! (`update_line_sensors`, `line_follow`, `approach_and_grab`,
//! `smart_transport_step`) return immediately and are meant to be
//! called once per loop iteration. Blocking chains (`grab`,
//! `drop_cargo`, `arm_home`, `realign`) pace themselves on the
//! hardware clock and only return when the chain has finished; each
//! is also available as a `*_start` / `*_tick` pair for callers that
//! drive their own loop.

use tracing::{info, warn};

use porter_common::config::{ConfigError, MissionConfig, RobotConfig};
use porter_common::consts::TICK_MS;
use porter_common::hw::driver::Hardware;
use porter_common::hw::types::{LineSensor, MotionCommand, SensorMask, VisionAxis};
use porter_common::state::{MissionPhase, Side, Waypoint};

use crate::approach::{ApproachSupervisor, ApproachTick};
use crate::arm::{ArmSequence, ArmSequencer, TickResult};
use crate::fault::FaultFlags;
use crate::maneuver::{Maneuver, ManeuverTick};
use crate::mission::{MissionStep, SmartTransport};
use crate::steer;

/// Decision core for one vehicle.
#[derive(Debug)]
pub struct Robot<H: Hardware> {
    hw: H,
    config: RobotConfig,
    snapshot: SensorMask,
    last_command: Option<MotionCommand>,
    phase: MissionPhase,
    carrying: bool,
    faults: FaultFlags,
    arm: ArmSequencer,
    realign: Option<Maneuver>,
    approach: ApproachSupervisor,
    transport: SmartTransport,
}

impl<H: Hardware> Robot<H> {
    /// Build a robot around a hardware handle.
    ///
    /// Validates the configuration up front; nothing else touches the
    /// hardware until [`init`](Self::init) or the first operation.
    pub fn new(hw: H, config: RobotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let approach = ApproachSupervisor::new(&config);
        let transport = SmartTransport::new(&config);
        Ok(Self {
            hw,
            config,
            snapshot: SensorMask::empty(),
            last_command: None,
            phase: MissionPhase::Reconnaissance,
            carrying: false,
            faults: FaultFlags::empty(),
            arm: ArmSequencer::new(),
            realign: None,
            approach,
            transport,
        })
    }

    /// Reset run state and drive the arm to its home pose. Blocking.
    pub fn init(&mut self) {
        self.snapshot = SensorMask::empty();
        self.last_command = None;
        self.phase = MissionPhase::Reconnaissance;
        self.carrying = false;
        self.faults = FaultFlags::empty();
        self.arm.reset();
        self.realign = None;
        self.approach.reset();
        self.transport.reset();
        self.run_arm(ArmSequence::Home);
        info!("robot initialized");
    }

    // ─── Per-Tick Steps ─────────────────────────────────────────────

    /// Refresh the line snapshot from the four ground sensors.
    pub fn update_line_sensors(&mut self) {
        self.snapshot = SensorMask::sample(&mut self.hw, self.config.drive.line_color);
    }

    /// Steer off the current snapshot.
    ///
    /// Patterns outside the priority table issue nothing, deliberately
    /// leaving the previous wheel command in force.
    pub fn line_follow(&mut self) {
        if let Some(command) = steer::steer(self.snapshot, &self.config.drive) {
            command.apply(&mut self.hw);
            self.last_command = Some(command);
        }
    }

    /// Refresh the vision pipeline's latest frame.
    pub fn update_camera(&mut self) {
        self.hw.camera_update();
    }

    /// Stop all four wheels.
    pub fn stop(&mut self) {
        let command = MotionCommand::stop();
        command.apply(&mut self.hw);
        self.last_command = Some(command);
    }

    /// One tick of the approach-and-grab supervisor.
    ///
    /// Only engages while in the reconnaissance phase; during delivery
    /// it returns `InProgress` without touching anything. A completed
    /// grab flips the carry flag and the phase; a closing timeout is
    /// recorded as a fault and the supervisor rescans.
    pub fn approach_and_grab(&mut self, target_id: u8) -> ApproachTick {
        if self.phase != MissionPhase::Reconnaissance {
            return ApproachTick::InProgress;
        }
        let now = self.hw.now_ms();
        let tick = self
            .approach
            .tick(&mut self.hw, &self.config, &mut self.snapshot, target_id, now);
        match tick {
            ApproachTick::Grabbed => {
                self.carrying = true;
                self.phase = MissionPhase::Delivery;
                info!(id = target_id, "cargo grabbed");
            }
            ApproachTick::TimedOut => {
                self.faults |= FaultFlags::APPROACH_TIMEOUT;
                warn!(id = target_id, "approach timed out, rescanning");
            }
            ApproachTick::InProgress => {}
        }
        tick
    }

    /// Begin an arm chain without blocking; pair with [`arm_tick`].
    ///
    /// [`arm_tick`]: Self::arm_tick
    pub fn arm_start(&mut self, sequence: ArmSequence) {
        let now = self.hw.now_ms();
        self.arm.start(sequence, now);
    }

    /// One tick of a chain begun by [`arm_start`].
    ///
    /// The completing tick applies the chain's flag side effects: a
    /// grab sets the carry flag and the delivery phase, a drop clears
    /// both, a home only clears the carry flag.
    ///
    /// [`arm_start`]: Self::arm_start
    pub fn arm_tick(&mut self) -> TickResult {
        if !self.arm.is_active() {
            return TickResult::Complete;
        }
        let now = self.hw.now_ms();
        let result = self.arm.tick(&mut self.hw, &self.config.arm, now);
        if result == TickResult::Complete {
            match self.arm.sequence() {
                Some(ArmSequence::Grab) => {
                    self.carrying = true;
                    self.phase = MissionPhase::Delivery;
                    info!("grab chain finished");
                }
                Some(ArmSequence::Drop) => {
                    self.carrying = false;
                    self.phase = MissionPhase::Reconnaissance;
                    info!("drop chain finished");
                }
                Some(ArmSequence::Home) => self.carrying = false,
                None => {}
            }
        }
        result
    }

    /// Begin a U-turn realignment without blocking; pair with
    /// [`realign_tick`].
    ///
    /// [`realign_tick`]: Self::realign_tick
    pub fn realign_start(&mut self, side: Side) {
        let now = self.hw.now_ms();
        self.realign = Some(Maneuver::realign(&self.config.drive, side, now));
        info!(?side, "realigning onto the line");
    }

    /// One tick of a realignment begun by [`realign_start`].
    ///
    /// Samples the line itself; the finishing tick publishes the
    /// sampled mask as the current snapshot and reports a timeout as
    /// a fault.
    ///
    /// [`realign_start`]: Self::realign_start
    pub fn realign_tick(&mut self) -> ManeuverTick {
        let Some(ref mut maneuver) = self.realign else {
            return ManeuverTick::Done { timed_out: false };
        };
        let now = self.hw.now_ms();
        let mask = SensorMask::sample(&mut self.hw, self.config.drive.line_color);
        let tick = maneuver.tick(&mut self.hw, mask, now);
        if let ManeuverTick::Done { timed_out } = tick {
            if timed_out {
                self.faults |= FaultFlags::REALIGN_TIMEOUT;
                warn!("realignment gave up before reacquiring the line");
            }
            self.snapshot = mask;
            self.realign = None;
        }
        tick
    }

    // ─── Blocking Chains ────────────────────────────────────────────

    /// Run the grab chain to completion. Blocking.
    pub fn grab(&mut self) {
        self.run_arm(ArmSequence::Grab);
    }

    /// Run the drop chain to completion. Blocking.
    pub fn drop_cargo(&mut self) {
        self.run_arm(ArmSequence::Drop);
    }

    /// Drive the arm to its raised, open home pose. Blocking.
    pub fn arm_home(&mut self) {
        self.run_arm(ArmSequence::Home);
    }

    /// U-turn until the line is reacquired on the outer sensors.
    /// Blocking; bounded by `realign_timeout_ms` unless the config
    /// selects the documented unbounded variant.
    pub fn realign(&mut self, side: Side) {
        self.realign_start(side);
        while self.realign_tick() == ManeuverTick::InProgress {
            self.hw.wait_ms(TICK_MS);
        }
    }

    fn run_arm(&mut self, sequence: ArmSequence) {
        self.arm_start(sequence);
        while self.arm_tick() == TickResult::InProgress {
            self.hw.wait_ms(TICK_MS);
        }
    }

    // ─── Transport Mission ──────────────────────────────────────────

    /// Swap the mission ids. Only allowed before the run leaves Start.
    pub fn smart_transport_config(&mut self, mission: MissionConfig) -> Result<(), ConfigError> {
        if self.transport.waypoint() != Waypoint::Start {
            return Err(ConfigError::ValidationError(
                "transport mission already running; reset before reconfiguring".into(),
            ));
        }
        mission.validate()?;
        self.config.mission = mission;
        self.transport = SmartTransport::new(&self.config);
        Ok(())
    }

    /// Restore the transport machine to its pre-run state.
    pub fn smart_transport_reset(&mut self) {
        self.transport.reset();
    }

    /// One tick of the transport mission.
    ///
    /// A finished drop chain clears the carry flag and returns the
    /// phase to reconnaissance.
    pub fn smart_transport_step(&mut self) -> MissionStep {
        let now = self.hw.now_ms();
        let step = self.transport.step(&mut self.hw, &self.config, now);
        if step == MissionStep::CargoDropped {
            self.carrying = false;
            self.phase = MissionPhase::Reconnaissance;
        }
        step
    }

    /// True once the mission has reached its terminal waypoint.
    #[inline]
    pub fn smart_transport_done(&self) -> bool {
        self.transport.is_done()
    }

    /// Current mission waypoint.
    #[inline]
    pub fn transport_waypoint(&self) -> Waypoint {
        self.transport.waypoint()
    }

    /// Path recorded at the start bar, once read.
    #[inline]
    pub fn transport_path(&self) -> Option<Side> {
        self.transport.path()
    }

    /// Target branch recorded at the mid bar, once read.
    #[inline]
    pub fn transport_target(&self) -> Option<u8> {
        self.transport.target()
    }

    /// Waypoints visited by the current run, in order.
    #[inline]
    pub fn transport_trail(&self) -> &[Waypoint] {
        self.transport.trail()
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Last sampled line snapshot.
    #[inline]
    pub const fn snapshot(&self) -> SensorMask {
        self.snapshot
    }

    /// Last wheel command issued through the facade, if any.
    #[inline]
    pub const fn last_command(&self) -> Option<MotionCommand> {
        self.last_command
    }

    /// True while `sensor` saw the line in the last snapshot.
    #[inline]
    pub fn is_on_black(&self, sensor: LineSensor) -> bool {
        self.snapshot.is_on(sensor)
    }

    /// True when all four sensors saw the line in the last snapshot.
    #[inline]
    pub const fn at_destination(&self) -> bool {
        self.snapshot.at_destination()
    }

    /// How many sensors saw the line in the last snapshot.
    #[inline]
    pub const fn black_count(&self) -> u8 {
        self.snapshot.coverage()
    }

    /// Current mission phase.
    #[inline]
    pub const fn phase(&self) -> MissionPhase {
        self.phase
    }

    /// Override the mission phase; also restarts approach scanning.
    pub fn set_phase(&mut self, phase: MissionPhase) {
        self.phase = phase;
        self.approach.reset();
    }

    /// True while cargo is held.
    #[inline]
    pub const fn is_carrying(&self) -> bool {
        self.carrying
    }

    /// Faults from this robot and its transport run, combined.
    pub fn faults(&self) -> FaultFlags {
        self.faults | self.transport.faults()
    }

    /// True if blob `id` is in the last frame and centered laterally.
    pub fn is_color_centered(&mut self, id: u8) -> bool {
        self.hw.target_detected(id)
            && self
                .config
                .vision
                .is_centered(self.hw.target_position(VisionAxis::X, id))
    }

    /// Vertical position of blob `id` in the last frame, if present.
    pub fn color_y(&mut self, id: u8) -> Option<i32> {
        self.hw
            .target_detected(id)
            .then(|| self.hw.target_position(VisionAxis::Y, id))
    }

    /// Validated configuration in force.
    #[inline]
    pub const fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Direct hardware access, for scenario scripting and reports.
    #[inline]
    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }
}
