//! Integration test: approach, grab and deliver.
//!
//! Validates the vision-gated fetch cycle through the robot facade:
//! 1. Confirmed centered sightings arm the approach and cue once
//! 2. Closing drives until the target fills the frame, then grabs
//! 3. A stalled closing times out, flags the fault and rescans
//! 4. Dropping the cargo returns the robot to reconnaissance

use porter_common::config::RobotConfig;
use porter_common::state::MissionPhase;
use porter_core::approach::ApproachTick;
use porter_core::fault::FaultFlags;
use porter_core::robot::Robot;
use porter_hal::SimRig;

// ── Helpers ─────────────────────────────────────────────────────────

const TICK: u64 = 20;
const TARGET: u8 = 2;

/// Tick the recon loop until the approach resolves or `max_ticks` pass.
fn approach_until(robot: &mut Robot<SimRig>, max_ticks: u32) -> ApproachTick {
    for _ in 0..max_ticks {
        robot.update_camera();
        let tick = robot.approach_and_grab(TARGET);
        if tick != ApproachTick::InProgress {
            return tick;
        }
        robot.hw_mut().advance(TICK);
    }
    ApproachTick::InProgress
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn confirmed_sighting_closes_and_grabs() {
    let mut rig = SimRig::new();
    rig.line_at(0, 0b0110);
    // Centered target drifting down the frame toward the grab line.
    rig.blob_window(0, 120_000, TARGET, 160, 100, 120);

    let mut robot = Robot::new(rig, RobotConfig::default()).unwrap();
    assert_eq!(approach_until(&mut robot, 500), ApproachTick::Grabbed);

    assert!(robot.is_carrying());
    assert_eq!(robot.phase(), MissionPhase::Delivery);
    assert!(robot.faults().is_empty());

    let rig = robot.hw_mut();
    assert_eq!(rig.cue_count(), 1);
    // Grab chain: lower, close, raise.
    assert_eq!(rig.servo_log().len(), 3);
    assert!(rig.is_stopped());
}

#[test]
fn stalled_closing_flags_and_rescans() {
    let mut rig = SimRig::new();
    rig.line_at(0, 0b0110);
    // Centered but never nearing: y stays short of the grab line.
    rig.blob_window(0, 600_000, TARGET, 160, 100, 0);

    let mut robot = Robot::new(rig, RobotConfig::default()).unwrap();
    assert_eq!(approach_until(&mut robot, 1_000), ApproachTick::TimedOut);

    assert!(robot.faults().contains(FaultFlags::APPROACH_TIMEOUT));
    assert!(!robot.is_carrying());
    assert_eq!(robot.phase(), MissionPhase::Reconnaissance);
    assert!(robot.hw_mut().is_stopped());

    // The rescan confirms the still-visible target a second time.
    let threshold = robot.config().vision.confirm_threshold as u32;
    for _ in 0..=threshold {
        robot.update_camera();
        robot.approach_and_grab(TARGET);
        robot.hw_mut().advance(TICK);
    }
    assert_eq!(robot.hw_mut().cue_count(), 2);
}

#[test]
fn fetch_then_drop_returns_to_reconnaissance() {
    let mut rig = SimRig::new();
    rig.line_at(0, 0b0110);
    rig.blob_window(0, 120_000, TARGET, 160, 150, 200);

    let mut robot = Robot::new(rig, RobotConfig::default()).unwrap();
    assert_eq!(approach_until(&mut robot, 500), ApproachTick::Grabbed);
    assert!(robot.is_carrying());

    robot.drop_cargo();
    assert!(!robot.is_carrying());
    assert_eq!(robot.phase(), MissionPhase::Reconnaissance);

    let arm = robot.config().arm.clone();
    let log = robot.hw_mut().servo_log();
    // Grab chain then drop chain.
    assert_eq!(log.len(), 6);
    assert_eq!((log[1].port, log[1].angle_deg), (arm.grip_port, arm.grip_closed_deg));
    assert_eq!((log[4].port, log[4].angle_deg), (arm.grip_port, arm.grip_open_deg));
}
