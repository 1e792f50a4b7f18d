//! Integration test: line following through the robot facade.
//!
//! Validates the per-tick sense-decide-apply loop:
//! 1. Each listed sensor pattern issues its table command
//! 2. Unlisted patterns hold the previous command across a gap
//! 3. Crossbars surface through the destination queries
//! 4. A realign recovers a lost line and following resumes

use porter_common::config::RobotConfig;
use porter_common::hw::types::{LineSensor, MotionCommand, SensorMask};
use porter_common::state::Side;
use porter_core::robot::Robot;
use porter_hal::SimRig;

// ── Helpers ─────────────────────────────────────────────────────────

const TICK: u64 = 20;

fn robot_on(rig: SimRig) -> Robot<SimRig> {
    Robot::new(rig, RobotConfig::default()).unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn each_pattern_issues_its_table_command() {
    let mut rig = SimRig::new();
    rig.line_at(0, 0b0110);
    rig.line_at(100, 0b0011);
    rig.line_at(200, 0b1100);
    rig.line_at(300, 0b0001);
    rig.line_at(400, 0b1000);

    let mut robot = robot_on(rig);
    let drive = robot.config().drive.clone();
    let expected = [
        MotionCommand::forward(drive.speed_straight),
        MotionCommand::pivot(Side::Left, drive.speed_correction),
        MotionCommand::pivot(Side::Right, drive.speed_correction),
        MotionCommand::pivot(Side::Left, drive.speed_straight),
        MotionCommand::pivot(Side::Right, drive.speed_straight),
    ];

    for want in expected {
        robot.update_line_sensors();
        robot.line_follow();
        assert_eq!(robot.last_command(), Some(want));
        robot.hw_mut().advance(100);
    }
}

#[test]
fn a_gap_keeps_the_last_command_in_force() {
    let mut rig = SimRig::new();
    rig.line_at(0, 0b0011);
    rig.line_at(200, 0b0000);
    rig.line_at(600, 0b0110);

    let mut robot = robot_on(rig);
    let drive = robot.config().drive.clone();

    robot.update_line_sensors();
    robot.line_follow();
    let correction = MotionCommand::pivot(Side::Left, drive.speed_correction);
    assert_eq!(robot.last_command(), Some(correction));

    // Across the gap the correction pivot stays in force.
    for _ in 0..15 {
        robot.hw_mut().advance(TICK);
        robot.update_line_sensors();
        robot.line_follow();
    }
    assert_eq!(robot.last_command(), Some(correction));
    assert!(!robot.hw_mut().is_stopped());

    robot.hw_mut().advance(400);
    robot.update_line_sensors();
    robot.line_follow();
    assert_eq!(
        robot.last_command(),
        Some(MotionCommand::forward(drive.speed_straight))
    );
}

#[test]
fn crossbar_lights_all_destination_queries() {
    let mut rig = SimRig::new();
    rig.line_at(0, 0b0110);
    rig.line_at(500, 0b1111);

    let mut robot = robot_on(rig);
    robot.update_line_sensors();
    robot.line_follow();
    let before = robot.last_command();
    assert!(!robot.at_destination());
    assert_eq!(robot.black_count(), 2);

    robot.hw_mut().advance(500);
    robot.update_line_sensors();
    robot.line_follow();
    assert!(robot.at_destination());
    assert_eq!(robot.black_count(), 4);
    assert!(robot.is_on_black(LineSensor::OuterLeft));
    assert!(robot.is_on_black(LineSensor::OuterRight));
    // All-on is not a steer case; the straight command survives.
    assert_eq!(robot.last_command(), before);
}

#[test]
fn realign_reacquires_after_losing_the_line() {
    let mut rig = SimRig::new();
    rig.line_at(0, 0b0110);
    rig.line_at(300, 0b0000);
    rig.line_at(1_500, 0b1001);
    rig.line_at(1_900, 0b0110);

    let mut robot = robot_on(rig);
    for _ in 0..20 {
        robot.update_line_sensors();
        robot.line_follow();
        robot.hw_mut().advance(TICK);
    }
    assert_eq!(robot.black_count(), 0);

    robot.realign(Side::Left);
    assert!(robot.faults().is_empty());
    assert_eq!(robot.snapshot(), SensorMask::OUTER_PAIR);
    assert!(robot.hw_mut().is_stopped());

    // Back over the line, following resumes.
    robot.hw_mut().advance(600);
    robot.update_line_sensors();
    robot.line_follow();
    let straight = MotionCommand::forward(robot.config().drive.speed_straight);
    assert_eq!(robot.last_command(), Some(straight));
    assert!(!robot.hw_mut().is_stopped());
}
