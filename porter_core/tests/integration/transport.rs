//! Integration test: transport mission end to end.
//!
//! Validates the six-waypoint delivery run through the robot facade:
//! 1. Path tag at the start bar selects the branch direction
//! 2. The mid-bar digit picks the drop branch, first or second
//! 3. The drop chain runs at the matching branch bar, then Done
//! 4. A reset restores the machine for a full second run

use porter_common::config::{MissionConfig, RobotConfig};
use porter_common::state::{Side, Waypoint};
use porter_core::mission::MissionStep;
use porter_core::robot::Robot;
use porter_hal::{Scenario, SimRig};

// ── Helpers ─────────────────────────────────────────────────────────

const TICK: u64 = 20;

/// Step the transport mission until Done, bounded by `max_ticks`.
fn run_until_done(robot: &mut Robot<SimRig>, max_ticks: u32) -> bool {
    for _ in 0..max_ticks {
        if robot.smart_transport_step() == MissionStep::Complete {
            return true;
        }
        robot.hw_mut().advance(TICK);
    }
    false
}

/// Script one full course onto the rig, shifted by `offset_ms`.
///
/// Start bar, junction, mid bar, first branch bar, each followed by a
/// clear stretch of plain line.
fn script_course(rig: &mut SimRig, offset_ms: u64) {
    rig.line_at(offset_ms, 0b0111);
    rig.line_at(offset_ms + 1_200, 0b0110);
    rig.line_at(offset_ms + 2_600, 0b1111);
    rig.line_at(offset_ms + 3_400, 0b0110);
    rig.line_at(offset_ms + 4_400, 0b1111);
    rig.line_at(offset_ms + 5_200, 0b0110);
    rig.line_at(offset_ms + 7_000, 0b1111);
    rig.line_at(offset_ms + 7_600, 0b0110);
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn demo_scenario_delivers_at_the_second_branch() {
    let rig = Scenario::demo().build();
    let mut robot = Robot::new(rig, RobotConfig::default()).unwrap();
    robot.init();

    assert!(run_until_done(&mut robot, 1_500), "mission never finished");
    assert!(robot.smart_transport_done());
    assert_eq!(robot.transport_waypoint(), Waypoint::Done);
    assert_eq!(
        robot.transport_trail(),
        &[
            Waypoint::Start,
            Waypoint::Branch0,
            Waypoint::Mid,
            Waypoint::BranchA,
            Waypoint::BranchB,
            Waypoint::Done,
        ]
    );
    assert_eq!(robot.transport_path(), Some(Side::Left));
    assert_eq!(robot.transport_target(), Some(2));
    assert!(robot.faults().is_empty());
    assert!(!robot.is_carrying());

    let rig = robot.hw_mut();
    assert!(rig.texts().iter().any(|t| t == "path: left"));
    assert!(rig.texts().iter().any(|t| t == "branch: 2"));
    assert!(rig.is_stopped());
    // Home at init plus the three-command drop chain.
    assert_eq!(rig.servo_log().len(), 5);
}

#[test]
fn matching_digit_delivers_at_the_first_branch() {
    let mission = MissionConfig::default();
    let mut rig = SimRig::new();
    script_course(&mut rig, 0);
    rig.tag_window(0, 8_000, mission.tag_first);
    rig.digit_window(4_300, 13_000, mission.branch_first, 90);

    let mut robot = Robot::new(rig, RobotConfig::default()).unwrap();
    robot.init();

    assert!(run_until_done(&mut robot, 1_000), "mission never finished");
    assert_eq!(robot.transport_target(), Some(mission.branch_first));
    // The second branch is never visited.
    assert_eq!(
        robot.transport_trail(),
        &[
            Waypoint::Start,
            Waypoint::Branch0,
            Waypoint::Mid,
            Waypoint::BranchA,
            Waypoint::Done,
        ]
    );
    assert!(robot.faults().is_empty());

    let arm = robot.config().arm.clone();
    let rig = robot.hw_mut();
    assert!(rig.texts().iter().any(|t| t == "branch: 1"));
    let log = rig.servo_log();
    assert_eq!(log.len(), 5);
    // Drop chain after the two-command init home: lower, open, raise.
    assert_eq!((log[2].port, log[2].angle_deg), (arm.arm_port, arm.arm_lowered_deg));
    assert_eq!((log[3].port, log[3].angle_deg), (arm.grip_port, arm.grip_open_deg));
    assert_eq!((log[4].port, log[4].angle_deg), (arm.arm_port, arm.arm_raised_deg));
}

#[test]
fn reset_supports_a_second_run() {
    let mission = MissionConfig::default();
    let mut rig = SimRig::new();

    // First course: left path, delivery at the first branch.
    script_course(&mut rig, 0);
    rig.tag_window(0, 8_000, mission.tag_first);
    rig.digit_window(4_300, 13_000, mission.branch_first, 90);

    // Second course well past the first, right path this time.
    script_course(&mut rig, 20_000);
    rig.tag_window(20_000, 28_000, mission.tag_second);
    rig.digit_window(24_300, 33_000, mission.branch_first, 90);

    let mut robot = Robot::new(rig, RobotConfig::default()).unwrap();
    robot.init();

    assert!(run_until_done(&mut robot, 1_000), "first run never finished");
    assert_eq!(robot.transport_path(), Some(Side::Left));

    robot.smart_transport_reset();
    assert!(!robot.smart_transport_done());
    assert_eq!(robot.transport_waypoint(), Waypoint::Start);
    assert_eq!(robot.transport_path(), None);
    assert_eq!(robot.transport_trail(), &[Waypoint::Start]);

    // Holds at Start until the second start bar, then runs the course.
    assert!(run_until_done(&mut robot, 2_000), "second run never finished");
    assert_eq!(robot.transport_path(), Some(Side::Right));
    assert_eq!(robot.transport_target(), Some(mission.branch_first));
    assert_eq!(
        robot.transport_trail(),
        &[
            Waypoint::Start,
            Waypoint::Branch0,
            Waypoint::Mid,
            Waypoint::BranchA,
            Waypoint::Done,
        ]
    );
    assert!(robot.faults().is_empty());

    let rig = robot.hw_mut();
    assert!(rig.texts().iter().any(|t| t == "path: left"));
    assert!(rig.texts().iter().any(|t| t == "path: right"));
    // One init home plus two full drop chains.
    assert_eq!(rig.servo_log().len(), 8);
}
