//! Reactive line-following control law.
//!
//! Maps one 4-sensor snapshot to a wheel command through a fixed
//! priority case table. The table is the tie-break policy: first match
//! wins, and any pattern it does not list (all dark, all clear, the
//! unlisted two-sensor combinations) produces no new command, leaving
//! the previous command in effect. Line recovery for those patterns
//! belongs to the bar and U-turn logic, not to this function.

use porter_common::config::DriveConfig;
use porter_common::hw::types::{MotionCommand, SensorMask};
use porter_common::state::Side;

/// One steering decision for the given sensor pattern.
///
/// Case order, highest priority first:
///
/// 1. exactly the center pair → straight at `speed_straight`
/// 2. exactly the left pair → pivot left at `speed_correction`
/// 3. exactly the right pair → pivot right at `speed_correction`
/// 4. inner-left alone → left drift, left side at `speed_soft`
/// 5. inner-right alone → right drift, mirrored
/// 6. outer-left alone → pivot left at `speed_straight`
/// 7. outer-right alone → pivot right at `speed_straight`
///
/// Returns `None` for every other pattern.
#[inline]
pub fn steer(mask: SensorMask, drive: &DriveConfig) -> Option<MotionCommand> {
    let cmd = if mask == SensorMask::CENTER_PAIR {
        MotionCommand::forward(drive.speed_straight)
    } else if mask == SensorMask::LEFT_PAIR {
        MotionCommand::pivot(Side::Left, drive.speed_correction)
    } else if mask == SensorMask::RIGHT_PAIR {
        MotionCommand::pivot(Side::Right, drive.speed_correction)
    } else if mask == SensorMask::INNER_LEFT {
        // Inner wheels of the turn run slow, outer wheels at correction.
        MotionCommand::differential(drive.speed_soft, drive.speed_correction)
    } else if mask == SensorMask::INNER_RIGHT {
        MotionCommand::differential(drive.speed_correction, drive.speed_soft)
    } else if mask == SensorMask::OUTER_LEFT {
        MotionCommand::pivot(Side::Left, drive.speed_straight)
    } else if mask == SensorMask::OUTER_RIGHT {
        MotionCommand::pivot(Side::Right, drive.speed_straight)
    } else {
        return None;
    };
    Some(cmd)
}
