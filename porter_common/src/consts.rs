//! Project-wide default tunables for the porter workspace.
//!
//! Single source of truth for the reference vehicle's speeds, servo
//! geometry, detector thresholds and maneuver timings. Configuration
//! structs in [`crate::config`] default to these values; imported by
//! all crates — no duplication permitted.

use static_assertions::const_assert;

// ─── Control Loop ───────────────────────────────────────────────────

/// Default control tick period in milliseconds (50 Hz).
pub const TICK_MS: u32 = 20;

/// Number of drive wheels.
pub const WHEEL_COUNT: usize = 4;

/// Number of ground line sensors.
pub const SENSOR_COUNT: usize = 4;

// ─── Drive Speeds (percent of full scale) ───────────────────────────

/// Cruise speed while both center sensors track the line.
pub const SPEED_STRAIGHT: u8 = 55;

/// Speed for pivot corrections when the line drifts to one pair.
pub const SPEED_CORRECTION: u8 = 44;

/// Inner-wheel speed for the gentle single-sensor drift cases.
pub const SPEED_SOFT: u8 = 33;

/// Upper bound accepted by the wheel drivers.
pub const SPEED_MAX: u8 = 100;

// ─── Maneuver Timings [ms] ──────────────────────────────────────────

/// Branch-turn pivot duration at the first junction.
pub const PIVOT_MS: u32 = 650;

/// Forward nudge before the delivery 90° turn.
pub const NUDGE_MS: u32 = 250;

/// Pivot duration of the delivery 90° turn.
pub const TURN90_PIVOT_MS: u32 = 900;

/// Reverse duration before dropping the cargo.
pub const BACKUP_MS: u32 = 800;

/// Extra forward clearance after the mid-bar (skips a false re-trigger).
pub const CLEAR_EXTRA_MS: u32 = 700;

/// Open-loop pivot impulse starting a U-turn realignment.
pub const UTURN_IMPULSE_MS: u32 = 450;

/// Upper bound on the drive-until-clear phase of a leave-bar maneuver.
pub const LEAVE_BAR_TIMEOUT_MS: u32 = 1500;

/// Default bound on the U-turn line-hunting phase.
pub const REALIGN_TIMEOUT_MS: u32 = 6000;

// ─── Arm Geometry ───────────────────────────────────────────────────

/// Positional servo port driving the arm joint.
pub const ARM_SERVO_PORT: u8 = 5;

/// Positional servo port driving the gripper.
pub const GRIP_SERVO_PORT: u8 = 6;

/// Arm angle with the cargo lifted clear of the ground [deg].
pub const ARM_RAISED_DEG: i16 = -60;

/// Arm angle at ground level for grab/drop [deg].
pub const ARM_LOWERED_DEG: i16 = -5;

/// Gripper angle with the jaws open [deg].
pub const GRIP_OPEN_DEG: i16 = 15;

/// Gripper angle clamped on the cargo [deg].
pub const GRIP_CLOSED_DEG: i16 = -25;

/// Commanded servo travel time for grab/drop motions [ms].
pub const SERVO_TRAVEL_MS: u32 = 500;

/// Commanded servo travel time for the initial home pose [ms].
pub const HOME_TRAVEL_MS: u32 = 300;

/// Pause after halting the drive before moving the arm [ms].
pub const HALT_PAUSE_MS: u32 = 500;

/// Dwell after each servo command; must exceed physical travel [ms].
pub const DWELL_MS: u32 = 800;

// ─── Bar Detector ───────────────────────────────────────────────────

/// Sensor coverage at or above which a bar is present.
pub const BAR_TRIGGER_COVERAGE: u8 = 3;

/// Sensor coverage at or below which the bar has been left behind.
pub const BAR_CLEAR_COVERAGE: u8 = 2;

/// Sustained-high duration required when immediate triggering is off [ms].
pub const BAR_HOLD_MS: u32 = 150;

/// Cooldown after each fired bar event [ms].
pub const BAR_COOLDOWN_MS: u32 = 1000;

// ─── Vision Gate ────────────────────────────────────────────────────

/// Left edge of the horizontal centering band [px].
pub const CENTER_X_MIN: i32 = 80;

/// Right edge of the horizontal centering band [px].
pub const CENTER_X_MAX: i32 = 240;

/// Vertical position at which the target is close enough to grab [px].
pub const CLOSE_Y: i32 = 237;

/// Consecutive centered detections required before an approach commits.
pub const CONFIRM_THRESHOLD: u8 = 8;

/// Minimum classifier confidence for a digit frame to count [0–100].
pub const MIN_CONFIDENCE: u8 = 60;

/// Identical consecutive digit frames required for a stable read.
pub const STABLE_COUNT: u8 = 3;

/// Timeout of the binary tag discrimination [ms].
pub const TAG_TIMEOUT_MS: u32 = 4000;

/// Timeout of the stable digit read [ms].
pub const DIGIT_TIMEOUT_MS: u32 = 4000;

/// Branch number assumed when the digit read times out.
pub const DIGIT_FALLBACK: u8 = 1;

/// Default bound on the vision-guided approach [ms].
pub const APPROACH_TIMEOUT_MS: u32 = 8000;

// ─── Compile-Time Sanity ────────────────────────────────────────────

const_assert!(CENTER_X_MIN < CENTER_X_MAX);
const_assert!(SPEED_SOFT <= SPEED_MAX);
const_assert!(SPEED_CORRECTION <= SPEED_MAX);
const_assert!(SPEED_STRAIGHT <= SPEED_MAX);
const_assert!(BAR_CLEAR_COVERAGE < BAR_TRIGGER_COVERAGE);
const_assert!(BAR_TRIGGER_COVERAGE as usize <= SENSOR_COUNT);
