//! Configuration loading traits and types.
//!
//! This module provides the full tunable set of the vehicle, grouped by
//! concern, plus a standardized way to load TOML configuration files
//! across all porter applications. Every default mirrors the reference
//! vehicle constants in [`crate::consts`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use porter_common::config::{ConfigLoader, RobotConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RobotConfig::load(Path::new("robot.toml"))?;
//!     config.validate()?;
//!     println!("cruise speed: {}", config.drive.speed_straight);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::*;
use crate::hw::types::LineColor;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Represents the verbosity level of logging output.
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

/// Common configuration fields shared across porter applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "porter-sim-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "porter-sim-01".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Drive ──────────────────────────────────────────────────────────

fn default_speed_straight() -> u8 {
    SPEED_STRAIGHT
}
fn default_speed_correction() -> u8 {
    SPEED_CORRECTION
}
fn default_speed_soft() -> u8 {
    SPEED_SOFT
}
fn default_pivot_ms() -> u32 {
    PIVOT_MS
}
fn default_nudge_ms() -> u32 {
    NUDGE_MS
}
fn default_turn90_pivot_ms() -> u32 {
    TURN90_PIVOT_MS
}
fn default_backup_ms() -> u32 {
    BACKUP_MS
}
fn default_clear_extra_ms() -> u32 {
    CLEAR_EXTRA_MS
}
fn default_uturn_impulse_ms() -> u32 {
    UTURN_IMPULSE_MS
}
fn default_leave_bar_timeout_ms() -> u32 {
    LEAVE_BAR_TIMEOUT_MS
}
fn default_realign_timeout_ms() -> u32 {
    REALIGN_TIMEOUT_MS
}

/// Drive speeds, maneuver durations and the line color to track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriveConfig {
    /// Cruise speed while centered on the line [% of full scale].
    #[serde(default = "default_speed_straight")]
    pub speed_straight: u8,

    /// Pivot-correction speed [%].
    #[serde(default = "default_speed_correction")]
    pub speed_correction: u8,

    /// Inner-wheel speed of the gentle drift cases [%].
    #[serde(default = "default_speed_soft")]
    pub speed_soft: u8,

    /// Surface color the line sensors track.
    #[serde(default)]
    pub line_color: LineColor,

    /// Branch-turn pivot duration [ms].
    #[serde(default = "default_pivot_ms")]
    pub pivot_ms: u32,

    /// Forward nudge before the delivery 90° turn [ms].
    #[serde(default = "default_nudge_ms")]
    pub nudge_ms: u32,

    /// Pivot duration of the delivery 90° turn [ms].
    #[serde(default = "default_turn90_pivot_ms")]
    pub turn90_pivot_ms: u32,

    /// Reverse duration before dropping [ms].
    #[serde(default = "default_backup_ms")]
    pub backup_ms: u32,

    /// Extra forward clearance after the mid bar [ms].
    #[serde(default = "default_clear_extra_ms")]
    pub clear_extra_ms: u32,

    /// Open-loop pivot impulse starting a U-turn [ms].
    #[serde(default = "default_uturn_impulse_ms")]
    pub uturn_impulse_ms: u32,

    /// Bound on the drive-until-clear phase of leave-bar [ms].
    #[serde(default = "default_leave_bar_timeout_ms")]
    pub leave_bar_timeout_ms: u32,

    /// Bound on the U-turn realignment [ms].
    ///
    /// 0 disables the bound: the intentionally unbounded variant of the
    /// realignment, which hunts until the outer-pair pattern appears.
    #[serde(default = "default_realign_timeout_ms")]
    pub realign_timeout_ms: u32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            speed_straight: SPEED_STRAIGHT,
            speed_correction: SPEED_CORRECTION,
            speed_soft: SPEED_SOFT,
            line_color: LineColor::Black,
            pivot_ms: PIVOT_MS,
            nudge_ms: NUDGE_MS,
            turn90_pivot_ms: TURN90_PIVOT_MS,
            backup_ms: BACKUP_MS,
            clear_extra_ms: CLEAR_EXTRA_MS,
            uturn_impulse_ms: UTURN_IMPULSE_MS,
            leave_bar_timeout_ms: LEAVE_BAR_TIMEOUT_MS,
            realign_timeout_ms: REALIGN_TIMEOUT_MS,
        }
    }
}

impl DriveConfig {
    /// Validate speed ranges and maneuver durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, speed) in [
            ("speed_straight", self.speed_straight),
            ("speed_correction", self.speed_correction),
            ("speed_soft", self.speed_soft),
        ] {
            if speed == 0 || speed > SPEED_MAX {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be in 1..={SPEED_MAX}, got {speed}"
                )));
            }
        }
        for (name, ms) in [
            ("pivot_ms", self.pivot_ms),
            ("nudge_ms", self.nudge_ms),
            ("turn90_pivot_ms", self.turn90_pivot_ms),
            ("backup_ms", self.backup_ms),
            ("uturn_impulse_ms", self.uturn_impulse_ms),
            ("leave_bar_timeout_ms", self.leave_bar_timeout_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        Ok(())
    }

    /// Realign deadline relative to `now`, `None` when unbounded.
    #[inline]
    pub fn realign_deadline(&self, now_ms: u64) -> Option<u64> {
        (self.realign_timeout_ms > 0).then(|| now_ms + self.realign_timeout_ms as u64)
    }
}

// ─── Arm ────────────────────────────────────────────────────────────

fn default_arm_port() -> u8 {
    ARM_SERVO_PORT
}
fn default_grip_port() -> u8 {
    GRIP_SERVO_PORT
}
fn default_arm_raised_deg() -> i16 {
    ARM_RAISED_DEG
}
fn default_arm_lowered_deg() -> i16 {
    ARM_LOWERED_DEG
}
fn default_grip_open_deg() -> i16 {
    GRIP_OPEN_DEG
}
fn default_grip_closed_deg() -> i16 {
    GRIP_CLOSED_DEG
}
fn default_travel_ms() -> u32 {
    SERVO_TRAVEL_MS
}
fn default_home_travel_ms() -> u32 {
    HOME_TRAVEL_MS
}
fn default_halt_pause_ms() -> u32 {
    HALT_PAUSE_MS
}
fn default_dwell_ms() -> u32 {
    DWELL_MS
}

/// Arm servo ports, poses and open-loop dwell times.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmConfig {
    /// Positional servo port of the arm joint (1..=6).
    #[serde(default = "default_arm_port")]
    pub arm_port: u8,

    /// Positional servo port of the gripper (1..=6).
    #[serde(default = "default_grip_port")]
    pub grip_port: u8,

    /// Arm angle with the cargo lifted [deg].
    #[serde(default = "default_arm_raised_deg")]
    pub arm_raised_deg: i16,

    /// Arm angle at ground level [deg].
    #[serde(default = "default_arm_lowered_deg")]
    pub arm_lowered_deg: i16,

    /// Gripper angle with the jaws open [deg].
    #[serde(default = "default_grip_open_deg")]
    pub grip_open_deg: i16,

    /// Gripper angle clamped on the cargo [deg].
    #[serde(default = "default_grip_closed_deg")]
    pub grip_closed_deg: i16,

    /// Commanded servo travel time for grab/drop motions [ms].
    #[serde(default = "default_travel_ms")]
    pub travel_ms: u32,

    /// Commanded servo travel time for the home pose [ms].
    #[serde(default = "default_home_travel_ms")]
    pub home_travel_ms: u32,

    /// Pause after halting the drive before moving the arm [ms].
    #[serde(default = "default_halt_pause_ms")]
    pub halt_pause_ms: u32,

    /// Dwell after each servo command [ms]; must cover physical travel.
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u32,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            arm_port: ARM_SERVO_PORT,
            grip_port: GRIP_SERVO_PORT,
            arm_raised_deg: ARM_RAISED_DEG,
            arm_lowered_deg: ARM_LOWERED_DEG,
            grip_open_deg: GRIP_OPEN_DEG,
            grip_closed_deg: GRIP_CLOSED_DEG,
            travel_ms: SERVO_TRAVEL_MS,
            home_travel_ms: HOME_TRAVEL_MS,
            halt_pause_ms: HALT_PAUSE_MS,
            dwell_ms: DWELL_MS,
        }
    }
}

impl ArmConfig {
    /// Servo angle range accepted by the 270° positional servos.
    pub const ANGLE_RANGE: std::ops::RangeInclusive<i16> = -135..=135;

    /// Validate ports, angles and dwell times.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, port) in [("arm_port", self.arm_port), ("grip_port", self.grip_port)] {
            if !(1..=6).contains(&port) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be in 1..=6, got {port}"
                )));
            }
        }
        if self.arm_port == self.grip_port {
            return Err(ConfigError::ValidationError(format!(
                "arm_port and grip_port must differ, both are {}",
                self.arm_port
            )));
        }
        for (name, angle) in [
            ("arm_raised_deg", self.arm_raised_deg),
            ("arm_lowered_deg", self.arm_lowered_deg),
            ("grip_open_deg", self.grip_open_deg),
            ("grip_closed_deg", self.grip_closed_deg),
        ] {
            if !Self::ANGLE_RANGE.contains(&angle) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be in -135..=135, got {angle}"
                )));
            }
        }
        for (name, ms) in [
            ("travel_ms", self.travel_ms),
            ("home_travel_ms", self.home_travel_ms),
            ("dwell_ms", self.dwell_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        Ok(())
    }
}

// ─── Vision ─────────────────────────────────────────────────────────

fn default_x_min() -> i32 {
    CENTER_X_MIN
}
fn default_x_max() -> i32 {
    CENTER_X_MAX
}
fn default_y_close() -> i32 {
    CLOSE_Y
}
fn default_confirm_threshold() -> u8 {
    CONFIRM_THRESHOLD
}
fn default_min_confidence() -> u8 {
    MIN_CONFIDENCE
}
fn default_stable_count() -> u8 {
    STABLE_COUNT
}
fn default_tag_timeout_ms() -> u32 {
    TAG_TIMEOUT_MS
}
fn default_digit_timeout_ms() -> u32 {
    DIGIT_TIMEOUT_MS
}
fn default_digit_fallback() -> u8 {
    DIGIT_FALLBACK
}
fn default_approach_timeout_ms() -> u32 {
    APPROACH_TIMEOUT_MS
}

/// Centering band, proximity threshold and vision-gate tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisionConfig {
    /// Left edge of the horizontal centering band [px].
    #[serde(default = "default_x_min")]
    pub x_min: i32,

    /// Right edge of the horizontal centering band [px].
    #[serde(default = "default_x_max")]
    pub x_max: i32,

    /// Vertical position at which the target is close enough [px].
    #[serde(default = "default_y_close")]
    pub y_close: i32,

    /// Consecutive centered detections before an approach commits.
    #[serde(default = "default_confirm_threshold")]
    pub confirm_threshold: u8,

    /// Minimum classifier confidence for a digit frame [0–100].
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u8,

    /// Identical consecutive digit frames for a stable read.
    #[serde(default = "default_stable_count")]
    pub stable_count: u8,

    /// Timeout of the binary tag discrimination [ms].
    #[serde(default = "default_tag_timeout_ms")]
    pub tag_timeout_ms: u32,

    /// Timeout of the stable digit read [ms].
    #[serde(default = "default_digit_timeout_ms")]
    pub digit_timeout_ms: u32,

    /// Branch number assumed when the digit read times out.
    ///
    /// Applied by the mission with a warning and a recorded fault flag,
    /// never silently.
    #[serde(default = "default_digit_fallback")]
    pub digit_fallback: u8,

    /// Bound on the vision-guided approach [ms]; 0 disables the bound
    /// (intentionally unbounded variant).
    #[serde(default = "default_approach_timeout_ms")]
    pub approach_timeout_ms: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            x_min: CENTER_X_MIN,
            x_max: CENTER_X_MAX,
            y_close: CLOSE_Y,
            confirm_threshold: CONFIRM_THRESHOLD,
            min_confidence: MIN_CONFIDENCE,
            stable_count: STABLE_COUNT,
            tag_timeout_ms: TAG_TIMEOUT_MS,
            digit_timeout_ms: DIGIT_TIMEOUT_MS,
            digit_fallback: DIGIT_FALLBACK,
            approach_timeout_ms: APPROACH_TIMEOUT_MS,
        }
    }
}

impl VisionConfig {
    /// Validate band geometry and counter thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.x_min >= self.x_max {
            return Err(ConfigError::ValidationError(format!(
                "x_min ({}) must be below x_max ({})",
                self.x_min, self.x_max
            )));
        }
        if self.y_close <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "y_close must be positive, got {}",
                self.y_close
            )));
        }
        if self.min_confidence > 100 {
            return Err(ConfigError::ValidationError(format!(
                "min_confidence must be in 0..=100, got {}",
                self.min_confidence
            )));
        }
        for (name, count) in [
            ("confirm_threshold", self.confirm_threshold),
            ("stable_count", self.stable_count),
        ] {
            if count == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        for (name, ms) in [
            ("tag_timeout_ms", self.tag_timeout_ms),
            ("digit_timeout_ms", self.digit_timeout_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        Ok(())
    }

    /// True while `x` sits inside the horizontal centering band.
    #[inline]
    pub fn is_centered(&self, x: i32) -> bool {
        (self.x_min..=self.x_max).contains(&x)
    }

    /// Approach deadline relative to `now`, `None` when unbounded.
    #[inline]
    pub fn approach_deadline(&self, now_ms: u64) -> Option<u64> {
        (self.approach_timeout_ms > 0).then(|| now_ms + self.approach_timeout_ms as u64)
    }
}

// ─── Bar Detector ───────────────────────────────────────────────────

fn default_trigger_coverage() -> u8 {
    BAR_TRIGGER_COVERAGE
}
fn default_clear_coverage() -> u8 {
    BAR_CLEAR_COVERAGE
}
fn default_hold_ms() -> u32 {
    BAR_HOLD_MS
}
fn default_cooldown_ms() -> u32 {
    BAR_COOLDOWN_MS
}
fn default_true() -> bool {
    true
}

/// Bar crossing detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarConfig {
    /// Coverage at or above which a bar is present.
    #[serde(default = "default_trigger_coverage")]
    pub trigger_coverage: u8,

    /// Coverage at or below which the bar has been left behind.
    #[serde(default = "default_clear_coverage")]
    pub clear_coverage: u8,

    /// Sustained-high duration required when `immediate_trigger` is
    /// off [ms].
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u32,

    /// Cooldown after each fired event [ms].
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u32,

    /// Fire on the first armed tick at trigger coverage; disable to
    /// require the sustained hold instead.
    #[serde(default = "default_true")]
    pub immediate_trigger: bool,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            trigger_coverage: BAR_TRIGGER_COVERAGE,
            clear_coverage: BAR_CLEAR_COVERAGE,
            hold_ms: BAR_HOLD_MS,
            cooldown_ms: BAR_COOLDOWN_MS,
            immediate_trigger: true,
        }
    }
}

impl BarConfig {
    /// Validate the coverage thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger_coverage as usize > SENSOR_COUNT {
            return Err(ConfigError::ValidationError(format!(
                "trigger_coverage must be at most {SENSOR_COUNT}, got {}",
                self.trigger_coverage
            )));
        }
        if self.clear_coverage >= self.trigger_coverage {
            return Err(ConfigError::ValidationError(format!(
                "clear_coverage ({}) must be below trigger_coverage ({})",
                self.clear_coverage, self.trigger_coverage
            )));
        }
        if self.trigger_coverage == 0 {
            return Err(ConfigError::ValidationError(
                "trigger_coverage must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Mission ────────────────────────────────────────────────────────

fn default_tag_first() -> u8 {
    1
}
fn default_tag_second() -> u8 {
    2
}
fn default_branch_first() -> u8 {
    1
}
fn default_branch_second() -> u8 {
    2
}

/// Transport mission identifiers: which tags select the path and which
/// branch numbers the digit read is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissionConfig {
    /// Tag id selecting the left path.
    #[serde(default = "default_tag_first")]
    pub tag_first: u8,

    /// Tag id selecting the right path.
    #[serde(default = "default_tag_second")]
    pub tag_second: u8,

    /// Branch number delivered at the first drop candidate.
    #[serde(default = "default_branch_first")]
    pub branch_first: u8,

    /// Branch number delivered at the second drop candidate.
    #[serde(default = "default_branch_second")]
    pub branch_second: u8,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            tag_first: 1,
            tag_second: 2,
            branch_first: 1,
            branch_second: 2,
        }
    }
}

impl MissionConfig {
    /// Validate that the discriminated identifiers differ.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag_first == self.tag_second {
            return Err(ConfigError::ValidationError(format!(
                "tag_first and tag_second must differ, both are {}",
                self.tag_first
            )));
        }
        if self.branch_first == self.branch_second {
            return Err(ConfigError::ValidationError(format!(
                "branch_first and branch_second must differ, both are {}",
                self.branch_first
            )));
        }
        Ok(())
    }
}

// ─── Robot Config ───────────────────────────────────────────────────

/// Complete tunable set of the vehicle, grouped by concern.
///
/// Immutable during a run; the facade rejects reconfiguration while a
/// transport mission is in progress.
///
/// # TOML Example
///
/// ```toml
/// [drive]
/// speed_straight = 55
///
/// [vision]
/// confirm_threshold = 8
///
/// [bar]
/// cooldown_ms = 1000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotConfig {
    /// Drive speeds and maneuver durations.
    #[serde(default)]
    pub drive: DriveConfig,

    /// Arm servo geometry and dwell times.
    #[serde(default)]
    pub arm: ArmConfig,

    /// Vision gate tuning.
    #[serde(default)]
    pub vision: VisionConfig,

    /// Bar detector thresholds.
    #[serde(default)]
    pub bar: BarConfig,

    /// Transport mission identifiers.
    #[serde(default)]
    pub mission: MissionConfig,
}

impl RobotConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.drive.validate()?;
        self.arm.validate()?;
        self.vision.validate()?;
        self.bar.validate()?;
        self.mission.validate()?;
        Ok(())
    }
}

/// Top-level application configuration: shared fields plus the vehicle
/// tunables.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "porter-sim-01"
///
/// [robot.drive]
/// speed_straight = 55
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Logging and instance identity.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Vehicle tunables.
    #[serde(default)]
    pub robot: RobotConfig,
}

impl RunConfig {
    /// Validate both layers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.robot.validate()?;
        Ok(())
    }
}

// ─── Loader ─────────────────────────────────────────────────────────

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any
/// type implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
/// - Returns `ConfigError::ValidationError` if semantic validation fails
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - Successfully loaded and parsed configuration
    /// * `Err(ConfigError)` - Loading or parsing failed
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
// This allows any serde-deserializable struct to use ConfigLoader.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn log_level_roundtrips_through_toml() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Wrapper {
            level: LogLevel,
        }

        for (level, text) in [
            (LogLevel::Trace, "trace"),
            (LogLevel::Debug, "debug"),
            (LogLevel::Info, "info"),
            (LogLevel::Warn, "warn"),
            (LogLevel::Error, "error"),
        ] {
            let wrapper = Wrapper { level };
            let rendered = toml::to_string(&wrapper).unwrap();
            assert!(rendered.contains(text));
            let parsed: Wrapper = toml::from_str(&format!("level = \"{text}\"")).unwrap();
            assert_eq!(parsed.level, level);
        }
    }

    // ── SharedConfig ──

    #[test]
    fn shared_config_rejects_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: String::new(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    // ── Defaults ──

    #[test]
    fn robot_config_defaults_match_reference_vehicle() {
        let config = RobotConfig::default();
        assert_eq!(config.drive.speed_straight, SPEED_STRAIGHT);
        assert_eq!(config.drive.speed_correction, SPEED_CORRECTION);
        assert_eq!(config.drive.speed_soft, SPEED_SOFT);
        assert_eq!(config.arm.arm_port, ARM_SERVO_PORT);
        assert_eq!(config.arm.grip_port, GRIP_SERVO_PORT);
        assert_eq!(config.arm.arm_raised_deg, ARM_RAISED_DEG);
        assert_eq!(config.vision.x_min, CENTER_X_MIN);
        assert_eq!(config.vision.x_max, CENTER_X_MAX);
        assert_eq!(config.vision.y_close, CLOSE_Y);
        assert_eq!(config.vision.confirm_threshold, CONFIRM_THRESHOLD);
        assert_eq!(config.bar.trigger_coverage, BAR_TRIGGER_COVERAGE);
        assert!(config.bar.immediate_trigger);
        assert_eq!(config.mission.tag_first, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: RobotConfig = toml::from_str("").unwrap();
        assert_eq!(config.drive.speed_straight, SPEED_STRAIGHT);
        assert_eq!(config.vision.digit_fallback, DIGIT_FALLBACK);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: RobotConfig = toml::from_str(
            r#"
[drive]
speed_straight = 60

[vision]
confirm_threshold = 4
"#,
        )
        .unwrap();
        assert_eq!(config.drive.speed_straight, 60);
        assert_eq!(config.drive.speed_correction, SPEED_CORRECTION);
        assert_eq!(config.vision.confirm_threshold, 4);
        assert_eq!(config.vision.stable_count, STABLE_COUNT);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result: Result<RobotConfig, _> = toml::from_str(
            r#"
[drive]
sped_straight = 60
"#,
        );
        assert!(result.is_err());
    }

    // ── Validation ──

    #[test]
    fn zero_speed_is_rejected() {
        let mut config = RobotConfig::default();
        config.drive.speed_soft = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn oversized_speed_is_rejected() {
        let mut config = RobotConfig::default();
        config.drive.speed_straight = 101;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn colliding_servo_ports_are_rejected() {
        let mut config = RobotConfig::default();
        config.arm.grip_port = config.arm.arm_port;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn out_of_range_servo_angle_is_rejected() {
        let mut config = RobotConfig::default();
        config.arm.arm_raised_deg = -170;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn inverted_centering_band_is_rejected() {
        let mut config = RobotConfig::default();
        config.vision.x_min = 240;
        config.vision.x_max = 80;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn bar_thresholds_must_be_ordered() {
        let mut config = RobotConfig::default();
        config.bar.clear_coverage = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
        config.bar.clear_coverage = 2;
        config.bar.trigger_coverage = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn equal_tag_ids_are_rejected() {
        let mut config = RobotConfig::default();
        config.mission.tag_second = config.mission.tag_first;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    // ── Helpers ──

    #[test]
    fn centering_band_query() {
        let vision = VisionConfig::default();
        assert!(vision.is_centered(CENTER_X_MIN));
        assert!(vision.is_centered(CENTER_X_MAX));
        assert!(vision.is_centered(160));
        assert!(!vision.is_centered(CENTER_X_MIN - 1));
        assert!(!vision.is_centered(CENTER_X_MAX + 1));
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let mut drive = DriveConfig::default();
        assert_eq!(
            drive.realign_deadline(1_000),
            Some(1_000 + REALIGN_TIMEOUT_MS as u64)
        );
        drive.realign_timeout_ms = 0;
        assert_eq!(drive.realign_deadline(1_000), None);

        let mut vision = VisionConfig::default();
        assert!(vision.approach_deadline(0).is_some());
        vision.approach_timeout_ms = 0;
        assert_eq!(vision.approach_deadline(0), None);
    }

    // ── Loader ──

    #[test]
    fn loader_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[drive]
speed_straight = 70
"#
        )
        .unwrap();

        let config = RobotConfig::load(file.path()).unwrap();
        assert_eq!(config.drive.speed_straight, 70);
    }

    #[test]
    fn loader_missing_file_is_file_not_found() {
        let result = RobotConfig::load(Path::new("/nonexistent/porter.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn loader_bad_toml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [[").unwrap();
        let result = RobotConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
