//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use porter_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use porter_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, RobotConfig, RunConfig, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{SENSOR_COUNT, TICK_MS, WHEEL_COUNT};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hw::driver::Hardware;
pub use crate::hw::types::{
    LineColor, LineSensor, MotionCommand, SensorMask, Spin, VisionAxis, WheelCommand, WheelId,
};

// ─── Mission State ──────────────────────────────────────────────────
pub use crate::state::{MissionPhase, Side, Waypoint};

/// Default control tick as Duration.
/// Used by all paced components: decision core, bench rigs, benches.
pub const DEFAULT_TICK: Duration = Duration::from_millis(TICK_MS as u64);
