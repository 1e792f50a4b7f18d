//! Actuation and sensor value types.
//!
//! This module defines the data structures spoken between the decision
//! core and a [`Hardware`] implementation:
//! - `WheelId` / `Spin` / `WheelCommand` / `MotionCommand` - drive side
//! - `LineSensor` / `LineColor` / `SensorMask` - ground sensor side
//! - `VisionAxis` - camera query parameter
//!
//! [`Hardware`]: crate::hw::driver::Hardware

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::{SENSOR_COUNT, WHEEL_COUNT};
use crate::hw::driver::Hardware;
use crate::state::Side;

// ─── Wheels ─────────────────────────────────────────────────────────

/// Drive wheel identifier — 1-based, matching the chassis port labels.
///
/// Odd ports sit on the left side of the chassis, even ports on the
/// right; a wheel's forward rotation sense depends on its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WheelId {
    /// Front-left wheel (port 1).
    FrontLeft = 1,
    /// Front-right wheel (port 2).
    FrontRight = 2,
    /// Rear-left wheel (port 3).
    RearLeft = 3,
    /// Rear-right wheel (port 4).
    RearRight = 4,
}

impl WheelId {
    /// All wheels in port order.
    pub const ALL: [Self; WHEEL_COUNT] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::RearLeft,
        Self::RearRight,
    ];

    /// Convert from raw port number. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::FrontLeft),
            2 => Some(Self::FrontRight),
            3 => Some(Self::RearLeft),
            4 => Some(Self::RearRight),
            _ => None,
        }
    }

    /// Zero-based array index for this wheel.
    #[inline]
    pub const fn index(&self) -> usize {
        (*self as u8 - 1) as usize
    }

    /// Returns true for the left-side wheels.
    #[inline]
    pub const fn is_left(&self) -> bool {
        matches!(self, Self::FrontLeft | Self::RearLeft)
    }

    /// Rotation sense that moves this wheel forward.
    ///
    /// Left-side wheels face the opposite way, so their forward sense
    /// is counter-clockwise while the right side turns clockwise.
    #[inline]
    pub const fn forward_spin(&self) -> Spin {
        if self.is_left() { Spin::Ccw } else { Spin::Cw }
    }
}

/// Rotation sense of a continuous wheel servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Spin {
    /// Clockwise, seen from the wheel's outer face.
    Cw = 0,
    /// Counter-clockwise.
    Ccw = 1,
}

impl Spin {
    /// The reversed rotation sense.
    #[inline]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Cw => Self::Ccw,
            Self::Ccw => Self::Cw,
        }
    }
}

// ─── Motion Commands ────────────────────────────────────────────────

/// Rotation command for a single wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelCommand {
    /// Rotation sense.
    pub spin: Spin,
    /// Speed in percent of full scale; 0 stops the wheel.
    pub speed: u8,
}

/// Desired actuation of all four wheels for one command.
///
/// Produced by the steer law and the maneuver runner, applied to the
/// drive immediately and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionCommand {
    wheels: [WheelCommand; WHEEL_COUNT],
}

impl MotionCommand {
    /// All wheels stopped.
    pub const fn stop() -> Self {
        Self::forward(0)
    }

    /// All wheels forward at `speed`.
    pub const fn forward(speed: u8) -> Self {
        Self::differential(speed, speed)
    }

    /// All wheels backward at `speed`.
    pub const fn reverse(speed: u8) -> Self {
        Self {
            wheels: [
                WheelCommand { spin: Spin::Cw, speed },
                WheelCommand { spin: Spin::Ccw, speed },
                WheelCommand { spin: Spin::Cw, speed },
                WheelCommand { spin: Spin::Ccw, speed },
            ],
        }
    }

    /// Rotate in place toward `side` at `speed`.
    ///
    /// A left pivot spins every wheel clockwise (left side backward,
    /// right side forward); a right pivot mirrors it.
    pub const fn pivot(side: Side, speed: u8) -> Self {
        let spin = match side {
            Side::Left => Spin::Cw,
            Side::Right => Spin::Ccw,
        };
        Self {
            wheels: [
                WheelCommand { spin, speed },
                WheelCommand { spin, speed },
                WheelCommand { spin, speed },
                WheelCommand { spin, speed },
            ],
        }
    }

    /// Both sides forward with independent speeds (veer, not rotate).
    pub const fn differential(left_speed: u8, right_speed: u8) -> Self {
        Self {
            wheels: [
                WheelCommand {
                    spin: Spin::Ccw,
                    speed: left_speed,
                },
                WheelCommand {
                    spin: Spin::Cw,
                    speed: right_speed,
                },
                WheelCommand {
                    spin: Spin::Ccw,
                    speed: left_speed,
                },
                WheelCommand {
                    spin: Spin::Cw,
                    speed: right_speed,
                },
            ],
        }
    }

    /// Command assigned to one wheel.
    #[inline]
    pub const fn wheel(&self, wheel: WheelId) -> WheelCommand {
        self.wheels[wheel.index()]
    }

    /// True when every wheel speed is zero.
    #[inline]
    pub fn is_stop(&self) -> bool {
        self.wheels.iter().all(|w| w.speed == 0)
    }

    /// Send this command to the drive, one wheel at a time.
    pub fn apply(&self, hw: &mut impl Hardware) {
        for wheel in WheelId::ALL {
            let cmd = self.wheel(wheel);
            hw.drive_wheel(wheel, cmd.spin, cmd.speed);
        }
    }
}

// ─── Line Sensors ───────────────────────────────────────────────────

/// Ground line sensor identifier — 1-based, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LineSensor {
    /// Leftmost sensor (S1).
    OuterLeft = 1,
    /// Center-left sensor (S2).
    InnerLeft = 2,
    /// Center-right sensor (S3).
    InnerRight = 3,
    /// Rightmost sensor (S4).
    OuterRight = 4,
}

impl LineSensor {
    /// All sensors, left to right.
    pub const ALL: [Self; SENSOR_COUNT] = [
        Self::OuterLeft,
        Self::InnerLeft,
        Self::InnerRight,
        Self::OuterRight,
    ];

    /// Convert from raw sensor number. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::OuterLeft),
            2 => Some(Self::InnerLeft),
            3 => Some(Self::InnerRight),
            4 => Some(Self::OuterRight),
            _ => None,
        }
    }

    /// The snapshot bit carrying this sensor.
    #[inline]
    pub const fn flag(&self) -> SensorMask {
        match self {
            Self::OuterLeft => SensorMask::OUTER_LEFT,
            Self::InnerLeft => SensorMask::INNER_LEFT,
            Self::InnerRight => SensorMask::INNER_RIGHT,
            Self::OuterRight => SensorMask::OUTER_RIGHT,
        }
    }
}

/// Surface color a line sensor is asked to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineColor {
    /// Painted guide line.
    #[default]
    Black,
    /// Mat background.
    White,
}

bitflags! {
    /// One-tick snapshot of the four ground line sensors.
    ///
    /// Bit order follows the physical left-to-right layout. The mask is
    /// sampled once per control tick and shared by every consumer within
    /// that tick; nothing re-samples mid-decision.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SensorMask: u8 {
        /// Outer-left sensor on the line.
        const OUTER_LEFT = 1 << 0;
        /// Inner-left sensor on the line.
        const INNER_LEFT = 1 << 1;
        /// Inner-right sensor on the line.
        const INNER_RIGHT = 1 << 2;
        /// Outer-right sensor on the line.
        const OUTER_RIGHT = 1 << 3;
    }
}

impl SensorMask {
    /// Both center sensors.
    pub const CENTER_PAIR: Self = Self::INNER_LEFT.union(Self::INNER_RIGHT);

    /// Both left-side sensors.
    pub const LEFT_PAIR: Self = Self::OUTER_LEFT.union(Self::INNER_LEFT);

    /// Both right-side sensors.
    pub const RIGHT_PAIR: Self = Self::INNER_RIGHT.union(Self::OUTER_RIGHT);

    /// Both outer sensors; the U-turn realignment target pattern.
    pub const OUTER_PAIR: Self = Self::OUTER_LEFT.union(Self::OUTER_RIGHT);

    /// Read all four sensors once, left to right.
    pub fn sample(hw: &mut impl Hardware, color: LineColor) -> Self {
        let mut mask = Self::empty();
        for sensor in LineSensor::ALL {
            if hw.read_line_sensor(sensor, color) {
                mask |= sensor.flag();
            }
        }
        mask
    }

    /// Number of sensors currently on the line.
    #[inline]
    pub const fn coverage(&self) -> u8 {
        self.bits().count_ones() as u8
    }

    /// True while the given sensor sees the line.
    #[inline]
    pub fn is_on(&self, sensor: LineSensor) -> bool {
        self.contains(sensor.flag())
    }

    /// True when every sensor sees the line (full crossbar under the
    /// vehicle).
    #[inline]
    pub const fn at_destination(&self) -> bool {
        self.bits() == Self::all().bits()
    }
}

// ─── Vision ─────────────────────────────────────────────────────────

/// Image axis selector for vision position queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VisionAxis {
    /// Horizontal pixel position.
    X = 0,
    /// Vertical pixel position.
    Y = 1,
}

// ─── Tests ──────────────────────────────────────────────────────────
