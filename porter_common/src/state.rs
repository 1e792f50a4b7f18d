//! Mission state enums shared across the porter workspace.
//!
//! All enums use `#[repr(u8)]` for compact layout and stable numeric
//! values in reports and scenario files. Conversion from raw bytes is
//! provided via `from_u8` and returns `None` for invalid values.

use serde::{Deserialize, Serialize};

// ─── Mission Phase ──────────────────────────────────────────────────

/// Operating phase of the arm/mission logic.
///
/// Flipped to `Delivery` by a completed grab and back to
/// `Reconnaissance` by a completed drop; an explicit operator override
/// exists on the robot facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MissionPhase {
    /// Searching for and picking up cargo.
    Reconnaissance = 0,
    /// Carrying cargo toward a drop point.
    Delivery = 1,
}

impl MissionPhase {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Reconnaissance),
            1 => Some(Self::Delivery),
            _ => None,
        }
    }

    /// Returns true while cargo is being carried.
    #[inline]
    pub const fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery)
    }
}

impl Default for MissionPhase {
    fn default() -> Self {
        Self::Reconnaissance
    }
}

// ─── Waypoint ───────────────────────────────────────────────────────

/// Discrete location in the transport mission.
///
/// Advances strictly forward in numeric order except `Done`, which is
/// absorbing until an explicit mission reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Waypoint {
    /// On the start bar, waiting for the path tag.
    Start = 0,
    /// Travelling toward the first junction.
    Branch0 = 1,
    /// Travelling toward the mid bar where the digit is read.
    Mid = 2,
    /// Travelling toward the first drop candidate.
    BranchA = 3,
    /// Travelling toward the second drop candidate.
    BranchB = 4,
    /// Mission finished; drive stopped.
    Done = 5,
}

impl Waypoint {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Start),
            1 => Some(Self::Branch0),
            2 => Some(Self::Mid),
            3 => Some(Self::BranchA),
            4 => Some(Self::BranchB),
            5 => Some(Self::Done),
            _ => None,
        }
    }

    /// Returns true for the absorbing terminal waypoint.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl Default for Waypoint {
    fn default() -> Self {
        Self::Start
    }
}

// ─── Side ───────────────────────────────────────────────────────────

/// Turn/path direction as seen from the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Toward the left branch.
    Left = 0,
    /// Toward the right branch.
    Right = 1,
}

impl Side {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    /// The mirrored direction.
    #[inline]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
