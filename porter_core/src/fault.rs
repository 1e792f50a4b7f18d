//! Fault flag accumulation for bounded operations.
//!
//! Every timeout in the core is reported, never silently swallowed: the
//! operation degrades (fallback value, retry, stop in place) and sets a
//! flag here so tests and the end-of-run report can observe it.

use bitflags::bitflags;

bitflags! {
    /// Accumulated fault flags of one mission run.
    ///
    /// Flags are sticky until the owning machine is reset; a set flag
    /// means the run degraded at least once, not that the condition
    /// still holds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultFlags: u8 {
        /// Tag discrimination hit its timeout; the mission stayed at
        /// the start waypoint and retries on the next activation.
        const TAG_READ_TIMEOUT    = 0x01;
        /// Stable digit read hit its timeout; the configured fallback
        /// branch number was applied.
        const DIGIT_READ_TIMEOUT  = 0x02;
        /// A leave-bar maneuver never saw coverage drop within its
        /// bound and proceeded anyway.
        const BAR_CLEAR_TIMEOUT   = 0x04;
        /// The vision-guided approach exceeded its bound and reset to
        /// scanning.
        const APPROACH_TIMEOUT    = 0x08;
        /// The U-turn line hunt exceeded its bound and stopped.
        const REALIGN_TIMEOUT     = 0x10;
    }
}

impl FaultFlags {
    /// Mask of the flags raised by the transport mission itself.
    pub const MISSION_MASK: Self = Self::from_bits_truncate(
        Self::TAG_READ_TIMEOUT.bits() | Self::DIGIT_READ_TIMEOUT.bits() | Self::BAR_CLEAR_TIMEOUT.bits(),
    );

    /// Returns true if any flag is set.
    #[inline]
    pub const fn is_degraded(&self) -> bool {
        !self.is_empty()
    }
}

impl Default for FaultFlags {
    fn default() -> Self {
        Self::empty()
    }
}
