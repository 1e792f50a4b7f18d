//! Vision gate: tag discrimination, stable digit read, confirm counter.
//!
//! Both readers poll the vision collaborator once per tick and are
//! bounded by a deadline fixed at construction. A timed-out read is a
//! valid negative result for the caller to handle, never a panic or a
//! silent default.

use porter_common::hw::driver::Hardware;

// ─── Tag Discrimination ─────────────────────────────────────────────

/// Outcome of one tag discrimination poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPoll {
    /// Neither candidate seen yet; poll again next tick.
    Pending,
    /// One candidate detected; carries the winning tag id.
    Detected(u8),
    /// Deadline passed without a detection.
    TimedOut,
}

/// Binary discrimination between two fiducial tag ids.
///
/// Constructed fresh for every read so a timeout retries with a full
/// window on the next activation.
#[derive(Debug)]
pub struct TagDiscriminator {
    first: u8,
    second: u8,
    deadline_ms: u64,
}

impl TagDiscriminator {
    /// Start a read window of `timeout_ms` from `now_ms`.
    pub fn new(first: u8, second: u8, timeout_ms: u32, now_ms: u64) -> Self {
        Self {
            first,
            second,
            deadline_ms: now_ms + timeout_ms as u64,
        }
    }

    /// Refresh the frame and check both candidates, first id wins ties.
    ///
    /// The deadline is checked after the detection queries, so the
    /// frame arriving exactly at the deadline still counts.
    pub fn poll(&mut self, hw: &mut impl Hardware, now_ms: u64) -> TagPoll {
        hw.camera_update();
        if hw.tag_detected(self.first) {
            return TagPoll::Detected(self.first);
        }
        if hw.tag_detected(self.second) {
            return TagPoll::Detected(self.second);
        }
        if now_ms >= self.deadline_ms {
            return TagPoll::TimedOut;
        }
        TagPoll::Pending
    }
}

// ─── Stable Digit Read ──────────────────────────────────────────────

/// Outcome of one digit read poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitPoll {
    /// No stable run yet; poll again next tick.
    Pending,
    /// The same value held for the configured run length.
    Stable(u8),
    /// Deadline passed before any value stabilized.
    TimedOut,
}

/// Run-length filtered digit classifier read.
///
/// Frames below the confidence floor do not participate: they neither
/// extend nor break the current run.
#[derive(Debug)]
pub struct DigitReader {
    min_confidence: u8,
    stable_count: u8,
    deadline_ms: u64,
    last: Option<u8>,
    run: u32,
}

impl DigitReader {
    /// Start a read window of `timeout_ms` from `now_ms`.
    pub fn new(min_confidence: u8, stable_count: u8, timeout_ms: u32, now_ms: u64) -> Self {
        Self {
            min_confidence,
            stable_count,
            deadline_ms: now_ms + timeout_ms as u64,
            last: None,
            run: 0,
        }
    }

    /// Refresh the frame and fold it into the run-length filter.
    pub fn poll(&mut self, hw: &mut impl Hardware, now_ms: u64) -> DigitPoll {
        hw.camera_update();
        if hw.digit_confidence() >= self.min_confidence {
            let value = hw.digit_best_value();
            if self.last == Some(value) {
                self.run += 1;
            } else {
                self.last = Some(value);
                self.run = 1;
            }
            if self.run >= self.stable_count as u32 {
                return DigitPoll::Stable(value);
            }
        }
        if now_ms >= self.deadline_ms {
            return DigitPoll::TimedOut;
        }
        DigitPoll::Pending
    }
}

// ─── Confirmation Hysteresis ────────────────────────────────────────

/// Counts consecutive qualifying observations and fires once the count
/// exceeds the threshold: the trigger lands on observation number
/// `threshold + 1`. Any single miss resets the count to zero.
#[derive(Debug)]
pub struct ConfirmCounter {
    threshold: u8,
    count: u32,
}

impl ConfirmCounter {
    /// Counter with the given confirmation threshold.
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            count: 0,
        }
    }

    /// Fold in one observation; returns true exactly on the trigger
    /// tick, after which the count starts over.
    pub fn observe(&mut self, qualifying: bool) -> bool {
        if !qualifying {
            self.count = 0;
            return false;
        }
        self.count += 1;
        if self.count > self.threshold as u32 {
            self.count = 0;
            return true;
        }
        false
    }

    /// Drop any accumulated count.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Current consecutive-hit count.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.count
    }
}
