//! Scripted simulation rig.
//!
//! [`SimRig`] implements the [`Hardware`] trait against a virtual
//! clock. Sensors follow scripted timelines set up before (or during)
//! a run; actuation is recorded so tests can assert on what the core
//! commanded instead of on wall time.

use porter_common::consts::WHEEL_COUNT;
use porter_common::hw::driver::Hardware;
use porter_common::hw::types::{LineColor, LineSensor, Spin, VisionAxis, WheelId};
use serde::Serialize;
use tracing::debug;

// ─── Actuation Log ──────────────────────────────────────────────────

/// One recorded servo command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServoMove {
    /// Virtual time the command was issued [ms].
    pub at_ms: u64,
    /// Servo port the command went to.
    pub port: u8,
    /// Commanded angle [deg].
    pub angle_deg: i16,
    /// Commanded travel time [ms].
    pub duration_ms: u32,
}

// ─── Scripted Timelines ─────────────────────────────────────────────

/// Line pattern from `at_ms` onward; bit `i - 1` drives sensor `i`.
#[derive(Debug, Clone, Copy)]
struct LineSegment {
    at_ms: u64,
    bits: u8,
}

/// A fiducial tag in view over `[from_ms, to_ms)`.
#[derive(Debug, Clone, Copy)]
struct TagWindow {
    from_ms: u64,
    to_ms: u64,
    id: u8,
}

/// Digit classifier output over `[from_ms, to_ms)`.
#[derive(Debug, Clone, Copy)]
struct DigitWindow {
    from_ms: u64,
    to_ms: u64,
    value: u8,
    confidence: u8,
}

/// A color blob over `[from_ms, to_ms)`, drifting down the frame.
#[derive(Debug, Clone, Copy)]
struct BlobWindow {
    from_ms: u64,
    to_ms: u64,
    id: u8,
    x: i32,
    y_start: i32,
    y_rate_px_s: i32,
}

impl BlobWindow {
    /// Vertical position at `at_ms`, which must lie inside the window.
    fn y_at(&self, at_ms: u64) -> i32 {
        let dt_ms = (at_ms - self.from_ms) as i64;
        self.y_start + (dt_ms * i64::from(self.y_rate_px_s) / 1000) as i32
    }
}

// ─── Rig ────────────────────────────────────────────────────────────

/// Scripted bench implementation of the [`Hardware`] trait.
///
/// Time is virtual and moves only through [`advance`] and `wait_ms`,
/// so a test controls exactly when each scripted event becomes
/// visible.
///
/// Scripting rules:
/// - vision windows are half-open `[from, to)`; where windows of the
///   same kind overlap, the first-added one defines the scene
/// - the line pattern is piecewise constant: the latest segment at or
///   before the current time applies, an empty script reads all-off
/// - vision queries reflect the frame latched by the most recent
///   `camera_update`, not the live clock; before the first latch
///   nothing is detected
///
/// [`advance`]: SimRig::advance
#[derive(Debug, Default)]
pub struct SimRig {
    now_ms: u64,
    wheel_speeds: [u8; WHEEL_COUNT],
    servo_log: Vec<ServoMove>,
    line: Vec<LineSegment>,
    tags: Vec<TagWindow>,
    digits: Vec<DigitWindow>,
    blobs: Vec<BlobWindow>,
    frame_at: Option<u64>,
    cues: u32,
    texts: Vec<String>,
}

impl SimRig {
    /// Rig at time zero with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Clock ──

    /// Current virtual time [ms].
    #[inline]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the virtual clock forward by `ms`.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    // ── Scripting ──

    /// Script the line pattern from `at_ms` onward.
    ///
    /// Bit `i - 1` of `bits` makes sensor `i` observe its configured
    /// color; bits above the sensor count are ignored.
    pub fn line_at(&mut self, at_ms: u64, bits: u8) {
        self.line.push(LineSegment { at_ms, bits });
    }

    /// Script a fiducial tag in view over `[from_ms, to_ms)`.
    pub fn tag_window(&mut self, from_ms: u64, to_ms: u64, id: u8) {
        self.tags.push(TagWindow { from_ms, to_ms, id });
    }

    /// Script the digit classifier output over `[from_ms, to_ms)`.
    pub fn digit_window(&mut self, from_ms: u64, to_ms: u64, value: u8, confidence: u8) {
        self.digits.push(DigitWindow {
            from_ms,
            to_ms,
            value,
            confidence,
        });
    }

    /// Script a color blob over `[from_ms, to_ms)`.
    ///
    /// The blob sits at horizontal position `x` and drifts from
    /// `y_start` at `y_rate_px_s` pixels per second of window time.
    pub fn blob_window(
        &mut self,
        from_ms: u64,
        to_ms: u64,
        id: u8,
        x: i32,
        y_start: i32,
        y_rate_px_s: i32,
    ) {
        self.blobs.push(BlobWindow {
            from_ms,
            to_ms,
            id,
            x,
            y_start,
            y_rate_px_s,
        });
    }

    // ── Observation ──

    /// Every servo command issued so far, in order.
    #[inline]
    pub fn servo_log(&self) -> &[ServoMove] {
        &self.servo_log
    }

    /// True while every wheel's last commanded speed is zero.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.wheel_speeds.iter().all(|&speed| speed == 0)
    }

    /// Number of confirmation cues played so far.
    #[inline]
    pub const fn cue_count(&self) -> u32 {
        self.cues
    }

    /// Every text shown on the display so far, in order.
    #[inline]
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    // ── Script lookups ──

    fn line_bits(&self) -> u8 {
        let mut bits = 0;
        let mut applied_at = None;
        for seg in &self.line {
            if seg.at_ms <= self.now_ms && applied_at.map_or(true, |at| seg.at_ms >= at) {
                bits = seg.bits;
                applied_at = Some(seg.at_ms);
            }
        }
        bits
    }

    fn tag_in_scene(&self, at_ms: u64) -> Option<u8> {
        self.tags
            .iter()
            .find(|w| w.from_ms <= at_ms && at_ms < w.to_ms)
            .map(|w| w.id)
    }

    fn digit_frame(&self, at_ms: u64) -> Option<(u8, u8)> {
        self.digits
            .iter()
            .find(|w| w.from_ms <= at_ms && at_ms < w.to_ms)
            .map(|w| (w.value, w.confidence))
    }

    fn blob(&self, id: u8, at_ms: u64) -> Option<&BlobWindow> {
        self.blobs
            .iter()
            .find(|w| w.id == id && w.from_ms <= at_ms && at_ms < w.to_ms)
    }
}

impl Hardware for SimRig {
    fn drive_wheel(&mut self, wheel: WheelId, spin: Spin, speed: u8) {
        debug!(?wheel, ?spin, speed, "drive");
        self.wheel_speeds[wheel.index()] = speed;
    }

    fn set_servo(&mut self, port: u8, angle_deg: i16, duration_ms: u32) {
        debug!(port, angle_deg, duration_ms, "servo");
        self.servo_log.push(ServoMove {
            at_ms: self.now_ms,
            port,
            angle_deg,
            duration_ms,
        });
    }

    fn read_line_sensor(&mut self, sensor: LineSensor, _color: LineColor) -> bool {
        (self.line_bits() >> (sensor as u8 - 1)) & 1 == 1
    }

    fn camera_update(&mut self) {
        self.frame_at = Some(self.now_ms);
    }

    fn target_detected(&mut self, id: u8) -> bool {
        self.frame_at.is_some_and(|at| self.blob(id, at).is_some())
    }

    fn target_position(&mut self, axis: VisionAxis, id: u8) -> i32 {
        let Some(at) = self.frame_at else { return 0 };
        match self.blob(id, at) {
            Some(w) => match axis {
                VisionAxis::X => w.x,
                VisionAxis::Y => w.y_at(at),
            },
            None => 0,
        }
    }

    fn digit_confidence(&mut self) -> u8 {
        self.frame_at
            .and_then(|at| self.digit_frame(at))
            .map_or(0, |(_, confidence)| confidence)
    }

    fn digit_best_value(&mut self) -> u8 {
        self.frame_at
            .and_then(|at| self.digit_frame(at))
            .map_or(0, |(value, _)| value)
    }

    fn tag_detected(&mut self, id: u8) -> bool {
        self.frame_at
            .and_then(|at| self.tag_in_scene(at))
            .is_some_and(|seen| seen == id)
    }

    fn play_cue(&mut self) {
        debug!("cue");
        self.cues += 1;
    }

    fn show_text(&mut self, text: &str) {
        debug!(text, "display");
        self.texts.push(text.to_string());
    }

    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn wait_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms));
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
