//! Hardware capability trait.
//!
//! This module defines [`Hardware`], the single injected abstraction
//! between the decision core and a physical or simulated vehicle. The
//! core depends only on this trait; concrete rigs live in `porter_hal`
//! and in test doubles.

use crate::hw::types::{LineColor, LineSensor, Spin, VisionAxis, WheelId};

/// Interface to the vehicle's actuators, sensors and clock.
///
/// Methods are grouped into capability sets. All actuation is
/// fire-and-forget: commands return immediately and callers pause
/// explicitly where physical travel time matters.
///
/// The decision core is single-threaded and poll-driven, so the trait
/// carries no `Send`/`Sync` bound; a rig that needs one can add it.
///
/// # Capability Sets
///
/// | Group | Methods | Contract |
/// |-------|---------|----------|
/// | drive | `drive_wheel` | speed 0 stops the wheel |
/// | servo | `set_servo` | positional move over a duration, no completion callback |
/// | line sensors | `read_line_sensor` | true while the sensor observes `color` |
/// | vision | `camera_update` + queries | queries reflect the last refreshed frame |
/// | feedback | `play_cue`, `show_text` | best effort, may be a no-op |
/// | clock | `now_ms`, `wait_ms` | monotonic milliseconds; a bench rig advances virtual time in `wait_ms` |
pub trait Hardware {
    // ── Drive ──

    /// Set one wheel's rotation sense and speed (0..=100; 0 stops).
    fn drive_wheel(&mut self, wheel: WheelId, spin: Spin, speed: u8);

    // ── Servo ──

    /// Command a positional servo to `angle_deg` over `duration_ms`.
    ///
    /// Fire-and-forget; the servo keeps travelling after this returns.
    fn set_servo(&mut self, port: u8, angle_deg: i16, duration_ms: u32);

    // ── Line sensors ──

    /// True while `sensor` currently observes `color`.
    fn read_line_sensor(&mut self, sensor: LineSensor, color: LineColor) -> bool;

    // ── Vision ──

    /// Refresh the vision pipeline's latest frame result.
    ///
    /// Must be called before any of the queries below; each query
    /// reflects the most recent refresh.
    fn camera_update(&mut self);

    /// True if the color blob with `id` is present in the last frame.
    fn target_detected(&mut self, id: u8) -> bool;

    /// Pixel position of the blob with `id` on `axis`.
    ///
    /// Meaningful only while [`target_detected`] reports true for the
    /// same frame.
    ///
    /// [`target_detected`]: Hardware::target_detected
    fn target_position(&mut self, axis: VisionAxis, id: u8) -> i32;

    /// Classifier confidence of the best digit hypothesis (0..=100).
    fn digit_confidence(&mut self) -> u8;

    /// Digit value with the highest classifier confidence.
    fn digit_best_value(&mut self) -> u8;

    /// True if the fiducial tag with `id` is present in the last frame.
    fn tag_detected(&mut self, id: u8) -> bool;

    // ── Feedback ──

    /// Play the short confirmation cue.
    fn play_cue(&mut self);

    /// Show a short text on the vehicle display.
    fn show_text(&mut self, text: &str);

    // ── Clock ──

    /// Monotonic milliseconds since rig start.
    fn now_ms(&self) -> u64;

    /// Pause for `ms` milliseconds.
    ///
    /// A physical rig sleeps; a bench rig advances its virtual clock so
    /// that blocking sequences stay testable.
    fn wait_ms(&mut self, ms: u32);
}
