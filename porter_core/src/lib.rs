//! # Porter Decision Core
//!
//! Decision core for a line-following transport robot: reads a 4-sensor
//! ground line array, debounces painted crossbars into discrete waypoint
//! events, gates pick/place actions behind confirmed vision detections,
//! and sequences a six-waypoint "Smart Transport" delivery run.
//!
//! ## Architecture Levels
//!
//! 1. **steer** — Reactive line-following control law (pure function)
//! 2. **bar** — Debounced bar crossing detector (latch + cooldown)
//! 3. **vision** — Tag discrimination, stable digit read, confirm counter
//! 4. **arm / maneuver** — Open-loop timed servo and drive sub-machines
//! 5. **approach / mission** — Vision-gated grab and waypoint sequencing
//! 6. **robot** — The facade owning all mutable state, generic over the
//!    hardware capability trait
//!
//! ## Poll-Driven Core
//!
//! Every long-running action is a sub-state machine with a `tick()` entry
//! point, stepped once per control tick by the caller. The core never
//! busy-waits; blocking convenience wrappers exist only at the facade for
//! provably bounded sequences, and pause through the hardware clock so a
//! scripted bench rig advances virtual time.

#![deny(clippy::disallowed_types)]

pub mod approach;
pub mod arm;
pub mod bar;
pub mod fault;
pub mod maneuver;
pub mod mission;
pub mod report;
pub mod robot;
pub mod steer;
pub mod tick;
pub mod vision;
