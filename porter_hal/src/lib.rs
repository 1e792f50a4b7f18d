//! # Porter HAL
//!
//! Bench hardware for the porter workspace.
//!
//! The decision core talks to the `Hardware` trait from
//! `porter_common`; this crate provides the scripted bench
//! implementation of it:
//!
//! - [`rig`] — [`SimRig`], a simulation rig with a virtual clock,
//!   scripted sensor timelines and logged actuation
//! - [`scenario`] — the JSON scenario format that scripts a rig
//!
//! A rig never sleeps: `wait_ms` advances the virtual clock, so
//! blocking sequences in the core run instantly under test while
//! keeping their timing observable.
//!
//! [`SimRig`]: rig::SimRig

#![warn(clippy::all)]

pub mod rig;
pub mod scenario;

// Re-export key types for convenience
pub use crate::rig::{ServoMove, SimRig};
pub use crate::scenario::{Scenario, ScenarioError};
