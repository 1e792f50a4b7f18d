//! Hardware capability trait and actuation/sensor types.
//!
//! This module contains the injected hardware abstraction consumed by
//! the decision core and the plain value types spoken across it.

pub mod driver;
pub mod types;
