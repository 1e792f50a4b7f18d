//! Porter Common Library
//!
//! This crate provides the shared vocabulary for the porter workspace:
//! hardware capability trait, actuation types, mission state enums,
//! tunable configuration and project-wide default constants.
//!
//! # Module Structure
//!
//! - [`hw`] - Hardware capability trait and actuation/sensor types
//! - [`state`] - Mission phase, waypoint and side enums
//! - [`config`] - Configuration structs, loading trait and validation
//! - [`consts`] - Default tunables of the reference vehicle
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! porter_common = { path = "../porter_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use porter_common::prelude::*;
//! use porter_common::config::{ConfigLoader, RobotConfig};
//! ```

pub mod config;
pub mod consts;
pub mod hw;
pub mod prelude;
pub mod state;
