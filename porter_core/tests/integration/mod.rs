//! Scenario modules for the integration binary.

mod faults;
mod grab_cycle;
mod line_follow;
mod transport;
