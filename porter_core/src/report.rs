//! End-of-run report assembly.
//!
//! The binary collects mission outcome and tick timing into a single
//! serializable [`RunReport`] and writes it as pretty-printed JSON for
//! offline inspection (bench logs, regression diffs).

use crate::fault::FaultFlags;
use crate::tick::TickStats;
use porter_common::state::{Side, Waypoint};
use porter_hal::rig::ServoMove;
use serde::Serialize;
use std::path::Path;

/// Tick timing summary for the report.
#[derive(Debug, Clone, Serialize)]
pub struct TimingReport {
    /// Total control ticks executed.
    pub tick_count: u64,
    /// Shortest tick [ns].
    pub min_ns: i64,
    /// Longest tick [ns].
    pub max_ns: i64,
    /// Average tick [ns].
    pub avg_ns: i64,
    /// Ticks that ran past the period budget.
    pub overruns: u64,
}

impl From<&TickStats> for TimingReport {
    fn from(stats: &TickStats) -> Self {
        Self {
            tick_count: stats.tick_count,
            // min_ns starts at i64::MAX; report 0 for an empty run.
            min_ns: if stats.tick_count == 0 { 0 } else { stats.min_ns },
            max_ns: stats.max_ns,
            avg_ns: stats.avg_ns(),
            overruns: stats.overruns,
        }
    }
}

/// Outcome of one mission run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Service instance identifier from the run configuration.
    pub service: String,
    /// Control ticks consumed by the run.
    pub ticks: u64,
    /// Whether the mission reached its terminal waypoint.
    pub done: bool,
    /// Waypoint the mission ended on.
    pub waypoint: Waypoint,
    /// Waypoints visited, in order.
    pub trail: Vec<Waypoint>,
    /// Branch side chosen at the fork, if the tag was read.
    pub path: Option<Side>,
    /// Destination branch number, if the digit was read.
    pub target: Option<u8>,
    /// Whether cargo is still held.
    pub carrying: bool,
    /// Names of the fault flags raised during the run.
    pub faults: Vec<String>,
    /// Servo commands issued during the run, with their issue times.
    pub servo_moves: Vec<ServoMove>,
    /// Tick timing summary.
    pub timing: TimingReport,
}

impl RunReport {
    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Names of the set flags, for human-readable report output.
pub fn fault_names(faults: FaultFlags) -> Vec<String> {
    faults
        .iter_names()
        .map(|(name, _)| name.to_string())
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────
