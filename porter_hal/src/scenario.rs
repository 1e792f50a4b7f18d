//! JSON scenario scripting for the bench rig.
//!
//! A [`Scenario`] is the declarative form of a [`SimRig`] script:
//! line segments plus vision windows, loaded from a JSON file or
//! built in code. [`Scenario::build`] feeds the events into a fresh
//! rig in declaration order, so overlap resolution follows the rig's
//! first-added-wins rule.
//!
//! # JSON Example
//!
//! ```json
//! {
//!   "name": "straight run",
//!   "line": [
//!     { "at_ms": 0, "bits": 7 },
//!     { "at_ms": 1200, "bits": 6 }
//!   ],
//!   "tags": [
//!     { "from_ms": 0, "to_ms": 8000, "id": 1 }
//!   ]
//! }
//! ```

use crate::rig::SimRig;
use porter_common::consts::SENSOR_COUNT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Scenario loading and validation failures.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario file could not be read.
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario file is not valid JSON for the schema.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    /// Scenario contents violate a schema rule.
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// One line pattern change, effective from `at_ms` onward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineEvent {
    /// Time the pattern takes effect [ms].
    pub at_ms: u64,
    /// Sensor bits; bit `i - 1` drives sensor `i`.
    pub bits: u8,
}

/// A fiducial tag in view over `[from_ms, to_ms)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagEvent {
    /// Window start [ms].
    pub from_ms: u64,
    /// Window end, exclusive [ms].
    pub to_ms: u64,
    /// Tag id in view.
    pub id: u8,
}

/// Digit classifier output over `[from_ms, to_ms)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigitEvent {
    /// Window start [ms].
    pub from_ms: u64,
    /// Window end, exclusive [ms].
    pub to_ms: u64,
    /// Best digit hypothesis.
    pub value: u8,
    /// Classifier confidence (0..=100).
    pub confidence: u8,
}

/// A color blob over `[from_ms, to_ms)`, drifting down the frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlobEvent {
    /// Window start [ms].
    pub from_ms: u64,
    /// Window end, exclusive [ms].
    pub to_ms: u64,
    /// Blob color id.
    pub id: u8,
    /// Horizontal pixel position.
    pub x: i32,
    /// Vertical pixel position at the window start.
    pub y_start: i32,
    /// Vertical drift [px/s]; positive moves down the frame.
    pub y_rate_px_s: i32,
}

/// Declarative script for a [`SimRig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Human-readable scenario name.
    #[serde(default)]
    pub name: String,

    /// Line pattern timeline.
    #[serde(default)]
    pub line: Vec<LineEvent>,

    /// Fiducial tag windows.
    #[serde(default)]
    pub tags: Vec<TagEvent>,

    /// Digit classifier windows.
    #[serde(default)]
    pub digits: Vec<DigitEvent>,

    /// Color blob windows.
    #[serde(default)]
    pub blobs: Vec<BlobEvent>,
}

impl Scenario {
    /// Load and validate a scenario from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a scenario from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check every event against the schema rules.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (i, event) in self.line.iter().enumerate() {
            if event.bits >= 1 << SENSOR_COUNT {
                return Err(ScenarioError::Invalid(format!(
                    "line[{i}]: bits {:#06b} exceed the {SENSOR_COUNT} sensors",
                    event.bits
                )));
            }
        }
        for (i, event) in self.tags.iter().enumerate() {
            check_window("tags", i, event.from_ms, event.to_ms)?;
        }
        for (i, event) in self.digits.iter().enumerate() {
            check_window("digits", i, event.from_ms, event.to_ms)?;
            if event.confidence > 100 {
                return Err(ScenarioError::Invalid(format!(
                    "digits[{i}]: confidence {} exceeds 100",
                    event.confidence
                )));
            }
        }
        for (i, event) in self.blobs.iter().enumerate() {
            check_window("blobs", i, event.from_ms, event.to_ms)?;
        }
        Ok(())
    }

    /// Build a fresh rig scripted with this scenario's events.
    pub fn build(&self) -> SimRig {
        let mut rig = SimRig::new();
        for event in &self.line {
            rig.line_at(event.at_ms, event.bits);
        }
        for event in &self.tags {
            rig.tag_window(event.from_ms, event.to_ms, event.id);
        }
        for event in &self.digits {
            rig.digit_window(event.from_ms, event.to_ms, event.value, event.confidence);
        }
        for event in &self.blobs {
            rig.blob_window(
                event.from_ms,
                event.to_ms,
                event.id,
                event.x,
                event.y_start,
                event.y_rate_px_s,
            );
        }
        info!(
            name = %self.name,
            line = self.line.len(),
            tags = self.tags.len(),
            digits = self.digits.len(),
            blobs = self.blobs.len(),
            "scenario built"
        );
        rig
    }

    /// Built-in happy-path transport demo.
    ///
    /// Scripts a full six-waypoint run with the default tunables: the
    /// left-path tag at the start bar, a stable digit `2` at the mid
    /// bar, and crossbars timed so every leave-bar maneuver clears
    /// well inside its bound. Completes whether or not a few hundred
    /// milliseconds of arm homing precede the run.
    pub fn demo() -> Self {
        Self {
            name: "demo".to_string(),
            line: vec![
                // Start bar, present from the beginning.
                LineEvent { at_ms: 0, bits: 0b0111 },
                LineEvent { at_ms: 1_200, bits: 0b0110 },
                // Junction bar before the pivot.
                LineEvent { at_ms: 2_600, bits: 0b1111 },
                LineEvent { at_ms: 3_400, bits: 0b0110 },
                // Mid bar where the digit is read.
                LineEvent { at_ms: 4_400, bits: 0b1111 },
                LineEvent { at_ms: 5_200, bits: 0b0110 },
                // First branch bar, not the target.
                LineEvent { at_ms: 7_000, bits: 0b1111 },
                LineEvent { at_ms: 7_600, bits: 0b0110 },
                // Second branch bar, where the cargo is dropped.
                LineEvent { at_ms: 8_700, bits: 0b1111 },
                LineEvent { at_ms: 9_400, bits: 0b0110 },
            ],
            tags: vec![TagEvent {
                from_ms: 0,
                to_ms: 8_000,
                id: 1,
            }],
            digits: vec![DigitEvent {
                from_ms: 4_300,
                to_ms: 13_000,
                value: 2,
                confidence: 90,
            }],
            blobs: vec![],
        }
    }
}

fn check_window(kind: &str, i: usize, from_ms: u64, to_ms: u64) -> Result<(), ScenarioError> {
    if to_ms <= from_ms {
        return Err(ScenarioError::Invalid(format!(
            "{kind}[{i}]: window [{from_ms}, {to_ms}) is empty"
        )));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────
