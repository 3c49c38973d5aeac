//! Rolling-threshold anomaly detection
//!
//! This module provides:
//! - `rolling`: causal rolling mean, batch and streaming
//! - `detector`: threshold flagging and anomaly extraction

mod detector;
mod rolling;

pub use detector::*;
pub use rolling::*;

use serde::Serialize;

/// Rolling statistic at one position.
///
/// `Undefined` marks positions before the first full window and is never
/// treated as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollingValue {
    Defined(f64),
    Undefined,
}

impl RollingValue {
    pub fn is_defined(&self) -> bool {
        matches!(self, RollingValue::Defined(_))
    }

    /// The value, if defined
    pub fn value(&self) -> Option<f64> {
        match *self {
            RollingValue::Defined(v) => Some(v),
            RollingValue::Undefined => None,
        }
    }

    /// True iff defined and strictly greater than `threshold`
    pub fn exceeds(&self, threshold: f64) -> bool {
        match *self {
            RollingValue::Defined(v) => v > threshold,
            RollingValue::Undefined => false,
        }
    }
}

impl From<Option<f64>> for RollingValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => RollingValue::Defined(v),
            None => RollingValue::Undefined,
        }
    }
}

/// One flagged event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlaggedEvent {
    /// 0-based position in the series
    pub position: usize,
    /// 1-based event index
    pub index: usize,
    /// Payout ratio of the event itself
    pub ratio: f64,
    /// Rolling mean that triggered the flag
    pub rolling: f64,
}

/// Summary outcome of a detection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    NoAnomalies,
    Detected { count: usize, first_index: usize },
}

/// Ordered flagged events plus derived summary fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub flagged: Vec<FlaggedEvent>,
    pub count: usize,
    /// 1-based index of the first flagged event
    pub first_flagged_index: Option<usize>,
    /// 1-based index of the last flagged event
    pub last_flagged_index: Option<usize>,
    /// Highest rolling mean among flagged events
    pub peak_rolling: Option<f64>,
}

impl AnomalyReport {
    /// Build a report from flagged events in series order
    pub fn from_flagged(flagged: Vec<FlaggedEvent>) -> Self {
        let count = flagged.len();
        let first_flagged_index = flagged.first().map(|e| e.index);
        let last_flagged_index = flagged.last().map(|e| e.index);
        let peak_rolling = flagged
            .iter()
            .map(|e| e.rolling)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

        Self {
            flagged,
            count,
            first_flagged_index,
            last_flagged_index,
            peak_rolling,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn outcome(&self) -> Outcome {
        match self.first_flagged_index {
            Some(first_index) => Outcome::Detected {
                count: self.count,
                first_index,
            },
            None => Outcome::NoAnomalies,
        }
    }

    /// 0-based positions of flagged events
    pub fn positions(&self) -> Vec<usize> {
        self.flagged.iter().map(|e| e.position).collect()
    }
}

/// Everything a detection pass produces, aligned with the series
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Window size the rolling values were computed with
    pub window: usize,
    pub rolling: Vec<RollingValue>,
    pub flags: Vec<bool>,
    pub report: AnomalyReport,
}

impl Detection {
    /// Fraction of events flagged
    pub fn anomaly_rate(&self) -> f64 {
        if self.flags.is_empty() {
            0.0
        } else {
            self.report.count as f64 / self.flags.len() as f64
        }
    }

    /// Maximum defined rolling value over the series
    pub fn max_rolling(&self) -> Option<f64> {
        self.rolling
            .iter()
            .filter_map(|v| v.value())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }
}
