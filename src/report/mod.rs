//! Report output
//!
//! Emitters consume the series and detection output and never feed back into
//! the analysis:
//! - `chart`: PNG rendering of the rolling RTP
//! - `summary`: console and JSON summaries

mod chart;
pub mod draw;
mod summary;

pub use chart::*;
pub use summary::*;

use crate::anomaly::{AnomalyReport, Detection, RollingValue};
use crate::data::Series;
use crate::error::Result;

/// Borrowed view of everything an emitter may need
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub series: &'a Series,
    pub detection: &'a Detection,
    pub threshold: f64,
}

impl<'a> ReportInput<'a> {
    pub fn new(series: &'a Series, detection: &'a Detection, threshold: f64) -> Self {
        Self {
            series,
            detection,
            threshold,
        }
    }

    pub fn rolling(&self) -> &'a [RollingValue] {
        &self.detection.rolling
    }

    pub fn flags(&self) -> &'a [bool] {
        &self.detection.flags
    }

    pub fn report(&self) -> &'a AnomalyReport {
        &self.detection.report
    }

    /// Window size the rolling values were computed with
    pub fn window(&self) -> usize {
        self.detection.window
    }
}

/// Output adapter for a finished detection run
pub trait ReportEmitter {
    /// Emit the report
    fn emit(&self, input: &ReportInput<'_>) -> Result<()>;
}
