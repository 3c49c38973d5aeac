//! Console and JSON summaries of a detection run

use super::{ReportEmitter, ReportInput};
use crate::anomaly::{AnomalyReport, Outcome};
use crate::config::{SurveillanceConfig, DEFAULT_OUTPUT_PATH};
use crate::error::Result;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Build the console summary lines for a report.
pub fn summary_lines(report: &AnomalyReport, threshold: f64, plot_path: &Path) -> Vec<String> {
    let first = match report.outcome() {
        Outcome::NoAnomalies => format!(
            "No anomalies detected (rolling RTP never exceeded {:.0}%).",
            threshold * 100.0
        ),
        Outcome::Detected { count, first_index } => format!(
            "Anomalies detected: {} points. First anomaly at spin {}.",
            count, first_index
        ),
    };

    vec![first, format!("Saved plot: {}", plot_path.display())]
}

/// Prints the summary to stdout
#[derive(Debug, Clone)]
pub struct ConsoleSummary {
    plot_path: PathBuf,
}

impl ConsoleSummary {
    pub fn new<P: Into<PathBuf>>(plot_path: P) -> Self {
        Self {
            plot_path: plot_path.into(),
        }
    }
}

impl Default for ConsoleSummary {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH)
    }
}

impl ReportEmitter for ConsoleSummary {
    fn emit(&self, input: &ReportInput<'_>) -> Result<()> {
        for line in summary_lines(input.report(), input.threshold, &self.plot_path) {
            println!("{}", line);
        }
        Ok(())
    }
}

/// Serialized form of a run
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a SurveillanceConfig>,
    series_length: usize,
    window_size: usize,
    overall_ratio: Option<f64>,
    max_rolling: Option<f64>,
    threshold: f64,
    anomaly_rate: f64,
    report: &'a AnomalyReport,
}

/// Writes the anomaly report as pretty JSON
#[derive(Debug, Clone)]
pub struct JsonSummary {
    path: PathBuf,
    config: Option<SurveillanceConfig>,
}

impl JsonSummary {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            config: None,
        }
    }

    /// Include the effective configuration in the output
    pub fn with_config(mut self, config: SurveillanceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Render the JSON document
    pub fn to_json(&self, input: &ReportInput<'_>) -> Result<String> {
        let doc = JsonReport {
            config: self.config.as_ref(),
            series_length: input.series.len(),
            window_size: input.window(),
            overall_ratio: input.series.overall_ratio(),
            max_rolling: input.detection.max_rolling(),
            threshold: input.threshold,
            anomaly_rate: input.detection.anomaly_rate(),
            report: input.report(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

impl ReportEmitter for JsonSummary {
    fn emit(&self, input: &ReportInput<'_>) -> Result<()> {
        fs::write(&self.path, self.to_json(input)?)?;
        info!("Summary saved to {}", self.path.display());
        Ok(())
    }
}
