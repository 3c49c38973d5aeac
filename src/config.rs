//! Run configuration
//!
//! Every knob of a surveillance run lives here, with defaults matching the
//! reference fraud-injection scenario. Configurations are validated as a whole
//! before anything is simulated.

use crate::data::check_segment_ranges;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default chart filename
pub const DEFAULT_OUTPUT_PATH: &str = "anomaly_report.png";

/// Injected anomaly regime: a half-open `[start, end)` range drawn from its own
/// normal distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRegime {
    /// First affected position (0-based, inclusive)
    pub start: usize,
    /// End position (0-based, exclusive)
    pub end: usize,
    /// Mean payout ratio inside the regime
    pub mean: f64,
    /// Standard deviation of the payout ratio inside the regime
    pub std_dev: f64,
}

impl AnomalyRegime {
    pub fn new(start: usize, end: usize, mean: f64, std_dev: f64) -> Self {
        Self {
            start,
            end,
            mean,
            std_dev,
        }
    }

    /// Number of events covered by the regime
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AnomalyRegime {
    fn default() -> Self {
        Self::new(50_000, 50_200, 2.00, 0.20)
    }
}

/// Full configuration of a surveillance run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveillanceConfig {
    /// Number of simulated events (spins)
    pub event_count: usize,
    /// Mean payout ratio of the normal regime
    pub base_mean: f64,
    /// Standard deviation of the normal regime
    pub base_std_dev: f64,
    /// Injected anomaly regimes, non-overlapping
    pub anomalies: Vec<AnomalyRegime>,
    /// Stake per event, constant across the series
    pub stake: f64,
    /// Rolling window size in events
    pub window_size: usize,
    /// Rolling-mean threshold above which events are flagged
    pub threshold: f64,
    /// Seed for the series generator
    pub random_seed: u64,
    /// Chart output path
    pub output_path: PathBuf,
    /// Chart resolution in dots per inch
    pub dpi: u32,
}

impl Default for SurveillanceConfig {
    fn default() -> Self {
        Self {
            event_count: 100_000,
            base_mean: 0.96,
            base_std_dev: 0.15,
            anomalies: vec![AnomalyRegime::default()],
            stake: 1.0,
            window_size: 500,
            threshold: 1.10,
            random_seed: 42,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            dpi: 200,
        }
    }
}

impl SurveillanceConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SurveillanceConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check the whole configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.event_count == 0 {
            return Err(Error::config("event count must be positive"));
        }
        check_distribution("base regime", self.base_mean, self.base_std_dev)?;

        if !self.stake.is_finite() || self.stake <= 0.0 {
            return Err(Error::config(format!(
                "stake must be positive and finite, got {}",
                self.stake
            )));
        }
        if self.window_size == 0 {
            return Err(Error::config("window size must be at least 1"));
        }
        if self.window_size > self.event_count {
            return Err(Error::config(format!(
                "window size {} exceeds event count {}",
                self.window_size, self.event_count
            )));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::config(format!(
                "threshold must be non-negative and finite, got {}",
                self.threshold
            )));
        }
        if self.dpi == 0 {
            return Err(Error::config("dpi must be positive"));
        }

        let ranges: Vec<(usize, usize)> =
            self.anomalies.iter().map(|r| (r.start, r.end)).collect();
        check_segment_ranges(&ranges, self.event_count)?;
        for (i, regime) in self.anomalies.iter().enumerate() {
            check_distribution(&format!("anomaly segment #{}", i), regime.mean, regime.std_dev)?;
        }

        Ok(())
    }
}

fn check_distribution(label: &str, mean: f64, std_dev: f64) -> Result<()> {
    if !mean.is_finite() {
        return Err(Error::config(format!("{}: mean must be finite", label)));
    }
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(Error::config(format!(
            "{}: standard deviation must be non-negative, got {}",
            label, std_dev
        )));
    }
    Ok(())
}
