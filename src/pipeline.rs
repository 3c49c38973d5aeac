//! End-to-end surveillance run
//!
//! Validates the configuration, generates the series, injects the anomaly
//! segments and runs the detector. Nothing is simulated if validation fails.

use crate::anomaly::{Detection, RollingAnomalyDetector};
use crate::config::SurveillanceConfig;
use crate::data::{generate_scenario, AnomalySegment, RatioSeriesBuilder, Series};
use crate::error::Result;
use crate::report::{ChartConfig, ChartRenderer, ConsoleSummary, ReportEmitter, ReportInput};
use log::{debug, info, warn};

/// Output of a completed run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: SurveillanceConfig,
    pub series: Series,
    pub detection: Detection,
}

impl RunOutput {
    /// Borrowed view for report emitters
    pub fn report_input(&self) -> ReportInput<'_> {
        ReportInput::new(&self.series, &self.detection, self.config.threshold)
    }

    /// Emit through each emitter in order, stopping at the first failure
    pub fn emit(&self, emitters: &[&dyn ReportEmitter]) -> Result<()> {
        let input = self.report_input();
        for emitter in emitters {
            emitter.emit(&input)?;
        }
        Ok(())
    }

    /// Default outputs: the PNG chart, then the console summary
    pub fn emit_default(&self) -> Result<()> {
        let chart = ChartRenderer::new(
            self.config.output_path.clone(),
            ChartConfig::with_dpi(self.config.dpi),
        );
        let console = ConsoleSummary::new(self.config.output_path.clone());
        self.emit(&[&chart, &console])
    }
}

/// Build the series described by `config`.
pub fn build_series(config: &SurveillanceConfig) -> Result<Series> {
    config.validate()?;
    assemble_series(config)
}

/// Generate and overlay the series for an already validated `config`.
fn assemble_series(config: &SurveillanceConfig) -> Result<Series> {
    let draws = generate_scenario(config)?;
    info!(
        "Generated {} base ratios (mean={}, std={}, seed={})",
        draws.base.len(),
        config.base_mean,
        config.base_std_dev,
        config.random_seed
    );

    let segments = config
        .anomalies
        .iter()
        .zip(draws.anomalies)
        .map(|(regime, values)| {
            debug!(
                "Injecting anomaly segment [{}, {}) mean={} std={}",
                regime.start, regime.end, regime.mean, regime.std_dev
            );
            if regime.len() < config.window_size {
                warn!(
                    "Anomaly segment [{}, {}) is shorter than the {}-event window",
                    regime.start, regime.end, config.window_size
                );
            }
            AnomalySegment::with_range(regime.start, regime.end, values)
        });

    RatioSeriesBuilder::new(draws.base, config.stake)
        .segments(segments)
        .build()
}

/// Run generation and detection for `config`.
pub fn run(config: &SurveillanceConfig) -> Result<RunOutput> {
    config.validate()?;
    let detector = RollingAnomalyDetector::new(config.window_size, config.threshold)?;

    let series = assemble_series(config)?;
    let detection = detector.detect(&series)?;

    match detection.report.first_flagged_index {
        Some(first) => info!(
            "Flagged {} of {} events (window={}, threshold={}), first at {}",
            detection.report.count,
            series.len(),
            config.window_size,
            config.threshold,
            first
        ),
        None => info!(
            "No events flagged (window={}, threshold={})",
            config.window_size, config.threshold
        ),
    }

    Ok(RunOutput {
        config: config.clone(),
        series,
        detection,
    })
}
