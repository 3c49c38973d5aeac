//! Simulate a payout-ratio series with an injected fraud window and flag it
//!
//! Usage: cargo run --release --bin surveillance -- --window 500 --threshold 1.10

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use rtp_surveillance::{
    pipeline, AnomalyRegime, ChartConfig, ChartRenderer, ConsoleSummary, JsonSummary,
    ReportEmitter, SurveillanceConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rolling RTP surveillance with injected fraud window")]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of simulated spins
    #[arg(short = 'n', long)]
    events: Option<usize>,

    /// Mean RTP of normal play
    #[arg(long)]
    base_mean: Option<f64>,

    /// Standard deviation of normal play
    #[arg(long)]
    base_std: Option<f64>,

    /// First spin of the fraud window (0-based, inclusive)
    #[arg(long)]
    anomaly_start: Option<usize>,

    /// End of the fraud window (0-based, exclusive)
    #[arg(long)]
    anomaly_end: Option<usize>,

    /// Mean RTP inside the fraud window
    #[arg(long)]
    anomaly_mean: Option<f64>,

    /// Standard deviation inside the fraud window
    #[arg(long)]
    anomaly_std: Option<f64>,

    /// Run without any injected fraud window
    #[arg(long, conflicts_with_all = ["anomaly_start", "anomaly_end", "anomaly_mean", "anomaly_std"])]
    no_anomaly: bool,

    /// Stake per spin
    #[arg(long)]
    stake: Option<f64>,

    /// Rolling window size
    #[arg(short, long)]
    window: Option<usize>,

    /// Rolling RTP threshold (1.10 = 110%)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Chart output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chart resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// Also write the anomaly report as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Write the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<(SurveillanceConfig, Option<PathBuf>, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => SurveillanceConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => SurveillanceConfig::default(),
        };

        if let Some(v) = self.events {
            config.event_count = v;
        }
        if let Some(v) = self.base_mean {
            config.base_mean = v;
        }
        if let Some(v) = self.base_std {
            config.base_std_dev = v;
        }
        if let Some(v) = self.stake {
            config.stake = v;
        }
        if let Some(v) = self.window {
            config.window_size = v;
        }
        if let Some(v) = self.threshold {
            config.threshold = v;
        }
        if let Some(v) = self.seed {
            config.random_seed = v;
        }
        if let Some(v) = self.output {
            config.output_path = v;
        }
        if let Some(v) = self.dpi {
            config.dpi = v;
        }

        if self.no_anomaly {
            config.anomalies.clear();
        } else if self.anomaly_start.is_some()
            || self.anomaly_end.is_some()
            || self.anomaly_mean.is_some()
            || self.anomaly_std.is_some()
        {
            if config.anomalies.is_empty() {
                config.anomalies.push(AnomalyRegime::default());
            }
            let regime = &mut config.anomalies[0];
            if let Some(v) = self.anomaly_start {
                regime.start = v;
            }
            if let Some(v) = self.anomaly_end {
                regime.end = v;
            }
            if let Some(v) = self.anomaly_mean {
                regime.mean = v;
            }
            if let Some(v) = self.anomaly_std {
                regime.std_dev = v;
            }
        }

        Ok((config, self.summary_json, self.dump_config))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let (config, summary_json, dump_config) = Args::parse().into_config()?;

    if let Some(path) = dump_config {
        config.to_file(&path)?;
        println!("Saved config: {}", path.display());
        return Ok(());
    }

    info!(
        "Simulating {} spins, window={}, threshold={:.2}",
        config.event_count, config.window_size, config.threshold
    );

    let output = pipeline::run(&config)?;

    let chart = ChartRenderer::new(config.output_path.clone(), ChartConfig::with_dpi(config.dpi));
    let console = ConsoleSummary::new(config.output_path.clone());
    let mut emitters: Vec<Box<dyn ReportEmitter>> = vec![Box::new(chart), Box::new(console)];
    if let Some(path) = summary_json {
        emitters.push(Box::new(JsonSummary::new(path).with_config(config.clone())));
    }

    let input = output.report_input();
    for emitter in &emitters {
        emitter.emit(&input)?;
    }

    Ok(())
}
