//! Rolling RTP Surveillance
//!
//! This library simulates per-spin payout ratios (RTP) for a repeated wagering
//! process, injects contiguous fraud windows and detects them with a causal
//! rolling-average threshold rule.
//!
//! # Modules
//!
//! - `config`: run configuration and validation
//! - `data`: seeded series generation and anomaly injection
//! - `anomaly`: rolling mean, threshold flagging and anomaly reports
//! - `report`: PNG chart, console and JSON summaries
//! - `pipeline`: end-to-end run
//!
//! # Example
//!
//! ```no_run
//! use rtp_surveillance::{pipeline, SurveillanceConfig};
//!
//! let config = SurveillanceConfig::default();
//! let output = pipeline::run(&config).unwrap();
//! output.emit_default().unwrap();
//! ```

pub mod anomaly;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;

pub use anomaly::*;
pub use config::*;
pub use data::*;
pub use error::{Error, Result};
pub use report::{ChartConfig, ChartRenderer, ConsoleSummary, JsonSummary, ReportEmitter, ReportInput};
