//! Series generation and assembly
//!
//! - `generator`: seeded payout-ratio sampling
//! - `series`: events, anomaly segments and the series builder

mod generator;
mod series;

pub use generator::*;
pub use series::*;
