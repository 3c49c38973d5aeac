//! Event series structures
//!
//! Core data structures for a simulated wagering run: one [`Event`] per spin,
//! assembled into an immutable [`Series`] by [`RatioSeriesBuilder`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Single wagering event (one spin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// 1-based ordinal of the event
    pub index: usize,
    pub stake: f64,
    pub payout: f64,
    /// Payout divided by stake
    pub ratio: f64,
}

impl Event {
    /// Create an event from its stake and payout ratio
    pub fn new(index: usize, stake: f64, ratio: f64) -> Self {
        let payout = stake * ratio;
        Self {
            index,
            stake,
            payout,
            ratio: payout / stake,
        }
    }

    /// Ratio in percent
    pub fn ratio_pct(&self) -> f64 {
        self.ratio * 100.0
    }
}

/// Ordered, immutable sequence of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    events: Vec<Event>,
}

impl Series {
    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get the number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Event at a 0-based position
    pub fn get(&self, position: usize) -> Option<&Event> {
        self.events.get(position)
    }

    /// Get all payout ratios
    pub fn ratios(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.ratio).collect()
    }

    /// Get all payouts
    pub fn payouts(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.payout).collect()
    }

    /// Total stake over the series
    pub fn total_stake(&self) -> f64 {
        self.events.iter().map(|e| e.stake).sum()
    }

    /// Total payout over the series
    pub fn total_payout(&self) -> f64 {
        self.events.iter().map(|e| e.payout).sum()
    }

    /// Overall RTP (total payout / total stake)
    pub fn overall_ratio(&self) -> Option<f64> {
        let stake = self.total_stake();
        if stake > 0.0 {
            Some(self.total_payout() / stake)
        } else {
            None
        }
    }
}

/// Contiguous `[start, end)` range whose ratios replace the base sequence
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalySegment {
    pub start: usize,
    pub end: usize,
    pub values: Vec<f64>,
}

impl AnomalySegment {
    pub fn new(start: usize, values: Vec<f64>) -> Self {
        Self {
            start,
            end: start + values.len(),
            values,
        }
    }

    /// Segment with an explicit end, checked against the value count at build time
    pub fn with_range(start: usize, end: usize, values: Vec<f64>) -> Self {
        Self { start, end, values }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }
}

/// Assembles the final [`Series`] from a base ratio sequence and anomaly overlays
#[derive(Debug, Clone)]
pub struct RatioSeriesBuilder {
    base: Vec<f64>,
    stake: f64,
    segments: Vec<AnomalySegment>,
}

impl RatioSeriesBuilder {
    /// Start from a base ratio sequence and a uniform stake
    pub fn new(base: Vec<f64>, stake: f64) -> Self {
        Self {
            base,
            stake,
            segments: Vec::new(),
        }
    }

    /// Add an anomaly segment
    pub fn segment(mut self, segment: AnomalySegment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Add several anomaly segments
    pub fn segments<I>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = AnomalySegment>,
    {
        self.segments.extend(segments);
        self
    }

    /// Validate all segments, overwrite the base ratios and build the series.
    pub fn build(self) -> Result<Series> {
        if !self.stake.is_finite() || self.stake <= 0.0 {
            return Err(Error::config(format!(
                "stake must be positive and finite, got {}",
                self.stake
            )));
        }
        self.validate_segments()?;

        let mut ratios = self.base;
        for segment in &self.segments {
            ratios[segment.start..segment.end].copy_from_slice(&segment.values);
        }

        let stake = self.stake;
        let events = ratios
            .into_iter()
            .enumerate()
            .map(|(i, ratio)| Event::new(i + 1, stake, ratio.max(0.0)))
            .collect();

        Ok(Series { events })
    }

    fn validate_segments(&self) -> Result<()> {
        let ranges: Vec<(usize, usize)> =
            self.segments.iter().map(|s| (s.start, s.end)).collect();
        check_segment_ranges(&ranges, self.base.len())?;

        for (i, segment) in self.segments.iter().enumerate() {
            if segment.values.len() != segment.len() {
                return Err(Error::config(format!(
                    "anomaly segment #{} [{}, {}) carries {} values, expected {}",
                    i,
                    segment.start,
                    segment.end,
                    segment.values.len(),
                    segment.len()
                )));
            }
        }
        Ok(())
    }
}

/// Check half-open `(start, end)` ranges against a series of length `n`:
/// each must be non-empty and in bounds, and no two may overlap.
///
/// Errors name segments by their position in `ranges`.
pub(crate) fn check_segment_ranges(ranges: &[(usize, usize)], n: usize) -> Result<()> {
    for (i, &(start, end)) in ranges.iter().enumerate() {
        if start >= end || end > n {
            return Err(Error::config(format!(
                "anomaly segment #{} [{}, {}) is outside 0 <= start < end <= {}",
                i, start, end, n
            )));
        }
    }

    let mut order: Vec<usize> = (0..ranges.len()).collect();
    order.sort_by_key(|&i| ranges[i].0);
    for pair in order.windows(2) {
        let (a, b) = (ranges[pair[0]], ranges[pair[1]]);
        if b.0 < a.1 {
            return Err(Error::config(format!(
                "anomaly segment #{} [{}, {}) overlaps segment #{} [{}, {})",
                pair[1], b.0, b.1, pair[0], a.0, a.1
            )));
        }
    }
    Ok(())
}
