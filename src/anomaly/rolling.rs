//! Causal rolling mean
//!
//! The mean at position `i` covers the trailing window `[i - W + 1, i]` and is
//! maintained with a compensated running sum, so a full pass is O(N)
//! regardless of window size. A window holding one repeated value returns that
//! value exactly; rounding must not decide a strict threshold comparison.

use super::RollingValue;
use std::collections::VecDeque;

/// Neumaier-compensated sum supporting removal
#[derive(Clone, Copy, Debug, Default)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    fn remove(&mut self, value: f64) {
        self.add(-value);
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Streaming rolling mean over the last `window` values
#[derive(Clone, Debug)]
pub struct RollingMean {
    /// Window size
    window: usize,
    /// Values currently inside the window
    buffer: VecDeque<f64>,
    /// Running sum of the buffer
    sum: CompensatedSum,
    /// Most recent value
    last: f64,
    /// Number of consecutive values equal to `last`
    run: usize,
}

impl RollingMean {
    /// Create a new rolling mean. A zero window never produces a value.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
            sum: CompensatedSum::default(),
            last: 0.0,
            run: 0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Clear the state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.sum = CompensatedSum::default();
        self.last = 0.0;
        self.run = 0;
    }

    /// Check if a full window has been seen
    pub fn is_warmed_up(&self) -> bool {
        self.window > 0 && self.buffer.len() == self.window
    }

    /// Current rolling value
    pub fn value(&self) -> RollingValue {
        if !self.is_warmed_up() {
            RollingValue::Undefined
        } else if self.run >= self.window {
            RollingValue::Defined(self.last)
        } else {
            RollingValue::Defined(self.sum.value() / self.window as f64)
        }
    }

    /// Push a new value and return the rolling mean including it
    pub fn push(&mut self, value: f64) -> RollingValue {
        if self.window == 0 {
            return RollingValue::Undefined;
        }

        if self.buffer.len() == self.window {
            if let Some(old_value) = self.buffer.pop_front() {
                self.sum.remove(old_value);
            }
        }

        self.buffer.push_back(value);
        self.sum.add(value);

        if self.run > 0 && value == self.last {
            self.run += 1;
        } else {
            self.last = value;
            self.run = 1;
        }

        self.value()
    }
}

/// Calculate the causal rolling mean of `data`.
///
/// The first `window - 1` positions are [`RollingValue::Undefined`]; if the
/// window is zero or longer than the data, every position is.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<RollingValue> {
    let mut stream = RollingMean::new(window);
    data.iter().map(|&x| stream.push(x)).collect()
}
