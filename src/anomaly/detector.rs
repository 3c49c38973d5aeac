//! Rolling-mean threshold detector
//!
//! Flags every event whose trailing-window mean payout ratio is strictly above
//! a fixed threshold.

use super::{rolling_mean, AnomalyReport, Detection, FlaggedEvent, RollingValue};
use crate::data::Series;
use crate::error::{Error, Result};

/// Rolling-mean threshold detector
#[derive(Clone, Debug)]
pub struct RollingAnomalyDetector {
    /// Window size for the rolling mean
    window: usize,
    /// Rolling mean above which events are flagged
    threshold: f64,
}

impl RollingAnomalyDetector {
    /// Create a new detector
    ///
    /// # Arguments
    /// * `window` - Size of the trailing window, at least 1
    /// * `threshold` - Non-negative cutoff, compared with `>`
    pub fn new(window: usize, threshold: f64) -> Result<Self> {
        if window == 0 {
            return Err(Error::config("window size must be at least 1"));
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::config(format!(
                "threshold must be non-negative and finite, got {}",
                threshold
            )));
        }
        Ok(Self { window, threshold })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Rolling mean of the series ratios, one value per event.
    ///
    /// Fails if the window is longer than the series.
    pub fn compute_rolling(&self, series: &Series) -> Result<Vec<RollingValue>> {
        if self.window > series.len() {
            return Err(Error::config(format!(
                "window size {} exceeds series length {}",
                self.window,
                series.len()
            )));
        }
        Ok(rolling_mean(&series.ratios(), self.window))
    }

    /// One flag per event: defined and strictly above the threshold.
    pub fn flag_anomalies(&self, rolling: &[RollingValue]) -> Vec<bool> {
        rolling.iter().map(|v| v.exceeds(self.threshold)).collect()
    }

    /// Collect flagged events in series order.
    ///
    /// Fails if `rolling` or `flags` is not aligned with the series.
    pub fn summarize(
        &self,
        series: &Series,
        rolling: &[RollingValue],
        flags: &[bool],
    ) -> Result<AnomalyReport> {
        if rolling.len() != series.len() || flags.len() != series.len() {
            return Err(Error::config(format!(
                "summary inputs misaligned: {} events, {} rolling values, {} flags",
                series.len(),
                rolling.len(),
                flags.len()
            )));
        }

        let flagged = series
            .events()
            .iter()
            .zip(rolling.iter().zip(flags.iter()))
            .enumerate()
            .filter_map(|(position, (event, (value, &flag)))| match (flag, value) {
                (true, RollingValue::Defined(rolling)) => Some(FlaggedEvent {
                    position,
                    index: event.index,
                    ratio: event.ratio,
                    rolling: *rolling,
                }),
                _ => None,
            })
            .collect();

        Ok(AnomalyReport::from_flagged(flagged))
    }

    /// Run rolling mean, flagging and summarizing in one pass over the series.
    pub fn detect(&self, series: &Series) -> Result<Detection> {
        let rolling = self.compute_rolling(series)?;
        let flags = self.flag_anomalies(&rolling);
        let report = self.summarize(series, &rolling, &flags)?;

        Ok(Detection {
            window: self.window,
            rolling,
            flags,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RatioSeriesBuilder;

    fn series(ratios: Vec<f64>) -> Series {
        RatioSeriesBuilder::new(ratios, 1.0).build().unwrap()
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(RollingAnomalyDetector::new(0, 1.1).unwrap_err().is_configuration());
        assert!(RollingAnomalyDetector::new(5, -1.0).is_err());
        assert!(RollingAnomalyDetector::new(5, f64::NAN).is_err());
        assert!(RollingAnomalyDetector::new(5, 0.0).is_ok());
    }

    #[test]
    fn test_rejects_window_longer_than_series() {
        let detector = RollingAnomalyDetector::new(4, 1.1).unwrap();
        let err = detector.compute_rolling(&series(vec![1.0; 3])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_threshold_is_strict() {
        // Window 2 means: -, 1.0, 1.25, 1.5, 1.0, 0.5
        let s = series(vec![1.0, 1.0, 1.5, 1.5, 0.5, 0.5]);
        let detector = RollingAnomalyDetector::new(2, 1.25).unwrap();

        let rolling = detector.compute_rolling(&s).unwrap();
        assert_eq!(rolling[2], RollingValue::Defined(1.25));

        let flags = detector.flag_anomalies(&rolling);
        assert_eq!(flags, vec![false, false, false, true, false, false]);
    }

    #[test]
    fn test_undefined_never_flagged_even_with_zero_threshold() {
        let s = series(vec![5.0; 10]);
        let detector = RollingAnomalyDetector::new(4, 0.0).unwrap();
        let detection = detector.detect(&s).unwrap();

        assert_eq!(&detection.flags[..3], &[false, false, false]);
        assert!(detection.flags[3..].iter().all(|&f| f));
        assert_eq!(detection.report.first_flagged_index, Some(4));
    }

    #[test]
    fn test_summarize_collects_in_order() {
        let s = series(vec![1.0, 1.0, 3.0, 1.0, 1.0, 1.0, 3.0]);
        let detector = RollingAnomalyDetector::new(2, 1.5).unwrap();
        let detection = detector.detect(&s).unwrap();

        // Window 2 means: -, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0
        let report = &detection.report;
        assert_eq!(report.count, 3);
        assert_eq!(report.positions(), vec![2, 3, 6]);
        assert_eq!(report.first_flagged_index, Some(3));
        assert_eq!(report.last_flagged_index, Some(7));
        assert_eq!(report.flagged[0].ratio, 3.0);
        assert_eq!(report.flagged[1].ratio, 1.0);
        assert_eq!(report.peak_rolling, Some(2.0));
    }

    #[test]
    fn test_summarize_rejects_misaligned_inputs() {
        let s = series(vec![1.0; 6]);
        let detector = RollingAnomalyDetector::new(2, 0.5).unwrap();
        let rolling = detector.compute_rolling(&s).unwrap();
        let flags = detector.flag_anomalies(&rolling);

        let err = detector.summarize(&s, &rolling[..5], &flags).unwrap_err();
        assert!(err.is_configuration());
        assert!(detector.summarize(&s, &rolling, &flags[1..]).is_err());
        assert_eq!(detector.summarize(&s, &rolling, &flags).unwrap().count, 5);
    }

    #[test]
    fn test_no_anomalies_is_not_an_error() {
        let s = series(vec![0.9; 20]);
        let detector = RollingAnomalyDetector::new(5, 1.1).unwrap();
        let detection = detector.detect(&s).unwrap();

        assert!(detection.report.is_empty());
        assert_eq!(detection.report.first_flagged_index, None);
        assert_eq!(detection.anomaly_rate(), 0.0);
    }
}
