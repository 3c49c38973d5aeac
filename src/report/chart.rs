//! Rolling RTP chart renderer
//!
//! Renders the rolling statistic (in percent) against event index, a dashed
//! threshold line and the flagged points, then writes a PNG.

use super::draw::{self, colors, Orientation, GLYPH_SIZE};
use super::{ReportEmitter, ReportInput};
use crate::config::DEFAULT_OUTPUT_PATH;
use crate::error::Result;
use image::{Rgb, RgbImage};
use log::info;
use std::path::{Path, PathBuf};

/// Chart title
pub const TITLE: &str = "Rolling RTP Surveillance (Injected Fraud Window)";
/// Horizontal axis label
pub const X_LABEL: &str = "Spin";
/// Vertical axis label
pub const Y_LABEL: &str = "Rolling RTP (%)";

/// Chart configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Resolution in dots per inch
    pub dpi: u32,
    /// Canvas width in inches
    pub width_in: f64,
    /// Canvas height in inches
    pub height_in: f64,
    pub background: Rgb<u8>,
    pub line_color: Rgb<u8>,
    pub threshold_color: Rgb<u8>,
    pub anomaly_color: Rgb<u8>,
    pub grid_color: Rgb<u8>,
    pub text_color: Rgb<u8>,
    /// Approximate number of ticks along each axis
    pub tick_count: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            width_in: 12.0,
            height_in: 6.0,
            background: colors::WHITE,
            line_color: colors::BLUE,
            threshold_color: colors::RED,
            anomaly_color: colors::RED,
            grid_color: colors::GRID,
            text_color: colors::BLACK,
            tick_count: 6,
        }
    }
}

impl ChartConfig {
    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    /// Canvas size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi.max(1) as f64;
        (
            ((self.width_in * dpi).round() as u32).max(1),
            ((self.height_in * dpi).round() as u32).max(1),
        )
    }

    /// Convert a size in points (1/72 inch) to whole pixels, at least one
    fn points(&self, pt: f64) -> i64 {
        ((pt * self.dpi as f64 / 72.0).round() as i64).max(1)
    }

    /// Bitmap font scale closest to a `pt`-sized font
    fn font_scale(&self, pt: f64) -> i64 {
        ((pt * self.dpi as f64 / 72.0 / GLYPH_SIZE as f64).round() as i64).max(1)
    }

    fn metrics(&self) -> TextMetrics {
        TextMetrics {
            tick: self.font_scale(9.0),
            label: self.font_scale(10.0),
            title: self.font_scale(12.0),
            pad: self.points(4.0),
            tick_len: self.points(3.5),
        }
    }
}

/// Font scales and spacing in pixels
struct TextMetrics {
    tick: i64,
    label: i64,
    title: i64,
    pad: i64,
    tick_len: i64,
}

/// Evenly spaced axis ticks on a 1, 2, 2.5 or 5 times a power of ten step
#[derive(Debug, Clone, PartialEq)]
pub struct Ticks {
    pub values: Vec<f64>,
    pub step: f64,
}

impl Ticks {
    /// Ticks inside `[min, max]`, about `count` of them
    pub fn nice(min: f64, max: f64, count: usize) -> Self {
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Self {
                values: vec![min],
                step: 1.0,
            };
        }

        let raw = (max - min) / count.max(1) as f64;
        let magnitude = 10f64.powf(raw.log10().floor());
        let step = magnitude
            * match raw / magnitude {
                r if r <= 1.0 => 1.0,
                r if r <= 2.0 => 2.0,
                r if r <= 2.5 => 2.5,
                r if r <= 5.0 => 5.0,
                _ => 10.0,
            };

        let first = (min / step).ceil() as i64;
        let last = (max / step).floor() as i64;
        let values = (first..=last).map(|k| k as f64 * step).collect();
        Self { values, step }
    }

    /// Labels with just enough decimals to tell neighbors apart
    pub fn labels(&self) -> Vec<String> {
        let mut decimals = 0;
        while decimals < 6 {
            let scaled = self.step * 10f64.powi(decimals as i32);
            if (scaled - scaled.round()).abs() < 1e-9 {
                break;
            }
            decimals += 1;
        }
        self.values
            .iter()
            .map(|v| format!("{:.*}", decimals, v))
            .collect()
    }
}

/// Plot area in pixel coordinates and the data range it maps
struct Frame {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    x_ticks: Ticks,
    y_ticks: Ticks,
}

impl Frame {
    fn x(&self, value: f64) -> i64 {
        let t = if self.x_max > self.x_min {
            (value - self.x_min) / (self.x_max - self.x_min)
        } else {
            0.5
        };
        self.left + (t * (self.right - self.left) as f64).round() as i64
    }

    fn y(&self, value: f64) -> i64 {
        let t = if self.y_max > self.y_min {
            (value - self.y_min) / (self.y_max - self.y_min)
        } else {
            0.5
        };
        self.bottom - (t * (self.bottom - self.top) as f64).round() as i64
    }
}

/// Legend sample drawn next to an entry
#[derive(Debug, Clone, Copy)]
enum LegendMark {
    Line,
    Dashed,
    Marker,
}

/// PNG chart emitter
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    config: ChartConfig,
    output_path: PathBuf,
}

impl ChartRenderer {
    /// Create a renderer writing to `output_path`
    pub fn new<P: Into<PathBuf>>(output_path: P, config: ChartConfig) -> Self {
        Self {
            config,
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Render the chart into an image buffer
    pub fn render(&self, input: &ReportInput<'_>) -> RgbImage {
        let (width, height) = self.config.pixel_size();
        let mut img = RgbImage::from_pixel(width, height, self.config.background);

        let metrics = self.config.metrics();
        let threshold_pct = input.threshold * 100.0;
        let frame = self.frame(input, width, height, threshold_pct, &metrics);

        self.draw_grid(&mut img, &frame);
        self.draw_rolling(&mut img, &frame, input);
        self.draw_threshold(&mut img, &frame, threshold_pct);
        self.draw_anomalies(&mut img, &frame, input);

        draw::draw_rect_outline(&mut img, frame.left, frame.top, frame.right, frame.bottom, colors::BLACK);

        self.draw_axes(&mut img, &frame, &metrics);
        self.draw_titles(&mut img, &frame, &metrics);
        self.draw_legend(&mut img, &frame, input, threshold_pct, &metrics);

        img
    }

    fn frame(
        &self,
        input: &ReportInput<'_>,
        width: u32,
        height: u32,
        threshold_pct: f64,
        m: &TextMetrics,
    ) -> Frame {
        let (lo, hi) = input
            .rolling()
            .iter()
            .filter_map(|v| v.value())
            .map(|v| v * 100.0)
            .fold((threshold_pct, threshold_pct), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let pad = ((hi - lo) * 0.05).max(1.0);
        let (y_min, y_max) = (lo - pad, hi + pad);
        let (x_min, x_max) = (1.0, input.series.len().max(1) as f64);

        let x_ticks = Ticks::nice(x_min, x_max, self.config.tick_count);
        let y_ticks = Ticks::nice(y_min, y_max, self.config.tick_count);

        let widest_y_label = y_ticks
            .labels()
            .iter()
            .map(|l| draw::text_width(l, m.tick))
            .max()
            .unwrap_or(0);
        let last_x_label = x_ticks
            .labels()
            .last()
            .map(|l| draw::text_width(l, m.tick))
            .unwrap_or(0);

        let glyph = GLYPH_SIZE;
        let left = m.pad + glyph * m.label + 2 * m.pad + widest_y_label + m.pad + m.tick_len;
        let top = 2 * m.pad + glyph * m.title + 2 * m.pad;
        let bottom_margin = m.tick_len + m.pad + glyph * m.tick + m.pad + glyph * m.label + 2 * m.pad;
        let right_margin = (4 * m.pad).max(last_x_label / 2 + m.pad);

        Frame {
            left,
            top,
            right: (width as i64 - 1 - right_margin).max(left + 1),
            bottom: (height as i64 - 1 - bottom_margin).max(top + 1),
            x_min,
            x_max,
            y_min,
            y_max,
            x_ticks,
            y_ticks,
        }
    }

    fn draw_grid(&self, img: &mut RgbImage, frame: &Frame) {
        for &value in &frame.x_ticks.values {
            let x = frame.x(value);
            draw::draw_vertical_line(img, x, frame.top, frame.bottom, 1, self.config.grid_color);
        }
        for &value in &frame.y_ticks.values {
            let y = frame.y(value);
            draw::draw_horizontal_line(img, y, frame.left, frame.right, 1, self.config.grid_color);
        }
    }

    fn draw_axes(&self, img: &mut RgbImage, frame: &Frame, m: &TextMetrics) {
        let color = self.config.text_color;
        let half_glyph = GLYPH_SIZE * m.tick / 2;

        for (&value, label) in frame.x_ticks.values.iter().zip(frame.x_ticks.labels()) {
            let x = frame.x(value);
            draw::draw_vertical_line(img, x, frame.bottom, frame.bottom + m.tick_len, 1, color);
            let label_x = x - draw::text_width(&label, m.tick) / 2;
            let label_y = frame.bottom + m.tick_len + m.pad;
            draw::draw_text(img, label_x, label_y, &label, m.tick, color, Orientation::Horizontal);
        }

        for (&value, label) in frame.y_ticks.values.iter().zip(frame.y_ticks.labels()) {
            let y = frame.y(value);
            draw::draw_horizontal_line(img, y, frame.left - m.tick_len, frame.left, 1, color);
            let label_x = frame.left - m.tick_len - m.pad - draw::text_width(&label, m.tick);
            draw::draw_text(img, label_x, y - half_glyph, &label, m.tick, color, Orientation::Horizontal);
        }
    }

    fn draw_titles(&self, img: &mut RgbImage, frame: &Frame, m: &TextMetrics) {
        let color = self.config.text_color;
        let center_x = (frame.left + frame.right) / 2;
        let center_y = (frame.top + frame.bottom) / 2;

        let title_x = (center_x - draw::text_width(TITLE, m.title) / 2).max(0);
        draw::draw_text(img, title_x, 2 * m.pad, TITLE, m.title, color, Orientation::Horizontal);

        let x_label_x = center_x - draw::text_width(X_LABEL, m.label) / 2;
        let x_label_y = frame.bottom + m.tick_len + m.pad + GLYPH_SIZE * m.tick + m.pad;
        draw::draw_text(img, x_label_x, x_label_y, X_LABEL, m.label, color, Orientation::Horizontal);

        let y_label_y = center_y - draw::text_width(Y_LABEL, m.label) / 2;
        draw::draw_text(img, m.pad, y_label_y, Y_LABEL, m.label, color, Orientation::Vertical);
    }

    fn draw_legend(
        &self,
        img: &mut RgbImage,
        frame: &Frame,
        input: &ReportInput<'_>,
        threshold_pct: f64,
        m: &TextMetrics,
    ) {
        let mut entries = vec![
            (LegendMark::Line, format!("Rolling RTP (window={})", input.window())),
            (LegendMark::Dashed, format!("Threshold ({:.0}%)", threshold_pct)),
        ];
        if !input.report().is_empty() {
            entries.push((LegendMark::Marker, "ANOMALY".to_string()));
        }

        let sample_len = self.config.points(20.0);
        let row_height = GLYPH_SIZE * m.label + m.pad;
        let text_width = entries
            .iter()
            .map(|(_, text)| draw::text_width(text, m.label))
            .max()
            .unwrap_or(0);

        let left = frame.left + 2 * m.pad;
        let top = frame.top + 2 * m.pad;
        let right = left + m.pad + sample_len + m.pad + text_width + m.pad;
        let bottom = top + m.pad + entries.len() as i64 * row_height;

        draw::fill_rect(img, left, top, right, bottom, self.config.background);
        draw::draw_rect_outline(img, left, top, right, bottom, colors::LEGEND_EDGE);

        for (i, (mark, text)) in entries.iter().enumerate() {
            let row_top = top + m.pad + i as i64 * row_height;
            let mid_y = row_top + GLYPH_SIZE * m.label / 2;
            let (x1, x2) = (left + m.pad, left + m.pad + sample_len);

            match mark {
                LegendMark::Line => draw::draw_horizontal_line(
                    img,
                    mid_y,
                    x1,
                    x2,
                    self.config.points(1.2),
                    self.config.line_color,
                ),
                LegendMark::Dashed => draw::draw_dashed_horizontal_line(
                    img,
                    mid_y,
                    x1,
                    x2,
                    self.config.points(2.0),
                    self.config.points(7.0),
                    self.config.points(3.0),
                    self.config.threshold_color,
                ),
                LegendMark::Marker => draw::draw_disc(
                    img,
                    (x1 + x2) / 2,
                    mid_y,
                    self.config.points(1.4),
                    self.config.anomaly_color,
                    0.6,
                ),
            }

            draw::draw_text(
                img,
                x2 + m.pad,
                row_top,
                text,
                m.label,
                self.config.text_color,
                Orientation::Horizontal,
            );
        }
    }

    fn draw_rolling(&self, img: &mut RgbImage, frame: &Frame, input: &ReportInput<'_>) {
        let thickness = self.config.points(1.2);
        let mut prev: Option<(i64, i64)> = None;

        for (event, value) in input.series.events().iter().zip(input.rolling()) {
            let Some(v) = value.value() else {
                prev = None;
                continue;
            };
            let point = (frame.x(event.index as f64), frame.y(v * 100.0));
            match prev {
                Some(p) if p == point => {}
                Some(p) => draw::draw_line(img, p, point, thickness, self.config.line_color),
                None => draw::draw_dot(img, point.0, point.1, thickness / 2, self.config.line_color),
            }
            prev = Some(point);
        }
    }

    fn draw_threshold(&self, img: &mut RgbImage, frame: &Frame, threshold_pct: f64) {
        let thickness = self.config.points(2.0);
        let dash = self.config.points(7.0);
        let gap = self.config.points(3.0);
        draw::draw_dashed_horizontal_line(
            img,
            frame.y(threshold_pct),
            frame.left,
            frame.right,
            thickness,
            dash,
            gap,
            self.config.threshold_color,
        );
    }

    fn draw_anomalies(&self, img: &mut RgbImage, frame: &Frame, input: &ReportInput<'_>) {
        let radius = self.config.points(1.4);
        let mut last: Option<(i64, i64)> = None;

        for flagged in &input.report().flagged {
            let point = (frame.x(flagged.index as f64), frame.y(flagged.rolling * 100.0));
            // Overlapping markers would compound the alpha blend
            if last == Some(point) {
                continue;
            }
            draw::draw_disc(img, point.0, point.1, radius, self.config.anomaly_color, 0.6);
            last = Some(point);
        }
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH, ChartConfig::default())
    }
}

impl ReportEmitter for ChartRenderer {
    fn emit(&self, input: &ReportInput<'_>) -> Result<()> {
        let img = self.render(input);
        img.save(&self.output_path)?;
        info!(
            "Chart saved to {} ({}x{})",
            self.output_path.display(),
            img.width(),
            img.height()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::RollingAnomalyDetector;
    use crate::data::{AnomalySegment, RatioSeriesBuilder};

    #[test]
    fn test_pixel_size_follows_dpi() {
        assert_eq!(ChartConfig::default().pixel_size(), (2400, 1200));
        assert_eq!(ChartConfig::with_dpi(50).pixel_size(), (600, 300));
    }

    #[test]
    fn test_render_dimensions_and_markers() {
        let series = RatioSeriesBuilder::new(vec![1.0; 400], 1.0)
            .segment(AnomalySegment::new(200, vec![3.0; 50]))
            .build()
            .unwrap();
        let detector = RollingAnomalyDetector::new(20, 1.1).unwrap();
        let detection = detector.detect(&series).unwrap();
        let input = ReportInput::new(&series, &detection, 1.1);

        let renderer = ChartRenderer::new("unused.png", ChartConfig::with_dpi(40));
        let img = renderer.render(&input);

        assert_eq!((img.width(), img.height()), (480, 240));
        // Some pixels carry the blended anomaly marker color (red dominant)
        assert!(img.pixels().any(|p| p.0[0] > 200 && p.0[1] < 150 && p.0[2] < 150));
        // And some carry the rolling line color
        assert!(img.pixels().any(|p| *p == colors::BLUE));
    }

    #[test]
    fn test_nice_ticks() {
        let ticks = Ticks::nice(0.0, 100.0, 5);
        assert_eq!(ticks.step, 20.0);
        assert_eq!(ticks.values, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);

        let ticks = Ticks::nice(95.0, 210.0, 5);
        assert_eq!(ticks.values, vec![100.0, 125.0, 150.0, 175.0, 200.0]);
        assert_eq!(ticks.labels(), vec!["100", "125", "150", "175", "200"]);

        let spins = Ticks::nice(1.0, 100_000.0, 6);
        assert_eq!(spins.values, vec![20_000.0, 40_000.0, 60_000.0, 80_000.0, 100_000.0]);

        assert_eq!(Ticks::nice(3.0, 3.0, 5).values, vec![3.0]);
    }

    #[test]
    fn test_tick_labels_keep_fractional_step() {
        let ticks = Ticks {
            values: vec![0.0, 2.5, 5.0],
            step: 2.5,
        };
        assert_eq!(ticks.labels(), vec!["0.0", "2.5", "5.0"]);
    }

    #[test]
    fn test_render_draws_text_outside_plot_area() {
        let series = RatioSeriesBuilder::new(vec![1.0; 400], 1.0)
            .segment(AnomalySegment::new(200, vec![3.0; 50]))
            .build()
            .unwrap();
        let detection = RollingAnomalyDetector::new(20, 1.1).unwrap().detect(&series).unwrap();
        let input = ReportInput::new(&series, &detection, 1.1);

        let config = ChartConfig::with_dpi(40);
        let renderer = ChartRenderer::new("unused.png", config.clone());
        let img = renderer.render(&input);
        let m = config.metrics();
        let frame = renderer.frame(&input, img.width(), img.height(), input.threshold * 100.0, &m);

        let inked = |x: u32, y: u32| *img.get_pixel(x, y) == colors::BLACK;
        // Title band above the plot area
        assert!((0..img.width()).any(|x| (0..frame.top as u32).any(|y| inked(x, y))));
        // Vertical axis label in the left margin
        let label_band = (m.pad + GLYPH_SIZE * m.label) as u32;
        assert!((0..label_band).any(|x| (0..img.height()).any(|y| inked(x, y))));
        // Tick labels and axis label below the plot area
        let below = frame.bottom as u32 + 2;
        assert!((0..img.width()).any(|x| (below..img.height()).any(|y| inked(x, y))));
        // Legend box inside the plot area
        assert!(img.pixels().any(|p| *p == colors::LEGEND_EDGE));
    }

    #[test]
    fn test_emit_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");

        let series = RatioSeriesBuilder::new(vec![0.9; 100], 1.0).build().unwrap();
        let detection = RollingAnomalyDetector::new(10, 1.1)
            .unwrap()
            .detect(&series)
            .unwrap();
        let input = ReportInput::new(&series, &detection, 1.1);

        ChartRenderer::new(&path, ChartConfig::with_dpi(20)).emit(&input).unwrap();

        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.width(), 240);
        assert_eq!(loaded.height(), 120);
    }

    #[test]
    fn test_emit_to_missing_directory_fails_as_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.png");

        let series = RatioSeriesBuilder::new(vec![0.9; 10], 1.0).build().unwrap();
        let detection = RollingAnomalyDetector::new(2, 1.1).unwrap().detect(&series).unwrap();
        let input = ReportInput::new(&series, &detection, 1.1);

        let err = ChartRenderer::new(&path, ChartConfig::with_dpi(10))
            .emit(&input)
            .unwrap_err();
        assert!(err.is_output());
    }
}
