//! Chart state: base scales, zoom transform and pointer tracking
//!
//! The base scales are computed once from the full data set. Everything that
//! depends on the zoom (paths, ticks, hit testing) is derived from the
//! unzoomed data and the current transform on demand. Repeated zooming
//! never accumulates rounding drift.

use super::scale::{drawable_extent, extent, tick_step, ticks, LinearScale, NICE_TICKS};
use super::series::{ChartKind, SeriesSet};
use super::zoom::ZoomTransform;
use crate::config::ChartConfig;
use serde::Serialize;

/// How a series is drawn relative to the hovered one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Normal,
    Highlighted,
    Ghost,
}

/// Data point nearest to the pointer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub series: String,
    pub series_index: usize,
    pub sample_index: usize,
    /// Pixel position under the current zoom
    pub px: f64,
    pub py: f64,
    /// Data coordinates recovered through the scales
    pub domain: f64,
    pub value: f64,
    pub tooltip: [String; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub pixel: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPath {
    pub name: String,
    pub d: String,
    pub emphasis: Emphasis,
}

/// Everything a client needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub kind: ChartKind,
    pub width: f64,
    pub height: f64,
    pub plot: [f64; 4],
    pub transform: ZoomTransform,
    pub visible_domain: [f64; 2],
    pub value_domain: [f64; 2],
    pub domain_label: &'static str,
    pub value_label: &'static str,
    pub domain_ticks: Vec<Tick>,
    pub value_ticks: Vec<Tick>,
    pub paths: Vec<SeriesPath>,
    pub hover: Option<Hit>,
    pub points: usize,
}

#[derive(Debug, Clone)]
pub struct ChartEngine {
    data: SeriesSet,
    config: ChartConfig,
    domain_scale: LinearScale,
    value_scale: LinearScale,
    transform: ZoomTransform,
    hover: Option<Hit>,
}

impl ChartEngine {
    pub fn new(data: SeriesSet, config: ChartConfig) -> Self {
        let domain = drawable_extent(extent(data.domain.iter().copied()));
        let values = drawable_extent(extent(data.values()));

        let domain_scale = LinearScale::new(domain, config.domain_range()).nice(NICE_TICKS);
        let value_scale = LinearScale::new(values, config.value_range()).nice(NICE_TICKS);

        Self {
            data,
            config,
            domain_scale,
            value_scale,
            transform: ZoomTransform::IDENTITY,
            hover: None,
        }
    }

    pub fn empty(kind: ChartKind, config: ChartConfig) -> Self {
        Self::new(SeriesSet::empty(kind), config)
    }

    pub fn kind(&self) -> ChartKind {
        self.data.kind
    }

    pub fn data(&self) -> &SeriesSet {
        &self.data
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn hover(&self) -> Option<&Hit> {
        self.hover.as_ref()
    }

    /// Un-zoomed domain scale
    pub fn base_domain_scale(&self) -> LinearScale {
        self.domain_scale
    }

    /// Domain scale with the zoom applied
    pub fn domain_scale(&self) -> LinearScale {
        self.domain_scale.with_range(self.transform.apply_range(self.config.domain_range()))
    }

    pub fn value_scale(&self) -> LinearScale {
        self.value_scale
    }

    /// Domain interval currently inside the plot area
    pub fn visible_domain(&self) -> [f64; 2] {
        let scale = self.domain_scale();
        let [r0, r1] = self.config.domain_range();
        [scale.invert(r0), scale.invert(r1)]
    }

    /// Replace the transform, clamped into the allowed window
    pub fn zoom_to(&mut self, transform: ZoomTransform) -> ZoomTransform {
        self.transform = transform.clamp(self.config.domain_range(), self.config.scale_extent);
        self.hover = None;
        self.transform
    }

    /// Wheel zoom around pixel `at`
    pub fn zoom_by(&mut self, factor: f64, at: f64) -> ZoomTransform {
        let next = self.transform.scale_at(factor, at, self.config.domain_range(), self.config.scale_extent);
        self.zoom_to(next)
    }

    /// Drag by `dx` pixels
    pub fn pan_by(&mut self, dx: f64) -> ZoomTransform {
        let next = self.transform.translate(dx, self.config.domain_range(), self.config.scale_extent);
        self.zoom_to(next)
    }

    pub fn reset_zoom(&mut self) {
        self.zoom_to(ZoomTransform::IDENTITY);
    }

    /// Closest data point to a pixel position by Euclidean distance
    ///
    /// Linear scan over every point of every series. On equal distance the
    /// earlier series wins, then the earlier sample.
    pub fn nearest(&self, px: f64, py: f64) -> Option<Hit> {
        if !px.is_finite() || !py.is_finite() {
            return None;
        }
        let xs = self.domain_scale();
        let ys = self.value_scale;

        let mut best: Option<(f64, usize, usize, f64, f64)> = None;
        for (si, series) in self.data.series.iter().enumerate() {
            for (i, (&d, &v)) in self.data.domain.iter().zip(&series.values).enumerate() {
                if !d.is_finite() || !v.is_finite() {
                    continue;
                }
                let (x, y) = (xs.apply(d), ys.apply(v));
                let dist = (x - px).hypot(y - py);
                if best.map_or(true, |(b, ..)| dist < b) {
                    best = Some((dist, si, i, x, y));
                }
            }
        }

        best.map(|(_, si, i, x, y)| {
            let name = self.data.series[si].name.clone();
            let (domain, value) = (xs.invert(x), ys.invert(y));
            Hit {
                tooltip: self.data.kind.tooltip(&name, domain, value),
                series: name,
                series_index: si,
                sample_index: i,
                px: x,
                py: y,
                domain,
                value,
            }
        })
    }

    /// Track the pointer; returns the new hover target
    pub fn pointer_move(&mut self, px: f64, py: f64) -> Option<&Hit> {
        self.hover = self.nearest(px, py);
        self.hover.as_ref()
    }

    /// Pointer left the chart: clear hover, all series back to normal
    pub fn pointer_leave(&mut self) {
        self.hover = None;
    }

    pub fn emphasis(&self) -> Vec<Emphasis> {
        (0..self.data.series.len())
            .map(|si| match &self.hover {
                None => Emphasis::Normal,
                Some(hit) if hit.series_index == si => Emphasis::Highlighted,
                Some(_) => Emphasis::Ghost,
            })
            .collect()
    }

    /// SVG path data per series under the current zoom
    pub fn paths(&self) -> Vec<SeriesPath> {
        let xs = self.domain_scale();
        let ys = self.value_scale;
        self.data
            .series
            .iter()
            .zip(self.emphasis())
            .map(|(series, emphasis)| SeriesPath {
                name: series.name.clone(),
                d: line_path(self.data.domain.iter().zip(&series.values).map(|(&d, &v)| (xs.apply(d), ys.apply(v)))),
                emphasis,
            })
            .collect()
    }

    /// Domain ticks over the visible window
    pub fn domain_ticks(&self) -> Vec<Tick> {
        let scale = self.domain_scale();
        let [v0, v1] = self.visible_domain();
        make_ticks(&scale, v0, v1, self.config.domain_ticks())
    }

    pub fn value_ticks(&self) -> Vec<Tick> {
        let [d0, d1] = self.value_scale.domain;
        make_ticks(&self.value_scale, d0, d1, self.config.value_ticks())
    }

    pub fn view(&self) -> ChartView {
        let [x0, x1] = self.config.domain_range();
        let [y1, y0] = self.config.value_range();
        ChartView {
            kind: self.data.kind,
            width: self.config.width,
            height: self.config.height,
            plot: [x0, y0, x1 - x0, y1 - y0],
            transform: self.transform,
            visible_domain: self.visible_domain(),
            value_domain: self.value_scale.domain,
            domain_label: self.data.kind.domain_label(),
            value_label: self.data.kind.value_label(),
            domain_ticks: self.domain_ticks(),
            value_ticks: self.value_ticks(),
            paths: self.paths(),
            hover: self.hover.clone(),
            points: self.data.len(),
        }
    }
}

fn make_ticks(scale: &LinearScale, start: f64, stop: f64, count: usize) -> Vec<Tick> {
    let step = tick_step(start, stop, count);
    ticks(start, stop, count as f64)
        .into_iter()
        .map(|value| Tick { value, pixel: scale.apply(value), label: tick_label(value, step) })
        .collect()
}

/// Signed tick label with as many decimals as the step needs
pub fn tick_label(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step < 1.0 { (-step.log10().floor()) as usize } else { 0 };
    let text = format!("{:.*}", decimals, value);
    if value > 0.0 || text.trim_start_matches(['-', '0', '.']).is_empty() {
        format!("+{}", text.trim_start_matches('-'))
    } else {
        text
    }
}

/// `M x,y L x,y ...`; non-finite points break the line
fn line_path<I: Iterator<Item = (f64, f64)>>(points: I) -> String {
    let mut d = String::new();
    let mut pen_down = false;
    for (x, y) in points {
        if !x.is_finite() || !y.is_finite() {
            pen_down = false;
            continue;
        }
        d.push(if pen_down { 'L' } else { 'M' });
        d.push_str(&format!("{},{}", round2(x), round2(y)));
        pen_down = true;
    }
    d
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
