//! Named series sharing one domain column

use crate::data::{FftSample, Sample};
use serde::{Deserialize, Serialize};

/// Chart flavour; decides axis titles and tooltip wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Acceleration,
    Fft,
}

impl ChartKind {
    pub fn domain_label(&self) -> &'static str {
        match self {
            ChartKind::Acceleration => "Time [ms] →",
            ChartKind::Fft => "Frequency [Hz] →",
        }
    }

    pub fn value_label(&self) -> &'static str {
        match self {
            ChartKind::Acceleration => "↑ Acceleration [mg]",
            ChartKind::Fft => "↑ FFT",
        }
    }

    /// Tooltip lines for a hovered point
    pub fn tooltip(&self, series: &str, domain: f64, value: f64) -> [String; 3] {
        match self {
            ChartKind::Acceleration => [
                format!("axis: {}", series.to_uppercase()),
                format!("time: {}ms", domain.round()),
                format!("acc: {}mg", value.round()),
            ],
            ChartKind::Fft => [
                format!("axis: {}", series.to_uppercase()),
                format!("freq: {:.1}Hz", domain),
                format!("fft: {:.3}", value),
            ],
        }
    }

    /// Element id prefix for SVG output
    pub fn id(&self) -> &'static str {
        match self {
            ChartKind::Acceleration => "acceleration",
            ChartKind::Fft => "fft",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Domain column plus any number of named value columns of the same length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSet {
    pub kind: ChartKind,
    pub domain: Vec<f64>,
    pub series: Vec<Series>,
}

impl SeriesSet {
    pub fn empty(kind: ChartKind) -> Self {
        Self { kind, domain: Vec::new(), series: Vec::new() }
    }

    /// Build from columns; value columns are cut to the domain length
    pub fn new(kind: ChartKind, domain: Vec<f64>, series: Vec<Series>) -> Self {
        let n = domain.len();
        let series = series
            .into_iter()
            .map(|mut s| {
                s.values.truncate(n);
                s.values.resize(n, f64::NAN);
                s
            })
            .collect();
        Self { kind, domain, series }
    }

    /// Time vs. x/y/z acceleration
    pub fn acceleration(samples: &[Sample]) -> Self {
        Self::new(
            ChartKind::Acceleration,
            samples.iter().map(|s| s.timestamp_ms).collect(),
            vec![
                Series { name: "x".into(), values: samples.iter().map(|s| s.x).collect() },
                Series { name: "y".into(), values: samples.iter().map(|s| s.y).collect() },
                Series { name: "z".into(), values: samples.iter().map(|s| s.z).collect() },
            ],
        )
    }

    /// Frequency vs. x/y/z magnitude
    pub fn fft(samples: &[FftSample]) -> Self {
        Self::new(
            ChartKind::Fft,
            samples.iter().map(|s| s.frequency_hz).collect(),
            vec![
                Series { name: "x".into(), values: samples.iter().map(|s| s.magnitude_x).collect() },
                Series { name: "y".into(), values: samples.iter().map(|s| s.magnitude_y).collect() },
                Series { name: "z".into(), values: samples.iter().map(|s| s.magnitude_z).collect() },
            ],
        )
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty() || self.series.is_empty()
    }

    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    /// All values of all series, in series order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series.iter().flat_map(|s| s.values.iter().copied())
    }
}
