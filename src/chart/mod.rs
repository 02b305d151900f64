//! Series chart engine
//!
//! Turns a [`SeriesSet`] (one domain column, any number of named value
//! columns) into drawable state:
//!
//! - niced linear scales for both axes ([`scale`])
//! - a horizontal zoom/pan transform clamped to the data extent ([`zoom`])
//! - line paths, axis ticks and nearest-point hit testing ([`engine`])
//! - a static SVG rendition ([`svg`])
//!
//! The same engine drives the acceleration chart (time vs. x/y/z) and the
//! FFT chart (frequency vs. x/y/z magnitude).

pub mod engine;
pub mod scale;
pub mod series;
pub mod svg;
pub mod zoom;

pub use engine::{ChartEngine, ChartView, Emphasis, Hit, SeriesPath, Tick};
pub use scale::LinearScale;
pub use series::{ChartKind, Series, SeriesSet};
pub use zoom::ZoomTransform;
