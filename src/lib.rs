//! accelview - browse and chart accelerometer recordings
//!
//! accelview talks to the OctoPrint accelerometer plugin (or reads a
//! directory of its recordings) and shows what was recorded: a tree of runs,
//! sequences and streams, and for the selected stream a time-domain
//! acceleration chart next to its frequency spectrum.
//!
//! # Overview
//!
//! The plugin sweeps the print head through a range of excitation
//! frequencies and damping values, recording one acceleration stream per
//! step. Each stream may later be post-processed into three per-axis FFT
//! files. The listing of all of that arrives as nested JSON:
//! `runs → sequences → streams (→ ffts)`.
//!
//! 1. **Hierarchy**: the listing becomes a [`TreeNode`] tree with pre-order
//!    indices and labels like `2023.11.27 23:56:25.233` or
//!    `X-Axis f=10Hz zeta=0.15`, laid out as an indented SVG tree.
//!
//! 2. **Charts**: a selected stream becomes two [`ChartEngine`]s sharing one
//!    renderer. Scales are niced over the joint extent of all series; the
//!    domain axis zooms (1x to 32x) and pans within the data; the pointer
//!    snaps to the nearest sample of any series.
//!
//! # Quick Start
//!
//! ```no_run
//! use accelview::client::DirSource;
//! use accelview::{Config, ViewerSession};
//!
//! let mut session = ViewerSession::new(Box::new(DirSource::new("recordings")), Config::default());
//! session.load_tree()?;
//!
//! let first_stream = session.rows().into_iter().find(|r| r.selection.is_some());
//! if let Some(row) = first_stream {
//!     let view = session.select_index(row.index)?;
//!     println!("{} samples, {} fft bins", view.acceleration.points, view.fft.points);
//! }
//! # Ok::<(), accelview::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`hierarchy`]: listing → tree, labels and tree layout
//! - [`data`]: stream/FFT file parsing and local spectra
//! - [`chart`]: scales, zoom, hit testing and SVG rendering
//! - [`client`]: plugin HTTP client and offline data sources
//! - [`control`]: recording parameters and push events
//! - [`session`]: the viewer state behind [`serve`]
//! - [`report`]: Output formatters (HTML, JSON, CSV)

pub mod chart;
pub mod client;
pub mod config;
pub mod control;
pub mod data;
pub mod error;
pub mod hierarchy;
pub mod report;
pub mod serve;
pub mod session;

pub use chart::{ChartEngine, ChartKind, ChartView, SeriesSet, ZoomTransform};
pub use client::{DataSource, DirSource, PluginClient};
pub use config::Config;
pub use error::{Error, Result};
pub use hierarchy::{build_tree, StreamSelection, TreeNode};
pub use session::ViewerSession;
