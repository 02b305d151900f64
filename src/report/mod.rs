//! Static export of the tree and stream charts
//!
//! - **HTML**: tree plus both charts of every stream as inline SVG
//! - **JSON**: tree rows plus the computed chart geometry
//! - **CSV**: the chart series as a long table
//!
//! # Usage
//!
//! ```ignore
//! use accelview::report;
//!
//! let data = report::ReportData::collect(&source, &config, &tree, &[], None)?;
//! report::generate("report.html", &data)?;  // HTML
//! report::generate("report.json", &data)?;  // JSON
//! report::generate("report.csv", &data)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;

use crate::chart::ChartEngine;
use crate::client::DataSource;
use crate::config::Config;
use crate::hierarchy::layout::{self, NodeRow};
use crate::hierarchy::{StreamSelection, TreeNode};
use crate::session;
use crate::{Error, Result};
use chrono::Local;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::io;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, data: &ReportData) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, data),
        "json" => json::write(&mut file, data),
        _ => csv::write(&mut file, data),
    }
}

/// Both charts of one stream row
#[derive(Debug, Clone)]
pub struct StreamReport {
    /// Tree row index
    pub index: usize,
    pub title: String,
    pub selection: StreamSelection,
    pub acceleration: ChartEngine,
    pub fft: ChartEngine,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ReportData {
    pub generated: String,
    pub source: String,
    pub rows: Vec<NodeRow>,
    pub tree_svg: String,
    pub streams: Vec<StreamReport>,
}

impl ReportData {
    /// Fetch and chart the streams of `tree`
    ///
    /// `only` lists tree row indices to include; empty means every stream.
    /// Streams are fetched in parallel, the result keeps tree order.
    pub fn collect(
        source: &dyn DataSource,
        config: &Config,
        tree: &TreeNode,
        only: &[usize],
        progress: Option<&ProgressBar>,
    ) -> Result<Self> {
        let rows = layout::layout(tree, config.tree.row_height);

        for &index in only {
            let selectable = rows.iter().any(|r| r.index == index && r.selection.is_some());
            if !selectable {
                return Err(Error::BadRequest(format!("tree row {} is not a stream", index)));
            }
        }

        let wanted: Vec<(&NodeRow, &StreamSelection)> = rows
            .iter()
            .filter(|r| only.is_empty() || only.contains(&r.index))
            .filter_map(|r| r.selection.as_ref().map(|s| (r, s)))
            .collect();

        if let Some(pb) = progress {
            pb.set_length(wanted.len() as u64);
        }

        let streams: Vec<StreamReport> = wanted
            .par_iter()
            .map(|(row, selection)| {
                let charts = session::load_stream(source, selection, &config.data);
                if let Some(pb) = progress {
                    pb.inc(1);
                    pb.set_message(selection.file_name.clone());
                }
                StreamReport {
                    index: row.index,
                    title: row.title.clone(),
                    selection: (*selection).clone(),
                    acceleration: ChartEngine::new(charts.acceleration, config.chart),
                    fft: ChartEngine::new(charts.fft, config.chart),
                    errors: charts.errors,
                }
            })
            .collect();

        Ok(Self {
            generated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source: source.describe(),
            tree_svg: layout::render_svg(&rows, &config.tree),
            rows,
            streams,
        })
    }
}

/// Summary statistics for a batch of streams
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Summary {
    pub streams: usize,
    pub samples: usize,
    pub fft_bins: usize,
    /// Streams with at least one chart left empty by an error
    pub failed: usize,
}

impl Summary {
    pub fn from_streams(streams: &[StreamReport]) -> Self {
        let mut summary = Self::default();
        summary.streams = streams.len();

        for s in streams {
            summary.samples += s.acceleration.data().len();
            summary.fft_bins += s.fft.data().len();
            if !s.errors.is_empty() {
                summary.failed += 1;
            }
        }

        summary
    }
}
