//! Viewer state behind the interactive UI
//!
//! One [`ViewerSession`] owns the current tree and both charts. Every UI
//! event maps to one method here and runs to completion before the next.
//!
//! Each stream selection starts a new generation. Chart events carry the
//! generation they were issued for; events for an older generation are
//! rejected with [`Error::StaleGeneration`] instead of acting on charts the
//! user no longer sees.

use crate::chart::{ChartEngine, ChartKind, ChartView, Hit, SeriesSet, ZoomTransform};
use crate::client::{self, DataSource};
use crate::config::{Config, DataFormat};
use crate::hierarchy::layout::{self, NodeRow};
use crate::hierarchy::{build_tree, StreamSelection, TreeNode};
use crate::{Error, Result};
use log::{error, info, warn};
use serde::Serialize;

/// Both charts of the current selection
#[derive(Debug, Clone, Serialize)]
pub struct SelectionView {
    pub generation: u64,
    pub selection: Option<StreamSelection>,
    pub acceleration: ChartView,
    pub fft: ChartView,
    /// Fetch or parse problems that left a chart empty
    pub errors: Vec<String>,
}

/// Chart data of one stream plus whatever went wrong fetching it
#[derive(Debug, Clone)]
pub struct StreamCharts {
    pub acceleration: SeriesSet,
    pub fft: SeriesSet,
    pub errors: Vec<String>,
}

/// Fetch and parse both chart inputs of a stream
///
/// Uses the plugin's FFT files when the stream has them (downloaded alongside
/// the stream itself), otherwise the locally computed spectrum. A chart whose
/// input fails is left empty.
pub fn load_stream(source: &dyn DataSource, selection: &StreamSelection, format: &DataFormat) -> StreamCharts {
    let (acceleration, spectrum) = match &selection.fft_files {
        Some(files) => rayon::join(
            || client::fetch_acceleration(source, &selection.file_name, format),
            || client::fetch_fft(source, files, format),
        ),
        None => {
            let acceleration = client::fetch_acceleration(source, &selection.file_name, format);
            let spectrum = match &acceleration {
                Ok(data) => client::fetch_spectrum(source, selection, Some(data), format),
                Err(_) => Ok(Vec::new()),
            };
            (acceleration, spectrum)
        }
    };

    let mut errors = Vec::new();
    let acceleration = match acceleration {
        Ok(data) => SeriesSet::acceleration(&data.samples),
        Err(e) => {
            warn!("acceleration chart left empty: {}", e);
            errors.push(format!("{}: {}", selection.file_name, e));
            SeriesSet::empty(ChartKind::Acceleration)
        }
    };
    let fft = match spectrum {
        Ok(samples) => SeriesSet::fft(&samples),
        Err(e) => {
            warn!("fft chart left empty: {}", e);
            errors.push(format!("fft: {}", e));
            SeriesSet::empty(ChartKind::Fft)
        }
    };
    StreamCharts { acceleration, fft, errors }
}

pub struct ViewerSession {
    source: Box<dyn DataSource>,
    config: Config,
    tree: TreeNode,
    selection: Option<StreamSelection>,
    acceleration: ChartEngine,
    fft: ChartEngine,
    generation: u64,
    errors: Vec<String>,
}

impl ViewerSession {
    pub fn new(source: Box<dyn DataSource>, config: Config) -> Self {
        Self {
            source,
            tree: build_tree(&serde_json::json!({})),
            selection: None,
            acceleration: ChartEngine::empty(ChartKind::Acceleration, config.chart),
            fft: ChartEngine::empty(ChartKind::Fft, config.chart),
            generation: 0,
            errors: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fetch the listing and rebuild the tree
    ///
    /// On failure the previous tree stays in place.
    pub fn load_tree(&mut self) -> Result<&TreeNode> {
        let listing = self.source.listing().map_err(|e| {
            error!("failed to fetch listing: {}", e);
            e
        })?;
        self.tree = build_tree(&listing);
        info!("tree loaded: {} nodes, {} leaves", self.tree.node_count(), self.tree.leaf_count());
        Ok(&self.tree)
    }

    pub fn rows(&self) -> Vec<NodeRow> {
        layout::layout(&self.tree, self.config.tree.row_height)
    }

    pub fn tree_svg(&self) -> String {
        layout::render_svg(&self.rows(), &self.config.tree)
    }

    /// Click on a tree row
    pub fn select_index(&mut self, index: usize) -> Result<SelectionView> {
        let node = self
            .tree
            .find_by_index(index)
            .ok_or_else(|| Error::BadRequest(format!("no tree node {}", index)))?;
        let selection = node
            .selection()
            .ok_or_else(|| Error::BadRequest(format!("'{}' is not a stream", node.name)))?;
        Ok(self.select_stream(selection))
    }

    /// Replace both charts with the data of one stream
    ///
    /// Never fails: a chart whose data cannot be fetched or parsed is shown
    /// empty and the problem is reported in [`SelectionView::errors`].
    pub fn select_stream(&mut self, selection: StreamSelection) -> SelectionView {
        self.generation += 1;
        info!("select {} (generation {})", selection.file_name, self.generation);

        let charts = load_stream(self.source.as_ref(), &selection, &self.config.data);
        self.errors = charts.errors;
        self.acceleration = ChartEngine::new(charts.acceleration, self.config.chart);
        self.fft = ChartEngine::new(charts.fft, self.config.chart);
        self.selection = Some(selection);
        self.view()
    }

    pub fn view(&self) -> SelectionView {
        SelectionView {
            generation: self.generation,
            selection: self.selection.clone(),
            acceleration: self.acceleration.view(),
            fft: self.fft.view(),
            errors: self.errors.clone(),
        }
    }

    pub fn chart(&self, kind: ChartKind) -> &ChartEngine {
        match kind {
            ChartKind::Acceleration => &self.acceleration,
            ChartKind::Fft => &self.fft,
        }
    }

    /// Chart for an event issued at `generation`
    fn chart_for(&mut self, kind: ChartKind, generation: u64) -> Result<&mut ChartEngine> {
        if generation != self.generation {
            return Err(Error::StaleGeneration { requested: generation, current: self.generation });
        }
        Ok(match kind {
            ChartKind::Acceleration => &mut self.acceleration,
            ChartKind::Fft => &mut self.fft,
        })
    }

    pub fn pointer(&mut self, kind: ChartKind, generation: u64, x: f64, y: f64) -> Result<Option<Hit>> {
        Ok(self.chart_for(kind, generation)?.pointer_move(x, y).cloned())
    }

    pub fn leave(&mut self, kind: ChartKind, generation: u64) -> Result<()> {
        self.chart_for(kind, generation)?.pointer_leave();
        Ok(())
    }

    pub fn zoom(&mut self, kind: ChartKind, generation: u64, transform: ZoomTransform) -> Result<ChartView> {
        let chart = self.chart_for(kind, generation)?;
        chart.zoom_to(transform);
        Ok(chart.view())
    }

    /// Wheel step around pixel `at`
    pub fn wheel(&mut self, kind: ChartKind, generation: u64, factor: f64, at: f64) -> Result<ChartView> {
        let chart = self.chart_for(kind, generation)?;
        chart.zoom_by(factor, at);
        Ok(chart.view())
    }

    pub fn pan(&mut self, kind: ChartKind, generation: u64, dx: f64) -> Result<ChartView> {
        let chart = self.chart_for(kind, generation)?;
        chart.pan_by(dx);
        Ok(chart.view())
    }
}
