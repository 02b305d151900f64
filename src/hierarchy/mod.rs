//! Data-set tree
//!
//! The plugin lists its recordings as a nested map
//! `run → sequence → stream → fft`. This module turns that listing into a
//! uniform [`TreeNode`] tree: every node has a label, a [`NodeType`], the
//! metadata of its level and a pre-order `index`/`depth` used for layout.
//!
//! # Policies
//!
//! - Sibling order is the order of the listing (serde_json keeps insertion
//!   order); nothing is sorted.
//! - FFT descriptors become terminal `Fft` rows below their stream.
//! - Malformed parts of the listing are skipped with a warning naming the
//!   JSON path. Building never fails; an empty listing gives a bare root.
//!
//! ```text
//! /                                  index 0, depth 0
//! └─ 2023.11.27 23:56:25.233         run
//!    └─ seq=0                        sequence
//!       └─ X-Axis f=10Hz zeta=0.15   stream  (click → charts)
//!          ├─ X f=10Hz zeta=0.15     fft
//!          ├─ Y f=10Hz zeta=0.15     fft
//!          └─ Z f=10Hz zeta=0.15     fft
//! ```

pub mod label;
pub mod layout;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Root,
    Run,
    Sequence,
    Stream,
    Fft,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeType::Root => "root",
            NodeType::Run => "run",
            NodeType::Sequence => "sequence",
            NodeType::Stream => "stream",
            NodeType::Fft => "fft",
        };
        write!(f, "{}", s)
    }
}

/// Structured run start/stop time as emitted by the plugin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub milli_second: u32,
}

/// Per-axis FFT file names of one stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FftFiles {
    pub x: String,
    pub y: String,
    pub z: String,
}

/// What a click on a stream row hands to the chart side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSelection {
    pub file_name: String,
    #[serde(default)]
    pub fft_files: Option<FftFiles>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInfo {
    pub id: String,
    pub started: Option<Timestamp>,
    pub stopped: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    pub id: String,
    pub axis: String,
    pub frequency_hz: f64,
    pub zeta_em2: f64,
    pub file_name: Option<String>,
    pub fft_files: Option<FftFiles>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FftInfo {
    pub id: String,
    pub axis: String,
    pub frequency_hz: f64,
    pub zeta_em2: f64,
    pub file_name: Option<String>,
}

/// Metadata of the listing level a node came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodePayload {
    Root,
    Run(RunInfo),
    Sequence { id: String },
    Stream(StreamInfo),
    Fft(FftInfo),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    pub payload: NodePayload,
    pub depth: usize,
    pub index: usize,
}

impl TreeNode {
    fn new(name: impl Into<String>, node_type: NodeType, payload: NodePayload) -> Self {
        Self {
            name: name.into(),
            node_type,
            children: Vec::new(),
            payload,
            depth: 0,
            index: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Assign pre-order `index` and `depth`, this node being index 0 / depth 0
    pub fn assign_indices(&mut self) {
        fn visit(node: &mut TreeNode, depth: usize, next: &mut usize) {
            node.depth = depth;
            node.index = *next;
            *next += 1;
            for child in &mut node.children {
                visit(child, depth + 1, next);
            }
        }
        let mut next = 0;
        visit(self, 0, &mut next);
    }

    /// All nodes in pre-order, this node first
    pub fn descendants(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Number of childless nodes below (and including) this one
    pub fn leaf_count(&self) -> usize {
        layout::fold_tree(self, &|node: &TreeNode, child_counts: Vec<usize>| {
            if node.is_leaf() {
                1
            } else {
                child_counts.iter().sum()
            }
        })
    }

    pub fn find_by_index(&self, index: usize) -> Option<&TreeNode> {
        self.path_to(index).and_then(|path| path.last().copied())
    }

    /// Nodes from this one down to the node with `index`, both included
    pub fn path_to(&self, index: usize) -> Option<Vec<&TreeNode>> {
        if self.index == index {
            return Some(vec![self]);
        }
        // pre-order: the target sits below the last child whose index is <= target
        let child = self.children.iter().rev().find(|c| c.index <= index)?;
        let mut path = child.path_to(index)?;
        path.insert(0, self);
        Some(path)
    }

    /// Click routing: stream rows select their files, everything else is inert
    pub fn selection(&self) -> Option<StreamSelection> {
        match &self.payload {
            NodePayload::Stream(stream) => stream.file_name.as_ref().map(|file_name| StreamSelection {
                file_name: file_name.clone(),
                fft_files: stream.fft_files.clone(),
            }),
            _ => None,
        }
    }
}

/// Build the tree from a listing response
///
/// Accepts the full response (`{"data_sets": ...}`), the bare `data_sets`
/// object, or a bare runs map, in either the rich layout
/// (`runs/<hash>/sequences/<id>/streams/<hash>`) or the flat one
/// (`<run>/<seq>/<stream>`).
pub fn build_tree(listing: &Value) -> TreeNode {
    let mut root = TreeNode::new("/", NodeType::Root, NodePayload::Root);

    let data_sets = listing.get("data_sets").unwrap_or(listing);
    let runs = match data_sets.get("runs") {
        Some(Value::Object(runs)) => Some(runs),
        _ => data_sets.as_object(),
    };

    match runs {
        Some(runs) => {
            for (run_id, run) in runs {
                if let Some(node) = build_run(run_id, run) {
                    root.children.push(node);
                }
            }
        }
        None => warn!("listing is not an object, showing an empty tree"),
    }

    root.assign_indices();
    root
}

fn build_run(run_id: &str, run: &Value) -> Option<TreeNode> {
    let path = format!("runs/{}", run_id);
    let run = object_at(run, &path)?;

    let started = match run.get("started") {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<Timestamp>(value.clone()) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!("skipping {}: bad start timestamp ({})", path, e);
                return None;
            }
        },
    };
    let stopped = run
        .get("stopped")
        .and_then(|v| serde_json::from_value::<Timestamp>(v.clone()).ok());

    let name = match &started {
        Some(ts) => label::format_timestamp(ts),
        None => run_id.to_string(),
    };

    let mut node = TreeNode::new(
        name,
        NodeType::Run,
        NodePayload::Run(RunInfo { id: run_id.to_string(), started, stopped }),
    );

    let sequences = match run.get("sequences") {
        Some(value) => object_at(value, &format!("{}/sequences", path))?,
        // run metadata marks the rich shape; only a bare map is a flat run
        None if run.contains_key("started") || run.contains_key("stopped") => {
            warn!("skipping {}/sequences: missing", path);
            return Some(node);
        }
        None => run,
    };
    for (seq_id, sequence) in sequences {
        if let Some(child) = build_sequence(&path, seq_id, sequence) {
            node.children.push(child);
        }
    }
    Some(node)
}

fn build_sequence(parent: &str, seq_id: &str, sequence: &Value) -> Option<TreeNode> {
    let path = format!("{}/sequences/{}", parent, seq_id);
    let sequence = object_at(sequence, &path)?;

    let mut node = TreeNode::new(
        label::sequence_label(seq_id),
        NodeType::Sequence,
        NodePayload::Sequence { id: seq_id.to_string() },
    );

    let streams = match sequence.get("streams") {
        Some(value) => object_at(value, &format!("{}/streams", path))?,
        None => sequence,
    };
    for (stream_id, stream) in streams {
        if let Some(child) = build_stream(&path, stream_id, stream) {
            node.children.push(child);
        }
    }
    Some(node)
}

fn build_stream(parent: &str, stream_id: &str, stream: &Value) -> Option<TreeNode> {
    let path = format!("{}/streams/{}", parent, stream_id);
    let stream = object_at(stream, &path)?;
    let meta = match stream.get("meta") {
        Some(value) => object_at(value, &format!("{}/meta", path))?,
        None => stream,
    };

    let axis = text_field(meta, "sequence_axis", &path)?;
    let frequency_hz = number_field(meta, "sequence_frequency_hz", &path)?;
    let zeta_em2 = number_field(meta, "sequence_zeta_em2", &path)?;
    let file_name = file_name_of(stream);

    let mut ffts = Vec::new();
    let fft_map = stream.get("ffts").or_else(|| stream.get("fft"));
    if let Some(fft_map) = fft_map.and_then(|v| object_at(v, &format!("{}/ffts", path))) {
        for (fft_id, fft) in fft_map {
            if let Some(info) = fft_info(&path, fft_id, fft, frequency_hz, zeta_em2) {
                ffts.push(info);
            }
        }
    }

    let fft_files = fft_files_of(&ffts);
    let mut node = TreeNode::new(
        label::stream_label(&axis, frequency_hz, zeta_em2),
        NodeType::Stream,
        NodePayload::Stream(StreamInfo {
            id: stream_id.to_string(),
            axis,
            frequency_hz,
            zeta_em2,
            file_name,
            fft_files,
        }),
    );

    for info in ffts {
        node.children.push(TreeNode::new(
            label::fft_label(&info.axis, info.frequency_hz, info.zeta_em2),
            NodeType::Fft,
            NodePayload::Fft(info),
        ));
    }
    Some(node)
}

fn fft_info(parent: &str, fft_id: &str, fft: &Value, frequency_hz: f64, zeta_em2: f64) -> Option<FftInfo> {
    let path = format!("{}/ffts/{}", parent, fft_id);
    let fft = object_at(fft, &path)?;
    let meta = match fft.get("meta") {
        Some(value) => object_at(value, &format!("{}/meta", path))?,
        None => fft,
    };

    let axis = meta
        .get("fft_axis")
        .and_then(Value::as_str)
        .unwrap_or(fft_id)
        .to_string();

    Some(FftInfo {
        id: fft_id.to_string(),
        axis,
        frequency_hz: meta.get("sequence_frequency_hz").and_then(as_number).unwrap_or(frequency_hz),
        zeta_em2: meta.get("sequence_zeta_em2").and_then(as_number).unwrap_or(zeta_em2),
        file_name: file_name_of(fft),
    })
}

/// Click payload only when all three axes have a file
fn fft_files_of(ffts: &[FftInfo]) -> Option<FftFiles> {
    let file_for = |axis: &str| {
        ffts.iter()
            .find(|f| f.axis.eq_ignore_ascii_case(axis))
            .and_then(|f| f.file_name.clone())
    };
    Some(FftFiles {
        x: file_for("x")?,
        y: file_for("y")?,
        z: file_for("z")?,
    })
}

fn file_name_of(node: &Map<String, Value>) -> Option<String> {
    match node.get("file")? {
        Value::String(name) => Some(name.clone()),
        Value::Object(file) => file.get("filename_ext").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn object_at<'a>(value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
    match value.as_object() {
        Some(map) => Some(map),
        None => {
            warn!("skipping {}: expected an object", path);
            None
        }
    }
}

fn text_field(meta: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
    match meta.get(key).and_then(Value::as_str) {
        Some(text) => Some(text.to_string()),
        None => {
            warn!("skipping {}: missing {}", path, key);
            None
        }
    }
}

fn number_field(meta: &Map<String, Value>, key: &str, path: &str) -> Option<f64> {
    match meta.get(key).and_then(as_number) {
        Some(n) => Some(n),
        None => {
            warn!("skipping {}: missing {}", path, key);
            None
        }
    }
}

/// Numbers may come as JSON numbers or zero-padded strings (`"015"`)
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==========================================================================
    // FIXTURES
    // ==========================================================================

    fn stream_descriptor(axis: &str, freq: u32, zeta: u32, ffts: &[&str]) -> Value {
        let mut fft_map = Map::new();
        for fft_axis in ffts {
            fft_map.insert(
                fft_axis.to_string(),
                json!({
                    "file": { "filename_ext": format!("fft-{}-{}-{}.tsv", axis, freq, fft_axis) },
                    "meta": {
                        "fft_axis": fft_axis,
                        "sequence_frequency_hz": freq,
                        "sequence_zeta_em2": zeta,
                    }
                }),
            );
        }
        json!({
            "file": { "filename_ext": format!("axxel-{}-{}.tsv", axis, freq) },
            "meta": {
                "sequence_axis": axis,
                "sequence_frequency_hz": freq,
                "sequence_zeta_em2": zeta,
            },
            "ffts": Value::Object(fft_map),
        })
    }

    /// runs × sequences × streams × ffts, all keys in insertion order
    fn synthetic_listing(runs: usize, seqs: usize, streams: usize, ffts: &[&str]) -> Value {
        let mut run_map = Map::new();
        for r in 0..runs {
            let mut seq_map = Map::new();
            for s in 0..seqs {
                let mut stream_map = Map::new();
                for t in 0..streams {
                    let axis = if t % 2 == 0 { "x" } else { "y" };
                    stream_map.insert(
                        format!("stream{}", t),
                        stream_descriptor(axis, 10 * (t as u32 + 1), 15, ffts),
                    );
                }
                seq_map.insert(s.to_string(), json!({ "streams": Value::Object(stream_map) }));
            }
            run_map.insert(
                format!("run{}", r),
                json!({
                    "started": {
                        "year": 2023, "month": 11, "day": 27,
                        "hour": 23, "minute": 56, "second": 25 + r, "milli_second": 233
                    },
                    "sequences": Value::Object(seq_map),
                }),
            );
        }
        json!({ "data_sets": { "runs": Value::Object(run_map) } })
    }

    // ==========================================================================
    // STRUCTURE & POLICY
    // ==========================================================================

    #[test]
    fn test_node_count_with_fft_rows() {
        // 1 root + 2 runs + 4 sequences + 8 streams + 16 ffts
        let tree = build_tree(&synthetic_listing(2, 2, 2, &["x", "y"]));
        assert_eq!(tree.node_count(), 31);
        assert_eq!(tree.descendants().len(), 31);
        assert_eq!(tree.leaf_count(), 16);
    }

    #[test]
    fn test_fft_nodes_are_terminal() {
        let tree = build_tree(&synthetic_listing(1, 1, 1, &["x", "y", "z"]));
        let ffts: Vec<_> = tree.descendants().into_iter().filter(|n| n.node_type == NodeType::Fft).collect();
        assert_eq!(ffts.len(), 3);
        assert!(ffts.iter().all(|n| n.is_leaf()));
    }

    #[test]
    fn test_empty_listing_gives_bare_root() {
        for listing in [json!({}), json!({ "data_sets": { "runs": {} } }), json!({ "data_sets": {} })] {
            let tree = build_tree(&listing);
            assert_eq!(tree.name, "/");
            assert_eq!(tree.node_type, NodeType::Root);
            assert!(tree.children.is_empty());
            assert_eq!(tree.index, 0);
        }
    }

    #[test]
    fn test_non_object_listing_gives_bare_root() {
        let tree = build_tree(&json!([1, 2, 3]));
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_sibling_order_is_listing_order() {
        let listing = json!({ "data_sets": { "runs": {
            "zzz": { "sequences": {} },
            "aaa": { "sequences": {} },
            "mmm": { "sequences": {} },
        }}});
        let tree = build_tree(&listing);
        let names: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zzz", "aaa", "mmm"]);
    }

    // ==========================================================================
    // PRE-ORDER INDEX & DEPTH INVARIANTS
    // ==========================================================================

    fn check_invariants(node: &TreeNode) {
        for child in &node.children {
            assert_eq!(child.depth, node.depth + 1, "child depth must be parent depth + 1");
            assert!(child.index > node.index, "child index must follow parent index");
            check_invariants(child);
        }
    }

    #[test]
    fn test_preorder_indices_strict_total_order() {
        let tree = build_tree(&synthetic_listing(2, 3, 2, &["x", "y", "z"]));
        let indices: Vec<usize> = tree.descendants().iter().map(|n| n.index).collect();
        let expected: Vec<usize> = (0..tree.node_count()).collect();
        assert_eq!(indices, expected);
        check_invariants(&tree);
    }

    #[test]
    fn test_descendants_indices_above_subtree_root() {
        let tree = build_tree(&synthetic_listing(2, 2, 2, &["x"]));
        for node in tree.descendants() {
            for d in node.descendants().into_iter().skip(1) {
                assert!(d.index > node.index);
            }
        }
    }

    #[test]
    fn test_leaf_count_matches_direct_traversal() {
        for (runs, seqs, streams, ffts) in [
            (0, 0, 0, vec![]),
            (1, 1, 1, vec![]),
            (2, 1, 3, vec!["x"]),
            (3, 2, 2, vec!["x", "y", "z"]),
        ] {
            let tree = build_tree(&synthetic_listing(runs, seqs, streams, &ffts));
            let direct = tree.descendants().iter().filter(|n| n.children.is_empty()).count();
            assert_eq!(tree.leaf_count(), direct);
        }
    }

    // ==========================================================================
    // LABELS & PAYLOAD
    // ==========================================================================

    #[test]
    fn test_labels_per_level() {
        let tree = build_tree(&synthetic_listing(1, 1, 1, &["x", "y", "z"]));
        let run = &tree.children[0];
        let seq = &run.children[0];
        let stream = &seq.children[0];
        assert_eq!(run.name, "2023.11.27 23:56:25.233");
        assert_eq!(seq.name, "seq=0");
        assert_eq!(stream.name, "X-Axis f=10Hz zeta=0.15");
        assert_eq!(stream.children[1].name, "Y f=10Hz zeta=0.15");
    }

    #[test]
    fn test_stream_selection_with_fft_triple() {
        let tree = build_tree(&synthetic_listing(1, 1, 1, &["x", "y", "z"]));
        let stream = &tree.children[0].children[0].children[0];
        let selection = stream.selection().unwrap();
        assert_eq!(selection.file_name, "axxel-x-10.tsv");
        let ffts = selection.fft_files.unwrap();
        assert_eq!(ffts.x, "fft-x-10-x.tsv");
        assert_eq!(ffts.y, "fft-x-10-y.tsv");
        assert_eq!(ffts.z, "fft-x-10-z.tsv");
    }

    #[test]
    fn test_incomplete_fft_triple_not_attached() {
        let tree = build_tree(&synthetic_listing(1, 1, 1, &["x", "y"]));
        let stream = &tree.children[0].children[0].children[0];
        let selection = stream.selection().unwrap();
        assert!(selection.fft_files.is_none());
    }

    #[test]
    fn test_only_streams_are_selectable() {
        let tree = build_tree(&synthetic_listing(1, 1, 1, &["x", "y", "z"]));
        for node in tree.descendants() {
            assert_eq!(node.selection().is_some(), node.node_type == NodeType::Stream);
        }
    }

    #[test]
    fn test_zeta_as_padded_string() {
        let listing = json!({ "data_sets": { "runs": { "r": { "sequences": { "0": { "streams": {
            "s": { "meta": {
                "sequence_axis": "y",
                "sequence_frequency_hz": "020",
                "sequence_zeta_em2": "015"
            }}
        }}}}}}});
        let tree = build_tree(&listing);
        assert_eq!(tree.children[0].children[0].children[0].name, "Y-Axis f=20Hz zeta=0.15");
    }

    #[test]
    fn test_legacy_fft_key_and_flat_fft_descriptor() {
        let listing = json!({ "data_sets": { "runs": { "r": { "sequences": { "0": { "streams": {
            "s": {
                "meta": { "sequence_axis": "x", "sequence_frequency_hz": 10, "sequence_zeta_em2": 15 },
                "fft": { "0": { "fft_axis": "z", "sequence_frequency_hz": 10, "sequence_zeta_em2": 15 } }
            }
        }}}}}}});
        let tree = build_tree(&listing);
        let stream = &tree.children[0].children[0].children[0];
        assert_eq!(stream.children.len(), 1);
        assert_eq!(stream.children[0].name, "Z f=10Hz zeta=0.15");
    }

    #[test]
    fn test_flat_listing_shape() {
        let listing = json!({ "data_sets": {
            "run-a": { "0": { "s0": stream_descriptor("x", 10, 10, &["x", "y", "z"]) } },
            "run-b": { "1": { "s1": stream_descriptor("y", 20, 20, &[]) } },
        }});
        let tree = build_tree(&listing);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].name, "run-a");
        assert_eq!(tree.children[1].children[0].name, "seq=1");
        assert_eq!(tree.node_count(), 1 + 2 + 2 + 2 + 3);
    }

    // ==========================================================================
    // MALFORMED INPUT
    // ==========================================================================

    #[test]
    fn test_malformed_subtrees_skipped() {
        let listing = json!({ "data_sets": { "runs": {
            "bad-run": 42,
            "bad-start": { "started": "yesterday", "sequences": {} },
            "good": { "sequences": {
                "0": { "streams": {
                    "no-meta": { "file": { "filename_ext": "a.tsv" } },
                    "ok": { "meta": {
                        "sequence_axis": "x", "sequence_frequency_hz": 10, "sequence_zeta_em2": 15
                    }}
                }},
                "1": "not a sequence"
            }}
        }}});
        let tree = build_tree(&listing);
        assert_eq!(tree.children.len(), 1);
        let run = &tree.children[0];
        assert_eq!(run.name, "good");
        assert_eq!(run.children.len(), 1);
        assert_eq!(run.children[0].children.len(), 1);
        assert_eq!(run.children[0].children[0].name, "X-Axis f=10Hz zeta=0.15");
    }

    #[test]
    fn test_run_metadata_without_sequences_adds_no_rows() {
        let listing = json!({ "data_sets": { "runs": { "r": {
            "started": { "year": 2023, "month": 11, "day": 27, "hour": 23, "minute": 56, "second": 25, "milli_second": 233 },
            "stopped": { "year": 2023, "month": 11, "day": 27, "hour": 23, "minute": 58, "second": 0, "milli_second": 0 }
        }}}});
        let tree = build_tree(&listing);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "2023.11.27 23:56:25.233");
        assert!(tree.children[0].children.is_empty());
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_stream_without_file_not_selectable() {
        let listing = json!({ "data_sets": { "runs": { "r": { "sequences": { "0": { "streams": {
            "s": { "meta": { "sequence_axis": "x", "sequence_frequency_hz": 10, "sequence_zeta_em2": 15 } }
        }}}}}}});
        let tree = build_tree(&listing);
        assert!(tree.children[0].children[0].children[0].selection().is_none());
    }

    // ==========================================================================
    // LOOKUP
    // ==========================================================================

    #[test]
    fn test_find_by_index_every_node() {
        let tree = build_tree(&synthetic_listing(2, 2, 2, &["x", "y", "z"]));
        for node in tree.descendants() {
            let found = tree.find_by_index(node.index).unwrap();
            assert_eq!(found.index, node.index);
            assert_eq!(found.name, node.name);
        }
        assert!(tree.find_by_index(tree.node_count()).is_none());
    }

    #[test]
    fn test_path_to_walks_ancestors() {
        let tree = build_tree(&synthetic_listing(1, 1, 1, &["x", "y", "z"]));
        let path = tree.path_to(4).unwrap();
        let types: Vec<_> = path.iter().map(|n| n.node_type).collect();
        assert_eq!(
            types,
            vec![NodeType::Root, NodeType::Run, NodeType::Sequence, NodeType::Stream, NodeType::Fft]
        );
    }
}
