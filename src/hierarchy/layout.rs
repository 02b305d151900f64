//! Indented-tree layout
//!
//! Rows sit at `index * row_height`, indented by `depth * row_height`.
//! Each non-root row is tied to its parent with an L-shaped connector that
//! drops from the parent's dot down to the row and then runs right to it.

use super::{NodeType, StreamSelection, TreeNode};
use crate::config::TreeStyle;
use serde::Serialize;
use std::fmt::Write;

/// Generic post-order fold over the tree
///
/// `f` receives a node and the already folded results of its children.
pub fn fold_tree<'a, B, F>(node: &'a TreeNode, f: &F) -> B
where
    F: Fn(&'a TreeNode, Vec<B>) -> B,
{
    let child_results: Vec<B> = node.children.iter().map(|child| fold_tree(child, f)).collect();
    f(node, child_results)
}

/// One laid-out tree row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    pub index: usize,
    pub depth: usize,
    pub name: String,
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    /// Connector from the parent, `None` for the root
    pub link: Option<String>,
    /// Childless descendants (1 for a leaf itself)
    pub leaves: usize,
    pub child_count: usize,
    /// Hover text: `run: <run> | <sequence> | <stream>`
    pub title: String,
    pub selection: Option<StreamSelection>,
}

impl NodeRow {
    /// Right-hand count column: leaves below inner nodes, `-` on leaves
    pub fn annotation(&self) -> String {
        if self.child_count == 0 {
            "-".to_string()
        } else {
            self.leaves.to_string()
        }
    }
}

/// `M{px},{py}V{cy}H{cx}`
pub fn link_path(parent: &TreeNode, child: &TreeNode, row_height: f64) -> String {
    format!(
        "M{},{}V{}H{}",
        parent.depth as f64 * row_height,
        parent.index as f64 * row_height,
        child.index as f64 * row_height,
        child.depth as f64 * row_height,
    )
}

/// Lay out every node of the tree in pre-order
pub fn layout(root: &TreeNode, row_height: f64) -> Vec<NodeRow> {
    let mut rows = Vec::with_capacity(root.node_count());
    let mut ancestors = Vec::new();
    visit(root, None, &mut ancestors, row_height, &mut rows);
    rows
}

fn visit<'a>(
    node: &'a TreeNode,
    parent: Option<&'a TreeNode>,
    ancestors: &mut Vec<&'a str>,
    row_height: f64,
    rows: &mut Vec<NodeRow>,
) {
    ancestors.push(&node.name);
    rows.push(NodeRow {
        index: node.index,
        depth: node.depth,
        name: node.name.clone(),
        node_type: node.node_type,
        x: node.depth as f64 * row_height,
        y: node.index as f64 * row_height,
        link: parent.map(|p| link_path(p, node, row_height)),
        leaves: node.leaf_count(),
        child_count: node.children.len(),
        title: title_for(ancestors),
        selection: node.selection(),
    });
    for child in &node.children {
        visit(child, Some(node), ancestors, row_height, rows);
    }
    ancestors.pop();
}

/// Ancestor path without the synthetic root, at most run/sequence/stream
fn title_for(path: &[&str]) -> String {
    let mut title = String::new();
    if let Some(run) = path.get(1) {
        title.push_str("run: ");
        title.push_str(run);
    }
    for part in path.iter().skip(2).take(2) {
        title.push_str(" | ");
        title.push_str(part);
    }
    title
}

/// Render the laid-out rows as a standalone SVG document
///
/// Stream rows carry `data-index` so the viewer page can route clicks.
pub fn render_svg(rows: &[NodeRow], style: &TreeStyle) -> String {
    let rh = style.row_height;
    let height = (rows.len() + 1) as f64 * rh;
    let mut svg = String::new();

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="tree" width="{w}" height="{h}" viewBox="{vx} {vy} {w} {h}" style="font: 10px sans-serif; overflow: visible;">"#,
        w = style.width,
        h = height,
        vx = -rh / 2.0,
        vy = -rh * 1.5,
    );

    svg.push_str(r##"<g fill="none" stroke="#999">"##);
    for row in rows {
        if let Some(link) = &row.link {
            let _ = write!(svg, r#"<path d="{}"/>"#, link);
        }
    }
    svg.push_str("</g>");

    for row in rows {
        let selectable = row.selection.is_some();
        let _ = write!(
            svg,
            r#"<g class="node {kind}" transform="translate(0,{y})"{data}>"#,
            kind = row.node_type,
            y = row.y,
            data = if selectable { format!(r#" data-index="{}""#, row.index) } else { String::new() },
        );
        let fill = if row.child_count > 0 { "#999" } else { "none" };
        let _ = write!(
            svg,
            r##"<circle cx="{}" r="2.5" fill="{}" stroke="#999"/>"##,
            row.x, fill
        );
        let _ = write!(
            svg,
            r#"<text dy="0.32em" x="{}"{}>{}</text>"#,
            row.x + 6.0,
            if selectable { r#" style="cursor: pointer;""# } else { "" },
            escape(&row.name)
        );
        let _ = write!(
            svg,
            r##"<text dy="0.32em" x="{}" text-anchor="end" fill="{}">{}</text>"##,
            style.width - rh,
            if row.child_count > 0 { "currentColor" } else { "#555" },
            row.annotation()
        );
        let _ = write!(svg, "<title>{}</title></g>", escape(&row.title));
    }

    svg.push_str("</svg>");
    svg
}

pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
