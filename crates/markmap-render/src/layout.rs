use crate::color::branch_color;
use crate::model::{Bounds, LayoutEdge, LayoutNode, LayoutPoint, MindmapLayout};
use crate::options::MarkmapOptions;
use crate::text::{TextMeasurer, TextStyle};
use markmap_core::{MindmapTree, NodeId};

/// Inner padding between a node's label and its box.
pub const NODE_PADDING: f64 = 4.0;
/// Radius of the fold toggle drawn at the end of a node's underline.
pub const TOGGLE_RADIUS: f64 = 6.0;

/// Horizontal tidy-tree layout of the visible part of `tree`.
///
/// `folded[i]` hides the descendants of node `i`. The root sits at `x = 0`; each child column
/// starts `spacing_horizontal` past the right edge of its parent, and every parent is vertically
/// centered on the block formed by its visible children.
pub fn layout_mindmap(
    tree: &MindmapTree,
    folded: &[bool],
    options: &MarkmapOptions,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
) -> MindmapLayout {
    let is_folded = |id: NodeId| folded.get(id.index()).copied().unwrap_or(false);

    // Visible nodes in pre-order, with children as indices into `visible`.
    let mut visible: Vec<NodeId> = Vec::new();
    let mut kids: Vec<Vec<usize>> = Vec::new();
    let mut stack: Vec<(NodeId, Option<usize>)> = vec![(tree.root().id, None)];
    while let Some((id, parent)) = stack.pop() {
        let idx = visible.len();
        visible.push(id);
        kids.push(Vec::new());
        if let Some(p) = parent {
            kids[p].push(idx);
        }
        if is_folded(id) {
            continue;
        }
        for child in tree.node(id).children.iter().rev() {
            stack.push((*child, Some(idx)));
        }
    }

    let mut nodes: Vec<LayoutNode> = visible
        .iter()
        .map(|&id| {
            let n = tree.node(id);
            let wrapped = measurer.measure_wrapped(&n.text, style, options.wrap_width());
            LayoutNode {
                id,
                depth: n.depth,
                x: 0.0,
                y: 0.0,
                width: wrapped.metrics.width.max(1.0) + NODE_PADDING * 2.0,
                height: wrapped.metrics.height + NODE_PADDING * 2.0,
                lines: wrapped.lines,
                color: branch_color(tree, id, options.color_freeze_level).to_string(),
                has_children: n.has_children(),
                folded: n.has_children() && is_folded(id),
            }
        })
        .collect();

    // Subtree extents, children before parents.
    let gap = options.spacing_vertical;
    let mut extent = vec![0.0_f64; nodes.len()];
    let mut block = vec![0.0_f64; nodes.len()];
    for idx in (0..nodes.len()).rev() {
        let children = &kids[idx];
        if !children.is_empty() {
            block[idx] = children.iter().map(|&c| extent[c]).sum::<f64>()
                + gap * (children.len() - 1) as f64;
        }
        extent[idx] = nodes[idx].height.max(block[idx]);
    }

    // Place subtrees top-down.
    let mut top = vec![0.0_f64; nodes.len()];
    for idx in 0..nodes.len() {
        let t = top[idx];
        nodes[idx].y = t + (extent[idx] - nodes[idx].height) / 2.0;
        let child_x = nodes[idx].x + nodes[idx].width + options.spacing_horizontal;
        let mut cursor = t + (extent[idx] - block[idx]) / 2.0;
        for &c in &kids[idx] {
            top[c] = cursor;
            nodes[c].x = child_x;
            cursor += extent[c] + gap;
        }
    }

    let mut edges = Vec::new();
    for (idx, children) in kids.iter().enumerate() {
        let from = nodes[idx].anchor_out();
        for &c in children {
            let to = nodes[c].anchor_in();
            let mid = (from.x + to.x) / 2.0;
            edges.push(LayoutEdge {
                from: nodes[idx].id,
                to: nodes[c].id,
                points: vec![
                    from,
                    LayoutPoint { x: mid, y: from.y },
                    LayoutPoint { x: mid, y: to.y },
                    to,
                ],
                color: nodes[c].color.clone(),
            });
        }
    }

    let corners = nodes.iter().flat_map(|n| {
        let r = if n.has_children { TOGGLE_RADIUS } else { 0.0 };
        [
            (n.x, n.y),
            (n.x + n.width + r, n.y + n.height + r),
            (n.x + n.width - r, n.y + n.height - r),
        ]
    });
    let bounds = Bounds::from_points(corners)
        .unwrap_or(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        })
        .pad_x(options.padding_x);

    tracing::trace!(
        visible = nodes.len(),
        width = bounds.width(),
        height = bounds.height(),
        "mindmap layout"
    );

    MindmapLayout {
        nodes,
        edges,
        bounds,
    }
}
