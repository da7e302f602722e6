use markmap_core::{MindmapTree, NodeId};

/// d3 `schemeCategory10`.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Branch color for `id`. With a non-zero `freeze_level`, nodes below that depth share the color
/// of their ancestor at `freeze_level`.
pub fn branch_color(tree: &MindmapTree, id: NodeId, freeze_level: u32) -> &'static str {
    let key = if freeze_level == 0 {
        id
    } else {
        tree.ancestor_at_depth(id, freeze_level)
    };
    PALETTE[key.index() % PALETTE.len()]
}
