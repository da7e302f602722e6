use serde::{Deserialize, Serialize};

/// Pre-order index of a node inside its [`MindmapTree`]. The root is always `NodeId(0)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Synthetic root created when the source has several top-level nodes.
    Root,
    Heading(u8),
    ListItem,
    /// Paragraph, code block, table, quote or raw HTML outside of a list item.
    Block,
}

/// Folding requested by the source through `<!-- markmap: fold -->` comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Fold {
    #[default]
    None,
    /// Collapse this node only.
    Fold,
    /// Collapse this node and every descendant.
    FoldAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindmapNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub depth: u32,
    pub kind: NodeKind,
    /// Inline HTML rendered from the node's markdown.
    pub content: String,
    /// Plain text of the node, lines separated by `\n`. Used for measuring.
    pub text: String,
    pub children: Vec<NodeId>,
    pub fold: Fold,
}

impl MindmapNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Immutable hierarchy produced once per source block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindmapTree {
    nodes: Vec<MindmapNode>,
}

impl MindmapTree {
    /// Builds a tree from nodes already laid out in pre-order with consistent links.
    pub(crate) fn from_preorder(nodes: Vec<MindmapNode>) -> Self {
        debug_assert!(
            nodes
                .iter()
                .enumerate()
                .all(|(i, n)| n.id.index() == i)
        );
        Self { nodes }
    }

    pub fn root(&self) -> &MindmapNode {
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&MindmapNode> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> &MindmapNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in pre-order (document order).
    pub fn nodes(&self) -> &[MindmapNode] {
        &self.nodes
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &MindmapNode> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .map(|c| self.node(*c))
    }

    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Ancestor of `id` at `depth`, or `id` itself when it is not deeper than `depth`.
    pub fn ancestor_at_depth(&self, id: NodeId, depth: u32) -> NodeId {
        let mut cur = self.node(id);
        while cur.depth > depth {
            let Some(parent) = cur.parent else {
                break;
            };
            cur = self.node(parent);
        }
        cur.id
    }

    /// Indented plain-text outline, one node per line. Handy for debugging and snapshots.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for n in &self.nodes {
            for _ in 0..n.depth {
                out.push_str("  ");
            }
            out.push_str(&n.text.replace('\n', " "));
            out.push('\n');
        }
        out
    }
}
