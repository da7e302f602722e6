use crate::layout::{TOGGLE_RADIUS, layout_mindmap};
use crate::model::MindmapLayout;
use crate::options::MarkmapOptions;
use crate::text::{TextMeasurer, TextStyle};
use crate::viewport::{ViewTransform, fit_transform};
use crate::{Error, Result};
use markmap_core::geom::{Point, Rect, Size, point, rect};
use markmap_core::{Fold, MindmapTree, NodeId};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Extra pick radius around fold toggles, in surface pixels.
const TOGGLE_HIT_SLOP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    /// The fold toggle at the end of a node's underline.
    Toggle,
    /// The node's label.
    Content,
}

/// Result of [`Markmap::hit_test`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub node: NodeId,
    pub region: HitRegion,
    /// The element under the pointer handles the pointer itself (label HTML, toggles), so hosts
    /// must not treat the click as a click on the empty canvas.
    pub interactive: bool,
}

/// Snapshot of a visible node in surface coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: NodeId,
    pub depth: u32,
    pub text: String,
    pub rect: Rect,
    pub has_children: bool,
    pub folded: bool,
    /// The label is embedded HTML that handles pointer input itself.
    pub interactive: bool,
}

/// A tree rendered onto one drawing surface.
///
/// Owns the view state (fold flags, pan/zoom); the tree itself is shared with every other view of
/// the same block.
pub struct Markmap {
    tree: Rc<MindmapTree>,
    options: MarkmapOptions,
    measurer: Rc<dyn TextMeasurer>,
    style: TextStyle,
    folded: Vec<bool>,
    layout: MindmapLayout,
    index: FxHashMap<NodeId, usize>,
    viewport: Size,
    transform: ViewTransform,
}

impl std::fmt::Debug for Markmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Markmap")
            .field("nodes", &self.tree.len())
            .field("visible", &self.layout.nodes.len())
            .field("viewport", &self.viewport)
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

impl Markmap {
    pub fn new(
        tree: Rc<MindmapTree>,
        options: MarkmapOptions,
        measurer: Rc<dyn TextMeasurer>,
        style: TextStyle,
        viewport: Size,
    ) -> Result<Self> {
        options.validate()?;
        if tree.is_empty() {
            return Err(Error::EmptyTree);
        }

        let level = options.initial_expand_level;
        let folded = tree
            .nodes()
            .iter()
            .map(|n| {
                n.has_children()
                    && (n.fold != Fold::None || (level >= 0 && n.depth >= level as u32))
            })
            .collect();

        let mut mm = Self {
            layout: MindmapLayout {
                nodes: Vec::new(),
                edges: Vec::new(),
                bounds: crate::model::Bounds {
                    min_x: 0.0,
                    min_y: 0.0,
                    max_x: 0.0,
                    max_y: 0.0,
                },
            },
            index: FxHashMap::default(),
            tree,
            options,
            measurer,
            style,
            folded,
            viewport,
            transform: ViewTransform::IDENTITY,
        };
        mm.relayout();
        if mm.options.auto_fit {
            mm.fit();
        }
        Ok(mm)
    }

    fn relayout(&mut self) {
        self.layout = layout_mindmap(
            &self.tree,
            &self.folded,
            &self.options,
            self.measurer.as_ref(),
            &self.style,
        );
        self.index = self
            .layout
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i))
            .collect();
    }

    /// Re-frames the diagram to the current surface size. Returns `false` (leaving the transform
    /// untouched) while the surface has no area.
    pub fn fit(&mut self) -> bool {
        match fit_transform(
            &self.layout.bounds,
            self.viewport,
            self.options.fit_ratio,
            self.options.max_scale,
        ) {
            Some(t) => {
                self.transform = t;
                tracing::trace!(k = t.k, x = t.x, y = t.y, "markmap fit");
                true
            }
            None => false,
        }
    }

    /// Records a new surface size, re-fitting when `autoFit` is enabled.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        if self.options.auto_fit {
            self.fit();
        }
    }

    /// Flips the fold state of `id`. Leaves and unknown ids are ignored (returns `false`).
    pub fn toggle_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.tree.get(id) else {
            return false;
        };
        if !node.has_children() {
            return false;
        }
        let slot = &mut self.folded[id.index()];
        *slot = !*slot;
        self.relayout();
        true
    }

    pub fn is_folded(&self, id: NodeId) -> bool {
        self.folded.get(id.index()).copied().unwrap_or(false)
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// What lies under `at` (surface coordinates). Toggles win over labels.
    pub fn hit_test(&self, at: Point) -> Option<Hit> {
        let p = self.transform.invert(at);
        let slop = TOGGLE_HIT_SLOP / self.transform.k;

        for n in &self.layout.nodes {
            let Some(c) = n.toggle_center() else {
                continue;
            };
            if (p - c).length() <= TOGGLE_RADIUS + slop {
                return Some(Hit {
                    node: n.id,
                    region: HitRegion::Toggle,
                    interactive: true,
                });
            }
        }

        self.layout
            .nodes
            .iter()
            .find(|n| n.rect().contains(p))
            .map(|n| Hit {
                node: n.id,
                region: HitRegion::Content,
                interactive: self.options.html_labels,
            })
    }

    /// Visible nodes, in pre-order, mapped to surface coordinates.
    pub fn node_views(&self) -> Vec<NodeView> {
        let k = self.transform.k;
        self.layout
            .nodes
            .iter()
            .map(|n| {
                let origin = self.transform.apply(point(n.x, n.y));
                NodeView {
                    id: n.id,
                    depth: n.depth,
                    text: self.tree.node(n.id).text.clone(),
                    rect: rect(origin.x, origin.y, n.width * k, n.height * k),
                    has_children: n.has_children,
                    folded: n.folded,
                    interactive: self.options.html_labels,
                }
            })
            .collect()
    }

    pub fn node_view(&self, id: NodeId) -> Option<NodeView> {
        let i = *self.index.get(&id)?;
        self.node_views().into_iter().nth(i)
    }

    pub fn layout(&self) -> &MindmapLayout {
        &self.layout
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn tree(&self) -> &Rc<MindmapTree> {
        &self.tree
    }

    pub fn options(&self) -> &MarkmapOptions {
        &self.options
    }

    /// SVG content for the surface (the `<g>` root and everything below it).
    pub fn to_markup(&self) -> String {
        crate::svg::render_markup(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DeterministicTextMeasurer;
    use markmap_core::Transformer;
    use markmap_core::geom::size;

    fn tree(src: &str) -> Rc<MindmapTree> {
        Rc::new(Transformer::new().transform(src).unwrap().tree)
    }

    fn render(src: &str, options: MarkmapOptions, viewport: Size) -> Markmap {
        Markmap::new(
            tree(src),
            options,
            Rc::new(DeterministicTextMeasurer::default()),
            TextStyle::default(),
            viewport,
        )
        .unwrap()
    }

    #[test]
    fn expand_level_folds_deep_branches() {
        let opts = MarkmapOptions {
            initial_expand_level: 1,
            ..MarkmapOptions::inline_defaults()
        };
        let mm = render("# R\n## A\n### A1\n## B\n", opts, size(800.0, 400.0));
        assert!(!mm.is_folded(NodeId(0)));
        assert!(mm.is_folded(NodeId(1)));
        // Leaves are never folded.
        assert!(!mm.is_folded(NodeId(3)));
        assert!(!mm.is_visible(NodeId(2)));
        assert_eq!(mm.layout().nodes.len(), 3);
    }

    #[test]
    fn fold_marks_start_folded() {
        let mm = render(
            "- a <!-- markmap: fold -->\n  - b\n- c\n",
            MarkmapOptions::inline_defaults(),
            size(800.0, 400.0),
        );
        let a = mm.tree().nodes().iter().find(|n| n.text == "a").unwrap().id;
        assert!(mm.is_folded(a));
    }

    #[test]
    fn toggle_shows_and_hides_children() {
        let mut mm = render(
            "# R\n## A\n### A1\n",
            MarkmapOptions::inline_defaults(),
            size(800.0, 400.0),
        );
        assert_eq!(mm.layout().nodes.len(), 3);
        assert!(mm.toggle_node(NodeId(1)));
        assert_eq!(mm.layout().nodes.len(), 2);
        assert!(mm.toggle_node(NodeId(1)));
        assert_eq!(mm.layout().nodes.len(), 3);
        assert!(!mm.toggle_node(NodeId(2)));
        assert!(!mm.toggle_node(NodeId(99)));
    }

    #[test]
    fn fit_waits_for_a_sized_surface() {
        let mut mm = render(
            "# R\n## A\n",
            MarkmapOptions::inline_defaults(),
            size(0.0, 0.0),
        );
        assert_eq!(mm.transform(), ViewTransform::IDENTITY);
        assert!(!mm.fit());
        mm.resize(size(600.0, 400.0));
        assert_ne!(mm.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn hit_test_reports_regions() {
        let opts = MarkmapOptions {
            html_labels: false,
            ..MarkmapOptions::inline_defaults()
        };
        let mm = render("# R\n## A\n", opts, size(800.0, 400.0));
        let root = mm.node_view(NodeId(0)).unwrap();
        let center = root.rect.center();
        let hit = mm.hit_test(center).unwrap();
        assert_eq!(hit.node, NodeId(0));
        assert_eq!(hit.region, HitRegion::Content);
        assert!(!hit.interactive);

        let toggle = mm
            .transform()
            .apply(mm.layout().nodes[0].toggle_center().unwrap());
        let hit = mm.hit_test(toggle).unwrap();
        assert_eq!(hit.region, HitRegion::Toggle);
        assert!(hit.interactive);

        assert_eq!(mm.hit_test(point(1.0, 1.0)), None);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let opts = MarkmapOptions {
            fit_ratio: 0.0,
            ..MarkmapOptions::inline_defaults()
        };
        let err = Markmap::new(
            tree("# R\n"),
            opts,
            Rc::new(DeterministicTextMeasurer::default()),
            TextStyle::default(),
            size(10.0, 10.0),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
    }
}
