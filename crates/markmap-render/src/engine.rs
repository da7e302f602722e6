use crate::markmap::Markmap;
use crate::options::MarkmapOptions;
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use crate::Result;
use markmap_core::MindmapTree;
use markmap_core::geom::Size;
use std::rc::Rc;

/// Turns a parsed tree into a live diagram bound to one surface.
///
/// Hosts hold the engine behind this trait so tests can substitute engines that fail or count
/// calls.
pub trait DrawEngine {
    fn render(
        &self,
        tree: Rc<MindmapTree>,
        options: &MarkmapOptions,
        viewport: Size,
    ) -> Result<Markmap>;
}

/// The built-in engine: tidy-tree layout measured with a [`TextMeasurer`].
#[derive(Clone)]
pub struct MarkmapEngine {
    measurer: Rc<dyn TextMeasurer>,
    style: TextStyle,
}

impl Default for MarkmapEngine {
    fn default() -> Self {
        Self::new(Rc::new(DeterministicTextMeasurer::default()), TextStyle::default())
    }
}

impl MarkmapEngine {
    pub fn new(measurer: Rc<dyn TextMeasurer>, style: TextStyle) -> Self {
        Self { measurer, style }
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }
}

impl DrawEngine for MarkmapEngine {
    fn render(
        &self,
        tree: Rc<MindmapTree>,
        options: &MarkmapOptions,
        viewport: Size,
    ) -> Result<Markmap> {
        Markmap::new(
            tree,
            options.clone(),
            Rc::clone(&self.measurer),
            self.style.clone(),
            viewport,
        )
    }
}
