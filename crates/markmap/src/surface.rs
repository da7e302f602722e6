use crate::config::WidgetConfig;
use crate::dom::{Document, ElementId};
use markmap_core::geom::{Size, size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Inline,
    Focus,
}

/// A drawing area in the host document, owned by exactly one diagram controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    element: ElementId,
    kind: SurfaceKind,
}

impl Surface {
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Current laid-out size.
    pub fn size(&self, doc: &Document) -> Size {
        doc.size(self.element)
    }
}

#[derive(Debug, Clone)]
pub struct SurfaceFactory {
    inline_height: f64,
    focus_width_ratio: f64,
    focus_height_ratio: f64,
    frame_padding: f64,
}

impl Default for SurfaceFactory {
    fn default() -> Self {
        Self::from_config(&WidgetConfig::default())
    }
}

impl SurfaceFactory {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            inline_height: config.inline_height,
            focus_width_ratio: config.focus_width_ratio,
            focus_height_ratio: config.focus_height_ratio,
            frame_padding: config.frame_padding,
        }
    }

    /// A full-width `svg.markmap` of fixed height appended to `container`.
    pub fn create_inline(&self, doc: &mut Document, container: ElementId) -> Surface {
        let svg = doc.create_element("svg");
        doc.add_class(svg, "markmap");
        doc.remove_attribute(svg, "width");
        doc.remove_attribute(svg, "height");
        doc.set_style(svg, "width", "100%");
        doc.set_style(svg, "height", &format!("{}px", self.inline_height));
        doc.set_style(svg, "cursor", "zoom-in");
        doc.set_height(svg, self.inline_height);
        doc.append_child(container, svg);
        Surface {
            element: svg,
            kind: SurfaceKind::Inline,
        }
    }

    /// Outer size of the focus frame for the current viewport.
    pub fn frame_size(&self, doc: &Document) -> Size {
        let vp = doc.viewport();
        size(
            vp.width * self.focus_width_ratio,
            vp.height * self.focus_height_ratio,
        )
    }

    pub fn frame_padding(&self) -> f64 {
        self.frame_padding
    }

    /// An `svg` filling the padded content box of `frame`.
    pub fn create_focus(&self, doc: &mut Document, frame: ElementId) -> Surface {
        let svg = doc.create_element("svg");
        doc.add_class(svg, "markmap");
        doc.set_style(svg, "width", "100%");
        doc.set_style(svg, "height", "100%");
        doc.set_style(svg, "display", "block");
        doc.append_child(frame, svg);
        let surface = Surface {
            element: svg,
            kind: SurfaceKind::Focus,
        };
        self.resize_focus(doc, frame, surface);
        surface
    }

    /// Re-derives the frame and focus surface sizes from the viewport.
    pub fn resize_focus(&self, doc: &mut Document, frame: ElementId, surface: Surface) {
        let outer = self.frame_size(doc);
        doc.set_width(frame, outer.width);
        doc.set_height(frame, outer.height);
        let pad = self.frame_padding * 2.0;
        doc.set_width(surface.element, (outer.width - pad).max(0.0));
        doc.set_height(surface.element, (outer.height - pad).max(0.0));
    }
}
