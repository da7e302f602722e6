use crate::dom::{Document, ElementId, ListenerTarget, Subscription};
use crate::events::{EventKind, Handler};
use markmap_core::geom::Point;
use markmap_render::{Hit, Markmap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The element under the pointer handles the click itself.
    PassThrough(Hit),
    /// The click landed on the canvas (or on passive content): open the focus view.
    OpenOverlay,
}

/// Decides what a click on an inline surface means, from the diagram's own hit test.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickRouter;

impl ClickRouter {
    /// Registers the click listener for `block` on its inline surface.
    pub fn attach(doc: &mut Document, surface: ElementId, block: usize) -> Subscription {
        doc.listen(
            ListenerTarget::Element(surface),
            EventKind::Click,
            Handler::RouteInlineClick { block },
        )
    }

    /// `at` is in surface coordinates.
    pub fn route(handle: &Markmap, at: Point) -> RouteDecision {
        match handle.hit_test(at) {
            Some(hit) if hit.interactive => RouteDecision::PassThrough(hit),
            _ => RouteDecision::OpenOverlay,
        }
    }
}
