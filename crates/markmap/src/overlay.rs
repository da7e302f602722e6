//! The enlarged focus view of one block.
//!
//! At most one overlay exists per block. Opening builds the modal DOM, locks page scrolling and
//! mounts a second diagram over the block's shared tree; closing releases every listener it
//! registered, unmounts that diagram, removes the modal and restores scrolling.

use crate::controller::{DiagramController, RefitRequest};
use crate::dom::{Document, ElementId, ListenerTarget, Subscription};
use crate::events::{DismissTrigger, EventKind, Handler};
use crate::host::Host;
use crate::surface::{Surface, SurfaceFactory};
use crate::tasks::RefitTarget;
use markmap_core::MindmapTree;
use markmap_render::{DrawEngine, MarkmapOptions};
use std::rc::Rc;
use std::time::Duration;

pub const MODAL_CLASS: &str = "markmap-modal";
pub const CLOSE_CLASS: &str = "markmap-modal-close";
pub const FRAME_CLASS: &str = "markmap-modal-frame";
pub const FRAME_ERROR_CLASS: &str = "markmap-modal-frame--error";
pub const ERROR_CLASS: &str = "markmap-error";

/// Live resources of an open overlay.
#[derive(Debug)]
pub struct OpenOverlay {
    container: ElementId,
    close_button: ElementId,
    frame: ElementId,
    surface: Surface,
    diagram: Option<DiagramController>,
    error: Option<ElementId>,
    subscriptions: Vec<Subscription>,
    saved_overflow: Option<String>,
}

impl OpenOverlay {
    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn close_button(&self) -> ElementId {
        self.close_button
    }

    pub fn frame(&self) -> ElementId {
        self.frame
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn diagram(&self) -> Option<&DiagramController> {
        self.diagram.as_ref()
    }

    /// The error element shown when the focus diagram failed to mount.
    pub fn error(&self) -> Option<ElementId> {
        self.error
    }
}

#[derive(Debug, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open(OpenOverlay),
}

/// What the overlay needs from its block to open.
#[derive(Clone, Copy)]
pub struct OpenRequest<'a> {
    pub engine: &'a dyn DrawEngine,
    pub factory: &'a SurfaceFactory,
    pub tree: &'a Rc<MindmapTree>,
    pub options: &'a MarkmapOptions,
    pub refit_delay: Duration,
}

#[derive(Debug)]
pub struct FocusOverlay {
    block: usize,
    state: OverlayState,
}

impl FocusOverlay {
    pub fn new(block: usize) -> Self {
        Self {
            block,
            state: OverlayState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, OverlayState::Open(_))
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn open_overlay(&self) -> Option<&OpenOverlay> {
        match &self.state {
            OverlayState::Open(o) => Some(o),
            OverlayState::Closed => None,
        }
    }

    /// Opens the focus view. A request while already open is ignored and returns `false`.
    ///
    /// A diagram that fails to mount is reported inside the frame; the overlay still opens and
    /// can be dismissed as usual.
    pub fn open(&mut self, host: &mut Host, req: OpenRequest<'_>) -> bool {
        if self.is_open() {
            tracing::debug!(block = self.block, "overlay already open");
            return false;
        }

        let doc = &mut host.document;
        let body = doc.body();

        let container = doc.create_element("div");
        doc.add_class(container, MODAL_CLASS);
        for (k, v) in [
            ("position", "fixed"),
            ("top", "0"),
            ("left", "0"),
            ("width", "100vw"),
            ("height", "100vh"),
            ("background", "rgba(0, 0, 0, 0.9)"),
            ("z-index", "9999"),
            ("display", "flex"),
            ("align-items", "center"),
            ("justify-content", "center"),
            ("cursor", "zoom-out"),
        ] {
            doc.set_style(container, k, v);
        }
        let vp = doc.viewport();
        doc.set_width(container, vp.width);
        doc.set_height(container, vp.height);

        let close_button = doc.create_element("button");
        doc.add_class(close_button, CLOSE_CLASS);
        doc.set_attribute(close_button, "type", "button");
        doc.set_attribute(close_button, "aria-label", "Close");
        doc.set_text(close_button, "✕");
        for (k, v) in [
            ("position", "absolute"),
            ("top", "20px"),
            ("right", "20px"),
            ("background", "white"),
            ("border", "none"),
            ("border-radius", "50%"),
            ("width", "40px"),
            ("height", "40px"),
            ("font-size", "20px"),
            ("cursor", "pointer"),
            ("z-index", "10000"),
        ] {
            doc.set_style(close_button, k, v);
        }

        let frame = doc.create_element("div");
        doc.add_class(frame, FRAME_CLASS);
        let padding = format!("{}px", req.factory.frame_padding());
        for (k, v) in [
            ("width", "95vw"),
            ("height", "90vh"),
            ("background", "white"),
            ("border-radius", "8px"),
            ("padding", padding.as_str()),
            ("box-sizing", "border-box"),
            ("cursor", "default"),
        ] {
            doc.set_style(frame, k, v);
        }

        doc.append_child(container, close_button);
        doc.append_child(container, frame);
        doc.append_child(body, container);

        let saved_overflow = doc.style(body, "overflow").map(str::to_string);
        doc.set_style(body, "overflow", "hidden");

        let surface = req.factory.create_focus(doc, frame);

        let block = self.block;
        let subscriptions = vec![
            doc.listen(
                ListenerTarget::Element(close_button),
                EventKind::Click,
                Handler::CloseOverlay {
                    block,
                    trigger: DismissTrigger::CloseButton,
                },
            ),
            doc.listen(
                ListenerTarget::Element(container),
                EventKind::Click,
                Handler::CloseOverlay {
                    block,
                    trigger: DismissTrigger::Backdrop,
                },
            ),
            doc.listen(
                ListenerTarget::Element(frame),
                EventKind::Click,
                Handler::StopPropagation,
            ),
            doc.listen(
                ListenerTarget::Document,
                EventKind::KeyDown,
                Handler::CloseOnEscape { block },
            ),
        ];

        let mounted = DiagramController::mount(
            host,
            req.engine,
            surface,
            Rc::clone(req.tree),
            req.options,
            RefitRequest {
                block,
                target: RefitTarget::Overlay,
                delay: req.refit_delay,
            },
        );
        let doc = &mut host.document;
        let (diagram, error) = match mounted {
            Ok(d) => (Some(d), None),
            Err(e) => {
                tracing::error!(block, error = %e, "failed to render focus view");
                let el = doc.create_element("div");
                doc.add_class(el, ERROR_CLASS);
                doc.set_text(el, &format!("Failed to render mind map: {e}"));
                doc.append_child(frame, el);
                doc.add_class(frame, FRAME_ERROR_CLASS);
                (None, Some(el))
            }
        };

        self.state = OverlayState::Open(OpenOverlay {
            container,
            close_button,
            frame,
            surface,
            diagram,
            error,
            subscriptions,
            saved_overflow,
        });
        tracing::debug!(block, "overlay opened");
        true
    }

    /// Dismisses the overlay. Returns `false` if it was not open.
    pub fn close(&mut self, doc: &mut Document, trigger: DismissTrigger) -> bool {
        let OverlayState::Open(mut open) = std::mem::take(&mut self.state) else {
            return false;
        };

        for sub in open.subscriptions.drain(..) {
            doc.unlisten(sub);
        }
        if let Some(mut diagram) = open.diagram.take() {
            diagram.unmount(doc);
        }
        doc.remove(open.container);

        let body = doc.body();
        match open.saved_overflow.as_deref() {
            Some(v) => doc.set_style(body, "overflow", v),
            None => doc.remove_style(body, "overflow"),
        }
        tracing::debug!(block = self.block, ?trigger, "overlay closed");
        true
    }

    /// Re-sizes the focus surface to the viewport and fits the diagram again.
    pub fn refit(&mut self, doc: &mut Document, factory: &SurfaceFactory) -> bool {
        let OverlayState::Open(open) = &mut self.state else {
            return false;
        };
        let vp = doc.viewport();
        doc.set_width(open.container, vp.width);
        doc.set_height(open.container, vp.height);
        factory.resize_focus(doc, open.frame, open.surface);
        match open.diagram.as_mut() {
            Some(d) => d.refit(doc),
            None => false,
        }
    }

    /// Fits the focus diagram without touching sizes; used by the deferred post-open task.
    pub fn run_deferred_refit(&mut self, doc: &mut Document) -> bool {
        match &mut self.state {
            OverlayState::Open(OpenOverlay {
                diagram: Some(d), ..
            }) => d.refit(doc),
            _ => false,
        }
    }
}
