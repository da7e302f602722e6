use crate::bootstrap::{InitReport, Widget, WidgetBootstrapper};
use crate::config::WidgetConfig;
use crate::dom::{Document, ElementId};
use crate::events::{DismissTrigger, ESCAPE, EventKind, Handler};
use crate::host::Host;
use crate::router::{ClickRouter, RouteDecision};
use crate::tasks::{RefitTarget, Task};
use markmap_core::geom::{Point, Size};
use markmap_render::HitRegion;
use std::time::Duration;

/// Host-facing runtime for one page: owns the document, the clock, the deferred task queue and
/// every block's widget, and turns host input into widget actions.
#[derive(Debug)]
pub struct MindmapPage {
    host: Host,
    bootstrapper: WidgetBootstrapper,
    widgets: Vec<Option<Widget>>,
    initialized: bool,
}

impl MindmapPage {
    pub fn new(document: Document, config: WidgetConfig) -> Self {
        Self::with_bootstrapper(document, WidgetBootstrapper::new(config))
    }

    pub fn with_bootstrapper(document: Document, bootstrapper: WidgetBootstrapper) -> Self {
        Self {
            host: Host::new(document),
            bootstrapper,
            widgets: Vec::new(),
            initialized: false,
        }
    }

    /// Mounts every markmap block in the document. Only the first call does any work.
    pub fn initialize(&mut self) -> InitReport {
        if self.initialized {
            tracing::debug!("page already initialized");
            return InitReport::default();
        }
        self.initialized = true;
        let (widgets, report) = self.bootstrapper.initialize(&mut self.host);
        self.widgets = widgets;
        report
    }

    /// A pointer activation on `target` at `at` (coordinates relative to `target`).
    pub fn click(&mut self, target: ElementId, at: Point) {
        let handlers = self.host.document.propagation_path(target, EventKind::Click);
        for handler in handlers {
            match handler {
                Handler::RouteInlineClick { block } => self.route_inline_click(block, at),
                Handler::CloseOverlay { block, trigger } => {
                    self.close_overlay(block, trigger);
                }
                Handler::CloseOnEscape { .. } | Handler::StopPropagation => {}
            }
        }
    }

    fn route_inline_click(&mut self, block: usize, at: Point) {
        let Some(Some(widget)) = self.widgets.get_mut(block) else {
            return;
        };
        let Some(handle) = widget.inline().handle() else {
            return;
        };
        match ClickRouter::route(handle, at) {
            RouteDecision::PassThrough(hit) => {
                if hit.region == HitRegion::Toggle {
                    widget
                        .inline_mut()
                        .toggle_node(&mut self.host.document, hit.node);
                }
            }
            RouteDecision::OpenOverlay => {
                self.bootstrapper.open_overlay(&mut self.host, widget);
            }
        }
    }

    pub fn key_down(&mut self, key: &str) {
        let handlers = self.host.document.document_handlers(EventKind::KeyDown);
        for handler in handlers {
            match handler {
                Handler::CloseOnEscape { block } if key == ESCAPE => {
                    self.close_overlay(block, DismissTrigger::Escape);
                }
                _ => {}
            }
        }
    }

    /// Opens the focus view of `block` as a canvas click would.
    pub fn open_overlay(&mut self, block: usize) -> bool {
        match self.widgets.get_mut(block) {
            Some(Some(widget)) => self.bootstrapper.open_overlay(&mut self.host, widget),
            _ => false,
        }
    }

    pub fn close_overlay(&mut self, block: usize, trigger: DismissTrigger) -> bool {
        match self.widgets.get_mut(block) {
            Some(Some(widget)) => widget
                .overlay_mut()
                .close(&mut self.host.document, trigger),
            _ => false,
        }
    }

    /// Advances the host clock and runs the deferred tasks that became due.
    pub fn advance(&mut self, dt: Duration) {
        for (task, token) in self.host.advance(dt) {
            let Task::Refit { block, target } = task;
            if token.is_cancelled() {
                tracing::debug!(block, ?target, "deferred re-fit skipped: cancelled");
                continue;
            }
            let Some(Some(widget)) = self.widgets.get_mut(block) else {
                continue;
            };
            let doc = &mut self.host.document;
            let fitted = match target {
                RefitTarget::Inline => widget.inline_mut().refit(doc),
                RefitTarget::Overlay => widget.overlay_mut().run_deferred_refit(doc),
            };
            tracing::debug!(block, ?target, fitted, "deferred re-fit fired");
        }
    }

    /// The browser window changed size.
    pub fn resize_viewport(&mut self, viewport: Size) {
        self.host.document.set_viewport(viewport);
        self.refit_all();
    }

    /// Re-fits every live diagram to its current surface size.
    pub fn refit_all(&mut self) {
        let factory = self.bootstrapper.factory();
        let doc = &mut self.host.document;
        for widget in self.widgets.iter_mut().flatten() {
            widget.inline_mut().refit(doc);
            widget.overlay_mut().refit(doc, factory);
        }
    }

    /// Closes overlays, releases listeners and unmounts every diagram. Pending deferred work
    /// becomes a no-op.
    pub fn teardown(&mut self) {
        let doc = &mut self.host.document;
        for widget in self.widgets.iter_mut().flatten() {
            widget.teardown(doc);
        }
        tracing::debug!("page torn down");
    }

    pub fn widget(&self, block: usize) -> Option<&Widget> {
        self.widgets.get(block).and_then(Option::as_ref)
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_overlay_open(&self, block: usize) -> bool {
        self.widget(block).is_some_and(|w| w.overlay().is_open())
    }

    pub fn document(&self) -> &Document {
        &self.host.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.host.document
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn now(&self) -> Duration {
        self.host.now()
    }
}
