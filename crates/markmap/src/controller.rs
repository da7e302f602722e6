use crate::dom::Document;
use crate::host::Host;
use crate::surface::Surface;
use crate::tasks::{CancellationToken, RefitTarget, Task};
use markmap_core::{MindmapTree, NodeId};
use markmap_render::{DrawEngine, Markmap, MarkmapOptions};
use std::rc::Rc;
use std::time::Duration;

/// Where a mounted diagram asks for its deferred re-fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefitRequest {
    pub block: usize,
    pub target: RefitTarget,
    pub delay: Duration,
}

/// Binds one diagram handle to one surface for the lifetime of the mount.
#[derive(Debug)]
pub struct DiagramController {
    block: usize,
    surface: Surface,
    handle: Option<Markmap>,
    token: CancellationToken,
}

impl DiagramController {
    /// Renders `tree` onto `surface` and schedules one deferred re-fit, so the diagram is framed
    /// again once the host has settled the surface size.
    pub fn mount(
        host: &mut Host,
        engine: &dyn DrawEngine,
        surface: Surface,
        tree: Rc<MindmapTree>,
        options: &MarkmapOptions,
        refit: RefitRequest,
    ) -> markmap_render::Result<Self> {
        options.validate()?;
        let viewport = surface.size(&host.document);
        let handle = engine.render(tree, options, viewport)?;
        host.document
            .set_markup(surface.element(), handle.to_markup());

        let token = CancellationToken::new();
        host.schedule(
            refit.delay,
            Task::Refit {
                block: refit.block,
                target: refit.target,
            },
            token.clone(),
        );
        tracing::debug!(
            block = refit.block,
            target = ?refit.target,
            width = viewport.width,
            height = viewport.height,
            "diagram mounted"
        );

        Ok(Self {
            block: refit.block,
            surface,
            handle: Some(handle),
            token,
        })
    }

    /// Re-measures the surface and fits the diagram to it. Returns `false` when unmounted, when
    /// the surface has left the document, or when the surface has no area.
    pub fn refit(&mut self, doc: &mut Document) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        let el = self.surface.element();
        if !doc.contains(el) {
            tracing::debug!(block = self.block, "re-fit skipped: surface detached");
            return false;
        }
        handle.resize(self.surface.size(doc));
        let fitted = handle.fit();
        doc.set_markup(el, handle.to_markup());
        fitted
    }

    /// Flips a node's fold state and repaints.
    pub fn toggle_node(&mut self, doc: &mut Document, node: NodeId) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        if !handle.toggle_node(node) {
            return false;
        }
        doc.set_markup(self.surface.element(), handle.to_markup());
        true
    }

    /// Clears the surface and cancels pending deferred work. Safe to call more than once.
    pub fn unmount(&mut self, doc: &mut Document) {
        self.token.cancel();
        if self.handle.take().is_some() {
            doc.set_markup(self.surface.element(), String::new());
            tracing::debug!(block = self.block, "diagram unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&Markmap> {
        self.handle.as_ref()
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for DiagramController {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
