use crate::config::WidgetConfig;
use crate::controller::{DiagramController, RefitRequest};
use crate::dom::{Document, ElementId, Subscription};
use crate::error::WidgetError;
use crate::events::DismissTrigger;
use crate::fallback::FallbackRenderer;
use crate::host::Host;
use crate::overlay::{FocusOverlay, OpenRequest};
use crate::router::ClickRouter;
use crate::surface::SurfaceFactory;
use crate::tasks::RefitTarget;
use markmap_core::{MindmapTree, Transformer};
use markmap_render::{DrawEngine, MarkmapEngine, MarkmapOptions};
use std::rc::Rc;

pub const CONTAINER_CLASS: &str = "markmap-container";

/// One mounted block: its shared tree, the inline diagram and the focus overlay.
#[derive(Debug)]
pub struct Widget {
    index: usize,
    container: ElementId,
    tree: Rc<MindmapTree>,
    title: Option<String>,
    focus_options: MarkmapOptions,
    inline: DiagramController,
    overlay: FocusOverlay,
    router: Option<Subscription>,
}

impl Widget {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn tree(&self) -> &Rc<MindmapTree> {
        &self.tree
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn inline(&self) -> &DiagramController {
        &self.inline
    }

    pub fn inline_mut(&mut self) -> &mut DiagramController {
        &mut self.inline
    }

    pub fn overlay(&self) -> &FocusOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut FocusOverlay {
        &mut self.overlay
    }

    pub fn focus_options(&self) -> &MarkmapOptions {
        &self.focus_options
    }

    /// Releases the router listener, closes the overlay and unmounts the inline diagram.
    pub fn teardown(&mut self, doc: &mut Document) {
        self.overlay.close(doc, DismissTrigger::Teardown);
        if let Some(sub) = self.router.take() {
            doc.unlisten(sub);
        }
        self.inline.unmount(doc);
    }
}

#[derive(Debug)]
pub enum BlockOutcome {
    Mounted,
    /// The block's source is shown as plain text in `element`.
    Fallback {
        element: ElementId,
        error: WidgetError,
    },
}

#[derive(Debug)]
pub struct BlockReport {
    pub index: usize,
    pub outcome: BlockOutcome,
}

/// Per-block results of [`WidgetBootstrapper::initialize`], in document order.
#[derive(Debug, Default)]
pub struct InitReport {
    pub blocks: Vec<BlockReport>,
}

impl InitReport {
    pub fn mounted(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.outcome, BlockOutcome::Mounted))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.blocks.len() - self.mounted()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The error that sent block `index` to the fallback, if any.
    pub fn error(&self, index: usize) -> Option<&WidgetError> {
        self.blocks
            .iter()
            .find(|b| b.index == index)
            .and_then(|b| match &b.outcome {
                BlockOutcome::Fallback { error, .. } => Some(error),
                BlockOutcome::Mounted => None,
            })
    }
}

/// Finds markmap code blocks and turns each into a [`Widget`], or into fallback text when it
/// cannot be parsed or drawn.
pub struct WidgetBootstrapper {
    transformer: Transformer,
    engine: Rc<dyn DrawEngine>,
    factory: SurfaceFactory,
    config: WidgetConfig,
}

impl Default for WidgetBootstrapper {
    fn default() -> Self {
        Self::new(WidgetConfig::default())
    }
}

impl std::fmt::Debug for WidgetBootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetBootstrapper")
            .field("transformer", &self.transformer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WidgetBootstrapper {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            transformer: Transformer::new(),
            engine: Rc::new(MarkmapEngine::default()),
            factory: SurfaceFactory::from_config(&config),
            config,
        }
    }

    pub fn with_engine(mut self, engine: Rc<dyn DrawEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn factory(&self) -> &SurfaceFactory {
        &self.factory
    }

    pub fn engine(&self) -> &dyn DrawEngine {
        self.engine.as_ref()
    }

    /// `pre > code.language-<language>` elements, in document order.
    pub fn discover(&self, doc: &Document) -> Vec<ElementId> {
        let class = format!("language-{}", self.config.language);
        doc.find_all(|d, id| {
            d.tag(id) == "code"
                && d.has_class(id, &class)
                && d.parent(id).is_some_and(|p| d.tag(p) == "pre")
        })
    }

    /// Mounts every block once. A failing block is replaced by its source text and logged; the
    /// remaining blocks are unaffected.
    pub fn initialize(&self, host: &mut Host) -> (Vec<Option<Widget>>, InitReport) {
        let blocks = self.discover(&host.document);
        tracing::debug!(blocks = blocks.len(), "markmap blocks discovered");

        let mut widgets = Vec::with_capacity(blocks.len());
        let mut report = InitReport::default();
        for (index, code) in blocks.into_iter().enumerate() {
            let raw = host.document.text_content(code);
            let pre = host.document.parent(code).unwrap_or(code);
            match self.mount_block(host, index, pre, &raw) {
                Ok(widget) => {
                    widgets.push(Some(widget));
                    report.blocks.push(BlockReport {
                        index,
                        outcome: BlockOutcome::Mounted,
                    });
                }
                Err((target, error)) => {
                    tracing::error!(block = index, error = %error, "failed to render mind map");
                    let element = FallbackRenderer::replace(&mut host.document, target, &raw);
                    widgets.push(None);
                    report.blocks.push(BlockReport {
                        index,
                        outcome: BlockOutcome::Fallback { element, error },
                    });
                }
            }
        }
        (widgets, report)
    }

    /// On failure, returns the element the fallback must replace with the error.
    fn mount_block(
        &self,
        host: &mut Host,
        index: usize,
        pre: ElementId,
        raw: &str,
    ) -> std::result::Result<Widget, (ElementId, WidgetError)> {
        let parsed = self
            .transformer
            .transform(raw)
            .map_err(|e| (pre, WidgetError::from(e)))?;
        let overrides = &parsed.effective_config;
        let inline_options = self
            .config
            .inline
            .with_overrides(overrides)
            .map_err(|e| (pre, WidgetError::from(e)))?;
        let focus_options = self
            .config
            .focus
            .with_overrides(overrides)
            .map_err(|e| (pre, WidgetError::from(e)))?;

        let doc = &mut host.document;
        let container = doc.create_element("div");
        doc.add_class(container, CONTAINER_CLASS);
        doc.replace(pre, container);
        doc.remove(pre);
        let surface = self.factory.create_inline(doc, container);

        let tree = Rc::new(parsed.tree);
        let inline = DiagramController::mount(
            host,
            self.engine.as_ref(),
            surface,
            Rc::clone(&tree),
            &inline_options,
            RefitRequest {
                block: index,
                target: RefitTarget::Inline,
                delay: self.config.refit_delay(),
            },
        )
        .map_err(|e| (container, WidgetError::from(e)))?;

        let router = ClickRouter::attach(&mut host.document, surface.element(), index);
        Ok(Widget {
            index,
            container,
            tree,
            title: parsed.title,
            focus_options,
            inline,
            overlay: FocusOverlay::new(index),
            router: Some(router),
        })
    }

    /// Opens the focus view of `widget`. Returns `false` if it was already open.
    pub fn open_overlay(&self, host: &mut Host, widget: &mut Widget) -> bool {
        widget.overlay.open(
            host,
            OpenRequest {
                engine: self.engine.as_ref(),
                factory: &self.factory,
                tree: &widget.tree,
                options: &widget.focus_options,
                refit_delay: self.config.refit_delay(),
            },
        )
    }
}
