#![forbid(unsafe_code)]

//! Headless interactive mind map widgets for markdown documents.
//!
//! Every `pre > code.language-markmap` block of a [`Document`] becomes an inline diagram; a click
//! on the diagram's canvas opens an enlarged focus view over the page, and a block that cannot be
//! parsed or drawn is shown as its raw source instead. The embedding host drives everything
//! through [`MindmapPage`]: it delivers clicks and key presses and advances the clock that runs
//! deferred re-fits.
//!
//! ```
//! use markmap::{Document, MindmapPage, WidgetConfig};
//! use markmap::geom::size;
//!
//! let mut doc = Document::new(size(1024.0, 768.0));
//! let body = doc.body();
//! doc.append_code_block(body, "markmap", "# Root\n## Child A\n## Child B\n");
//!
//! let mut page = MindmapPage::new(doc, WidgetConfig::default());
//! let report = page.initialize();
//! assert_eq!(report.mounted(), 1);
//! ```

pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod events;
pub mod fallback;
pub mod host;
pub mod overlay;
pub mod page;
pub mod router;
pub mod surface;
pub mod tasks;

pub use bootstrap::{BlockOutcome, BlockReport, InitReport, Widget, WidgetBootstrapper};
pub use config::WidgetConfig;
pub use controller::DiagramController;
pub use dom::{Document, ElementId, Subscription};
pub use error::{Result, WidgetError};
pub use events::DismissTrigger;
pub use fallback::FallbackRenderer;
pub use overlay::FocusOverlay;
pub use page::MindmapPage;
pub use router::{ClickRouter, RouteDecision};
pub use surface::{Surface, SurfaceFactory, SurfaceKind};

pub use markmap_core::{MindmapTree, NodeId, Transformer, geom};
pub use markmap_render::{DrawEngine, MarkmapEngine, MarkmapOptions};
