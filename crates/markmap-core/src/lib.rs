#![forbid(unsafe_code)]

//! Markdown outline parser + mind map tree model (headless).
//!
//! Design goals:
//! - one immutable [`MindmapTree`] per source block, shared (not copied) by every view of it
//! - deterministic, testable outputs (no global counters, no randomness)
//! - an explicit [`Transformer`] service instead of process-wide state

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod geom;
pub mod transform;
pub mod tree;

pub use config::MarkmapConfig;
pub use error::{Error, Result};
pub use frontmatter::FrontMatter;
pub use transform::{TransformResult, Transformer};
pub use tree::{Fold, MindmapNode, MindmapTree, NodeId, NodeKind};
