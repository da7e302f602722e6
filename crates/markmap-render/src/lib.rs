#![forbid(unsafe_code)]

//! Headless layout + SVG rendering for mind map trees.
//!
//! The [`DrawEngine`] trait is the seam used by interactive hosts: it turns a shared
//! [`MindmapTree`](markmap_core::MindmapTree) plus [`MarkmapOptions`] into a live [`Markmap`]
//! handle bound to one surface size. The handle owns fold state and the pan/zoom transform, and
//! exposes [`Markmap::fit`] to re-frame the diagram.

pub mod color;
pub mod engine;
pub mod layout;
pub mod markmap;
pub mod model;
pub mod options;
pub mod svg;
pub mod text;
pub mod viewport;

pub use engine::{DrawEngine, MarkmapEngine};
pub use markmap::{Hit, HitRegion, Markmap, NodeView};
pub use options::MarkmapOptions;
pub use viewport::ViewTransform;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid option `{option}`: {message}")]
    InvalidOption { option: String, message: String },
    #[error("cannot render an empty tree")]
    EmptyTree,
    #[error("drawing surface unavailable: {message}")]
    SurfaceUnavailable { message: String },
    #[error("options JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
