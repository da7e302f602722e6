#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("failed to parse mind map source: {0}")]
    Parse(#[from] markmap_core::Error),
    #[error("failed to render mind map: {0}")]
    Render(#[from] markmap_render::Error),
    #[error("failed to render focus view: {0}")]
    OverlayRender(#[source] markmap_render::Error),
    #[error("invalid widget config: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, WidgetError>;
