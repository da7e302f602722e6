use crate::dom::{Document, ElementId};

/// Shows a block's source as plain preformatted text when it cannot be drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRenderer;

impl FallbackRenderer {
    /// Puts `pre.markmap-fallback` holding `raw` verbatim where `target` was, and frees `target`.
    pub fn replace(doc: &mut Document, target: ElementId, raw: &str) -> ElementId {
        let pre = doc.create_element("pre");
        doc.add_class(pre, "markmap-fallback");
        doc.set_text(pre, raw);
        if !doc.replace(target, pre) {
            let body = doc.body();
            doc.append_child(body, pre);
        }
        doc.remove(target);
        pre
    }
}
