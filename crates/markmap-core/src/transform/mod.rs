mod builder;

#[cfg(test)]
mod tests;

use crate::frontmatter::split_front_matter;
use crate::{MarkmapConfig, MindmapTree, Result};

/// Result of turning one source block into a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub tree: MindmapTree,
    /// Front-matter `title`, if any.
    pub title: Option<String>,
    /// Options found in the block's front matter (`markmap:` key).
    pub config: MarkmapConfig,
    /// Site config with the block's front-matter options merged on top.
    pub effective_config: MarkmapConfig,
}

/// Markdown-to-tree service.
///
/// Holds no per-block state, so one instance can be shared by every block of a document.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    site_config: MarkmapConfig,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Site-wide option defaults. Per-block front matter wins over these.
    pub fn with_site_config(mut self, site_config: MarkmapConfig) -> Self {
        self.site_config.deep_merge(site_config.as_value());
        self
    }

    pub fn site_config(&self) -> &MarkmapConfig {
        &self.site_config
    }

    /// Parses `text` into a tree. Pure: identical input yields an identical result.
    ///
    /// Surrounding whitespace is ignored, so front matter after a blank first line still counts.
    pub fn transform(&self, text: &str) -> Result<TransformResult> {
        let cleaned = normalize_newlines(text.trim());
        let (front_matter, body) = split_front_matter(&cleaned)?;
        let (title, config) = match front_matter {
            Some(fm) => (fm.title, fm.options),
            None => (None, MarkmapConfig::empty_object()),
        };

        let tree = builder::build_tree(body, title.as_deref())?;

        let mut effective_config = self.site_config.clone();
        effective_config.deep_merge(config.as_value());

        tracing::trace!(nodes = tree.len(), "mind map source transformed");
        Ok(TransformResult {
            tree,
            title,
            config,
            effective_config,
        })
    }
}

fn normalize_newlines(input: &str) -> String {
    if !input.contains('\r') {
        return input.to_string();
    }
    input.replace("\r\n", "\n").replace('\r', "\n")
}
