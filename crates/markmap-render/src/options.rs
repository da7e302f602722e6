use crate::{Error, Result};
use markmap_core::MarkmapConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Diagram options. Field names follow the camelCase keys accepted in configs and front matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkmapOptions {
    /// Transition duration for layout changes, in milliseconds.
    pub duration: u32,
    /// Maximum node content width; `0` lets nodes grow to fit their content.
    pub max_width: f64,
    /// `-1` expands every level; `N` expands `N` levels below the root.
    pub initial_expand_level: i32,
    pub spacing_horizontal: f64,
    pub spacing_vertical: f64,
    /// Left/right inset of the drawing area.
    pub padding_x: f64,
    pub auto_fit: bool,
    /// Fraction of the surface the diagram fills after fitting.
    pub fit_ratio: f64,
    /// Nodes deeper than this reuse the color of their ancestor at this depth; `0` colors
    /// every node independently.
    pub color_freeze_level: u32,
    /// Upper bound for the zoom factor picked by [`fit`](crate::Markmap::fit).
    pub max_scale: f64,
    /// Render labels as embedded HTML. Embedded labels own pointer interaction.
    pub html_labels: bool,
}

impl Default for MarkmapOptions {
    fn default() -> Self {
        Self::inline_defaults()
    }
}

/// Alternative spellings accepted in configs, mapped to their canonical key.
const OPTION_ALIASES: &[(&str, &str)] = &[
    ("animationDurationMs", "duration"),
    ("maxNodeWidth", "maxWidth"),
];

impl MarkmapOptions {
    /// Dense defaults for diagrams rendered in the page flow.
    pub fn inline_defaults() -> Self {
        Self {
            duration: 500,
            max_width: 0.0,
            initial_expand_level: -1,
            spacing_horizontal: 120.0,
            spacing_vertical: 10.0,
            padding_x: 20.0,
            auto_fit: true,
            fit_ratio: 0.9,
            color_freeze_level: 0,
            max_scale: 2.0,
            html_labels: true,
        }
    }

    /// Roomier defaults for the enlarged focus view.
    pub fn focus_defaults() -> Self {
        Self {
            spacing_horizontal: 150.0,
            spacing_vertical: 15.0,
            padding_x: 30.0,
            fit_ratio: 0.95,
            ..Self::inline_defaults()
        }
    }

    /// Returns a copy with `overrides` (a JSON object of option keys) applied and validated.
    /// Unknown keys are ignored.
    pub fn with_overrides(&self, overrides: &MarkmapConfig) -> Result<Self> {
        if overrides.is_empty() {
            let out = self.clone();
            out.validate()?;
            return Ok(out);
        }

        let mut merged = MarkmapConfig::from_value(serde_json::to_value(self)?);
        merged.deep_merge(&canonicalize(overrides.as_value()));
        let out: Self = serde_json::from_value(merged.into_value()).map_err(|e| {
            Error::InvalidOption {
                option: "markmap".to_string(),
                message: e.to_string(),
            }
        })?;
        out.validate()?;
        Ok(out)
    }

    pub fn validate(&self) -> Result<()> {
        fn invalid(option: &str, message: impl Into<String>) -> Error {
            Error::InvalidOption {
                option: option.to_string(),
                message: message.into(),
            }
        }

        if !(self.fit_ratio.is_finite() && self.fit_ratio > 0.0 && self.fit_ratio <= 1.0) {
            return Err(invalid("fitRatio", format!("{} is outside (0, 1]", self.fit_ratio)));
        }
        for (name, v) in [
            ("maxWidth", self.max_width),
            ("spacingHorizontal", self.spacing_horizontal),
            ("spacingVertical", self.spacing_vertical),
            ("paddingX", self.padding_x),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(invalid(name, format!("{v} must be a finite, non-negative number")));
            }
        }
        if self.initial_expand_level < -1 {
            return Err(invalid(
                "initialExpandLevel",
                format!("{} is below -1", self.initial_expand_level),
            ));
        }
        if !(self.max_scale.is_finite() && self.max_scale > 0.0) {
            return Err(invalid("maxScale", format!("{} must be positive", self.max_scale)));
        }
        Ok(())
    }

    /// `Some(width)` when node content should wrap.
    pub fn wrap_width(&self) -> Option<f64> {
        (self.max_width > 0.0).then_some(self.max_width)
    }
}

fn canonicalize(overrides: &Value) -> Value {
    let Value::Object(map) = overrides else {
        return overrides.clone();
    };
    let mut out = serde_json::Map::with_capacity(map.len());
    for (key, value) in map {
        let key = OPTION_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key.as_str())
            .map(|(_, canonical)| *canonical)
            .unwrap_or(key.as_str());
        out.insert(key.to_string(), value.clone());
    }
    Value::Object(out)
}
