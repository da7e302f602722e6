use crate::error::{Result, WidgetError};
use markmap_core::MarkmapConfig;
use markmap_render::MarkmapOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Page-level widget settings.
///
/// `inline` and `focus` are complete option sets; per-block front matter is layered on top of
/// them when a block mounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    /// Code blocks tagged `language-<language>` are picked up.
    pub language: String,
    /// Inline surface height, in pixels.
    pub inline_height: f64,
    /// Delay before the post-mount re-fit.
    pub refit_delay_ms: u64,
    pub focus_width_ratio: f64,
    pub focus_height_ratio: f64,
    /// Padding inside the focus frame, in pixels.
    pub frame_padding: f64,
    pub inline: MarkmapOptions,
    pub focus: MarkmapOptions,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            language: "markmap".to_string(),
            inline_height: 400.0,
            refit_delay_ms: 100,
            focus_width_ratio: 0.95,
            focus_height_ratio: 0.9,
            frame_padding: 20.0,
            inline: MarkmapOptions::inline_defaults(),
            focus: MarkmapOptions::focus_defaults(),
        }
    }
}

impl WidgetConfig {
    /// Parses a JSON object. Missing keys keep their defaults, including keys missing from the
    /// `inline` and `focus` option objects.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(text).map_err(config_error)?;
        let Value::Object(map) = &mut value else {
            return Err(WidgetError::Config {
                message: "expected a JSON object".to_string(),
            });
        };
        let inline = map.remove("inline");
        let focus = map.remove("focus");

        let mut cfg: WidgetConfig = serde_json::from_value(value).map_err(config_error)?;
        cfg.inline = layered(MarkmapOptions::inline_defaults(), inline)?;
        cfg.focus = layered(MarkmapOptions::focus_defaults(), focus)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(WidgetError::Config {
                message: "`language` must not be empty".to_string(),
            });
        }
        if !(self.inline_height.is_finite() && self.inline_height > 0.0) {
            return Err(WidgetError::Config {
                message: format!("`inlineHeight` {} must be positive", self.inline_height),
            });
        }
        for (name, v) in [
            ("focusWidthRatio", self.focus_width_ratio),
            ("focusHeightRatio", self.focus_height_ratio),
        ] {
            if !(v.is_finite() && v > 0.0 && v <= 1.0) {
                return Err(WidgetError::Config {
                    message: format!("`{name}` {v} is outside (0, 1]"),
                });
            }
        }
        if !(self.frame_padding.is_finite() && self.frame_padding >= 0.0) {
            return Err(WidgetError::Config {
                message: format!("`framePadding` {} must be non-negative", self.frame_padding),
            });
        }
        self.inline.validate().map_err(config_error)?;
        self.focus.validate().map_err(config_error)?;
        Ok(())
    }

    pub fn refit_delay(&self) -> Duration {
        Duration::from_millis(self.refit_delay_ms)
    }
}

fn layered(base: MarkmapOptions, overrides: Option<Value>) -> Result<MarkmapOptions> {
    match overrides {
        None => Ok(base),
        Some(v) => base
            .with_overrides(&MarkmapConfig::from_value(v))
            .map_err(config_error),
    }
}

fn config_error(e: impl std::fmt::Display) -> WidgetError {
    WidgetError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_option_sets_keep_their_own_defaults() {
        let cfg = WidgetConfig::from_json_str(
            r#"{"inlineHeight": 320, "focus": {"spacingVertical": 40}, "inline": {"duration": 0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.inline_height, 320.0);
        assert_eq!(cfg.refit_delay(), Duration::from_millis(100));
        assert_eq!(cfg.inline.duration, 0);
        assert_eq!(cfg.inline.spacing_horizontal, 120.0);
        assert_eq!(cfg.focus.spacing_vertical, 40.0);
        assert_eq!(cfg.focus.spacing_horizontal, 150.0);
        assert_eq!(cfg.focus.fit_ratio, 0.95);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for text in [
            "[]",
            "{",
            r#"{"language": ""}"#,
            r#"{"focusWidthRatio": 0}"#,
            r#"{"inline": {"fitRatio": 2}}"#,
        ] {
            let err = WidgetConfig::from_json_str(text).unwrap_err();
            assert!(matches!(err, WidgetError::Config { .. }), "{text}: {err}");
        }
    }
}
