use crate::{Error, MarkmapConfig, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Leading YAML block of a mind map source.
///
/// ```text
/// ---
/// title: Roadmap
/// markmap:
///   colorFreezeLevel: 2
/// ---
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// The `markmap` options object, merged over the site config for this block only.
    pub options: MarkmapConfig,
}

fn frontmatter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^-{3}[ \t]*\n(?:(.*?)\n)?-{3}[ \t]*(?:\n+|$)").expect("valid regex")
    })
}

fn opens_frontmatter(input: &str) -> bool {
    input
        .lines()
        .next()
        .is_some_and(|first| first.trim_end() == "---")
}

/// Splits `input` into its front matter (if any) and the remaining markdown body.
///
/// `input` must already use `\n` line endings.
pub fn split_front_matter(input: &str) -> Result<(Option<FrontMatter>, &str)> {
    if !opens_frontmatter(input) {
        return Ok((None, input));
    }
    let Some(caps) = frontmatter_regex().captures(input) else {
        return Err(Error::MalformedFrontMatter);
    };

    let yaml_body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let raw_yaml: serde_yaml::Value =
        serde_yaml::from_str(yaml_body).map_err(|e| Error::InvalidFrontMatterYaml {
            message: e.to_string(),
        })?;
    let parsed = serde_json::to_value(raw_yaml).map_err(|e| Error::InvalidFrontMatterYaml {
        message: e.to_string(),
    })?;

    let parsed_obj = match parsed {
        Value::Null => Default::default(),
        Value::Object(map) => map,
        _ => {
            return Err(Error::InvalidFrontMatterYaml {
                message: "front-matter must be a mapping".to_string(),
            });
        }
    };

    let title = match parsed_obj.get("title") {
        Some(Value::String(t)) => Some(t.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let mut options = MarkmapConfig::empty_object();
    match parsed_obj.get("markmap") {
        None | Some(Value::Null) => {}
        Some(v @ Value::Object(_)) => options.deep_merge(v),
        Some(_) => {
            return Err(Error::InvalidFrontMatterYaml {
                message: "`markmap` must be a mapping of options".to_string(),
            });
        }
    }

    let end = caps.get(0).map(|m| m.end()).unwrap_or(input.len());
    Ok((Some(FrontMatter { title, options }), &input[end..]))
}
