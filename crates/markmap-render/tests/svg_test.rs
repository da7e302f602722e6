use markmap_core::Transformer;
use markmap_core::geom::size;
use markmap_render::svg::render_svg_document;
use markmap_render::{DrawEngine, MarkmapEngine, MarkmapOptions};
use std::rc::Rc;

fn render(src: &str, opts: MarkmapOptions) -> String {
    let tree = Rc::new(Transformer::new().transform(src).expect("parse ok").tree);
    let mm = MarkmapEngine::default()
        .render(tree, &opts, size(640.0, 400.0))
        .expect("render ok");
    render_svg_document(&mm, "mm-0")
}

#[test]
fn svg_document_is_well_formed() {
    let svg = render(
        "# Root\n## A & B\n- `x < y`\n- **bold**\n",
        MarkmapOptions::inline_defaults(),
    );
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("width"), Some("640"));

    let nodes: Vec<_> = doc
        .descendants()
        .filter(|n| n.attribute("class") == Some("markmap-node"))
        .collect();
    assert_eq!(nodes.len(), 4);
    let links = doc
        .descendants()
        .filter(|n| n.attribute("class") == Some("markmap-link"))
        .count();
    assert_eq!(links, 3);
    assert!(
        doc.descendants()
            .any(|n| n.has_tag_name("foreignObject"))
    );
}

#[test]
fn transition_uses_configured_duration() {
    let svg = render(
        "# Root\n",
        MarkmapOptions {
            duration: 150,
            ..MarkmapOptions::inline_defaults()
        },
    );
    assert!(svg.contains("transition: transform 150ms"));
}

#[test]
fn plain_text_labels_escape_content() {
    let svg = render(
        "# a < b & c\n",
        MarkmapOptions {
            html_labels: false,
            ..MarkmapOptions::inline_defaults()
        },
    );
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let tspan = doc
        .descendants()
        .find(|n| n.has_tag_name("tspan"))
        .expect("label tspan");
    assert_eq!(tspan.text(), Some("a < b & c"));
    assert!(!doc.descendants().any(|n| n.has_tag_name("foreignObject")));
    let node = doc
        .descendants()
        .find(|n| n.attribute("class") == Some("markmap-node"))
        .unwrap();
    assert_eq!(node.attribute("data-interactive"), Some("false"));
}

#[test]
fn only_parents_get_toggles() {
    let svg = render("# Root\n## A\n## B\n", MarkmapOptions::inline_defaults());
    assert_eq!(svg.matches("markmap-toggle").count(), 1);
}
