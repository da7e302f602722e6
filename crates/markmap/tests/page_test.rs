use markmap::geom::{Size, point, size};
use markmap::{BlockOutcome, Document, MindmapPage, NodeId, WidgetConfig, WidgetError};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn viewport() -> Size {
    size(1024.0, 768.0)
}

fn page_with(blocks: &[&str]) -> MindmapPage {
    let mut doc = Document::new(viewport());
    let body = doc.body();
    for src in blocks {
        let intro = doc.create_element("p");
        doc.set_text(intro, "intro");
        doc.append_child(body, intro);
        doc.append_code_block(body, "markmap", src);
    }
    MindmapPage::new(doc, WidgetConfig::default())
}

fn by_class(doc: &Document, class: &str) -> Vec<markmap::ElementId> {
    doc.find_all(|d, id| d.has_class(id, class))
}

#[test]
fn scenario_a_renders_inline_without_overlay_or_fallback() {
    let mut page = page_with(&["# Root\n## Child A\n## Child B"]);
    let report = page.initialize();
    assert_eq!((report.mounted(), report.failed()), (1, 0));

    let widget = page.widget(0).expect("mounted widget");
    let tree = widget.tree();
    assert_eq!(tree.root().text, "Root");
    let children: Vec<_> = tree.children(NodeId::ROOT).map(|n| n.text.as_str()).collect();
    assert_eq!(children, vec!["Child A", "Child B"]);

    let doc = page.document();
    assert!(!page.is_overlay_open(0));
    assert!(by_class(doc, "markmap-fallback").is_empty());
    assert!(by_class(doc, "markmap-modal").is_empty());
    assert_eq!(by_class(doc, "markmap-container").len(), 1);

    let svg = widget.inline().surface().element();
    assert_eq!(doc.style(svg, "height"), Some("400px"));
    assert_eq!(doc.markup(svg).matches(r#"class="markmap-node""#).count(), 3);
}

#[test]
fn scenario_b_malformed_source_falls_back_to_raw_text() {
    let raw = "---\ntitle: broken\n# Root\n## Child";
    let mut page = page_with(&[raw]);
    let report = page.initialize();
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.error(0), Some(WidgetError::Parse(_))));
    assert!(page.widget(0).is_none());

    let doc = page.document();
    let fallback = by_class(doc, "markmap-fallback");
    assert_eq!(fallback.len(), 1);
    assert_eq!(doc.tag(fallback[0]), "pre");
    assert_eq!(doc.text_content(fallback[0]), raw);
    assert!(by_class(doc, "markmap-container").is_empty());
    assert!(doc.find_all(|d, id| d.tag(id) == "code").is_empty());
}

#[test]
fn failures_stay_inside_their_block() {
    let mut page = page_with(&[
        "# One\n## a",
        "<!-- markmap: fold -->\n",
        "---\nmarkmap:\n  fitRatio: 3\n---\n# Three",
        "# Four\n## b",
    ]);
    let report = page.initialize();
    assert_eq!((report.mounted(), report.failed()), (2, 2));
    assert!(matches!(report.error(1), Some(WidgetError::Parse(_))));
    assert!(matches!(report.error(2), Some(WidgetError::Render(_))));
    assert!(page.widget(0).is_some());
    assert!(page.widget(3).is_some());

    let BlockOutcome::Fallback { element, .. } = &report.blocks[2].outcome else {
        panic!("block 2 should fall back");
    };
    assert_eq!(
        page.document().text_content(*element),
        "---\nmarkmap:\n  fitRatio: 3\n---\n# Three"
    );

    // Fallbacks keep document order.
    let doc = page.document();
    let order: Vec<_> = doc
        .children(doc.body())
        .iter()
        .filter(|id| doc.tag(**id) != "p")
        .map(|id| doc.classes(*id).join(" "))
        .collect();
    assert_eq!(
        order,
        vec![
            "markmap-container",
            "markmap-fallback",
            "markmap-fallback",
            "markmap-container"
        ]
    );
}

#[test]
fn front_matter_options_and_title_apply_per_block() {
    let mut page = page_with(&[
        "---\ntitle: My Map\nmarkmap:\n  initialExpandLevel: 1\n---\n- a\n  - a1\n- b",
        "# Plain\n## x\n### y",
    ]);
    page.initialize();

    let first = page.widget(0).unwrap();
    assert_eq!(first.title(), Some("My Map"));
    assert_eq!(first.tree().root().content, "My Map");
    let handle = first.inline().handle().unwrap();
    assert!(handle.is_folded(NodeId(1)));
    assert_eq!(first.focus_options().initial_expand_level, 1);

    let second = page.widget(1).unwrap().inline().handle().unwrap();
    assert!(!second.is_folded(NodeId(1)));
}

#[test]
fn custom_language_is_discovered() {
    let mut doc = Document::new(viewport());
    let body = doc.body();
    doc.append_code_block(body, "mindmap", "# A");
    doc.append_code_block(body, "markmap", "# B");
    let config = WidgetConfig {
        language: "mindmap".to_string(),
        ..WidgetConfig::default()
    };
    let mut page = MindmapPage::new(doc, config);
    let report = page.initialize();
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(page.widget(0).unwrap().tree().root().text, "A");
}

#[test]
fn initialize_runs_once() {
    let mut page = page_with(&["# Root"]);
    assert_eq!(page.initialize().mounted(), 1);
    assert!(page.initialize().is_empty());
    assert_eq!(page.widget_count(), 1);
}

#[test]
fn deferred_refit_tracks_container_size() {
    let mut page = page_with(&["# Root\n## Child A\n## Child B"]);
    page.initialize();
    let container = page.widget(0).unwrap().container();
    let k0 = page.widget(0).unwrap().inline().handle().unwrap().transform().k;
    assert_eq!(k0, 2.0);

    page.document_mut().set_width(container, 300.0);
    page.advance(Duration::from_millis(99));
    let k = page.widget(0).unwrap().inline().handle().unwrap().transform().k;
    assert_eq!(k, k0);

    page.advance(Duration::from_millis(1));
    let k = page.widget(0).unwrap().inline().handle().unwrap().transform().k;
    assert!(k < 1.0, "k = {k}");
    assert!(page.host().tasks.is_empty());
}

#[test]
fn refit_all_follows_container_resize() {
    let mut page = page_with(&["# Root\n## Child A\n## Child B"]);
    page.initialize();
    let container = page.widget(0).unwrap().container();
    page.document_mut().set_width(container, 300.0);
    page.refit_all();
    let handle = page.widget(0).unwrap().inline().handle().unwrap();
    assert_eq!(handle.viewport(), size(300.0, 400.0));
}

#[test]
fn deferred_refit_after_teardown_is_a_no_op() {
    let mut page = page_with(&["# Root\n## Child A"]);
    page.initialize();
    let svg = page.widget(0).unwrap().inline().surface().element();
    assert!(!page.host().tasks.is_empty());

    page.teardown();
    assert!(page.widget(0).unwrap().inline().token().is_cancelled());
    assert_eq!(page.document().markup(svg), "");
    assert_eq!(page.document().listener_count(), 0);

    page.advance(Duration::from_secs(1));
    assert!(!page.widget(0).unwrap().inline().is_mounted());
    assert_eq!(page.document().markup(svg), "");
}

#[test]
fn toggle_click_folds_without_opening_overlay() {
    let mut page = page_with(&["# Root\n## Child A\n### a1\n## Child B"]);
    page.initialize();
    let widget = page.widget(0).unwrap();
    let svg = widget.inline().surface().element();
    let handle = widget.inline().handle().unwrap();
    let visible = handle.node_views().len();
    let child_a = handle.layout().node(NodeId(1)).unwrap();
    let toggle = handle.transform().apply(child_a.toggle_center().unwrap());

    page.click(svg, toggle);
    assert!(!page.is_overlay_open(0));
    let handle = page.widget(0).unwrap().inline().handle().unwrap();
    assert!(handle.is_folded(NodeId(1)));
    assert_eq!(handle.node_views().len(), visible - 1);
    assert!(!page.document().markup(svg).contains(r#"data-node-id="2""#));
}

#[test]
fn label_click_passes_through_and_canvas_click_opens() {
    let mut page = page_with(&["# Root\n## Child A\n## Child B"]);
    page.initialize();
    let widget = page.widget(0).unwrap();
    let svg = widget.inline().surface().element();
    let label = widget.inline().handle().unwrap().node_views()[1].rect.center();

    page.click(svg, label);
    assert!(!page.is_overlay_open(0));

    page.click(svg, point(2.0, 2.0));
    assert!(page.is_overlay_open(0));
}
