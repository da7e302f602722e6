use super::*;
use crate::{Error, Fold, NodeId, NodeKind};
use serde_json::json;

fn tree(text: &str) -> MindmapTree {
    Transformer::new().transform(text).unwrap().tree
}

fn texts(tree: &MindmapTree) -> Vec<(u32, &str)> {
    tree.nodes()
        .iter()
        .map(|n| (n.depth, n.text.as_str()))
        .collect()
}

#[test]
fn headings_nest_by_level() {
    let t = tree("# Root\n## Child A\n## Child B");
    assert_eq!(t.len(), 3);
    assert_eq!(t.root().text, "Root");
    assert_eq!(t.root().kind, NodeKind::Heading(1));
    assert_eq!(t.root().children, vec![NodeId(1), NodeId(2)]);
    assert_eq!(t.node(NodeId(1)).text, "Child A");
    assert_eq!(t.node(NodeId(2)).text, "Child B");
    assert_eq!(t.node(NodeId(2)).parent, Some(NodeId::ROOT));
}

#[test]
fn skipped_heading_levels_attach_to_nearest_shallower_heading() {
    let t = tree("# Root\n### Deep\n## Mid\n#### Deeper");
    assert_eq!(
        texts(&t),
        vec![(0, "Root"), (1, "Deep"), (1, "Mid"), (2, "Deeper")]
    );
}

#[test]
fn list_items_nest_under_headings_and_items() {
    let t = tree("# Root\n- a\n  - a1\n  - a2\n- b\n");
    assert_eq!(
        texts(&t),
        vec![(0, "Root"), (1, "a"), (2, "a1"), (2, "a2"), (1, "b")]
    );
    assert_eq!(t.node(NodeId(1)).kind, NodeKind::ListItem);
}

#[test]
fn several_top_level_nodes_get_a_synthetic_root() {
    let t = tree("- one\n- two\n");
    assert_eq!(t.root().kind, NodeKind::Root);
    assert_eq!(t.root().text, "");
    assert_eq!(t.root().children.len(), 2);
}

#[test]
fn frontmatter_title_names_the_synthetic_root() {
    let t = tree("---\ntitle: Plan <A>\n---\n- one\n- two\n");
    assert_eq!(t.root().text, "Plan <A>");
    assert_eq!(t.root().content, "Plan &lt;A&gt;");
}

#[test]
fn leading_blank_lines_do_not_hide_frontmatter() {
    let result = Transformer::new()
        .transform("\n\n---\ntitle: T\nmarkmap:\n  maxWidth: 300\n---\n- a\n- b\n  \n")
        .unwrap();
    assert_eq!(result.title.as_deref(), Some("T"));
    assert_eq!(result.config.get_i64("maxWidth"), Some(300));
    assert_eq!(texts(&result.tree), vec![(0, "T"), (1, "a"), (1, "b")]);
}

#[test]
fn inline_markdown_is_rendered_to_html() {
    let t = tree("# Root\n## **bold** and `code`");
    let child = t.node(NodeId(1));
    assert_eq!(
        child.content,
        "<strong>bold</strong> and <code>code</code>"
    );
    assert_eq!(child.text, "bold and code");
}

#[test]
fn loose_item_paragraphs_are_joined_with_line_breaks() {
    let t = tree("- first\n\n  second\n- other\n");
    let item = t.node(NodeId(1));
    assert_eq!(item.text, "first\nsecond");
    assert!(item.content.contains("<br />"));
}

#[test]
fn paragraphs_under_headings_become_leaves() {
    let t = tree("# Root\nSome prose.\n\n## Child\n");
    assert_eq!(texts(&t), vec![(0, "Root"), (1, "Some prose."), (1, "Child")]);
    assert_eq!(t.node(NodeId(1)).kind, NodeKind::Block);
    assert!(!t.node(NodeId(1)).content.starts_with("<p>"));
}

#[test]
fn code_blocks_keep_their_markup() {
    let t = tree("# Root\n```\nlet x = 1;\n```\n");
    let code = t.node(NodeId(1));
    assert!(code.content.starts_with("<pre><code>"));
    assert_eq!(code.text, "let x = 1;");
}

#[test]
fn fold_comments_mark_nodes() {
    let t = tree("# Root\n## A <!-- markmap: fold -->\n### A1\n## B <!-- markmap: foldAll -->\n### B1\n");
    let a = &t.nodes()[1];
    assert_eq!(a.text, "A");
    assert_eq!(a.fold, Fold::Fold);
    assert_eq!(t.nodes()[2].fold, Fold::None);
    let b = &t.nodes()[3];
    assert_eq!(b.fold, Fold::FoldAll);
    assert_eq!(t.nodes()[4].fold, Fold::FoldAll);
}

#[test]
fn standalone_fold_comment_applies_to_current_heading() {
    let t = tree("# Root\n## A\n<!-- markmap: fold -->\n\n- x\n");
    assert_eq!(t.len(), 3);
    assert_eq!(t.nodes()[1].fold, Fold::Fold);
}

#[test]
fn crlf_input_is_normalized() {
    assert_eq!(tree("# Root\r\n## A\r\n"), tree("# Root\n## A\n"));
}

#[test]
fn blank_input_is_an_empty_document() {
    let err = Transformer::new().transform("   \n\n").unwrap_err();
    assert!(matches!(err, Error::EmptyDocument));
}

#[test]
fn comment_only_input_is_an_empty_document() {
    let err = Transformer::new().transform("<!-- nothing -->\n").unwrap_err();
    assert!(matches!(err, Error::EmptyDocument));
}

#[test]
fn unterminated_frontmatter_fails() {
    let err = Transformer::new()
        .transform("---\nmarkmap:\n  maxWidth: 300\n# Root\n")
        .unwrap_err();
    assert!(matches!(err, Error::MalformedFrontMatter));
}

#[test]
fn frontmatter_options_merge_over_site_config() {
    let transformer = Transformer::new().with_site_config(MarkmapConfig::from_value(json!({
        "colorFreezeLevel": 1,
        "spacingVertical": 4,
    })));
    let result = transformer
        .transform("---\nmarkmap:\n  colorFreezeLevel: 3\n---\n# Root\n")
        .unwrap();
    assert_eq!(result.config.get_i64("colorFreezeLevel"), Some(3));
    assert_eq!(result.effective_config.get_i64("colorFreezeLevel"), Some(3));
    assert_eq!(result.effective_config.get_i64("spacingVertical"), Some(4));
}

#[test]
fn ancestor_at_depth_walks_up() {
    let t = tree("# R\n## A\n### A1\n#### A1x\n");
    assert_eq!(t.ancestor_at_depth(NodeId(3), 1), NodeId(1));
    assert_eq!(t.ancestor_at_depth(NodeId(1), 2), NodeId(1));
    assert_eq!(t.max_depth(), 3);
}
