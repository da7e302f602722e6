use crate::tree::{Fold, MindmapNode, MindmapTree, NodeId, NodeKind};
use crate::{Error, Result};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use std::sync::OnceLock;

fn fold_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*<!--\s*markmap:\s*(foldAll|fold)\s*-->\s*$").expect("valid regex")
    })
}

fn fold_comment(event: &Event<'_>) -> Option<Fold> {
    let (Event::Html(raw) | Event::InlineHtml(raw)) = event else {
        return None;
    };
    let caps = fold_comment_regex().captures(raw)?;
    match caps.get(1).map(|m| m.as_str()) {
        Some("foldAll") => Some(Fold::FoldAll),
        Some(_) => Some(Fold::Fold),
        None => None,
    }
}

fn is_html_comment(raw: &str) -> bool {
    let t = raw.trim();
    t.is_empty() || (t.starts_with("<!--") && t.ends_with("-->"))
}

struct Draft<'a> {
    parent: Option<usize>,
    kind: NodeKind,
    events: Vec<Event<'a>>,
    text: String,
    fold: Fold,
}

impl Draft<'_> {
    fn has_payload(&self) -> bool {
        self.events.iter().any(|e| match e {
            Event::Start(_) | Event::End(_) | Event::SoftBreak | Event::HardBreak => false,
            Event::Html(raw) | Event::InlineHtml(raw) => !is_html_comment(raw),
            _ => true,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Capture {
    Heading(usize),
    Item(usize),
    /// Top-level block; `depth` counts open tags, `unwrap` drops the outer paragraph tags.
    Block {
        node: usize,
        depth: usize,
        unwrap: bool,
    },
}

#[derive(Default)]
struct TreeBuilder<'a> {
    drafts: Vec<Draft<'a>>,
    headings: Vec<(u8, usize)>,
    items: Vec<usize>,
    capture: Option<Capture>,
}

impl<'a> TreeBuilder<'a> {
    fn new_draft(&mut self, parent: Option<usize>, kind: NodeKind) -> usize {
        self.drafts.push(Draft {
            parent,
            kind,
            events: Vec::new(),
            text: String::new(),
            fold: Fold::None,
        });
        self.drafts.len() - 1
    }

    fn current_heading(&self) -> Option<usize> {
        self.headings.last().map(|(_, idx)| *idx)
    }

    fn append(&mut self, node: usize, event: Event<'a>) {
        let draft = &mut self.drafts[node];
        match &event {
            Event::Text(t) | Event::Code(t) => draft.text.push_str(t),
            Event::SoftBreak => draft.text.push(' '),
            Event::HardBreak => draft.text.push('\n'),
            Event::TaskListMarker(checked) => {
                draft.text.push_str(if *checked { "[x] " } else { "[ ] " })
            }
            _ => {}
        }
        draft.events.push(event);
    }

    fn line_break(&mut self, node: usize) {
        let draft = &mut self.drafts[node];
        draft.events.push(Event::HardBreak);
        draft.text.push('\n');
    }

    fn apply_fold(&mut self, fold: Fold) {
        let target = match self.capture {
            Some(Capture::Heading(n)) | Some(Capture::Item(n)) => Some(n),
            _ => self.items.last().copied().or_else(|| self.current_heading()),
        };
        let Some(target) = target else {
            return;
        };
        let slot = &mut self.drafts[target].fold;
        if *slot != Fold::FoldAll {
            *slot = fold;
        }
    }

    fn push(&mut self, event: Event<'a>) {
        if let Some(fold) = fold_comment(&event) {
            self.apply_fold(fold);
            return;
        }
        match self.capture {
            Some(Capture::Heading(node)) => match event {
                Event::End(TagEnd::Heading(_)) => self.capture = None,
                other => self.append(node, other),
            },
            Some(Capture::Item(node)) => self.push_in_item(node, event),
            Some(Capture::Block {
                node,
                depth,
                unwrap,
            }) => self.push_in_block(node, depth, unwrap, event),
            None => self.push_top(event),
        }
    }

    fn push_in_item(&mut self, node: usize, event: Event<'a>) {
        match event {
            // Nested lists produce their own nodes.
            Event::Start(Tag::List(_)) => self.capture = None,
            Event::End(TagEnd::Item) => self.close_item(),
            Event::Start(Tag::Paragraph) => {
                if !self.drafts[node].events.is_empty() {
                    self.line_break(node);
                }
            }
            Event::End(TagEnd::Paragraph) => {}
            other => self.append(node, other),
        }
    }

    fn push_in_block(&mut self, node: usize, depth: usize, unwrap: bool, event: Event<'a>) {
        let depth = match &event {
            Event::Start(_) => depth + 1,
            Event::End(_) => depth.saturating_sub(1),
            _ => depth,
        };
        if depth == 0 {
            self.capture = None;
            if !unwrap {
                self.append(node, event);
            }
            self.finish_block(node);
            return;
        }
        self.capture = Some(Capture::Block {
            node,
            depth,
            unwrap,
        });
        self.append(node, event);
    }

    fn push_top(&mut self, event: Event<'a>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) if self.items.is_empty() => {
                let level = level as u8;
                while self.headings.last().is_some_and(|(l, _)| *l >= level) {
                    self.headings.pop();
                }
                let parent = self.current_heading();
                let idx = self.new_draft(parent, NodeKind::Heading(level));
                self.headings.push((level, idx));
                self.capture = Some(Capture::Heading(idx));
            }
            Event::Start(Tag::Item) => self.open_item(),
            Event::End(TagEnd::Item) => self.close_item(),
            Event::Start(Tag::List(_)) | Event::End(TagEnd::List(_)) | Event::Rule => {}
            other => {
                // Content after a nested list still belongs to the enclosing item.
                if let Some(&item) = self.items.last() {
                    self.capture = Some(Capture::Item(item));
                    self.push_in_item(item, other);
                    return;
                }
                self.start_block(other);
            }
        }
    }

    fn start_block(&mut self, event: Event<'a>) {
        let parent = self.current_heading();
        match event {
            Event::Start(Tag::Paragraph) => {
                let idx = self.new_draft(parent, NodeKind::Block);
                self.capture = Some(Capture::Block {
                    node: idx,
                    depth: 1,
                    unwrap: true,
                });
            }
            Event::Start(tag) => {
                let idx = self.new_draft(parent, NodeKind::Block);
                self.append(idx, Event::Start(tag));
                self.capture = Some(Capture::Block {
                    node: idx,
                    depth: 1,
                    unwrap: false,
                });
            }
            Event::End(_) => {}
            stray => {
                let idx = self.new_draft(parent, NodeKind::Block);
                self.append(idx, stray);
                self.finish_block(idx);
            }
        }
    }

    fn finish_block(&mut self, node: usize) {
        if !self.drafts[node].has_payload() && node + 1 == self.drafts.len() {
            self.drafts.pop();
        }
    }

    fn open_item(&mut self) {
        let parent = self
            .items
            .last()
            .copied()
            .or_else(|| self.current_heading());
        let idx = self.new_draft(parent, NodeKind::ListItem);
        self.items.push(idx);
        self.capture = Some(Capture::Item(idx));
    }

    fn close_item(&mut self) {
        self.items.pop();
        self.capture = None;
    }

    fn finish(self, title: Option<&str>) -> Result<MindmapTree> {
        if self.drafts.is_empty() {
            return Err(Error::EmptyDocument);
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.drafts.len()];
        let mut top = Vec::new();
        for (idx, draft) in self.drafts.iter().enumerate() {
            match draft.parent {
                Some(p) => children[p].push(idx),
                None => top.push(idx),
            }
        }

        let mut rendered: Vec<Option<(NodeKind, String, String, Fold)>> = self
            .drafts
            .into_iter()
            .map(|d| {
                let mut content = String::new();
                html::push_html(&mut content, d.events.into_iter());
                Some((
                    d.kind,
                    content.trim().to_string(),
                    d.text.trim().to_string(),
                    d.fold,
                ))
            })
            .collect();

        #[derive(Clone, Copy)]
        enum Slot {
            Synthetic,
            Draft(usize),
        }

        let root = if top.len() == 1 {
            Slot::Draft(top[0])
        } else {
            Slot::Synthetic
        };

        let mut nodes: Vec<MindmapNode> = Vec::with_capacity(rendered.len() + 1);
        let mut stack: Vec<(Slot, Option<NodeId>, u32)> = vec![(root, None, 0)];
        while let Some((slot, parent, depth)) = stack.pop() {
            let ((kind, content, text, fold), kids) = match slot {
                Slot::Synthetic => {
                    let title = title.unwrap_or_default().trim();
                    (
                        (
                            NodeKind::Root,
                            htmlize::escape_text(title).into_owned(),
                            title.to_string(),
                            Fold::None,
                        ),
                        top.as_slice(),
                    )
                }
                Slot::Draft(idx) => {
                    let Some(parts) = rendered[idx].take() else {
                        continue;
                    };
                    (parts, children[idx].as_slice())
                }
            };

            let id = NodeId(nodes.len() as u32);
            if let Some(p) = parent {
                nodes[p.index()].children.push(id);
            }

            let fold = match parent.map(|p| nodes[p.index()].fold) {
                Some(Fold::FoldAll) => Fold::FoldAll,
                _ => fold,
            };

            nodes.push(MindmapNode {
                id,
                parent,
                depth,
                kind,
                content,
                text,
                children: Vec::new(),
                fold,
            });
            for &kid in kids.iter().rev() {
                stack.push((Slot::Draft(kid), Some(id), depth + 1));
            }
        }

        Ok(MindmapTree::from_preorder(nodes))
    }
}

/// Builds a tree from a markdown body (front matter already stripped).
pub(super) fn build_tree(body: &str, title: Option<&str>) -> Result<MindmapTree> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(body, options) {
        builder.push(event);
    }
    builder.finish(title)
}
