//! A small headless document: an element arena with classes, attributes, inline styles, text,
//! opaque SVG markup, host-reported sizes and listener registrations.
//!
//! Removing an element frees its slot and its whole subtree. Slots are reused, and an
//! [`ElementId`] carries the generation of the slot it was issued for, so a stale id never aliases
//! a newer element: queries on it return empty values and mutations are ignored.

use crate::events::{EventKind, Handler};
use indexmap::IndexMap;
use markmap_core::geom::{Size, size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    fn index(self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    text: String,
    markup: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Element(ElementId),
    Document,
}

#[derive(Debug)]
struct Listener {
    id: u64,
    target: ListenerTarget,
    kind: EventKind,
    handler: Handler,
}

/// A live listener registration. Not `Clone`: it is released exactly once, by handing it back
/// to [`Document::unlisten`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a dropped Subscription can never be released"]
pub struct Subscription {
    id: u64,
}

#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: ElementId,
    body: ElementId,
    viewport: Size,
    listeners: Vec<Listener>,
    next_listener: u64,
}

impl Document {
    /// An empty `html > body` document filling `viewport`.
    pub fn new(viewport: Size) -> Self {
        let placeholder = ElementId {
            index: 0,
            generation: 0,
        };
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: placeholder,
            body: placeholder,
            viewport,
            listeners: Vec::new(),
            next_listener: 0,
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.body);
        doc.set_viewport(viewport);
        doc
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let body = self.body;
        self.set_width(body, viewport.width);
        self.set_height(body, viewport.height);
    }

    fn el(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn el_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let element = Element {
            tag: tag.to_string(),
            ..Element::default()
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            return ElementId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            element: Some(element),
        });
        ElementId {
            index,
            generation: 0,
        }
    }

    /// Whether `id` still names an element, attached or not.
    pub fn is_live(&self, id: ElementId) -> bool {
        self.el(id).is_some()
    }

    /// Number of live elements, attached or detached.
    pub fn element_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if !self.is_live(parent) || !self.is_live(child) {
            return;
        }
        self.detach(child);
        if let Some(c) = self.el_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.el_mut(parent) {
            p.children.push(child);
        }
    }

    /// Puts `new` where `old` is and detaches `old`. Returns `false` if `old` has no parent.
    pub fn replace(&mut self, old: ElementId, new: ElementId) -> bool {
        let Some(parent) = self.parent(old) else {
            return false;
        };
        if !self.is_live(new) {
            return false;
        }
        self.detach(new);
        let Some(siblings) = self.el_mut(parent).map(|p| &mut p.children) else {
            return false;
        };
        let Some(pos) = siblings.iter().position(|c| *c == old) else {
            return false;
        };
        siblings[pos] = new;
        if let Some(n) = self.el_mut(new) {
            n.parent = Some(parent);
        }
        if let Some(o) = self.el_mut(old) {
            o.parent = None;
        }
        true
    }

    /// Detaches `id` and frees it together with its subtree and every listener registered on
    /// them. The document root and body cannot be removed.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.root || id == self.body || !self.is_live(id) {
            return;
        }
        self.detach(id);
        let freed = self.descendants(id);
        self.listeners.retain(|l| match l.target {
            ListenerTarget::Element(t) => !freed.contains(&t),
            ListenerTarget::Document => true,
        });
        for dead in freed {
            let slot = &mut self.slots[dead.index()];
            slot.element = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(dead.index);
        }
    }

    fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.el_mut(id).and_then(|e| e.parent.take()) else {
            return;
        };
        if let Some(p) = self.el_mut(parent) {
            p.children.retain(|c| *c != id);
        }
    }

    /// Whether `id` is live and attached to the document tree.
    pub fn contains(&self, id: ElementId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.el(cur).and_then(|e| e.parent) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.el(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.el(id)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
    }

    pub fn tag(&self, id: ElementId) -> &str {
        self.el(id).map(|e| e.tag.as_str()).unwrap_or_default()
    }

    /// `id` and everything below it, in document order.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.is_live(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.children(cur).iter().rev().copied());
        }
        out
    }

    /// Attached elements matching `pred`, in document order.
    pub fn find_all(&self, pred: impl Fn(&Document, ElementId) -> bool) -> Vec<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| pred(self, *id))
            .collect()
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        let Some(el) = self.el_mut(id) else {
            return;
        };
        if !el.classes.iter().any(|c| c == class) {
            el.classes.push(class.to_string());
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    pub fn classes(&self, id: ElementId) -> &[String] {
        self.el(id)
            .map(|e| e.classes.as_slice())
            .unwrap_or_default()
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        if let Some(el) = self.el_mut(id) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        if let Some(el) = self.el_mut(id) {
            el.attributes.shift_remove(name);
        }
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.el(id)?.attributes.get(name).map(String::as_str)
    }

    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) {
        if let Some(el) = self.el_mut(id) {
            el.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&mut self, id: ElementId, property: &str) {
        if let Some(el) = self.el_mut(id) {
            el.style.shift_remove(property);
        }
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.el(id)?.style.get(property).map(String::as_str)
    }

    /// Inline `style` attribute text, in declaration order.
    pub fn style_text(&self, id: ElementId) -> String {
        self.el(id)
            .map(|e| {
                e.style
                    .iter()
                    .map(|(k, v)| format!("{k}: {v};"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(el) = self.el_mut(id) {
            el.text = text.to_string();
        }
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: ElementId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.el(d))
            .map(|e| e.text.as_str())
            .collect()
    }

    /// Opaque rendered content (SVG markup) owned by the element.
    pub fn set_markup(&mut self, id: ElementId, markup: String) {
        if let Some(el) = self.el_mut(id) {
            el.markup = markup;
        }
    }

    pub fn markup(&self, id: ElementId) -> &str {
        self.el(id).map(|e| e.markup.as_str()).unwrap_or_default()
    }

    pub fn set_width(&mut self, id: ElementId, width: f64) {
        if let Some(el) = self.el_mut(id) {
            el.width = Some(width);
        }
    }

    pub fn set_height(&mut self, id: ElementId, height: f64) {
        if let Some(el) = self.el_mut(id) {
            el.height = Some(height);
        }
    }

    /// Laid-out size. Without an explicit width an element spans its parent's width; without an
    /// explicit height it has none. A freed element has no size.
    pub fn size(&self, id: ElementId) -> Size {
        let Some(el) = self.el(id) else {
            return size(0.0, 0.0);
        };
        let width = match (el.width, el.parent) {
            (Some(w), _) => w,
            (None, Some(p)) => self.size(p).width,
            (None, None) => 0.0,
        };
        size(width, el.height.unwrap_or(0.0))
    }

    /// Appends `pre > code.language-<language>` holding `source` to `parent`; returns the `pre`.
    pub fn append_code_block(
        &mut self,
        parent: ElementId,
        language: &str,
        source: &str,
    ) -> ElementId {
        let pre = self.create_element("pre");
        let code = self.create_element("code");
        self.add_class(code, &format!("language-{language}"));
        self.set_text(code, source);
        self.append_child(pre, code);
        self.append_child(parent, pre);
        pre
    }

    pub fn listen(
        &mut self,
        target: ListenerTarget,
        kind: EventKind,
        handler: Handler,
    ) -> Subscription {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            target,
            kind,
            handler,
        });
        Subscription { id }
    }

    /// Releases a registration. Returns `false` if it was already gone.
    pub fn unlisten(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != subscription.id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listener_count_on(&self, target: ListenerTarget) -> usize {
        self.listeners.iter().filter(|l| l.target == target).count()
    }

    fn handlers_on(
        &self,
        target: ListenerTarget,
        kind: EventKind,
    ) -> impl Iterator<Item = Handler> + '_ {
        self.listeners
            .iter()
            .filter(move |l| l.target == target && l.kind == kind)
            .map(|l| l.handler)
    }

    /// Handlers an event of `kind` on `target` reaches: the target first, then each ancestor,
    /// then the document. An element holding a propagation-stopping handler ends the path after
    /// its own handlers. The list is a snapshot taken before any handler runs.
    pub fn propagation_path(&self, target: ElementId, kind: EventKind) -> Vec<Handler> {
        let mut out = Vec::new();
        let mut cur = Some(target);
        while let Some(id) = cur {
            let before = out.len();
            out.extend(self.handlers_on(ListenerTarget::Element(id), kind));
            if out[before..].iter().any(|h| h.stops_propagation()) {
                return out;
            }
            cur = self.parent(id);
        }
        out.extend(self.handlers_on(ListenerTarget::Document, kind));
        out
    }

    /// Handlers registered on the document itself.
    pub fn document_handlers(&self, kind: EventKind) -> Vec<Handler> {
        self.handlers_on(ListenerTarget::Document, kind).collect()
    }
}
