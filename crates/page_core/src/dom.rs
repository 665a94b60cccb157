//! In-memory document model: an element arena with classes, attributes,
//! `data-*` values, inline style and a minimal layout box.

use std::collections::{BTreeMap, BTreeSet};

/// Element ids, classes and data attributes the controller looks for.
pub mod contract {
    pub const NAV_TOGGLE_ID: &str = "nav-toggle";
    pub const NAV_MENU_ID: &str = "nav-menu";
    pub const NAV_LINK_CLASS: &str = "nav-link";
    pub const HEADER_CLASS: &str = "header";
    pub const SEARCH_FORM_CLASS: &str = "search-form";
    pub const RESULTS_CLASS: &str = "search-results";
    pub const ARTICLE_CARD_CLASS: &str = "article-card";
    pub const TAG_FILTER_CLASS: &str = "tag-filter";
    pub const BACK_TO_TOP_CLASS: &str = "back-to-top";

    pub const ACTIVE_CLASS: &str = "active";
    pub const SCROLLED_CLASS: &str = "scrolled";
    pub const ERROR_CLASS: &str = "error";
    pub const LAZY_CLASS: &str = "lazy";

    pub const REQUIRED_ATTR: &str = "required";
    pub const HREF_ATTR: &str = "href";
    pub const SRC_ATTR: &str = "src";
    pub const NAME_ATTR: &str = "name";

    pub const TAGS_DATA: &str = "tags";
    pub const TAG_DATA: &str = "tag";
    pub const DEFERRED_SRC_DATA: &str = "src";

    pub const HIDDEN_TRANSFORM: &str = "translateY(-100%)";
    pub const SHOWN_TRANSFORM: &str = "translateY(0)";
}

pub const DEFAULT_VIEWPORT_HEIGHT: i64 = 800;

id_newtype!(ElementId, usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Display {
    /// No inline `display`; the element renders normally.
    #[default]
    Default,
    Block,
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub opacity: Option<f32>,
    pub display: Display,
    pub visibility: Visibility,
    pub transform: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub top: i64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    dataset: BTreeMap<String, String>,
    pub text: String,
    pub value: String,
    /// Document-relative top edge in pixels.
    pub offset_top: i64,
    pub height: i64,
    pub style: Style,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            dataset: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            offset_top: 0,
            height: 0,
            style: Style::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.dataset.get(key).map(String::as_str)
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    body: ElementId,
    scroll_y: i64,
    viewport_height: i64,
    last_scroll_request: Option<ScrollRequest>,
    notices: Vec<String>,
    native_submissions: Vec<ElementId>,
    navigations: Vec<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            elements: vec![Element::new("body")],
            body: ElementId(0),
            scroll_y: 0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            last_scroll_request: None,
            notices: Vec::new(),
            native_submissions: Vec::new(),
            navigations: Vec::new(),
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Creates a detached element; it joins the tree through [`Document::append_child`].
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.elements.push(Element::new(tag));
        ElementId(self.elements.len() - 1)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    /// Moves `child` under `parent`. Refuses cycles and unknown ids.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if self.element(parent).is_none() || self.element(child).is_none() {
            return false;
        }
        if child == self.body || self.contains(child, parent) {
            return false;
        }
        self.detach(child);
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
        true
    }

    /// Detaches the element (and its subtree) from the tree.
    pub fn remove_element(&mut self, id: ElementId) {
        if id == self.body || self.element(id).is_none() {
            return;
        }
        self.detach(id);
    }

    pub fn clear_children(&mut self, id: ElementId) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let children = std::mem::take(&mut element.children);
        for child in children {
            self.elements[child.0].parent = None;
        }
    }

    fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.elements[id.0].parent.take() {
            self.elements[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn is_connected(&self, id: ElementId) -> bool {
        self.ancestors(id).last() == Some(&self.body)
    }

    /// `node` itself followed by its ancestors up to the root of its tree.
    pub fn ancestors(&self, node: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = self.element(node).map(|_| node);
        while let Some(id) = current {
            chain.push(id);
            current = self.elements[id.0].parent;
        }
        chain
    }

    /// Inclusive containment, like `Node.contains`.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    /// Descendants of `root` in document order, excluding `root`.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let Some(element) = self.element(root) else {
            return out;
        };
        let mut stack: Vec<ElementId> = element.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.elements[id.0].children.iter().rev().copied());
        }
        out
    }

    fn connected(&self) -> impl Iterator<Item = ElementId> {
        std::iter::once(self.body).chain(self.descendants(self.body))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.connected()
            .find(|el| self.elements[el.0].id.as_deref() == Some(id))
    }

    pub fn elements_by_class(&self, class: &str) -> Vec<ElementId> {
        self.connected()
            .filter(|el| self.elements[el.0].has_class(class))
            .collect()
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<ElementId> {
        let tag = tag.to_ascii_lowercase();
        self.connected()
            .filter(|el| self.elements[el.0].tag == tag)
            .collect()
    }

    /// Closest inclusive ancestor with the given tag.
    pub fn closest_tag(&self, node: ElementId, tag: &str) -> Option<ElementId> {
        self.ancestors(node)
            .into_iter()
            .find(|el| self.elements[el.0].tag == tag)
    }

    pub fn set_id(&mut self, el: ElementId, id: impl Into<String>) {
        if let Some(element) = self.element_mut(el) {
            element.id = Some(id.into());
        }
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.element(el).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(element) = self.element_mut(el) {
            element.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(element) = self.element_mut(el) {
            element.classes.remove(class);
        }
    }

    pub fn set_class(&mut self, el: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(el, class);
        } else {
            self.remove_class(el, class);
        }
    }

    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, el: ElementId, class: &str) -> bool {
        let on = !self.has_class(el, class);
        self.set_class(el, class, on);
        on
    }

    pub fn attribute(&self, el: ElementId, name: &str) -> Option<&str> {
        self.element(el).and_then(|e| e.attribute(name))
    }

    pub fn set_attribute(&mut self, el: ElementId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(el) {
            element.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attribute(&mut self, el: ElementId, name: &str) {
        if let Some(element) = self.element_mut(el) {
            element.attributes.remove(name);
        }
    }

    pub fn data(&self, el: ElementId, key: &str) -> Option<&str> {
        self.element(el).and_then(|e| e.data(key))
    }

    pub fn set_data(&mut self, el: ElementId, key: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(el) {
            element.dataset.insert(key.to_string(), value.into());
        }
    }

    pub fn text(&self, el: ElementId) -> Option<&str> {
        self.element(el).map(|e| e.text.as_str())
    }

    pub fn set_text(&mut self, el: ElementId, text: impl Into<String>) {
        if let Some(element) = self.element_mut(el) {
            element.text = text.into();
        }
    }

    /// Own text plus the text of every descendant, in document order.
    pub fn text_content(&self, el: ElementId) -> String {
        let Some(element) = self.element(el) else {
            return String::new();
        };
        let mut out = element.text.clone();
        for id in self.descendants(el) {
            let text = &self.elements[id.0].text;
            if !text.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
        }
        out
    }

    pub fn value(&self, el: ElementId) -> Option<&str> {
        self.element(el).map(|e| e.value.as_str())
    }

    pub fn set_value(&mut self, el: ElementId, value: impl Into<String>) {
        if let Some(element) = self.element_mut(el) {
            element.value = value.into();
        }
    }

    pub fn style(&self, el: ElementId) -> Option<&Style> {
        self.element(el).map(|e| &e.style)
    }

    pub fn style_mut(&mut self, el: ElementId) -> Option<&mut Style> {
        self.element_mut(el).map(|e| &mut e.style)
    }

    /// False when the element or any ancestor has `display: none`.
    pub fn is_rendered(&self, el: ElementId) -> bool {
        self.element(el).is_some()
            && self
                .ancestors(el)
                .iter()
                .all(|id| self.elements[id.0].style.display != Display::None)
    }

    pub fn offset_top(&self, el: ElementId) -> Option<i64> {
        self.element(el).map(|e| e.offset_top)
    }

    /// Rendered height; zero for elements that are not rendered.
    pub fn rendered_height(&self, el: ElementId) -> i64 {
        if !self.is_rendered(el) {
            return 0;
        }
        self.element(el).map_or(0, |e| e.height.max(0))
    }

    pub fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    pub(crate) fn set_scroll_y(&mut self, offset: i64) {
        self.scroll_y = offset.max(0);
    }

    pub fn viewport_height(&self) -> i64 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: i64) {
        self.viewport_height = height.max(0);
    }

    pub(crate) fn record_scroll_request(&mut self, top: i64, behavior: ScrollBehavior) {
        let top = top.max(0);
        self.last_scroll_request = Some(ScrollRequest { top, behavior });
        self.scroll_y = top;
    }

    pub fn last_scroll_request(&self) -> Option<ScrollRequest> {
        self.last_scroll_request
    }

    /// Records a blocking message for the visitor (the `alert()` of a browser).
    pub fn alert(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn record_native_submission(&mut self, form: ElementId) {
        self.native_submissions.push(form);
    }

    /// Forms whose submission was not cancelled by any listener.
    pub fn native_submissions(&self) -> &[ElementId] {
        &self.native_submissions
    }

    pub(crate) fn record_navigation(&mut self, href: impl Into<String>) {
        self.navigations.push(href.into());
    }

    /// Links followed because no listener prevented the click default.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

#[cfg(test)]
#[path = "tests/dom_tests.rs"]
mod tests;
