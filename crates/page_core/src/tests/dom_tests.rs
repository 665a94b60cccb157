use super::*;

fn nav_tree() -> (Document, ElementId, ElementId, ElementId) {
    let mut doc = Document::new();
    let nav = doc.create_element("nav");
    doc.set_id(nav, "nav-menu");
    let list = doc.create_element("ul");
    let link = doc.create_element("a");
    doc.add_class(link, "nav-link");
    doc.set_attribute(link, "href", "#about");
    let body = doc.body();
    doc.append_child(body, nav);
    doc.append_child(nav, list);
    doc.append_child(list, link);
    (doc, nav, list, link)
}

#[test]
fn lookups_ignore_detached_elements() {
    let (mut doc, nav, _, _) = nav_tree();
    let orphan = doc.create_element("div");
    doc.set_id(orphan, "orphan");
    doc.add_class(orphan, "nav-link");

    assert_eq!(doc.get_element_by_id("nav-menu"), Some(nav));
    assert_eq!(doc.get_element_by_id("orphan"), None);
    assert_eq!(doc.elements_by_class("nav-link").len(), 1);
    assert!(!doc.is_connected(orphan));
}

#[test]
fn contains_is_inclusive_and_follows_parents() {
    let (doc, nav, list, link) = nav_tree();
    assert!(doc.contains(nav, link));
    assert!(doc.contains(link, link));
    assert!(!doc.contains(link, nav));
    assert_eq!(doc.ancestors(link), vec![link, list, nav, doc.body()]);
}

#[test]
fn append_child_refuses_cycles() {
    let (mut doc, nav, list, _) = nav_tree();
    assert!(!doc.append_child(list, nav));
    assert!(!doc.append_child(nav, nav));
    assert_eq!(doc.element(list).and_then(|e| e.parent()), Some(nav));
}

#[test]
fn descendants_are_in_document_order() {
    let mut doc = Document::new();
    let body = doc.body();
    let a = doc.create_element("section");
    let a1 = doc.create_element("p");
    let a2 = doc.create_element("p");
    let b = doc.create_element("section");
    doc.append_child(body, a);
    doc.append_child(a, a1);
    doc.append_child(a, a2);
    doc.append_child(body, b);
    assert_eq!(doc.descendants(body), vec![a, a1, a2, b]);
    assert_eq!(doc.elements_by_tag("P"), vec![a1, a2]);
}

#[test]
fn removing_an_element_disconnects_its_subtree() {
    let (mut doc, nav, _, link) = nav_tree();
    doc.remove_element(nav);
    assert!(!doc.is_connected(link));
    assert!(doc.elements_by_class("nav-link").is_empty());

    doc.remove_element(doc.body());
    assert!(doc.is_connected(doc.body()));
}

#[test]
fn removing_an_unknown_element_is_a_no_op() {
    let (mut doc, nav, _, link) = nav_tree();
    doc.remove_element(ElementId(10_000));
    assert!(doc.is_connected(nav));
    assert!(doc.is_connected(link));
}

#[test]
fn toggle_class_reports_new_state() {
    let (mut doc, nav, _, _) = nav_tree();
    assert!(doc.toggle_class(nav, contract::ACTIVE_CLASS));
    assert!(doc.has_class(nav, contract::ACTIVE_CLASS));
    assert!(!doc.toggle_class(nav, contract::ACTIVE_CLASS));
}

#[test]
fn hidden_ancestor_hides_rendering_and_height() {
    let (mut doc, nav, _, link) = nav_tree();
    if let Some(el) = doc.element_mut(link) {
        el.height = 20;
    }
    assert_eq!(doc.rendered_height(link), 20);
    if let Some(style) = doc.style_mut(nav) {
        style.display = Display::None;
    }
    assert!(!doc.is_rendered(link));
    assert_eq!(doc.rendered_height(link), 0);
}

#[test]
fn scroll_requests_clamp_to_top() {
    let mut doc = Document::new();
    doc.record_scroll_request(-40, ScrollBehavior::Smooth);
    assert_eq!(doc.scroll_y(), 0);
    assert_eq!(
        doc.last_scroll_request(),
        Some(ScrollRequest {
            top: 0,
            behavior: ScrollBehavior::Smooth
        })
    );
}

#[test]
fn text_content_joins_descendants() {
    let mut doc = Document::new();
    let body = doc.body();
    let item = doc.create_element("div");
    let title = doc.create_element("h3");
    doc.set_text(title, "Title");
    let desc = doc.create_element("p");
    doc.set_text(desc, "Body");
    doc.append_child(body, item);
    doc.append_child(item, title);
    doc.append_child(item, desc);
    assert_eq!(doc.text_content(item), "Title Body");
}
