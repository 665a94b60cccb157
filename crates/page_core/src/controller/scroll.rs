use std::{cell::Cell, rc::Rc};

use tracing::debug;

use crate::{
    config::ControllerSettings,
    dom::{contract, Document, ElementId, ScrollBehavior, Visibility},
    events::{EventKind, ListenerTarget},
    page::Page,
};

use super::{Capabilities, Disposer};

/// Scroll offset for a same-page link: the target's top edge minus the
/// header height, or `None` when the fragment does not resolve.
pub fn anchor_offset(doc: &Document, link: ElementId, header: Option<ElementId>) -> Option<i64> {
    let href = doc.attribute(link, contract::HREF_ATTR)?;
    let fragment = href.strip_prefix('#').filter(|f| !f.is_empty())?;
    let target = doc.get_element_by_id(fragment)?;
    let top = doc.offset_top(target)?;
    let header_height = header.map_or(0, |h| doc.rendered_height(h));
    Some((top - header_height).max(0))
}

pub(super) fn attach_anchor_scrolling(page: &Page, caps: &Capabilities, disposer: &mut Disposer) {
    for link in &caps.anchor_links {
        let link = *link;
        let header = caps.header;
        let page = page.clone();
        disposer.listen(ListenerTarget::Element(link), EventKind::Click, move |event| {
            event.prevent_default();
            let offset = anchor_offset(&page.document(), link, header);
            let Some(top) = offset else {
                debug!(link = link.0, "anchor target missing; click ignored");
                return;
            };
            debug!(top, "smooth scrolling to anchor");
            page.scroll_to(top, ScrollBehavior::Smooth);
        });
    }
}

fn apply_header_state(
    doc: &mut Document,
    header: ElementId,
    previous: i64,
    settings: &ControllerSettings,
) {
    let current = doc.scroll_y();
    let hide = current > previous && current > settings.header_hide_threshold;
    if let Some(style) = doc.style_mut(header) {
        let transform = if hide {
            contract::HIDDEN_TRANSFORM
        } else {
            contract::SHOWN_TRANSFORM
        };
        style.transform = Some(transform.to_string());
    }
    doc.set_class(
        header,
        contract::SCROLLED_CLASS,
        current > settings.scrolled_threshold,
    );
}

pub(super) fn attach_header_visibility(
    page: &Page,
    caps: &Capabilities,
    settings: &ControllerSettings,
    disposer: &mut Disposer,
) {
    let Some(header) = caps.header else {
        debug!("no header element; hide-on-scroll skipped");
        return;
    };

    let initial = page.document().scroll_y();
    let last_offset = Rc::new(Cell::new(initial));
    let settings = settings.clone();
    let page = page.clone();
    disposer.listen(ListenerTarget::Window, EventKind::Scroll, move |_| {
        let mut doc = page.document_mut();
        let previous = last_offset.replace(doc.scroll_y());
        apply_header_state(&mut doc, header, previous, &settings);
    });
}

fn apply_back_to_top_visibility(doc: &mut Document, button: ElementId, threshold: i64) {
    let visible = doc.scroll_y() > threshold;
    if let Some(style) = doc.style_mut(button) {
        style.opacity = Some(if visible { 1.0 } else { 0.0 });
        style.visibility = if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

pub(super) fn attach_back_to_top(
    page: &Page,
    caps: &Capabilities,
    settings: &ControllerSettings,
    disposer: &mut Disposer,
) {
    let Some(body) = caps.body else {
        return;
    };
    let threshold = settings.back_to_top_threshold;
    let label = settings.locale.messages().back_to_top;

    let button = {
        let mut doc = page.document_mut();
        let button = doc.create_element("button");
        doc.add_class(button, contract::BACK_TO_TOP_CLASS);
        doc.set_attribute(button, "type", "button");
        doc.set_attribute(button, "aria-label", label);
        doc.set_text(button, "↑");
        doc.append_child(body, button);
        apply_back_to_top_visibility(&mut doc, button, threshold);
        button
    };
    disposer.track_element(button);

    let on_scroll = page.clone();
    disposer.listen(ListenerTarget::Window, EventKind::Scroll, move |_| {
        apply_back_to_top_visibility(&mut on_scroll.document_mut(), button, threshold);
    });

    let on_click = page.clone();
    disposer.listen(ListenerTarget::Element(button), EventKind::Click, move |_| {
        on_click.scroll_to(0, ScrollBehavior::Smooth);
    });
}
