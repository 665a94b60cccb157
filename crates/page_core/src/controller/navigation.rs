use tracing::debug;

use crate::{
    dom::{contract::ACTIVE_CLASS, Document, ElementId},
    events::{EventKind, ListenerTarget},
    page::Page,
};

use super::{Capabilities, Disposer};

/// Sets the active marker on toggle and menu together.
pub fn set_menu_open(doc: &mut Document, toggle: ElementId, menu: ElementId, open: bool) {
    doc.set_class(toggle, ACTIVE_CLASS, open);
    doc.set_class(menu, ACTIVE_CLASS, open);
}

pub fn is_menu_open(doc: &Document, toggle: ElementId) -> bool {
    doc.has_class(toggle, ACTIVE_CLASS)
}

pub(super) fn attach(page: &Page, caps: &Capabilities, disposer: &mut Disposer) {
    let (Some(toggle), Some(menu)) = (caps.nav_toggle, caps.nav_menu) else {
        debug!("navigation toggle or menu missing; menu behavior skipped");
        return;
    };

    let on_toggle = page.clone();
    disposer.listen(ListenerTarget::Element(toggle), EventKind::Click, move |_| {
        let mut doc = on_toggle.document_mut();
        let open = !is_menu_open(&doc, toggle);
        set_menu_open(&mut doc, toggle, menu, open);
        debug!(open, "navigation menu toggled");
    });

    for link in &caps.nav_links {
        let on_link = page.clone();
        disposer.listen(ListenerTarget::Element(*link), EventKind::Click, move |_| {
            set_menu_open(&mut on_link.document_mut(), toggle, menu, false);
        });
    }

    let on_outside = page.clone();
    disposer.listen(ListenerTarget::Document, EventKind::Click, move |event| {
        let Some(target) = event.target() else {
            return;
        };
        let mut doc = on_outside.document_mut();
        if !is_menu_open(&doc, toggle) || doc.contains(menu, target) || doc.contains(toggle, target)
        {
            return;
        }
        set_menu_open(&mut doc, toggle, menu, false);
        debug!("navigation menu closed by outside click");
    });
}
