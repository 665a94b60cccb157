use tracing::debug;

use crate::{
    dom::{contract, Document, ElementId},
    page::Page,
};

use super::{Capabilities, Disposer};

/// Swaps the deferred source in and drops the `lazy` marker.
pub fn load_image(doc: &mut Document, img: ElementId) {
    if let Some(src) = doc.data(img, contract::DEFERRED_SRC_DATA).map(str::to_string) {
        doc.set_attribute(img, contract::SRC_ATTR, src);
    }
    doc.remove_class(img, contract::LAZY_CLASS);
}

pub(super) fn attach(page: &Page, caps: &Capabilities, disposer: &mut Disposer) {
    if caps.lazy_images.is_empty() {
        return;
    }

    if !page.supports_intersection_observer() {
        let mut doc = page.document_mut();
        for img in &caps.lazy_images {
            load_image(&mut doc, *img);
        }
        debug!(
            images = caps.lazy_images.len(),
            "no intersection observer; images loaded eagerly"
        );
        return;
    }

    let on_intersect = page.clone();
    let observer = page.create_observer(move |entry| {
        if !entry.is_intersecting {
            return;
        }
        load_image(&mut on_intersect.document_mut(), entry.target);
        on_intersect.unobserve(entry.observer, entry.target);
    });
    disposer.track_observer(observer);
    for img in &caps.lazy_images {
        page.observe(observer, *img);
    }
    page.check_intersections();
}
