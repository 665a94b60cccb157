use std::rc::Rc;

use shared::domain::{tag_list_contains, ALL_TAGS};
use tracing::debug;

use crate::{
    config::ControllerSettings,
    dom::{contract, Display, ElementId},
    events::{EventKind, ListenerTarget},
    page::Page,
    timing::fade_in,
};

use super::{Capabilities, Disposer};

/// Makes `selected` the only active filter and shows the cards carrying its
/// tag. Returns the cards left visible.
pub fn apply_tag_filter(
    page: &Page,
    filters: &[ElementId],
    cards: &[ElementId],
    selected: ElementId,
    fade: std::time::Duration,
) -> Vec<ElementId> {
    let shown = {
        let mut doc = page.document_mut();
        let Some(tag) = doc.data(selected, contract::TAG_DATA).map(str::to_string) else {
            return Vec::new();
        };
        for filter in filters {
            doc.set_class(*filter, contract::ACTIVE_CLASS, *filter == selected);
        }
        let mut shown = Vec::new();
        for card in cards {
            let matches = tag == ALL_TAGS
                || doc
                    .data(*card, contract::TAGS_DATA)
                    .is_some_and(|tags| tag_list_contains(tags, &tag));
            if matches {
                shown.push(*card);
            } else if let Some(style) = doc.style_mut(*card) {
                style.display = Display::None;
            }
        }
        debug!(tag = %tag, shown = shown.len(), total = cards.len(), "tag filter applied");
        shown
    };
    for card in &shown {
        fade_in(page, *card, fade);
    }
    shown
}

pub(super) fn attach(
    page: &Page,
    caps: &Capabilities,
    settings: &ControllerSettings,
    disposer: &mut Disposer,
) {
    if caps.tag_filters.is_empty() {
        return;
    }
    let filters: Rc<[ElementId]> = caps.tag_filters.clone().into();
    let cards: Rc<[ElementId]> = caps.article_cards.clone().into();
    let fade = settings.fade_duration;

    for filter in caps.tag_filters.iter().copied() {
        let page = page.clone();
        let filters = Rc::clone(&filters);
        let cards = Rc::clone(&cards);
        disposer.listen(ListenerTarget::Element(filter), EventKind::Click, move |_| {
            apply_tag_filter(&page, &filters, &cards, filter, fade);
        });
    }
}
