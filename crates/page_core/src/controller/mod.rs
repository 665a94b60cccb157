//! Page interaction controller: attaches each behavior to whatever elements
//! the page actually has and hands back a [`Disposer`] for teardown.

use std::{cell::Cell, rc::Rc};

use tracing::{debug, info};

use crate::{
    config::ControllerSettings,
    dom::{contract, Document, ElementId},
    events::{Event, EventKind, ListenerId, ListenerTarget},
    page::{ObserverId, Page},
    scheduler::Scheduler,
    search::{MockSearchService, SearchService},
};

pub mod filters;
pub mod forms;
pub mod images;
pub mod navigation;
pub mod scroll;

pub use forms::{collect_params, validate_form, ValidationError};

/// Optional element references the behaviors attach to.
///
/// Anything absent here means the matching behavior is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub body: Option<ElementId>,
    pub nav_toggle: Option<ElementId>,
    pub nav_menu: Option<ElementId>,
    pub nav_links: Vec<ElementId>,
    pub header: Option<ElementId>,
    pub anchor_links: Vec<ElementId>,
    pub forms: Vec<ElementId>,
    pub search_forms: Vec<ElementId>,
    pub results_container: Option<ElementId>,
    pub article_cards: Vec<ElementId>,
    pub tag_filters: Vec<ElementId>,
    pub lazy_images: Vec<ElementId>,
}

impl Capabilities {
    pub fn discover(doc: &Document) -> Self {
        let forms = doc.elements_by_tag("form");
        let search_forms = forms
            .iter()
            .copied()
            .filter(|f| doc.has_class(*f, contract::SEARCH_FORM_CLASS))
            .collect();
        let anchor_links = doc
            .elements_by_tag("a")
            .into_iter()
            .filter(|a| {
                doc.attribute(*a, contract::HREF_ATTR)
                    .is_some_and(|href| href.starts_with('#'))
            })
            .collect();
        let lazy_images = doc
            .elements_by_tag("img")
            .into_iter()
            .filter(|img| doc.data(*img, contract::DEFERRED_SRC_DATA).is_some())
            .collect();

        Self {
            body: Some(doc.body()),
            nav_toggle: doc.get_element_by_id(contract::NAV_TOGGLE_ID),
            nav_menu: doc.get_element_by_id(contract::NAV_MENU_ID),
            nav_links: doc.elements_by_class(contract::NAV_LINK_CLASS),
            header: doc.elements_by_class(contract::HEADER_CLASS).first().copied(),
            anchor_links,
            forms,
            search_forms,
            results_container: doc.elements_by_class(contract::RESULTS_CLASS).first().copied(),
            article_cards: doc.elements_by_class(contract::ARTICLE_CARD_CLASS),
            tag_filters: doc.elements_by_class(contract::TAG_FILTER_CLASS),
            lazy_images,
        }
    }
}

/// Collaborators injected into the controller.
pub struct Services {
    pub search: Rc<dyn SearchService>,
}

impl Services {
    pub fn new(search: Rc<dyn SearchService>) -> Self {
        Self { search }
    }

    /// Hard-coded search answering after the configured latency.
    pub fn mock(scheduler: Rc<dyn Scheduler>, settings: &ControllerSettings) -> Self {
        let search = MockSearchService::new(scheduler).with_latency(settings.search_latency);
        Self::new(Rc::new(search))
    }
}

/// Everything [`initialize`] registered. Listeners keep the page alive until
/// [`Disposer::dispose`] runs.
pub struct Disposer {
    page: Page,
    listeners: Vec<ListenerId>,
    observers: Vec<ObserverId>,
    created: Vec<ElementId>,
    active: Rc<Cell<bool>>,
}

impl Disposer {
    fn new(page: Page) -> Self {
        Self {
            page,
            listeners: Vec::new(),
            observers: Vec::new(),
            created: Vec::new(),
            active: Rc::new(Cell::new(true)),
        }
    }

    /// Flag cleared by [`Disposer::dispose`]; async work checks it before
    /// touching the page.
    pub(crate) fn liveness(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.active)
    }

    pub(crate) fn listen(
        &mut self,
        target: ListenerTarget,
        kind: EventKind,
        handler: impl Fn(&Event) + 'static,
    ) -> ListenerId {
        let id = self.page.add_listener(target, kind, handler);
        self.listeners.push(id);
        id
    }

    pub(crate) fn track_observer(&mut self, observer: ObserverId) {
        self.observers.push(observer);
    }

    pub(crate) fn track_element(&mut self, element: ElementId) {
        self.created.push(element);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Elements the controller added to the page (the back-to-top button).
    pub fn created_elements(&self) -> &[ElementId] {
        &self.created
    }

    pub fn dispose(self) {
        self.active.set(false);
        for id in &self.listeners {
            self.page.remove_listener(*id);
        }
        for observer in &self.observers {
            self.page.disconnect(*observer);
        }
        let mut doc = self.page.document_mut();
        for element in &self.created {
            doc.remove_element(*element);
        }
        debug!(
            listeners = self.listeners.len(),
            observers = self.observers.len(),
            elements = self.created.len(),
            "page controller disposed"
        );
    }
}

pub fn initialize(
    page: &Page,
    caps: &Capabilities,
    services: Services,
    settings: &ControllerSettings,
) -> Disposer {
    let mut disposer = Disposer::new(page.clone());

    navigation::attach(page, caps, &mut disposer);
    scroll::attach_anchor_scrolling(page, caps, &mut disposer);
    scroll::attach_header_visibility(page, caps, settings, &mut disposer);
    forms::attach_validation(page, caps, settings, &mut disposer);
    forms::attach_search(page, caps, &services, settings, &mut disposer);
    filters::attach(page, caps, settings, &mut disposer);
    images::attach(page, caps, &mut disposer);
    scroll::attach_back_to_top(page, caps, settings, &mut disposer);

    info!(
        listeners = disposer.listener_count(),
        locale = ?settings.locale,
        "page controller initialized"
    );
    disposer
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
