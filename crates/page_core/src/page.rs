//! A live page: document, listeners, intersection observers and the
//! scheduler they share.

use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use tracing::trace;

use crate::{
    dom::{contract, Document, ElementId, ScrollBehavior},
    events::{
        DispatchOutcome, DomEvent, Event, EventKind, ListenerId, ListenerRegistry, ListenerTarget,
    },
    scheduler::Scheduler,
};

id_newtype!(ObserverId, u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub observer: ObserverId,
    pub target: ElementId,
    pub is_intersecting: bool,
}

type IntersectionCallback = Rc<dyn Fn(&IntersectionEntry)>;

struct Observer {
    callback: IntersectionCallback,
    targets: BTreeSet<ElementId>,
}

#[derive(Default)]
struct ObserverRegistry {
    next_id: u64,
    observers: BTreeMap<ObserverId, Observer>,
}

struct PageInner {
    document: RefCell<Document>,
    listeners: RefCell<ListenerRegistry>,
    observers: RefCell<ObserverRegistry>,
    scheduler: Rc<dyn Scheduler>,
    intersection_supported: Cell<bool>,
}

/// Cheap-to-clone handle; every clone sees the same page.
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageInner>,
}

impl Page {
    pub fn new(document: Document, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(PageInner {
                document: RefCell::new(document),
                listeners: RefCell::new(ListenerRegistry::default()),
                observers: RefCell::new(ObserverRegistry::default()),
                scheduler,
                intersection_supported: Cell::new(true),
            }),
        }
    }

    pub fn document(&self) -> Ref<'_, Document> {
        self.inner.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.inner.document.borrow_mut()
    }

    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        Rc::clone(&self.inner.scheduler)
    }

    pub fn supports_intersection_observer(&self) -> bool {
        self.inner.intersection_supported.get()
    }

    /// Simulates a host without viewport-intersection observation.
    pub fn set_intersection_observer_supported(&self, supported: bool) {
        self.inner.intersection_supported.set(supported);
    }

    pub fn add_listener(
        &self,
        target: ListenerTarget,
        kind: EventKind,
        handler: impl Fn(&Event) + 'static,
    ) -> ListenerId {
        self.inner
            .listeners
            .borrow_mut()
            .add(target, kind, Rc::new(handler))
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn dispatch(&self, event: DomEvent) -> DispatchOutcome {
        match event {
            DomEvent::Click { target } => self.click(target),
            DomEvent::Input { target, value } => self.input(target, value),
            DomEvent::Submit { form } => self.submit(form),
            DomEvent::Scroll { offset } => self.scroll_window(offset),
        }
    }

    /// Clicks `target`; an un-prevented click inside a link follows it.
    pub fn click(&self, target: ElementId) -> DispatchOutcome {
        let outcome = self.dispatch_bubbling(EventKind::Click, target);
        if !outcome.default_prevented {
            let mut doc = self.document_mut();
            let href = doc
                .closest_tag(target, "a")
                .and_then(|link| doc.attribute(link, contract::HREF_ATTR))
                .map(str::to_string);
            if let Some(href) = href {
                doc.record_navigation(href);
            }
        }
        outcome
    }

    pub fn input(&self, target: ElementId, value: impl Into<String>) -> DispatchOutcome {
        self.document_mut().set_value(target, value);
        self.dispatch_bubbling(EventKind::Input, target)
    }

    /// Submits `form`; it is recorded as natively submitted unless a listener
    /// prevented the default.
    pub fn submit(&self, form: ElementId) -> DispatchOutcome {
        let outcome = self.dispatch_bubbling(EventKind::Submit, form);
        if !outcome.default_prevented {
            self.document_mut().record_native_submission(form);
        }
        outcome
    }

    /// The visitor scrolled the window to `offset`.
    pub fn scroll_window(&self, offset: i64) -> DispatchOutcome {
        self.document_mut().set_scroll_y(offset);
        self.after_scroll()
    }

    /// Programmatic scroll (`window.scrollTo`).
    pub fn scroll_to(&self, top: i64, behavior: ScrollBehavior) -> DispatchOutcome {
        self.document_mut().record_scroll_request(top, behavior);
        self.after_scroll()
    }

    fn after_scroll(&self) -> DispatchOutcome {
        let event = Event::new(EventKind::Scroll, None);
        self.run_handlers(ListenerTarget::Window, &event);
        self.check_intersections();
        DispatchOutcome {
            default_prevented: event.default_prevented(),
        }
    }

    fn dispatch_bubbling(&self, kind: EventKind, target: ElementId) -> DispatchOutcome {
        let path = self.document().ancestors(target);
        trace!(?kind, target = target.0, depth = path.len(), "dispatching event");
        let event = Event::new(kind, Some(target));
        for node in path {
            self.run_handlers(ListenerTarget::Element(node), &event);
        }
        self.run_handlers(ListenerTarget::Document, &event);
        DispatchOutcome {
            default_prevented: event.default_prevented(),
        }
    }

    fn run_handlers(&self, target: ListenerTarget, event: &Event) {
        let handlers = self.inner.listeners.borrow().handlers_for(target, event.kind());
        for handler in handlers {
            handler(event);
        }
    }

    pub fn create_observer(&self, callback: impl Fn(&IntersectionEntry) + 'static) -> ObserverId {
        let mut registry = self.inner.observers.borrow_mut();
        registry.next_id += 1;
        let id = ObserverId(registry.next_id);
        registry.observers.insert(
            id,
            Observer {
                callback: Rc::new(callback),
                targets: BTreeSet::new(),
            },
        );
        id
    }

    pub fn observe(&self, observer: ObserverId, target: ElementId) {
        if let Some(entry) = self.inner.observers.borrow_mut().observers.get_mut(&observer) {
            entry.targets.insert(target);
        }
    }

    pub fn unobserve(&self, observer: ObserverId, target: ElementId) {
        if let Some(entry) = self.inner.observers.borrow_mut().observers.get_mut(&observer) {
            entry.targets.remove(&target);
        }
    }

    pub fn disconnect(&self, observer: ObserverId) {
        self.inner.observers.borrow_mut().observers.remove(&observer);
    }

    pub fn is_observed(&self, target: ElementId) -> bool {
        self.inner
            .observers
            .borrow()
            .observers
            .values()
            .any(|o| o.targets.contains(&target))
    }

    /// Reports every observed element that overlaps the current viewport.
    pub fn check_intersections(&self) {
        let mut pending: Vec<(IntersectionCallback, IntersectionEntry)> = Vec::new();
        {
            let registry = self.inner.observers.borrow();
            let doc = self.document();
            let view_top = doc.scroll_y();
            let view_bottom = view_top + doc.viewport_height();
            for (id, observer) in &registry.observers {
                for target in &observer.targets {
                    let Some(element) = doc.element(*target) else {
                        continue;
                    };
                    if !doc.is_connected(*target) || !doc.is_rendered(*target) {
                        continue;
                    }
                    let top = element.offset_top;
                    let bottom = top + element.height.max(0);
                    if top < view_bottom && bottom >= view_top {
                        pending.push((
                            Rc::clone(&observer.callback),
                            IntersectionEntry {
                                observer: *id,
                                target: *target,
                                is_intersecting: true,
                            },
                        ));
                    }
                }
            }
        }
        for (callback, entry) in pending {
            callback(&entry);
        }
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
