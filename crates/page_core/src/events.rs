//! Event values and the listener registry backing [`crate::Page`] dispatch.

use std::{cell::Cell, rc::Rc};

use crate::dom::ElementId;

id_newtype!(ListenerId, u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    Submit,
    Scroll,
}

/// Input delivered to a page by its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    Click { target: ElementId },
    Input { target: ElementId, value: String },
    Submit { form: ElementId },
    Scroll { offset: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Element(ElementId),
    Document,
    Window,
}

#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    target: Option<ElementId>,
    default_prevented: Cell<bool>,
}

impl Event {
    pub(crate) fn new(kind: EventKind, target: Option<ElementId>) -> Self {
        Self {
            kind,
            target,
            default_prevented: Cell::new(false),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The element the event was fired at; `None` for window events.
    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
}

pub(crate) type Handler = Rc<dyn Fn(&Event)>;

struct Listener {
    id: ListenerId,
    target: ListenerTarget,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl ListenerRegistry {
    pub(crate) fn add(
        &mut self,
        target: ListenerTarget,
        kind: EventKind,
        handler: Handler,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(Listener {
            id,
            target,
            kind,
            handler,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Handlers for one target, in registration order.
    pub(crate) fn handlers_for(&self, target: ListenerTarget, kind: EventKind) -> Vec<Handler> {
        self.listeners
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| Rc::clone(&l.handler))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}
