//! Generic timing combinators over a [`Scheduler`].

use std::{
    cell::Cell,
    rc::{Rc, Weak},
    time::Duration,
};

use crate::{
    dom::{Display, ElementId},
    page::Page,
    scheduler::{Scheduler, TimerId},
};

pub const DEFAULT_FADE: Duration = Duration::from_millis(300);

struct DebounceState<A> {
    scheduler: Rc<dyn Scheduler>,
    wait: Duration,
    callback: Rc<dyn Fn(A)>,
    pending: Cell<Option<TimerId>>,
}

/// Handle returned by [`debounce`].
pub struct Debounced<A> {
    state: Rc<DebounceState<A>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<A: 'static> Debounced<A> {
    /// Restarts the wait; only the last argument of a burst is delivered.
    pub fn call(&self, arg: A) {
        if let Some(timer) = self.state.pending.take() {
            self.state.scheduler.clear_timeout(timer);
        }
        let weak: Weak<DebounceState<A>> = Rc::downgrade(&self.state);
        let callback = Rc::clone(&self.state.callback);
        let timer = self.state.scheduler.set_timeout(
            self.state.wait,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.pending.set(None);
                }
                callback(arg);
            }),
        );
        self.state.pending.set(Some(timer));
    }

    pub fn cancel(&self) {
        if let Some(timer) = self.state.pending.take() {
            self.state.scheduler.clear_timeout(timer);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }
}

pub fn debounce<A: 'static>(
    scheduler: Rc<dyn Scheduler>,
    wait: Duration,
    f: impl Fn(A) + 'static,
) -> Debounced<A> {
    Debounced {
        state: Rc::new(DebounceState {
            scheduler,
            wait,
            callback: Rc::new(f),
            pending: Cell::new(None),
        }),
    }
}

/// Handle returned by [`throttle`].
pub struct Throttled<A> {
    scheduler: Rc<dyn Scheduler>,
    limit: Duration,
    callback: Rc<dyn Fn(A)>,
    last_run: Rc<Cell<Option<Duration>>>,
}

impl<A> Clone for Throttled<A> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Rc::clone(&self.scheduler),
            limit: self.limit,
            callback: Rc::clone(&self.callback),
            last_run: Rc::clone(&self.last_run),
        }
    }
}

impl<A> Throttled<A> {
    /// Runs immediately when outside a window; returns whether it ran.
    pub fn call(&self, arg: A) -> bool {
        let now = self.scheduler.now();
        let open = match self.last_run.get() {
            Some(last) => now.saturating_sub(last) >= self.limit,
            None => true,
        };
        if open {
            self.last_run.set(Some(now));
            (self.callback)(arg);
        }
        open
    }
}

pub fn throttle<A: 'static>(
    scheduler: Rc<dyn Scheduler>,
    limit: Duration,
    f: impl Fn(A) + 'static,
) -> Throttled<A> {
    Throttled {
        scheduler,
        limit,
        callback: Rc::new(f),
        last_run: Rc::new(Cell::new(None)),
    }
}

/// Animates opacity 0 → 1 after forcing `display: block`.
pub fn fade_in(page: &Page, element: ElementId, duration: Duration) {
    {
        let mut doc = page.document_mut();
        let Some(style) = doc.style_mut(element) else {
            return;
        };
        style.opacity = Some(0.0);
        style.display = Display::Block;
    }
    let start = page.scheduler().now();
    schedule_frame(page.clone(), element, start, duration, 0.0, 1.0, false);
}

/// Animates opacity from its current value to 0, then sets `display: none`.
pub fn fade_out(page: &Page, element: ElementId, duration: Duration) {
    let from = {
        let doc = page.document();
        let Some(style) = doc.style(element) else {
            return;
        };
        style.opacity.unwrap_or(1.0)
    };
    let start = page.scheduler().now();
    schedule_frame(page.clone(), element, start, duration, from, 0.0, true);
}

fn schedule_frame(
    page: Page,
    element: ElementId,
    start: Duration,
    duration: Duration,
    from: f32,
    to: f32,
    hide_at_end: bool,
) {
    let scheduler = page.scheduler();
    scheduler.request_frame(Box::new(move |now| {
        let progress = if duration.is_zero() {
            1.0
        } else {
            (now.saturating_sub(start).as_secs_f32() / duration.as_secs_f32()).min(1.0)
        };
        let done = progress >= 1.0;
        {
            let mut doc = page.document_mut();
            let Some(style) = doc.style_mut(element) else {
                return;
            };
            style.opacity = Some(if done { to } else { from + (to - from) * progress });
            if done && hide_at_end {
                style.display = Display::None;
            }
        }
        if !done {
            schedule_frame(page, element, start, duration, from, to, hide_at_end);
        }
    }));
}

#[cfg(test)]
#[path = "tests/timing_tests.rs"]
mod tests;
