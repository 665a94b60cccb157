use super::*;

use std::cell::RefCell;

use crate::{dom::Document, scheduler::VirtualScheduler};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn debounce_fires_once_after_burst_with_last_argument() {
    let scheduler = VirtualScheduler::new();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let clock = Rc::clone(&scheduler);
    let debounced = debounce(scheduler.clone(), ms(200), move |n: u32| {
        sink.borrow_mut().push((n, clock.now()))
    });

    for n in 0..5 {
        debounced.call(n);
        scheduler.advance(ms(25));
    }
    // last call happened at 100ms
    assert!(debounced.is_pending());
    scheduler.advance(ms(174));
    assert!(calls.borrow().is_empty());

    scheduler.advance(ms(1));
    assert_eq!(*calls.borrow(), vec![(4, ms(300))]);
    assert!(!debounced.is_pending());

    scheduler.advance(ms(1000));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn cancelled_debounce_never_fires() {
    let scheduler = VirtualScheduler::new();
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let debounced = debounce(scheduler.clone(), ms(50), move |()| counter.set(counter.get() + 1));
    debounced.call(());
    debounced.cancel();
    scheduler.advance(ms(500));
    assert_eq!(hits.get(), 0);
}

#[test]
fn throttle_runs_first_call_immediately_and_drops_the_rest() {
    let scheduler = VirtualScheduler::new();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let throttled = throttle(scheduler.clone(), ms(200), move |n: u32| sink.borrow_mut().push(n));

    let mut ran = Vec::new();
    for n in 0..5 {
        ran.push(throttled.call(n));
        scheduler.advance(ms(10));
    }
    assert_eq!(ran, vec![true, false, false, false, false]);
    assert_eq!(*calls.borrow(), vec![0]);

    scheduler.advance(ms(150));
    assert!(throttled.call(9));
    assert_eq!(*calls.borrow(), vec![0, 9]);
}

fn page_with_box() -> (Page, Rc<VirtualScheduler>, ElementId) {
    let scheduler = VirtualScheduler::new();
    let mut doc = Document::new();
    let body = doc.body();
    let card = doc.create_element("div");
    doc.append_child(body, card);
    (Page::new(doc, scheduler.clone()), scheduler, card)
}

#[test]
fn fade_in_reaches_full_opacity_after_duration() {
    let (page, scheduler, card) = page_with_box();
    if let Some(style) = page.document_mut().style_mut(card) {
        style.display = Display::None;
    }

    fade_in(&page, card, DEFAULT_FADE);
    {
        let doc = page.document();
        let style = doc.style(card).expect("style");
        assert_eq!(style.display, Display::Block);
        assert_eq!(style.opacity, Some(0.0));
    }

    scheduler.advance(ms(150));
    let midway = page.document().style(card).and_then(|s| s.opacity).expect("opacity");
    assert!(midway > 0.3 && midway < 0.7, "midway opacity was {midway}");

    scheduler.advance(ms(200));
    assert_eq!(page.document().style(card).and_then(|s| s.opacity), Some(1.0));
    assert_eq!(scheduler.pending_timers(), 0);
}

#[test]
fn fade_out_hides_element_at_the_end() {
    let (page, scheduler, card) = page_with_box();
    fade_out(&page, card, ms(100));

    scheduler.advance(ms(50));
    assert!(page.document().is_rendered(card));

    scheduler.advance(ms(100));
    let doc = page.document();
    let style = doc.style(card).expect("style");
    assert_eq!(style.opacity, Some(0.0));
    assert_eq!(style.display, Display::None);
}

#[test]
fn fading_a_missing_element_is_a_no_op() {
    let (page, scheduler, _) = page_with_box();
    fade_in(&page, ElementId(999), DEFAULT_FADE);
    fade_out(&page, ElementId(999), DEFAULT_FADE);
    assert_eq!(scheduler.pending_timers(), 0);
}
