use super::*;

fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let make = move |name: &'static str| {
        let sink = Rc::clone(&sink);
        Box::new(move || sink.borrow_mut().push(name)) as Box<dyn FnOnce()>
    };
    (log, make)
}

#[test]
fn timers_fire_in_deadline_then_registration_order() {
    let scheduler = VirtualScheduler::new();
    let (log, task) = recorder();
    scheduler.set_timeout(Duration::from_millis(30), task("late"));
    scheduler.set_timeout(Duration::from_millis(10), task("first"));
    scheduler.set_timeout(Duration::from_millis(10), task("second"));

    scheduler.advance(Duration::from_millis(9));
    assert!(log.borrow().is_empty());

    scheduler.advance(Duration::from_millis(21));
    assert_eq!(*log.borrow(), vec!["first", "second", "late"]);
    assert_eq!(scheduler.now(), Duration::from_millis(30));
    assert_eq!(scheduler.pending_timers(), 0);
}

#[test]
fn cleared_timer_never_fires() {
    let scheduler = VirtualScheduler::new();
    let (log, task) = recorder();
    let id = scheduler.set_timeout(Duration::from_millis(5), task("cancelled"));
    scheduler.clear_timeout(id);
    scheduler.clear_timeout(id);
    scheduler.advance(Duration::from_secs(1));
    assert!(log.borrow().is_empty());
}

#[test]
fn clock_reads_deadline_while_timer_runs() {
    let scheduler = VirtualScheduler::new();
    let seen = Rc::new(Cell::new(Duration::ZERO));
    let sink = Rc::clone(&seen);
    let clock = Rc::clone(&scheduler);
    scheduler.set_timeout(
        Duration::from_millis(40),
        Box::new(move || sink.set(clock.now())),
    );
    scheduler.advance(Duration::from_millis(100));
    assert_eq!(seen.get(), Duration::from_millis(40));
}

#[test]
fn frames_are_spaced_by_frame_interval() {
    let scheduler = VirtualScheduler::new();
    let stamps = Rc::new(RefCell::new(Vec::new()));

    fn next(scheduler: Rc<VirtualScheduler>, stamps: Rc<RefCell<Vec<Duration>>>, left: u32) {
        let again = Rc::clone(&scheduler);
        scheduler.request_frame(Box::new(move |at| {
            stamps.borrow_mut().push(at);
            if left > 1 {
                next(again, stamps, left - 1);
            }
        }));
    }

    next(Rc::clone(&scheduler), Rc::clone(&stamps), 3);
    scheduler.advance(Duration::from_millis(100));
    assert_eq!(
        *stamps.borrow(),
        vec![FRAME_INTERVAL, FRAME_INTERVAL * 2, FRAME_INTERVAL * 3]
    );
}

#[test]
fn sleeping_future_resumes_when_clock_passes_deadline() {
    let scheduler = VirtualScheduler::new();
    let done = Rc::new(Cell::new(false));
    let flag = Rc::clone(&done);
    let sleeper: Rc<dyn Scheduler> = scheduler.clone();
    scheduler.spawn_local(Box::pin(async move {
        sleeper.sleep(Duration::from_millis(1000)).await;
        flag.set(true);
    }));

    scheduler.advance(Duration::from_millis(999));
    assert!(!done.get());
    scheduler.advance(Duration::from_millis(1));
    assert!(done.get());
}

#[tokio::test]
async fn tokio_scheduler_runs_and_cancels_timers() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let scheduler = TokioScheduler::new();
            let (log, task) = recorder();
            scheduler.set_timeout(Duration::from_millis(5), task("kept"));
            let dropped = scheduler.set_timeout(Duration::from_millis(5), task("dropped"));
            scheduler.clear_timeout(dropped);

            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(*log.borrow(), vec!["kept"]);
        })
        .await;
}
