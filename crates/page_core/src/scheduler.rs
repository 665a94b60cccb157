//! Timers, animation frames and local futures behind one trait, so every
//! timing-dependent behavior can run against a virtual clock.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap},
    rc::Rc,
    time::Duration,
};

use futures::{
    channel::oneshot,
    executor::{LocalPool, LocalSpawner},
    future::LocalBoxFuture,
    task::LocalSpawnExt,
};
use tracing::warn;

id_newtype!(TimerId, u64);

/// Spacing of frame callbacks (roughly 60 frames per second).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub trait Scheduler {
    /// Time elapsed since the scheduler was created.
    fn now(&self) -> Duration;
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId;
    /// Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
    /// Runs `callback` on the next frame with the frame timestamp.
    fn request_frame(&self, callback: Box<dyn FnOnce(Duration)>) -> TimerId;
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);

    fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        self.set_timeout(
            delay,
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        Box::pin(async move {
            let _ = rx.await;
        })
    }
}

enum Task {
    Timeout(Box<dyn FnOnce()>),
    Frame(Box<dyn FnOnce(Duration)>),
}

#[derive(Default)]
struct VirtualState {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Task>,
    deadlines: HashMap<TimerId, Duration>,
}

/// Deterministic scheduler whose clock only moves through [`VirtualScheduler::advance`].
///
/// Timers fire in deadline order, ties in registration order. Spawned
/// futures are polled until they stall before the first timer and after
/// every fired timer.
pub struct VirtualScheduler {
    state: RefCell<VirtualState>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            state: RefCell::new(VirtualState::default()),
            pool: RefCell::new(pool),
            spawner,
        }
    }
}

impl VirtualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn enqueue(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let deadline = state.now + delay;
        state.queue.insert((deadline, id.0), task);
        state.deadlines.insert(id, deadline);
        id
    }

    /// Number of timers and frame callbacks still queued.
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Polls spawned futures without moving the clock.
    pub fn run_pending(&self) {
        match self.pool.try_borrow_mut() {
            Ok(mut pool) => pool.run_until_stalled(),
            Err(_) => warn!("virtual scheduler re-entered while polling futures"),
        }
    }

    /// Moves the clock forward, firing everything due on the way.
    pub fn advance(&self, by: Duration) {
        let target = self.state.borrow().now + by;
        self.run_pending();
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .queue
                    .first_key_value()
                    .is_some_and(|(&(deadline, _), _)| deadline <= target);
                if due {
                    let popped = state.queue.pop_first();
                    if let Some(((deadline, seq), _)) = &popped {
                        state.deadlines.remove(&TimerId(*seq));
                        state.now = *deadline;
                    }
                    popped
                } else {
                    None
                }
            };
            let Some(((deadline, _), task)) = next else {
                break;
            };
            match task {
                Task::Timeout(run) => run(),
                Task::Frame(run) => run(deadline),
            }
            self.run_pending();
        }
        self.state.borrow_mut().now = target;
        self.run_pending();
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> Duration {
        self.state.borrow().now
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        self.enqueue(delay, Task::Timeout(task))
    }

    fn clear_timeout(&self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        if let Some(deadline) = state.deadlines.remove(&id) {
            state.queue.remove(&(deadline, id.0));
        }
    }

    fn request_frame(&self, callback: Box<dyn FnOnce(Duration)>) -> TimerId {
        self.enqueue(FRAME_INTERVAL, Task::Frame(callback))
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(future) {
            warn!(error = %err, "failed to spawn local future on virtual scheduler");
        }
    }
}

/// Real-time scheduler. Must be used from inside a [`tokio::task::LocalSet`].
pub struct TokioScheduler {
    origin: tokio::time::Instant,
    next_id: Cell<u64>,
    timers: Rc<RefCell<HashMap<TimerId, tokio::task::AbortHandle>>>,
}

impl TokioScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            origin: tokio::time::Instant::now(),
            next_id: Cell::new(0),
            timers: Rc::new(RefCell::new(HashMap::new())),
        })
    }

    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        let timers = Rc::clone(&self.timers);
        let origin = self.origin;
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            timers.borrow_mut().remove(&id);
            match task {
                Task::Timeout(run) => run(),
                Task::Frame(run) => run(origin.elapsed()),
            }
        });
        self.timers.borrow_mut().insert(id, handle.abort_handle());
        id
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        self.schedule(delay, Task::Timeout(task))
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(handle) = self.timers.borrow_mut().remove(&id) {
            handle.abort();
        }
    }

    fn request_frame(&self, callback: Box<dyn FnOnce(Duration)>) -> TimerId {
        self.schedule(FRAME_INTERVAL, Task::Frame(callback))
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(future);
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
