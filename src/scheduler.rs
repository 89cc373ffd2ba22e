//! Work dispatch.
//!
//! A [`Scheduler`] decides where and when a unit of work runs. Work units
//! are [`Task`]s: resumable closures returning a [`TaskState`] that either
//! finishes the task, reschedules it immediately (`Yield`), or reschedules
//! it after a sleep (`Sleeping`). Returning `Yield`/`Sleeping` is the
//! recursive-scheduling shape used by `interval`, `from_iter_with` and the
//! periodic time operators: the task *is* its own continuation.
//!
//! Built-in schedulers:
//! - [`ImmediateScheduler`]: runs the task synchronously on the calling
//!   thread, sleeping inline for delays.
//! - [`ThreadPoolScheduler`]: dispatches onto a process-wide futures
//!   thread pool; sleeps are `futures-timer` delays.
//! - [`NewThreadScheduler`]: a dedicated OS thread per work unit.
//! - [`CurrentThreadScheduler`]: a cross-thread FIFO drained by an
//!   explicit [`work`](CurrentThreadScheduler::work) call.
//! - [`TestScheduler`]: virtual time for deterministic tests.
//!
//! Time is read through [`Scheduler::now`], a monotonic duration since an
//! arbitrary process epoch; the test scheduler substitutes virtual time, so
//! operators that stamp values stay correct under both.

mod current_thread;
mod immediate;
mod new_thread;
pub mod test_scheduler;
mod thread_pool;

pub use current_thread::CurrentThreadScheduler;
pub use immediate::ImmediateScheduler;
pub use new_thread::NewThreadScheduler;
pub use test_scheduler::TestScheduler;
pub use thread_pool::ThreadPoolScheduler;

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use crossbeam_utils::atomic::AtomicCell;
use lazy_static::lazy_static;

use crate::subscription::Subscription;

lazy_static! {
  static ref PROCESS_EPOCH: Instant = Instant::now();
}

/// Monotonic time since the process epoch.
pub(crate) fn clock_now() -> Duration {
  PROCESS_EPOCH.elapsed()
}

/// What a task step asks the scheduler to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  /// The task is done; release it.
  Finished,
  /// Run the same task again as soon as possible.
  Yield,
  /// Run the same task again after the given sleep.
  Sleeping(Duration),
}

/// A resumable unit of work.
pub struct Task(Box<dyn FnMut() -> TaskState + Send>);

impl Task {
  /// A task that re-runs `step` until it reports [`TaskState::Finished`].
  pub fn new(step: impl FnMut() -> TaskState + Send + 'static) -> Self {
    Task(Box::new(step))
  }

  /// A task that runs `action` exactly once.
  pub fn once(action: impl FnOnce() + Send + 'static) -> Self {
    let mut action = Some(action);
    Task(Box::new(move || {
      if let Some(action) = action.take() {
        action();
      }
      TaskState::Finished
    }))
  }

  /// Execute one step.
  pub fn step(&mut self) -> TaskState {
    (self.0)()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleState {
  Pending,
  Finished,
  Cancelled,
}

/// Cancellation handle of a scheduled task.
///
/// Schedulers consult the handle before every step and at every wake, so
/// cancellation is observed promptly even while a task sleeps.
#[derive(Clone)]
pub struct TaskHandle {
  state: Arc<AtomicCell<HandleState>>,
}

impl Default for TaskHandle {
  fn default() -> Self {
    TaskHandle::new()
  }
}

impl TaskHandle {
  pub fn new() -> Self {
    TaskHandle { state: Arc::new(AtomicCell::new(HandleState::Pending)) }
  }

  /// A handle for work that already ran to completion.
  pub fn finished() -> Self {
    TaskHandle { state: Arc::new(AtomicCell::new(HandleState::Finished)) }
  }

  /// Record that the task ran to completion on its own.
  pub fn mark_finished(&self) {
    let _ = self
      .state
      .compare_exchange(HandleState::Pending, HandleState::Finished);
  }

  /// Whether the task was cancelled (as opposed to finishing).
  pub fn is_cancelled(&self) -> bool {
    self.state.load() == HandleState::Cancelled
  }
}

impl Subscription for TaskHandle {
  fn unsubscribe(&mut self) {
    let _ = self
      .state
      .compare_exchange(HandleState::Pending, HandleState::Cancelled);
  }

  fn is_closed(&self) -> bool {
    self.state.load() != HandleState::Pending
  }
}

/// A strategy for dispatching units of work.
pub trait Scheduler: Send + Sync + 'static {
  /// Run `task` after an optional delay, re-running it as long as it
  /// returns [`TaskState::Yield`] or [`TaskState::Sleeping`].
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle;

  /// Monotonic time since this scheduler's epoch.
  fn now(&self) -> Duration {
    clock_now()
  }
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    (**self).schedule(task, delay)
  }

  fn now(&self) -> Duration {
    (**self).now()
  }
}

/// Drive `task` to completion on the calling thread, using `sleep` for the
/// delays. Shared by the immediate and new-thread schedulers.
pub(crate) fn run_task_inline(mut task: Task, handle: &TaskHandle, sleep: impl Fn(Duration)) {
  loop {
    if handle.is_closed() {
      return;
    }
    match task.step() {
      TaskState::Finished => {
        handle.mark_finished();
        return;
      }
      TaskState::Yield => {}
      TaskState::Sleeping(d) => sleep(d),
    }
  }
}
