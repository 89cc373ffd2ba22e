//! Virtual time for deterministic tests.
//!
//! [`TestScheduler`] only advances its clock when told to, executing due
//! tasks synchronously. Each thread owns an independent virtual clock and
//! task queue, so tests stay isolated when run in parallel.
//!
//! ```
//! use std::time::Duration;
//! use brook::prelude::*;
//!
//! TestScheduler::init();
//!
//! let seen = MutArc::own(Vec::new());
//! let c_seen = seen.clone();
//! observable::of(42)
//!   .delay_with(Duration::from_millis(100), TestScheduler)
//!   .subscribe(move |v| c_seen.rc_deref_mut().push(v));
//!
//! assert!(seen.rc_deref().is_empty());
//! TestScheduler::advance_by(Duration::from_millis(100));
//! assert_eq!(*seen.rc_deref(), vec![42]);
//! ```

use std::{cell::RefCell, cmp::Ordering, collections::BinaryHeap, time::Duration};

use crate::scheduler::{Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

struct TestSchedulerState {
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
  initialized: bool,
}

impl Default for TestSchedulerState {
  fn default() -> Self {
    Self {
      virtual_time: Duration::ZERO,
      task_queue: BinaryHeap::new(),
      next_task_id: 0,
      initialized: false,
    }
  }
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Task,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id.
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

thread_local! {
  static TEST_SCHEDULER_STATE: RefCell<TestSchedulerState> =
    RefCell::new(TestSchedulerState::default());
}

/// A virtual-time scheduler for deterministic testing.
///
/// Zero-sized; all instances on the same thread share one virtual clock
/// and queue through thread-local storage.
#[derive(Clone, Copy, Default)]
pub struct TestScheduler;

impl TestScheduler {
  /// Initialize or reset this thread's scheduler state. Call at the start
  /// of each test; the other methods panic without it.
  pub fn init() {
    TEST_SCHEDULER_STATE.with(|state| {
      let mut state = state.borrow_mut();
      state.virtual_time = Duration::ZERO;
      state.task_queue.clear();
      state.next_task_id = 0;
      state.initialized = true;
    });
  }

  fn ensure_initialized() {
    TEST_SCHEDULER_STATE.with(|state| {
      assert!(
        state.borrow().initialized,
        "TestScheduler::init() must be called before using the scheduler"
      );
    });
  }

  /// The current virtual time.
  pub fn virtual_now() -> Duration {
    Self::ensure_initialized();
    TEST_SCHEDULER_STATE.with(|state| state.borrow().virtual_time)
  }

  /// Number of tasks waiting in the queue.
  pub fn pending_count() -> usize {
    Self::ensure_initialized();
    TEST_SCHEDULER_STATE.with(|state| state.borrow().task_queue.len())
  }

  /// Whether the queue is empty.
  pub fn is_empty() -> bool {
    Self::pending_count() == 0
  }

  fn execute_tasks_until(target_time: Option<Duration>) {
    loop {
      let due = TEST_SCHEDULER_STATE.with(|state| {
        let mut state = state.borrow_mut();
        let should_stop = match state.task_queue.peek() {
          None => true,
          Some(peek) => {
            target_time.is_some_and(|limit| peek.scheduled_time > limit)
          }
        };
        if should_stop {
          return None;
        }
        let scheduled = state.task_queue.pop().expect("peeked task present");
        state.virtual_time = scheduled.scheduled_time;
        Some(scheduled)
      });

      let Some(mut scheduled) = due else {
        break;
      };
      if scheduled.handle.is_closed() {
        continue;
      }

      let result = scheduled.task.step();

      TEST_SCHEDULER_STATE.with(|state| {
        let mut state = state.borrow_mut();
        match result {
          TaskState::Finished => scheduled.handle.mark_finished(),
          TaskState::Yield => Self::reschedule(&mut state, scheduled, Duration::ZERO),
          TaskState::Sleeping(d) => Self::reschedule(&mut state, scheduled, d),
        }
      });
    }
  }

  fn reschedule(state: &mut TestSchedulerState, scheduled: ScheduledTask, delay: Duration) {
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    state.task_queue.push(ScheduledTask {
      scheduled_time: state.virtual_time + delay,
      task_id,
      task: scheduled.task,
      handle: scheduled.handle,
    });
  }

  /// Advance virtual time by `duration`, executing every task that comes
  /// due, in (time, FIFO) order.
  pub fn advance_by(duration: Duration) {
    Self::ensure_initialized();
    let target_time =
      TEST_SCHEDULER_STATE.with(|state| state.borrow().virtual_time + duration);

    Self::execute_tasks_until(Some(target_time));

    TEST_SCHEDULER_STATE.with(|state| {
      state.borrow_mut().virtual_time = target_time;
    });
  }

  /// Execute every pending task, advancing time as far as needed. Tasks
  /// that keep rescheduling themselves keep running until finished or
  /// cancelled, so flush an infinite `interval` only after cancelling it.
  pub fn flush() {
    Self::ensure_initialized();
    Self::execute_tasks_until(None);
  }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    Self::ensure_initialized();
    let handle = TaskHandle::new();
    TEST_SCHEDULER_STATE.with(|state| {
      let mut state = state.borrow_mut();
      let scheduled_time = state.virtual_time + delay.unwrap_or(Duration::ZERO);
      let task_id = state.next_task_id;
      state.next_task_id += 1;
      state.task_queue.push(ScheduledTask {
        scheduled_time,
        task_id,
        task,
        handle: handle.clone(),
      });
    });
    handle
  }

  fn now(&self) -> Duration {
    Self::virtual_now()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{rc::MutArc, subscription::Subscription};

  #[test]
  fn init_resets_time_and_queue() {
    TestScheduler::init();
    TestScheduler.schedule(Task::once(|| {}), Some(Duration::from_millis(5)));
    TestScheduler::advance_by(Duration::from_millis(10));
    assert_eq!(TestScheduler::virtual_now(), Duration::from_millis(10));

    TestScheduler::init();
    assert_eq!(TestScheduler::virtual_now(), Duration::ZERO);
    assert!(TestScheduler::is_empty());
  }

  #[test]
  fn advance_by_is_cumulative() {
    TestScheduler::init();
    TestScheduler::advance_by(Duration::from_millis(100));
    TestScheduler::advance_by(Duration::from_millis(50));
    assert_eq!(TestScheduler::virtual_now(), Duration::from_millis(150));
  }

  #[test]
  fn immediate_and_delayed_tasks_run_at_their_time() {
    TestScheduler::init();
    let results = MutArc::own(Vec::new());

    let r = results.clone();
    TestScheduler.schedule(Task::once(move || r.rc_deref_mut().push("immediate")), None);
    let r = results.clone();
    TestScheduler.schedule(
      Task::once(move || r.rc_deref_mut().push("delayed")),
      Some(Duration::from_millis(100)),
    );

    assert_eq!(TestScheduler::pending_count(), 2);

    TestScheduler::advance_by(Duration::ZERO);
    assert_eq!(*results.rc_deref(), vec!["immediate"]);

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(*results.rc_deref(), vec!["immediate", "delayed"]);
  }

  #[test]
  fn cancelled_tasks_never_run() {
    TestScheduler::init();
    let hits = MutArc::own(0);

    let c_hits = hits.clone();
    let mut handle = TestScheduler.schedule(
      Task::once(move || *c_hits.rc_deref_mut() += 1),
      Some(Duration::from_millis(100)),
    );
    handle.unsubscribe();

    TestScheduler::advance_by(Duration::from_millis(150));
    assert_eq!(*hits.rc_deref(), 0);
  }

  #[test]
  fn same_time_tasks_run_fifo() {
    TestScheduler::init();
    let order = MutArc::own(Vec::new());

    for i in 0..5 {
      let c_order = order.clone();
      TestScheduler.schedule(
        Task::once(move || c_order.rc_deref_mut().push(i)),
        Some(Duration::from_millis(100)),
      );
    }

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(*order.rc_deref(), vec![0, 1, 2, 3, 4]);
  }

  #[test]
  fn sleeping_tasks_reschedule_at_virtual_offsets() {
    TestScheduler::init();
    let stamps = MutArc::own(Vec::new());

    let c_stamps = stamps.clone();
    let mut remaining = 3;
    TestScheduler.schedule(
      Task::new(move || {
        c_stamps.rc_deref_mut().push(TestScheduler::virtual_now());
        remaining -= 1;
        if remaining == 0 {
          TaskState::Finished
        } else {
          TaskState::Sleeping(Duration::from_millis(10))
        }
      }),
      Some(Duration::from_millis(10)),
    );

    TestScheduler::flush();
    assert_eq!(
      *stamps.rc_deref(),
      vec![
        Duration::from_millis(10),
        Duration::from_millis(20),
        Duration::from_millis(30)
      ]
    );
  }

  #[test]
  fn tasks_beyond_the_target_stay_queued() {
    TestScheduler::init();
    let hits = MutArc::own(Vec::new());

    for ms in [50u64, 150] {
      let c_hits = hits.clone();
      TestScheduler.schedule(
        Task::once(move || c_hits.rc_deref_mut().push(ms)),
        Some(Duration::from_millis(ms)),
      );
    }

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(*hits.rc_deref(), vec![50]);
    assert_eq!(TestScheduler::pending_count(), 1);

    TestScheduler::advance_by(Duration::from_millis(50));
    assert_eq!(*hits.rc_deref(), vec![50, 150]);
  }
}
