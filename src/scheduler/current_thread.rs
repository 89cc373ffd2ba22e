use std::{
  cmp::Ordering,
  collections::BinaryHeap,
  sync::{Arc, Condvar, Mutex},
  time::Duration,
};

use crate::scheduler::{clock_now, Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

/// A FIFO of work drained by an explicit [`work`](Self::work) call.
///
/// Scheduling is allowed from any thread: the entry lands in this
/// scheduler's queue and wakes a concurrent `work` call if one is blocked
/// waiting. Entries due at the same time run in scheduling order, which is
/// what makes chains driven by this scheduler deterministic.
#[derive(Clone, Default)]
pub struct CurrentThreadScheduler {
  inner: Arc<Queue>,
}

#[derive(Default)]
struct Queue {
  state: Mutex<QueueState>,
  wake: Condvar,
}

#[derive(Default)]
struct QueueState {
  heap: BinaryHeap<Entry>,
  next_seq: usize,
}

struct Entry {
  due: Duration,
  seq: usize,
  task: Task,
  handle: TaskHandle,
}

impl PartialEq for Entry {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due && self.seq == other.seq
  }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Entry {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earliest due first, FIFO within the same instant.
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

impl CurrentThreadScheduler {
  pub fn new() -> Self {
    CurrentThreadScheduler::default()
  }

  /// Number of queued entries.
  pub fn pending_count(&self) -> usize {
    lock_state(&self.inner.state).heap.len()
  }

  /// Drain the queue, running every entry as it comes due, until the queue
  /// is empty. Entries not yet due make this call sleep until their due
  /// time (or until an earlier entry arrives from another thread).
  pub fn work(&self) {
    loop {
      let mut state = lock_state(&self.inner.state);
      let now = clock_now();
      match state.heap.peek() {
        None => return,
        Some(entry) if entry.due > now => {
          let wait = entry.due - now;
          let (guard, _timed_out) = self
            .inner
            .wake
            .wait_timeout(state, wait)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
          drop(guard);
        }
        Some(_) => {
          let mut entry = state.heap.pop().expect("peeked entry present");
          drop(state);

          if entry.handle.is_closed() {
            continue;
          }
          match entry.task.step() {
            TaskState::Finished => entry.handle.mark_finished(),
            TaskState::Yield => self.reschedule(entry, Duration::ZERO),
            TaskState::Sleeping(d) => self.reschedule(entry, d),
          }
        }
      }
    }
  }

  fn reschedule(&self, entry: Entry, delay: Duration) {
    let mut state = lock_state(&self.inner.state);
    let seq = state.next_seq;
    state.next_seq += 1;
    state.heap.push(Entry {
      due: clock_now() + delay,
      seq,
      task: entry.task,
      handle: entry.handle,
    });
    self.inner.wake.notify_one();
  }
}

impl Scheduler for CurrentThreadScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let mut state = lock_state(&self.inner.state);
    let seq = state.next_seq;
    state.next_seq += 1;
    state.heap.push(Entry {
      due: clock_now() + delay.unwrap_or(Duration::ZERO),
      seq,
      task,
      handle: handle.clone(),
    });
    self.inner.wake.notify_one();
    handle
  }
}

fn lock_state(state: &Mutex<QueueState>) -> std::sync::MutexGuard<'_, QueueState> {
  state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
