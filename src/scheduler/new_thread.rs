use std::{panic::AssertUnwindSafe, thread, time::Duration};

use crate::scheduler::{Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

/// Spawns a dedicated OS thread per work unit.
///
/// Suited to long-running or blocking producers that must not tie up the
/// shared pool. The thread exits when the task finishes or its handle is
/// cancelled; sleeps are real thread sleeps, re-checking cancellation at
/// every wake.
#[derive(Clone, Copy, Default)]
pub struct NewThreadScheduler;

impl Scheduler for NewThreadScheduler {
  fn schedule(&self, mut task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let task_handle = handle.clone();
    thread::Builder::new()
      .name("brook-worker".into())
      .spawn(move || {
        if let Some(d) = delay {
          thread::sleep(d);
        }
        loop {
          if task_handle.is_closed() {
            return;
          }
          let step = std::panic::catch_unwind(AssertUnwindSafe(|| task.step()));
          match step {
            Ok(TaskState::Finished) => {
              task_handle.mark_finished();
              return;
            }
            Ok(TaskState::Yield) => {}
            Ok(TaskState::Sleeping(d)) => thread::sleep(d),
            Err(_) => {
              tracing::error!("scheduled task panicked, dropping it");
              task_handle.mark_finished();
              return;
            }
          }
        }
      })
      .expect("spawn a worker thread");
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::time::Instant;

  use super::*;
  use crate::rc::MutArc;

  #[test]
  fn runs_on_its_own_thread() {
    let seen = MutArc::own(None);
    let c_seen = seen.clone();
    NewThreadScheduler.schedule(
      Task::once(move || {
        *c_seen.rc_deref_mut() =
          Some(thread::current().name().map(str::to_owned));
      }),
      None,
    );

    let start = Instant::now();
    while seen.rc_deref().is_none() && start.elapsed() < Duration::from_secs(1) {
      thread::sleep(Duration::from_millis(1));
    }
    let name = seen.rc_deref().clone().flatten();
    assert_eq!(name.as_deref(), Some("brook-worker"));
  }
}
