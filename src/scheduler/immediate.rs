use std::{thread, time::Duration};

use crate::scheduler::{run_task_inline, Scheduler, Task, TaskHandle};

/// Runs every work unit synchronously on the calling thread.
///
/// Delays and task sleeps block the caller. Recursive tasks (`interval` on
/// this scheduler) therefore never return to the caller until cancelled
/// from another thread or finished.
#[derive(Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    if let Some(d) = delay {
      if !d.is_zero() {
        thread::sleep(d);
      }
    }
    run_task_inline(task, &handle, thread::sleep);
    handle
  }
}
