use std::{panic::AssertUnwindSafe, time::Duration};

use futures::executor::ThreadPool;
use futures_timer::Delay;
use lazy_static::lazy_static;

use crate::scheduler::{Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

lazy_static! {
  static ref DEFAULT_POOL: ThreadPool = ThreadPool::builder()
    .name_prefix("brook-pool-")
    .create()
    .expect("spawn the default thread pool");
}

/// Dispatches work units onto a futures thread pool.
///
/// The default instance shares one process-wide pool; task sleeps are
/// asynchronous (`futures-timer`), so a sleeping task occupies no pool
/// thread. This is the default scheduler of the time-based operators.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl Default for ThreadPoolScheduler {
  fn default() -> Self {
    ThreadPoolScheduler { pool: DEFAULT_POOL.clone() }
  }
}

impl ThreadPoolScheduler {
  /// A scheduler backed by its own dedicated pool.
  pub fn with_pool(pool: ThreadPool) -> Self {
    ThreadPoolScheduler { pool }
  }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule(&self, mut task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let task_handle = handle.clone();
    self.pool.spawn_ok(async move {
      if let Some(d) = delay {
        Delay::new(d).await;
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
          Ok(TaskState::Sleeping(d)) => Delay::new(d).await,
          Err(_) => {
            tracing::error!("scheduled task panicked, dropping it");
            task_handle.mark_finished();
            return;
          }
        }
      }
    });
    handle
  }
}
