//! One-shot delayed emission.

use std::time::Duration;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle, ThreadPoolScheduler},
};

/// Creates an observable emitting a single `()` after `delay`, then
/// completing. For an emission that then turns periodic, see
/// [`interval_at`](crate::observable::interval_at).
pub fn timer(delay: Duration) -> Timer<ThreadPoolScheduler> {
  timer_with(delay, ThreadPoolScheduler::default())
}

/// [`timer`] driven by an explicit scheduler.
pub fn timer_with<SD>(delay: Duration, scheduler: SD) -> Timer<SD> {
  Timer { delay, scheduler }
}

#[derive(Clone)]
pub struct Timer<SD> {
  pub(crate) delay: Duration,
  pub(crate) scheduler: SD,
}

impl<SD: Scheduler> Observable for Timer<SD> {
  type Item = ();
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = ()> + Send + 'static,
  {
    let mut observer = MutArc::own(Some(observer));
    self.scheduler.schedule(
      Task::once(move || {
        observer.next(());
        observer.complete();
      }),
      Some(self.delay),
    )
  }
}
