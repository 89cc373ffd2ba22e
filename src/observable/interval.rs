//! Periodic tick sources.

use std::time::Duration;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle, TaskState, ThreadPoolScheduler},
};

/// Creates an observable emitting `0, 1, 2, …` every `period`, forever.
/// The first tick arrives one `period` after subscribing.
///
/// Combine with `take(n)` or unsubscribe to end it; cancellation is
/// observed at every reschedule point.
pub fn interval(period: Duration) -> Interval<ThreadPoolScheduler> {
  interval_with(period, ThreadPoolScheduler::default())
}

/// [`interval`] driven by an explicit scheduler.
pub fn interval_with<SD>(period: Duration, scheduler: SD) -> Interval<SD> {
  Interval { initial_delay: period, period, scheduler }
}

/// Creates an observable whose first tick arrives after `initial_delay`
/// and which then ticks every `period`.
pub fn interval_at(initial_delay: Duration, period: Duration) -> Interval<ThreadPoolScheduler> {
  interval_at_with(initial_delay, period, ThreadPoolScheduler::default())
}

/// [`interval_at`] driven by an explicit scheduler.
pub fn interval_at_with<SD>(
  initial_delay: Duration, period: Duration, scheduler: SD,
) -> Interval<SD> {
  Interval { initial_delay, period, scheduler }
}

#[derive(Clone)]
pub struct Interval<SD> {
  pub(crate) initial_delay: Duration,
  pub(crate) period: Duration,
  pub(crate) scheduler: SD,
}

impl<SD: Scheduler> Observable for Interval<SD> {
  type Item = usize;
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = usize> + Send + 'static,
  {
    let mut observer = MutArc::own(Some(observer));
    let period = self.period;
    let mut tick = 0usize;
    self.scheduler.schedule(
      Task::new(move || {
        if observer.is_closed() {
          return TaskState::Finished;
        }
        observer.next(tick);
        tick += 1;
        TaskState::Sleeping(period)
      }),
      Some(self.initial_delay),
    )
  }
}
