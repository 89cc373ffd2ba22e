//! Deferred function calls as observables.

use std::panic::AssertUnwindSafe;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle, ThreadPoolScheduler},
};

/// Creates an observable that runs `action` as one scheduled work unit,
/// emits its return value, then completes. A panic escaping the action is
/// delivered as an error; unsubscribing before the action runs suppresses
/// both the call and its result.
pub fn start<F, Item>(action: F) -> Start<F, ThreadPoolScheduler>
where
  F: FnOnce() -> Item,
{
  start_with(action, ThreadPoolScheduler::default())
}

/// [`start`] driven by an explicit scheduler.
pub fn start_with<F, Item, SD>(action: F, scheduler: SD) -> Start<F, SD>
where
  F: FnOnce() -> Item,
{
  Start { action, scheduler }
}

#[derive(Clone)]
pub struct Start<F, SD> {
  pub(crate) action: F,
  pub(crate) scheduler: SD,
}

impl<F, Item, SD> Observable for Start<F, SD>
where
  F: FnOnce() -> Item + Send + 'static,
  SD: Scheduler,
{
  type Item = Item;
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    let mut observer = MutArc::own(Some(observer));
    let action = self.action;
    self.scheduler.schedule(
      Task::once(move || {
        if observer.is_closed() {
          return;
        }
        match std::panic::catch_unwind(AssertUnwindSafe(action)) {
          Ok(value) => {
            observer.next(value);
            observer.complete();
          }
          Err(payload) => observer.error(StreamError::from_panic(payload)),
        }
      }),
      None,
    )
  }
}
