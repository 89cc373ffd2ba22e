//! Iterables as observables.

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
  subscription::SingleSubscription,
};

/// Creates an observable emitting every item of `iter` synchronously at
/// subscribe time, then completing.
///
/// ```
/// use brook::prelude::*;
///
/// observable::from_iter(vec![1, 2, 3]).subscribe(|v| println!("{v}"));
/// ```
pub fn from_iter<I: IntoIterator>(iter: I) -> FromIter<I> {
  FromIter(iter)
}

#[derive(Clone)]
pub struct FromIter<I>(pub(crate) I);

impl<I: IntoIterator> Observable for FromIter<I> {
  type Item = I::Item;
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = I::Item> + Send + 'static,
  {
    for value in self.0 {
      if observer.is_closed() {
        return SingleSubscription::closed();
      }
      observer.next(value);
    }
    observer.complete();
    SingleSubscription::closed()
  }
}

/// Creates an observable emitting the items of `iter` on `scheduler`, one
/// work unit per item, so cancellation between items is prompt.
pub fn from_iter_with<I: IntoIterator, SD>(iter: I, scheduler: SD) -> FromIterWith<I, SD> {
  FromIterWith { iter, scheduler }
}

#[derive(Clone)]
pub struct FromIterWith<I, SD> {
  pub(crate) iter: I,
  pub(crate) scheduler: SD,
}

impl<I, SD> Observable for FromIterWith<I, SD>
where
  I: IntoIterator,
  I::IntoIter: Send + 'static,
  SD: Scheduler,
{
  type Item = I::Item;
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = I::Item> + Send + 'static,
  {
    let mut iter = self.iter.into_iter();
    let mut observer = MutArc::own(Some(observer));
    self.scheduler.schedule(
      Task::new(move || {
        if observer.is_closed() {
          return TaskState::Finished;
        }
        match iter.next() {
          Some(value) => {
            observer.next(value);
            TaskState::Yield
          }
          None => {
            observer.complete();
            TaskState::Finished
          }
        }
      }),
      None,
    )
  }
}
