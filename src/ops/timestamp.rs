use std::time::Duration;

use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, scheduler::Scheduler};

/// A value wrapped with the monotonic time it was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamped<T> {
  /// Monotonic clock reading at emission.
  pub time: Duration,
  pub value: T,
}

/// A value wrapped with the time elapsed since its predecessor (since
/// subscription for the first value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elapsed<T> {
  pub elapsed: Duration,
  pub value: T,
}

/// Stamps each value with the scheduler clock.
#[derive(Clone)]
pub struct TimestampOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for TimestampOp<S, SD>
where
  S: Observable,
  SD: Scheduler + Clone,
{
  type Item = Stamped<S::Item>;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Stamped<S::Item>> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(TimestampObserver { observer, scheduler: self.scheduler })
  }
}

pub struct TimestampObserver<O, SD> {
  observer: O,
  scheduler: SD,
}

impl<O, SD, Item> Observer for TimestampObserver<O, SD>
where
  O: Observer<Item = Stamped<Item>>,
  SD: Scheduler,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self
      .observer
      .next(Stamped { time: self.scheduler.now(), value });
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

/// Wraps each value with the delta from the previous emission.
#[derive(Clone)]
pub struct TimeIntervalOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for TimeIntervalOp<S, SD>
where
  S: Observable,
  SD: Scheduler + Clone,
{
  type Item = Elapsed<S::Item>;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Elapsed<S::Item>> + Send + 'static,
  {
    let start = self.scheduler.now();
    self.source.actual_subscribe(TimeIntervalObserver {
      observer,
      scheduler: self.scheduler,
      previous: start,
    })
  }
}

pub struct TimeIntervalObserver<O, SD> {
  observer: O,
  scheduler: SD,
  previous: Duration,
}

impl<O, SD, Item> Observer for TimeIntervalObserver<O, SD>
where
  O: Observer<Item = Elapsed<Item>>,
  SD: Scheduler,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let now = self.scheduler.now();
    let elapsed = now.saturating_sub(self.previous);
    self.previous = now;
    self.observer.next(Elapsed { elapsed, value });
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
