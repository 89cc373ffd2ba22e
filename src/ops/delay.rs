use std::time::Duration;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task},
  subscription::CompositeSubscription,
};

/// Shifts each value, and the completion, later by a fixed delay.
/// Errors forward immediately, discarding whatever is still in flight.
#[derive(Clone)]
pub struct DelayOp<S, SD> {
  pub(crate) source: S,
  pub(crate) delay: Duration,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for DelayOp<S, SD>
where
  S: Observable,
  S::Item: Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = S::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    let DelayOp { source, delay, scheduler } = self;
    let observer = MutArc::own(Some(observer));

    let subscription = CompositeSubscription::new();
    subscription.add(source.actual_subscribe(DelayObserver {
      observer: observer.clone(),
      delay_of: move |_: &S::Item| delay,
      scheduler,
      flight: MutArc::own(Flight::default()),
    }));
    subscription.add(DetachOnUnsubscribe { observer });
    subscription
  }
}

/// Delays each value by its own `f(&value)`; values whose delays differ
/// may overtake each other.
#[derive(Clone)]
pub struct DelayByOp<S, F, SD> {
  pub(crate) source: S,
  pub(crate) func: F,
  pub(crate) scheduler: SD,
}

impl<S, F, SD> Observable for DelayByOp<S, F, SD>
where
  S: Observable,
  S::Item: Send + 'static,
  F: FnMut(&S::Item) -> Duration + Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = S::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    let DelayByOp { source, func, scheduler } = self;
    let observer = MutArc::own(Some(observer));

    let subscription = CompositeSubscription::new();
    subscription.add(source.actual_subscribe(DelayObserver {
      observer: observer.clone(),
      delay_of: func,
      scheduler,
      flight: MutArc::own(Flight::default()),
    }));
    subscription.add(DetachOnUnsubscribe { observer });
    subscription
  }
}

/// Unsubscribing empties the shared observer slot, so deliveries already
/// scheduled fall into nothing instead of reaching a disposed sink.
struct DetachOnUnsubscribe<O> {
  observer: MutArc<Option<O>>,
}

impl<O: Send> crate::subscription::Subscription for DetachOnUnsubscribe<O> {
  fn unsubscribe(&mut self) {
    self.observer.rc_deref_mut().take();
  }

  fn is_closed(&self) -> bool {
    self.observer.rc_deref().is_none()
  }
}

/// Deliveries still scheduled but not yet run, plus whether the source has
/// already completed. The completion fires only once both say so.
#[derive(Default)]
struct Flight {
  outstanding: usize,
  source_done: bool,
}

pub struct DelayObserver<O, F, SD> {
  observer: MutArc<Option<O>>,
  delay_of: F,
  scheduler: SD,
  flight: MutArc<Flight>,
}

impl<O, F, SD, Item> Observer for DelayObserver<O, F, SD>
where
  O: Observer<Item = Item> + Send + 'static,
  Item: Send + 'static,
  F: FnMut(&Item) -> Duration,
  SD: Scheduler + Clone,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let delay = (self.delay_of)(&value);
    self.flight.rc_deref_mut().outstanding += 1;

    let mut observer = self.observer.clone();
    let flight = self.flight.clone();
    self.scheduler.schedule(
      Task::once(move || {
        observer.next(value);
        let complete_now = {
          let mut flight = flight.rc_deref_mut();
          flight.outstanding -= 1;
          flight.source_done && flight.outstanding == 0
        };
        if complete_now {
          observer.complete();
        }
      }),
      Some(delay),
    );
  }

  fn error(&mut self, err: StreamError) {
    self.observer.error(err);
  }

  fn complete(&mut self) {
    let complete_now = {
      let mut flight = self.flight.rc_deref_mut();
      flight.source_done = true;
      flight.outstanding == 0
    };
    if complete_now {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{observable::ObservableExt, scheduler::TestScheduler, subject::Subject, subscription::Subscription};

  #[test]
  fn values_arrive_after_the_delay() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    input
      .clone()
      .delay_with(Duration::from_millis(100), TestScheduler)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    input.next(42);
    TestScheduler::advance_by(Duration::from_millis(99));
    assert!(seen.rc_deref().is_empty());

    TestScheduler::advance_by(Duration::from_millis(1));
    assert_eq!(*seen.rc_deref(), vec![42]);
  }

  #[test]
  fn unsubscribing_discards_scheduled_deliveries() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::<i32>::new());

    let c_seen = seen.clone();
    let mut sub = input
      .clone()
      .delay_with(Duration::from_millis(100), TestScheduler)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    input.next(1);
    sub.unsubscribe();
    TestScheduler::flush();
    assert!(seen.rc_deref().is_empty());
  }

  #[test]
  fn per_value_delays_may_reorder() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    input
      .clone()
      .delay_by_with(
        |v: &u64| Duration::from_millis(*v),
        TestScheduler,
      )
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    input.next(50u64);
    input.next(10u64);
    TestScheduler::flush();

    assert_eq!(*seen.rc_deref(), vec![10, 50]);
  }
}
