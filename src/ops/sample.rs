use std::time::Duration;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
  subscription::{CompositeSubscription, Subscription},
};

/// Remembers the latest value and emits it on every `period` tick, but
/// only when it is fresh (arrived since the previous tick). Completion
/// flushes a fresh value before completing.
#[derive(Clone)]
pub struct SampleOp<S, SD> {
  pub(crate) source: S,
  pub(crate) period: Duration,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for SampleOp<S, SD>
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
    let SampleOp { source, period, scheduler } = self;
    let observer = MutArc::own(Some(observer));
    let latest: MutArc<Option<S::Item>> = MutArc::own(None);

    let mut tick_observer = observer.clone();
    let tick_latest = latest.clone();
    let ticker: TaskHandle = scheduler.schedule(
      Task::new(move || {
        if tick_observer.is_closed() {
          return TaskState::Finished;
        }
        let fresh = tick_latest.rc_deref_mut().take();
        if let Some(value) = fresh {
          tick_observer.next(value);
        }
        TaskState::Sleeping(period)
      }),
      Some(period),
    );

    let subscription = CompositeSubscription::new();
    subscription.add(source.actual_subscribe(SampleObserver {
      observer,
      latest,
      ticker: ticker.clone(),
    }));
    subscription.add(ticker);
    subscription
  }
}

pub struct SampleObserver<O, Item> {
  observer: MutArc<Option<O>>,
  latest: MutArc<Option<Item>>,
  ticker: TaskHandle,
}

impl<O, Item> Observer for SampleObserver<O, Item>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    *self.latest.rc_deref_mut() = Some(value);
  }

  fn error(&mut self, err: StreamError) {
    self.ticker.unsubscribe();
    self.latest.rc_deref_mut().take();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    self.ticker.unsubscribe();
    let fresh = self.latest.rc_deref_mut().take();
    if let Some(value) = fresh {
      self.observer.next(value);
    }
    self.observer.complete();
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{observable::ObservableExt, scheduler::TestScheduler, subject::Subject};

  #[test]
  fn each_tick_emits_only_a_fresh_value() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    input
      .clone()
      .sample_with(Duration::from_millis(10), TestScheduler)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    input.next(1);
    input.next(2);
    TestScheduler::advance_by(Duration::from_millis(10));
    assert_eq!(*seen.rc_deref(), vec![2]);

    // Nothing arrived during this tick: nothing is re-emitted.
    TestScheduler::advance_by(Duration::from_millis(10));
    assert_eq!(*seen.rc_deref(), vec![2]);

    input.next(3);
    TestScheduler::advance_by(Duration::from_millis(10));
    assert_eq!(*seen.rc_deref(), vec![2, 3]);
  }

  #[test]
  fn completion_flushes_a_fresh_value() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());
    let completed = MutArc::own(false);

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    input
      .clone()
      .sample_with(Duration::from_millis(10), TestScheduler)
      .subscribe_all(
        move |v| c_seen.rc_deref_mut().push(v),
        |_| {},
        move || *c_completed.rc_deref_mut() = true,
      );

    input.next(7);
    input.complete();
    TestScheduler::flush();

    assert_eq!(*seen.rc_deref(), vec![7]);
    assert!(*completed.rc_deref());
  }
}
