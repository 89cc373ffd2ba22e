use std::time::Duration;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle},
  subscription::{CompositeSubscription, Subscription},
};

/// Emits a value only once `duration` has elapsed without a newer one:
/// every arrival cancels the pending emission and schedules its own.
/// Completion flushes the trailing value synchronously; an error discards
/// it.
#[derive(Clone)]
pub struct DebounceOp<S, SD> {
  pub(crate) source: S,
  pub(crate) duration: Duration,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for DebounceOp<S, SD>
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
    let observer = MutArc::own(Some(observer));
    let pending: MutArc<Option<TaskHandle>> = MutArc::own(None);
    let trailing: MutArc<Option<S::Item>> = MutArc::own(None);

    let debounced = DebounceObserver {
      observer: observer.clone(),
      trailing: trailing.clone(),
      pending: pending.clone(),
      duration: self.duration,
      scheduler: self.scheduler,
    };

    let subscription = CompositeSubscription::new();
    subscription.add(self.source.actual_subscribe(debounced));
    subscription.add(pending);
    subscription
  }
}

pub struct DebounceObserver<O, SD, Item> {
  observer: MutArc<Option<O>>,
  trailing: MutArc<Option<Item>>,
  pending: MutArc<Option<TaskHandle>>,
  duration: Duration,
  scheduler: SD,
}

impl<O, SD, Item> Observer for DebounceObserver<O, SD, Item>
where
  O: Observer<Item = Item> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    *self.trailing.rc_deref_mut() = Some(value);
    if let Some(mut stale) = self.pending.rc_deref_mut().take() {
      stale.unsubscribe();
    }
    let mut observer = self.observer.clone();
    let trailing = self.trailing.clone();
    let handle = self.scheduler.schedule(
      Task::once(move || {
        let value = trailing.rc_deref_mut().take();
        if let Some(value) = value {
          observer.next(value);
        }
      }),
      Some(self.duration),
    );
    *self.pending.rc_deref_mut() = Some(handle);
  }

  fn error(&mut self, err: StreamError) {
    if let Some(mut stale) = self.pending.rc_deref_mut().take() {
      stale.unsubscribe();
    }
    self.trailing.rc_deref_mut().take();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    if let Some(mut stale) = self.pending.rc_deref_mut().take() {
      stale.unsubscribe();
    }
    let value = self.trailing.rc_deref_mut().take();
    if let Some(value) = value {
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
  fn a_quiet_period_releases_the_latest_value() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    input
      .clone()
      .debounce_with(Duration::from_millis(50), TestScheduler)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    input.next(1);
    assert!(seen.rc_deref().is_empty());

    TestScheduler::advance_by(Duration::from_millis(50));
    assert_eq!(*seen.rc_deref(), vec![1]);
  }

  #[test]
  fn bursts_collapse_to_their_final_value() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    input
      .clone()
      .debounce_with(Duration::from_millis(100), TestScheduler)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    input.next(1);
    TestScheduler::advance_by(Duration::from_millis(30));
    input.next(2);
    TestScheduler::advance_by(Duration::from_millis(30));
    input.next(3);
    assert!(seen.rc_deref().is_empty());

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(*seen.rc_deref(), vec![3]);

    input.next(4);
    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(*seen.rc_deref(), vec![3, 4]);
  }

  #[test]
  fn completion_flushes_the_trailing_value() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());
    let completed = MutArc::own(false);

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    input
      .clone()
      .debounce_with(Duration::from_millis(100), TestScheduler)
      .subscribe_all(
        move |v| c_seen.rc_deref_mut().push(v),
        |_| {},
        move || *c_completed.rc_deref_mut() = true,
      );

    input.next(42);
    input.complete();

    assert_eq!(*seen.rc_deref(), vec![42]);
    assert!(*completed.rc_deref());
  }

  #[test]
  fn an_error_discards_the_pending_value() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::<i32>::new());
    let errors = MutArc::own(0);

    let c_seen = seen.clone();
    let c_errors = errors.clone();
    input
      .clone()
      .debounce_with(Duration::from_millis(100), TestScheduler)
      .subscribe_err(
        move |v| c_seen.rc_deref_mut().push(v),
        move |_| *c_errors.rc_deref_mut() += 1,
      );

    input.next(1);
    input.error(StreamError::message("cut"));
    TestScheduler::flush();

    assert!(seen.rc_deref().is_empty());
    assert_eq!(*errors.rc_deref(), 1);
  }
}
