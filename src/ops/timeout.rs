use std::time::Duration;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle},
  subscription::{CompositeSubscription, Subscription},
};

/// Fails the stream with [`StreamError::Timeout`] when `duration` passes
/// without an event; every value restarts the clock. The timer firing also
/// tears the upstream subscription down.
#[derive(Clone)]
pub struct TimeoutOp<S, SD> {
  pub(crate) source: S,
  pub(crate) duration: Duration,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for TimeoutOp<S, SD>
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
    let TimeoutOp { source, duration, scheduler } = self;
    let observer = MutArc::own(Some(observer));
    let pending: MutArc<Option<TaskHandle>> = MutArc::own(None);
    let subscription = CompositeSubscription::new();

    let mut timeout_observer = TimeoutObserver {
      observer,
      pending: pending.clone(),
      duration,
      scheduler,
      subscription: subscription.clone(),
    };
    timeout_observer.arm();

    subscription.add(source.actual_subscribe(timeout_observer));
    subscription.add(pending);
    subscription
  }
}

pub struct TimeoutObserver<O, SD> {
  observer: MutArc<Option<O>>,
  pending: MutArc<Option<TaskHandle>>,
  duration: Duration,
  scheduler: SD,
  subscription: CompositeSubscription,
}

impl<O, SD> TimeoutObserver<O, SD>
where
  O: Observer + Send + 'static,
  O::Item: Send + 'static,
  SD: Scheduler + Clone,
{
  fn disarm(&mut self) {
    if let Some(mut stale) = self.pending.rc_deref_mut().take() {
      stale.unsubscribe();
    }
  }

  fn arm(&mut self) {
    self.disarm();
    let mut observer = self.observer.clone();
    let duration = self.duration;
    let mut upstream = self.subscription.clone();
    let handle = self.scheduler.schedule(
      Task::once(move || {
        if !observer.is_closed() {
          observer.error(StreamError::Timeout { after: duration });
          upstream.unsubscribe();
        }
      }),
      Some(duration),
    );
    *self.pending.rc_deref_mut() = Some(handle);
  }
}

impl<O, SD> Observer for TimeoutObserver<O, SD>
where
  O: Observer + Send + 'static,
  O::Item: Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = O::Item;

  fn next(&mut self, value: O::Item) {
    self.observer.next(value);
    if !self.observer.is_closed() {
      self.arm();
    }
  }

  fn error(&mut self, err: StreamError) {
    self.disarm();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    self.disarm();
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
  fn silence_past_the_deadline_errors() {
    TestScheduler::init();
    let input = Subject::<i32>::new();
    let errors = MutArc::own(Vec::new());

    let c_errors = errors.clone();
    input
      .clone()
      .timeout_with(Duration::from_millis(100), TestScheduler)
      .subscribe_err(|_| {}, move |e| c_errors.rc_deref_mut().push(e));

    TestScheduler::advance_by(Duration::from_millis(100));

    let errors = errors.rc_deref();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], StreamError::Timeout { .. }));
    assert_eq!(input.subscriber_count(), 0);
  }

  #[test]
  fn every_arrival_restarts_the_clock() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());
    let errors = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    let c_errors = errors.clone();
    input
      .clone()
      .timeout_with(Duration::from_millis(100), TestScheduler)
      .subscribe_err(
        move |v| c_seen.rc_deref_mut().push(v),
        move |e| c_errors.rc_deref_mut().push(e),
      );

    for v in 0..3 {
      TestScheduler::advance_by(Duration::from_millis(60));
      input.next(v);
    }
    assert!(errors.rc_deref().is_empty());
    assert_eq!(*seen.rc_deref(), vec![0, 1, 2]);

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(errors.rc_deref().len(), 1);
  }

  #[test]
  fn completion_disarms_the_timer() {
    TestScheduler::init();
    let mut input = Subject::<i32>::new();
    let completed = MutArc::own(false);
    let errors = MutArc::own(Vec::new());

    let c_completed = completed.clone();
    let c_errors = errors.clone();
    input
      .clone()
      .timeout_with(Duration::from_millis(100), TestScheduler)
      .subscribe_all(
        |_| {},
        move |e| c_errors.rc_deref_mut().push(e),
        move || *c_completed.rc_deref_mut() = true,
      );

    input.complete();
    TestScheduler::flush();

    assert!(*completed.rc_deref());
    assert!(errors.rc_deref().is_empty());
  }
}
