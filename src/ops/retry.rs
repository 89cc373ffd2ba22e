use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, SerialSubscription},
};

/// Re-subscribes a clonable source on error. The budget counts
/// re-subscriptions *after* the initial failure: `retry(0)` never retries,
/// `retry(3)` runs the source at most four times. Once the budget is
/// spent, the last error is forwarded.
#[derive(Clone)]
pub struct RetryOp<S> {
  pub(crate) source: S,
  pub(crate) budget: Option<usize>,
}

impl<S> Observable for RetryOp<S>
where
  S: Observable + Clone + Send + 'static,
  S::Item: Send + 'static,
{
  type Item = S::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    let serial = SerialSubscription::new();
    let subscription = CompositeSubscription::new();
    subscription.add(serial.clone());

    let retrying = RetryObserver {
      source: self.source.clone(),
      observer: MutArc::own(Some(observer)),
      remaining: self.budget,
      serial: serial.clone(),
    };
    serial.set(self.source.actual_subscribe(retrying));
    subscription
  }
}

pub struct RetryObserver<S, O> {
  source: S,
  observer: MutArc<Option<O>>,
  remaining: Option<usize>,
  serial: SerialSubscription,
}

impl<S, O> Observer for RetryObserver<S, O>
where
  S: Observable + Clone + Send + 'static,
  S::Item: Send + 'static,
  O: Observer<Item = S::Item> + Send + 'static,
{
  type Item = S::Item;

  fn next(&mut self, value: S::Item) {
    self.observer.next(value);
  }

  fn error(&mut self, err: StreamError) {
    let exhausted = self.remaining == Some(0);
    if exhausted || self.observer.is_closed() {
      self.observer.error(err);
      return;
    }
    let again = RetryObserver {
      source: self.source.clone(),
      observer: self.observer.clone(),
      remaining: self.remaining.map(|budget| budget - 1),
      serial: self.serial.clone(),
    };
    self
      .serial
      .set(self.source.clone().actual_subscribe(again));
  }

  fn complete(&mut self) {
    self.observer.complete();
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    error::StreamError,
    observable::{self, ObservableExt, Subscriber},
    observer::Observer,
    rc::MutArc,
  };

  #[test]
  fn retries_the_budgeted_number_of_times() {
    let attempts = MutArc::own(0);
    let errors = MutArc::own(Vec::new());
    let seen = MutArc::own(Vec::new());

    let c_attempts = attempts.clone();
    let source = observable::defer(move || {
      let attempt = {
        let mut attempts = c_attempts.rc_deref_mut();
        *attempts += 1;
        *attempts
      };
      observable::create(move |mut subscriber: Subscriber<i32>| {
        subscriber.next(attempt);
        subscriber.error(StreamError::message("flaky"));
      })
    });

    let c_seen = seen.clone();
    let c_errors = errors.clone();
    source.retry(3).subscribe_err(
      move |v| c_seen.rc_deref_mut().push(v),
      move |e| c_errors.rc_deref_mut().push(e.to_string()),
    );

    // One initial subscription plus three retries.
    assert_eq!(*attempts.rc_deref(), 4);
    assert_eq!(*seen.rc_deref(), vec![1, 2, 3, 4]);
    assert_eq!(*errors.rc_deref(), vec!["flaky".to_string()]);
  }

  #[test]
  fn retry_zero_forwards_the_first_error() {
    let attempts = MutArc::own(0);
    let errors = MutArc::own(0);

    let c_attempts = attempts.clone();
    let source = observable::defer(move || {
      *c_attempts.rc_deref_mut() += 1;
      observable::throw_err::<i32>(StreamError::message("no"))
    });

    let c_errors = errors.clone();
    source
      .retry(0)
      .subscribe_err(|_| {}, move |_| *c_errors.rc_deref_mut() += 1);

    assert_eq!(*attempts.rc_deref(), 1);
    assert_eq!(*errors.rc_deref(), 1);
  }

  #[test]
  fn a_successful_attempt_completes_normally() {
    let attempts = MutArc::own(0);
    let completed = MutArc::own(false);

    let c_attempts = attempts.clone();
    let source = observable::defer(move || {
      let attempt = {
        let mut attempts = c_attempts.rc_deref_mut();
        *attempts += 1;
        *attempts
      };
      observable::create(move |mut subscriber: Subscriber<i32>| {
        if attempt < 3 {
          subscriber.error(StreamError::message("warming up"));
        } else {
          subscriber.next(99);
          subscriber.complete();
        }
      })
    });

    let c_completed = completed.clone();
    source
      .retry(5)
      .subscribe_all(|_| {}, |_| {}, move || *c_completed.rc_deref_mut() = true);

    assert_eq!(*attempts.rc_deref(), 3);
    assert!(*completed.rc_deref());
  }
}
