use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, SerialSubscription},
};

/// Runs two streams back to back: the second is not even subscribed until
/// the first completes. Errors end the whole sequence.
#[derive(Clone)]
pub struct ConcatOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

impl<A, B> Observable for ConcatOp<A, B>
where
  A: Observable,
  B: Observable<Item = A::Item> + Send + 'static,
  A::Item: Send + 'static,
{
  type Item = A::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = A::Item> + Send + 'static,
  {
    let serial = SerialSubscription::new();
    let subscription = CompositeSubscription::new();
    subscription.add(serial.clone());

    let first = FirstHalfObserver {
      observer: MutArc::own(Some(observer)),
      tail: Some(self.b),
      serial: serial.clone(),
    };
    serial.set(self.a.actual_subscribe(first));
    subscription
  }
}

pub struct FirstHalfObserver<O, B> {
  observer: MutArc<Option<O>>,
  tail: Option<B>,
  serial: SerialSubscription,
}

impl<O, B> Observer for FirstHalfObserver<O, B>
where
  B: Observable + Send + 'static,
  B::Item: Send + 'static,
  O: Observer<Item = B::Item> + Send + 'static,
{
  type Item = B::Item;

  fn next(&mut self, value: B::Item) {
    self.observer.next(value);
  }

  fn error(&mut self, err: StreamError) {
    self.observer.error(err);
  }

  fn complete(&mut self) {
    // Hand the downstream observer over to the tail stream.
    if let Some(tail) = self.tail.take() {
      if !self.observer.is_closed() {
        self.serial.set(tail.actual_subscribe(self.observer.clone()));
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::StreamError, observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn runs_streams_in_sequence() {
    let seen = MutArc::own(Vec::new());
    let completed = MutArc::own(false);

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    observable::of(1)
      .concat(observable::of(2))
      .concat(observable::of(3))
      .subscribe_all(
        move |v| c_seen.rc_deref_mut().push(v),
        |_| {},
        move || *c_completed.rc_deref_mut() = true,
      );

    assert_eq!(*seen.rc_deref(), vec![1, 2, 3]);
    assert!(*completed.rc_deref());
  }

  #[test]
  fn tail_is_untouched_until_the_head_completes() {
    let pulls = MutArc::own(0);
    let c_pulls = pulls.clone();
    let tail = observable::defer(move || {
      *c_pulls.rc_deref_mut() += 1;
      observable::of(2)
    });

    let head = crate::subject::Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    head
      .clone()
      .concat(tail)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    use crate::observer::Observer;
    let mut head = head;
    head.next(1);
    assert_eq!(*pulls.rc_deref(), 0);

    head.complete();
    assert_eq!(*pulls.rc_deref(), 1);
    assert_eq!(*seen.rc_deref(), vec![1, 2]);
  }

  #[test]
  fn a_head_error_skips_the_tail() {
    let errors = MutArc::own(Vec::new());
    let seen = MutArc::own(Vec::new());

    let c_errors = errors.clone();
    let c_seen = seen.clone();
    observable::throw_err(StreamError::message("head died"))
      .concat(observable::of(2))
      .subscribe_err(
        move |v| c_seen.rc_deref_mut().push(v),
        move |e| c_errors.rc_deref_mut().push(e.to_string()),
      );

    assert!(seen.rc_deref().is_empty());
    assert_eq!(*errors.rc_deref(), vec!["head died".to_string()]);
  }
}
