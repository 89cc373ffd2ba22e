use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, SerialSubscription},
};

/// Intercepts an error with a handler closure: `Some(fallback)` resumes
/// the stream with the fallback observable, `None` lets the error
/// propagate. The matcher and the recovery are one closure: matching on
/// the [`StreamError`] variants is the dispatch.
#[derive(Clone)]
pub struct CatchErrOp<S, F> {
  pub(crate) source: S,
  pub(crate) handler: F,
}

impl<S, F, B> Observable for CatchErrOp<S, F>
where
  S: Observable,
  S::Item: Send + 'static,
  B: Observable<Item = S::Item> + Send + 'static,
  F: FnMut(&StreamError) -> Option<B> + Send + 'static,
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

    let catching = CatchErrObserver {
      observer: MutArc::own(Some(observer)),
      handler: self.handler,
      serial: serial.clone(),
    };
    serial.set(self.source.actual_subscribe(catching));
    subscription
  }
}

pub struct CatchErrObserver<O, F> {
  observer: MutArc<Option<O>>,
  handler: F,
  serial: SerialSubscription,
}

impl<O, F, B> Observer for CatchErrObserver<O, F>
where
  B: Observable + Send + 'static,
  B::Item: Send + 'static,
  O: Observer<Item = B::Item> + Send + 'static,
  F: FnMut(&StreamError) -> Option<B> + Send + 'static,
{
  type Item = B::Item;

  fn next(&mut self, value: B::Item) {
    self.observer.next(value);
  }

  fn error(&mut self, err: StreamError) {
    match (self.handler)(&err) {
      Some(fallback) => {
        if !self.observer.is_closed() {
          self
            .serial
            .set(fallback.actual_subscribe(self.observer.clone()));
        }
      }
      None => self.observer.error(err),
    }
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
  use crate::{error::StreamError, observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn a_matching_error_resumes_with_the_fallback() {
    let seen = MutArc::own(Vec::new());
    let completed = MutArc::own(false);

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    observable::from_iter(vec![1, 2])
      .concat(observable::throw_err(StreamError::Timeout {
        after: std::time::Duration::from_secs(1),
      }))
      .catch_err(|err| match err {
        StreamError::Timeout { .. } => Some(observable::from_iter(vec![8, 9])),
        _ => None,
      })
      .subscribe_all(
        move |v| c_seen.rc_deref_mut().push(v),
        |_| {},
        move || *c_completed.rc_deref_mut() = true,
      );

    assert_eq!(*seen.rc_deref(), vec![1, 2, 8, 9]);
    assert!(*completed.rc_deref());
  }

  #[test]
  fn a_non_matching_error_propagates() {
    let errors = MutArc::own(Vec::new());

    let c_errors = errors.clone();
    observable::throw_err::<i32>(StreamError::message("fatal"))
      .catch_err(|err| match err {
        StreamError::Timeout { .. } => Some(observable::of(0)),
        _ => None,
      })
      .subscribe_err(|_| {}, move |e| c_errors.rc_deref_mut().push(e.to_string()));

    assert_eq!(*errors.rc_deref(), vec!["fatal".to_string()]);
  }
}
