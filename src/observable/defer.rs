//! Per-subscription source construction.

use std::panic::AssertUnwindSafe;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  subscription::{BoxSubscription, SingleSubscription},
};

/// Creates an observable that invokes `factory` anew for every
/// subscription and subscribes to the result.
///
/// A panic escaping the factory is delivered to the subscriber as
/// [`StreamError::Panicked`].
///
/// ```
/// use brook::prelude::*;
///
/// let fresh = observable::defer(|| observable::of(1));
/// fresh.clone().subscribe(|v| assert_eq!(v, 1));
/// fresh.subscribe(|v| assert_eq!(v, 1));
/// ```
pub fn defer<F, B>(factory: F) -> Defer<F>
where
  F: FnOnce() -> B,
  B: Observable,
{
  Defer { factory }
}

#[derive(Clone)]
pub struct Defer<F> {
  pub(crate) factory: F,
}

impl<F, B> Observable for Defer<F>
where
  F: FnOnce() -> B,
  B: Observable,
{
  type Item = B::Item;
  type Unsub = BoxSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = B::Item> + Send + 'static,
  {
    let built = std::panic::catch_unwind(AssertUnwindSafe(self.factory));
    match built {
      Ok(source) => Box::new(source.actual_subscribe(observer)),
      Err(payload) => {
        observer.error(StreamError::from_panic(payload));
        Box::new(SingleSubscription::closed())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{observable::{self, ObservableExt}, rc::MutArc};

  #[test]
  fn factory_runs_per_subscription() {
    let invocations = MutArc::own(0);
    let c_invocations = invocations.clone();

    let source = defer(move || {
      *c_invocations.rc_deref_mut() += 1;
      observable::of(7)
    });

    source.clone().subscribe(|_| {});
    source.subscribe(|_| {});

    assert_eq!(*invocations.rc_deref(), 2);
  }

  #[test]
  fn factory_panic_reaches_the_subscriber_as_an_error() {
    let errors = MutArc::own(Vec::new());
    let c_errors = errors.clone();

    defer(|| {
      if true {
        panic!("factory exploded");
      }
      observable::of(1)
    })
    .subscribe_err(|_| {}, move |e| c_errors.rc_deref_mut().push(e.to_string()));

    let errors = errors.rc_deref();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("factory exploded"));
  }
}
