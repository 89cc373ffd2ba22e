//! Prefixing and suffixing a stream with literal values.

use crate::{error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Emits `values` before anything the source produces.
pub struct StartWithOp<S: Observable> {
  pub(crate) source: S,
  pub(crate) values: Vec<S::Item>,
}

impl<S> Clone for StartWithOp<S>
where
  S: Observable + Clone,
  S::Item: Clone,
{
  fn clone(&self) -> Self {
    StartWithOp { source: self.source.clone(), values: self.values.clone() }
  }
}

impl<S> Observable for StartWithOp<S>
where
  S: Observable,
  S::Item: Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    for value in self.values {
      observer.next(value);
    }
    self.source.actual_subscribe(observer)
  }
}

/// Emits `values` after the source completes; an error skips them.
pub struct EndWithOp<S: Observable> {
  pub(crate) source: S,
  pub(crate) values: Vec<S::Item>,
}

impl<S> Clone for EndWithOp<S>
where
  S: Observable + Clone,
  S::Item: Clone,
{
  fn clone(&self) -> Self {
    EndWithOp { source: self.source.clone(), values: self.values.clone() }
  }
}

impl<S> Observable for EndWithOp<S>
where
  S: Observable,
  S::Item: Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(EndWithObserver { observer, suffix: self.values })
  }
}

pub struct EndWithObserver<O, Item> {
  observer: O,
  suffix: Vec<Item>,
}

impl<O, Item> Observer for EndWithObserver<O, Item>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.observer.next(value);
  }

  fn complete(&mut self) {
    for value in self.suffix.drain(..) {
      self.observer.next(value);
    }
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{error::StreamError, observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn start_with_prepends() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![3, 4])
      .start_with(vec![1, 2])
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2, 3, 4]);
  }

  #[test]
  fn end_with_appends_on_completion() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 2])
      .end_with(vec![8, 9])
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2, 8, 9]);
  }

  #[test]
  fn end_with_skips_the_suffix_on_error() {
    let seen = MutArc::own(Vec::new());
    let errors = MutArc::own(0);

    let c_seen = seen.clone();
    let c_errors = errors.clone();
    observable::throw_err::<i32>(StreamError::message("cut short"))
      .end_with(vec![8])
      .subscribe_err(
        move |v| c_seen.rc_deref_mut().push(v),
        move |_| *c_errors.rc_deref_mut() += 1,
      );

    assert!(seen.rc_deref().is_empty());
    assert_eq!(*errors.rc_deref(), 1);
  }
}
