use crate::{error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Substitutes one default value when the source completes without ever
/// emitting.
pub struct DefaultIfEmptyOp<S: Observable> {
  pub(crate) source: S,
  pub(crate) default: S::Item,
}

impl<S> Clone for DefaultIfEmptyOp<S>
where
  S: Observable + Clone,
  S::Item: Clone,
{
  fn clone(&self) -> Self {
    DefaultIfEmptyOp { source: self.source.clone(), default: self.default.clone() }
  }
}

impl<S> Observable for DefaultIfEmptyOp<S>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self.source.actual_subscribe(DefaultIfEmptyObserver {
      observer,
      default: Some(self.default),
    })
  }
}

pub struct DefaultIfEmptyObserver<O, Item> {
  observer: O,
  default: Option<Item>,
}

impl<O, Item> Observer for DefaultIfEmptyObserver<O, Item>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.default = None;
    self.observer.next(value);
  }

  fn complete(&mut self) {
    if let Some(default) = self.default.take() {
      self.observer.next(default);
    }
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn empty_sources_emit_the_default() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::empty()
      .default_if_empty(9)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![9]);
  }

  #[test]
  fn non_empty_sources_are_untouched() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 2])
      .default_if_empty(9)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2]);
  }
}
