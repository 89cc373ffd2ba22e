use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Forwards only the values satisfying a predicate.
#[derive(Clone)]
pub struct FilterOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for FilterOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool + Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(FilterObserver { observer, predicate: self.predicate })
  }
}

pub struct FilterObserver<O, F> {
  observer: O,
  predicate: F,
}

impl<O, F, Item> Observer for FilterObserver<O, F>
where
  O: Observer<Item = Item>,
  F: FnMut(&Item) -> bool,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.observer.next(value);
    }
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
