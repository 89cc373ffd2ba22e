use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Drops values while the predicate holds; once it fails, everything
/// (including the failing value) is forwarded.
#[derive(Clone)]
pub struct SkipWhileOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for SkipWhileOp<S, F>
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
    self.source.actual_subscribe(SkipWhileObserver {
      observer,
      predicate: self.predicate,
      skipping: true,
    })
  }
}

pub struct SkipWhileObserver<O, F> {
  observer: O,
  predicate: F,
  skipping: bool,
}

impl<O, F, Item> Observer for SkipWhileObserver<O, F>
where
  O: Observer<Item = Item>,
  F: FnMut(&Item) -> bool,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.skipping && (self.predicate)(&value) {
      return;
    }
    self.skipping = false;
    self.observer.next(value);
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
