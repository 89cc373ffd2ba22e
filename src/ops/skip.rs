use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Drops the first `count` values, forwards the rest.
#[derive(Clone)]
pub struct SkipOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S: Observable> Observable for SkipOp<S> {
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(SkipObserver { observer, remaining: self.count })
  }
}

pub struct SkipObserver<O> {
  observer: O,
  remaining: usize,
}

impl<O, Item> Observer for SkipObserver<O>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.remaining > 0 {
      self.remaining -= 1;
    } else {
      self.observer.next(value);
    }
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
