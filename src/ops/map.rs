use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

/// Transforms each value with a closure; terminals pass through.
#[derive(Clone)]
pub struct MapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F, B> Observable for MapOp<S, F>
where
  S: Observable,
  S::Item: 'static,
  F: FnMut(S::Item) -> B + Send + 'static,
{
  type Item = B;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = B> + Send + 'static,
  {
    self.source.actual_subscribe(MapObserver {
      observer,
      func: self.func,
      _hint: TypeHint::new(),
    })
  }
}

pub struct MapObserver<O, F, Item> {
  observer: O,
  func: F,
  _hint: TypeHint<Item>,
}

impl<O, F, Item, B> Observer for MapObserver<O, F, Item>
where
  O: Observer<Item = B>,
  F: FnMut(Item) -> B,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.observer.next((self.func)(value));
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
