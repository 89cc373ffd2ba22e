use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

/// Replaces every value with a clone of one constant.
#[derive(Clone)]
pub struct MapToOp<S, B> {
  pub(crate) source: S,
  pub(crate) value: B,
}

impl<S, B> Observable for MapToOp<S, B>
where
  S: Observable,
  S::Item: 'static,
  B: Clone + Send + 'static,
{
  type Item = B;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = B> + Send + 'static,
  {
    self.source.actual_subscribe(MapToObserver {
      observer,
      value: self.value,
      _hint: TypeHint::new(),
    })
  }
}

pub struct MapToObserver<O, B, Item> {
  observer: O,
  value: B,
  _hint: TypeHint<Item>,
}

impl<O, B, Item> Observer for MapToObserver<O, B, Item>
where
  O: Observer<Item = B>,
  B: Clone,
{
  type Item = Item;

  fn next(&mut self, _value: Item) {
    self.observer.next(self.value.clone());
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
