use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

/// Maps values through a closure, dropping the `None`s.
#[derive(Clone)]
pub struct FilterMapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F, B> Observable for FilterMapOp<S, F>
where
  S: Observable,
  S::Item: 'static,
  F: FnMut(S::Item) -> Option<B> + Send + 'static,
{
  type Item = B;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = B> + Send + 'static,
  {
    self.source.actual_subscribe(FilterMapObserver {
      observer,
      func: self.func,
      _hint: TypeHint::new(),
    })
  }
}

pub struct FilterMapObserver<O, F, Item> {
  observer: O,
  func: F,
  _hint: TypeHint<Item>,
}

impl<O, F, Item, B> Observer for FilterMapObserver<O, F, Item>
where
  O: Observer<Item = B>,
  F: FnMut(Item) -> Option<B>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if let Some(mapped) = (self.func)(value) {
      self.observer.next(mapped);
    }
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
