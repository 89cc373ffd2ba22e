use std::{any::Any, marker::PhantomData};

use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

/// Forwards only the values whose runtime type is `U`, downcast.
#[derive(Clone)]
pub struct OfTypeOp<S, U> {
  source: S,
  _target: PhantomData<fn() -> U>,
}

impl<S, U> OfTypeOp<S, U> {
  pub(crate) fn new(source: S) -> Self {
    OfTypeOp { source, _target: PhantomData }
  }
}

impl<S, U> Observable for OfTypeOp<S, U>
where
  S: Observable,
  S::Item: Any,
  U: 'static,
{
  type Item = U;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = U> + Send + 'static,
  {
    self.source.actual_subscribe(OfTypeObserver {
      observer,
      _hint: TypeHint::new(),
      _target: PhantomData,
    })
  }
}

pub struct OfTypeObserver<O, U, Item> {
  observer: O,
  _hint: TypeHint<Item>,
  _target: PhantomData<fn() -> U>,
}

impl<O, Item, U> Observer for OfTypeObserver<O, U, Item>
where
  O: Observer<Item = U>,
  Item: Any,
  U: 'static,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let boxed: Box<dyn Any> = Box::new(value);
    if let Ok(target) = boxed.downcast::<U>() {
      self.observer.next(*target);
    }
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
