use crate::{error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

/// Folds the stream into one value, emitted at completion.
#[derive(Clone)]
pub struct ReduceOp<S, B, F> {
  pub(crate) source: S,
  pub(crate) seed: B,
  pub(crate) func: F,
}

impl<S, B, F> Observable for ReduceOp<S, B, F>
where
  S: Observable,
  S::Item: 'static,
  B: Send + 'static,
  F: FnMut(B, S::Item) -> B + Send + 'static,
{
  type Item = B;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = B> + Send + 'static,
  {
    self.source.actual_subscribe(ReduceObserver {
      observer,
      acc: Some(self.seed),
      func: self.func,
      _hint: TypeHint::new(),
    })
  }
}

pub struct ReduceObserver<O, B, F, Item> {
  observer: O,
  acc: Option<B>,
  func: F,
  _hint: TypeHint<Item>,
}

impl<O, B, F, Item> Observer for ReduceObserver<O, B, F, Item>
where
  O: Observer<Item = B>,
  F: FnMut(B, Item) -> B,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if let Some(acc) = self.acc.take() {
      self.acc = Some((self.func)(acc, value));
    }
  }

  fn complete(&mut self) {
    if let Some(acc) = self.acc.take() {
      self.observer.next(acc);
    }
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
