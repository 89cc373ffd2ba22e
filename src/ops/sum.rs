use std::ops::Add;

use crate::{error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

/// Adds the values up and emits the total at completion.
#[derive(Clone)]
pub struct SumOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for SumOp<S>
where
  S: Observable,
  S::Item: Add<Output = S::Item> + Default + Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self.source.actual_subscribe(SumObserver {
      observer,
      total: S::Item::default(),
    })
  }
}

pub struct SumObserver<O, Item> {
  observer: O,
  total: Item,
}

impl<O, Item> Observer for SumObserver<O, Item>
where
  O: Observer<Item = Item>,
  Item: Add<Output = Item> + Default,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let total = std::mem::take(&mut self.total);
    self.total = total + value;
  }

  fn complete(&mut self) {
    let total = std::mem::take(&mut self.total);
    self.observer.next(total);
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

/// Emits the arithmetic mean of the values at completion; an empty stream
/// just completes.
#[derive(Clone)]
pub struct AverageOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for AverageOp<S>
where
  S: Observable,
  S::Item: Into<f64> + Send + 'static,
{
  type Item = f64;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = f64> + Send + 'static,
  {
    self.source.actual_subscribe(AverageObserver {
      observer,
      total: 0.0,
      count: 0usize,
      _hint: TypeHint::new(),
    })
  }
}

pub struct AverageObserver<O, Item> {
  observer: O,
  total: f64,
  count: usize,
  _hint: TypeHint<Item>,
}

impl<O, Item> Observer for AverageObserver<O, Item>
where
  O: Observer<Item = f64>,
  Item: Into<f64>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.total += value.into();
    self.count += 1;
  }

  fn complete(&mut self) {
    if self.count > 0 {
      self.observer.next(self.total / self.count as f64);
    }
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}
