use crate::{error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

/// Emits how many values the source produced, at completion.
#[derive(Clone)]
pub struct CountOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for CountOp<S>
where
  S: Observable,
  S::Item: 'static,
{
  type Item = usize;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = usize> + Send + 'static,
  {
    self.source.actual_subscribe(CountObserver {
      observer,
      total: 0,
      _hint: TypeHint::new(),
    })
  }
}

pub struct CountObserver<O, Item> {
  observer: O,
  total: usize,
  _hint: TypeHint<Item>,
}

impl<O, Item> Observer for CountObserver<O, Item>
where
  O: Observer<Item = usize>,
{
  type Item = Item;

  fn next(&mut self, _value: Item) {
    self.total += 1;
  }

  fn complete(&mut self) {
    self.observer.next(self.total);
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt};

  #[test]
  fn counts_the_values() {
    assert_eq!(observable::range(0, 9).count().wait().unwrap(), Some(9));
    assert_eq!(observable::empty::<i32>().count().wait().unwrap(), Some(0));
  }
}
