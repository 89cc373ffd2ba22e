use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

/// Folds the stream, emitting every intermediate accumulator.
#[derive(Clone)]
pub struct ScanOp<S, B, F> {
  pub(crate) source: S,
  pub(crate) seed: B,
  pub(crate) func: F,
}

impl<S, B, F> Observable for ScanOp<S, B, F>
where
  S: Observable,
  S::Item: 'static,
  B: Clone + Send + 'static,
  F: FnMut(B, S::Item) -> B + Send + 'static,
{
  type Item = B;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = B> + Send + 'static,
  {
    self.source.actual_subscribe(ScanObserver {
      observer,
      acc: self.seed,
      func: self.func,
      _hint: TypeHint::new(),
    })
  }
}

pub struct ScanObserver<O, B, F, Item> {
  observer: O,
  acc: B,
  func: F,
  _hint: TypeHint<Item>,
}

impl<O, B, F, Item> Observer for ScanObserver<O, B, F, Item>
where
  O: Observer<Item = B>,
  B: Clone,
  F: FnMut(B, Item) -> B,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.acc = (self.func)(self.acc.clone(), value);
    self.observer.next(self.acc.clone());
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn emits_running_totals() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 2, 3, 4])
      .scan(0, |acc, v| acc + v)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 3, 6, 10]);
  }
}
