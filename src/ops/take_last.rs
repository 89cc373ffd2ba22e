use std::collections::VecDeque;

use crate::{error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Keeps a ring of the trailing `count` values and flushes it, in arrival
/// order, when the source completes.
#[derive(Clone)]
pub struct TakeLastOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S> Observable for TakeLastOp<S>
where
  S: Observable,
  S::Item: Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self.source.actual_subscribe(TakeLastObserver {
      observer,
      ring: VecDeque::with_capacity(self.count.min(64)),
      count: self.count,
    })
  }
}

pub struct TakeLastObserver<O, Item> {
  observer: O,
  ring: VecDeque<Item>,
  count: usize,
}

impl<O, Item> Observer for TakeLastObserver<O, Item>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.count == 0 {
      return;
    }
    if self.ring.len() == self.count {
      self.ring.pop_front();
    }
    self.ring.push_back(value);
  }

  fn complete(&mut self) {
    for value in self.ring.drain(..) {
      self.observer.next(value);
    }
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn flushes_the_tail_in_arrival_order() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(1..=6)
      .take_last(3)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![4, 5, 6]);
  }

  #[test]
  fn shorter_streams_flush_everything() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(1..=2)
      .take_last(5)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2]);
  }
}
