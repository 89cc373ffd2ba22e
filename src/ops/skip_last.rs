use std::collections::VecDeque;

use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Withholds a sliding buffer of `count` values so the trailing `count`
/// never reach downstream.
#[derive(Clone)]
pub struct SkipLastOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S> Observable for SkipLastOp<S>
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
    self.source.actual_subscribe(SkipLastObserver {
      observer,
      held: VecDeque::with_capacity(self.count.min(64)),
      count: self.count,
    })
  }
}

pub struct SkipLastObserver<O, Item> {
  observer: O,
  held: VecDeque<Item>,
  count: usize,
}

impl<O, Item> Observer for SkipLastObserver<O, Item>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.held.push_back(value);
    if self.held.len() > self.count {
      let released = self.held.pop_front().expect("buffer non-empty");
      self.observer.next(released);
    }
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn withholds_the_tail() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(1..=6)
      .skip_last(2)
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2, 3, 4]);
  }

  #[test]
  fn short_streams_emit_nothing() {
    let seen = MutArc::own(Vec::<i32>::new());
    let completed = MutArc::own(false);

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    observable::from_iter(1..=2).skip_last(5).subscribe_all(
      move |v| c_seen.rc_deref_mut().push(v),
      |_| {},
      move || *c_completed.rc_deref_mut() = true,
    );

    assert!(seen.rc_deref().is_empty());
    assert!(*completed.rc_deref());
  }
}
