use std::collections::HashSet;

use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Deduplicates over the whole stream with a set of seen values.
#[derive(Clone)]
pub struct DistinctOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for DistinctOp<S>
where
  S: Observable,
  S::Item: std::hash::Hash + Eq + Clone + Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(DistinctObserver { observer, seen: HashSet::new() })
  }
}

pub struct DistinctObserver<O, Item> {
  observer: O,
  seen: HashSet<Item>,
}

impl<O, Item> Observer for DistinctObserver<O, Item>
where
  O: Observer<Item = Item>,
  Item: std::hash::Hash + Eq + Clone,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.seen.insert(value.clone()) {
      self.observer.next(value);
    }
  }

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

/// Forwards a value only when it differs from its immediate predecessor.
#[derive(Clone)]
pub struct DistinctUntilChangedOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for DistinctUntilChangedOp<S>
where
  S: Observable,
  S::Item: PartialEq + Clone + Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(DistinctUntilChangedObserver { observer, previous: None })
  }
}

pub struct DistinctUntilChangedObserver<O, Item> {
  observer: O,
  previous: Option<Item>,
}

impl<O, Item> Observer for DistinctUntilChangedObserver<O, Item>
where
  O: Observer<Item = Item>,
  Item: PartialEq + Clone,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.previous.as_ref() != Some(&value) {
      self.previous = Some(value.clone());
      self.observer.next(value);
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
  fn distinct_deduplicates_globally() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 2, 1, 3, 2, 4])
      .distinct()
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2, 3, 4]);
  }

  #[test]
  fn distinct_until_changed_collapses_runs() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 1, 2, 2, 2, 1])
      .distinct_until_changed()
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2, 1]);
  }
}
