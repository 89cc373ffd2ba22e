use std::collections::HashMap;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  subject::{Subject, SubjectSubscription},
  type_hint::TypeHint,
};

/// Splits a stream into substreams keyed by a classifier: the first value
/// of each distinct key creates a [`GroupedObservable`], emitted
/// downstream in first-seen order. Every group shares the parent's
/// lifecycle and terminates with it.
#[derive(Clone)]
pub struct GroupByOp<S, KF> {
  pub(crate) source: S,
  pub(crate) key_fn: KF,
}

impl<S, KF, K> Observable for GroupByOp<S, KF>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
  KF: FnMut(&S::Item) -> K + Send + 'static,
  K: std::hash::Hash + Eq + Clone + Send + 'static,
{
  type Item = GroupedObservable<K, S::Item>;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = GroupedObservable<K, S::Item>> + Send + 'static,
  {
    self.source.actual_subscribe(GroupByObserver {
      observer,
      key_fn: self.key_fn,
      groups: HashMap::new(),
      order: Vec::new(),
      _hint: TypeHint::new(),
    })
  }
}

/// One key's substream. The key rides along for routing decisions.
pub struct GroupedObservable<K, Item> {
  key: K,
  subject: Subject<Item>,
}

impl<K: Clone, Item> Clone for GroupedObservable<K, Item> {
  fn clone(&self) -> Self {
    GroupedObservable { key: self.key.clone(), subject: self.subject.clone() }
  }
}

impl<K, Item> GroupedObservable<K, Item> {
  /// The classifier value every member of this group shares.
  pub fn key(&self) -> &K {
    &self.key
  }
}

impl<K, Item: 'static> Observable for GroupedObservable<K, Item> {
  type Item = Item;
  type Unsub = SubjectSubscription<Item>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    self.subject.actual_subscribe(observer)
  }
}

pub struct GroupByObserver<O, KF, K, Item> {
  observer: O,
  key_fn: KF,
  groups: HashMap<K, Subject<Item>>,
  order: Vec<K>,
  _hint: TypeHint<Item>,
}

impl<O, KF, K, Item> Observer for GroupByObserver<O, KF, K, Item>
where
  O: Observer<Item = GroupedObservable<K, Item>>,
  KF: FnMut(&Item) -> K,
  K: std::hash::Hash + Eq + Clone,
  Item: Clone,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let key = (self.key_fn)(&value);
    let mut subject = match self.groups.get(&key) {
      Some(subject) => subject.clone(),
      None => {
        let subject = Subject::new();
        self.groups.insert(key.clone(), subject.clone());
        self.order.push(key.clone());
        self
          .observer
          .next(GroupedObservable { key, subject: subject.clone() });
        subject
      }
    };
    subject.next(value);
  }

  fn error(&mut self, err: StreamError) {
    for key in self.order.drain(..) {
      if let Some(mut subject) = self.groups.remove(&key) {
        subject.error(err.clone());
      }
    }
    self.observer.error(err);
  }

  fn complete(&mut self) {
    for key in self.order.drain(..) {
      if let Some(mut subject) = self.groups.remove(&key) {
        subject.complete();
      }
    }
    self.observer.complete();
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn one_group_per_distinct_key_in_first_seen_order() {
    let keys = MutArc::own(Vec::new());

    let c_keys = keys.clone();
    observable::from_iter(vec![1, 4, 2, 7, 6])
      .group_by(|v| v % 2)
      .subscribe(move |group| c_keys.rc_deref_mut().push(*group.key()));

    assert_eq!(*keys.rc_deref(), vec![1, 0]);
  }

  #[test]
  fn groups_receive_their_members_and_the_parent_terminal() {
    let evens = MutArc::own(Vec::new());
    let completions = MutArc::own(0);

    let c_evens = evens.clone();
    let c_completions = completions.clone();
    observable::from_iter(vec![1, 4, 2, 7])
      .group_by(|v| v % 2)
      .subscribe(move |group| {
        if *group.key() == 0 {
          let evens = c_evens.clone();
          let completions = c_completions.clone();
          group.subscribe_all(
            move |v| evens.rc_deref_mut().push(v),
            |_| {},
            move || *completions.rc_deref_mut() += 1,
          );
        }
      });

    assert_eq!(*evens.rc_deref(), vec![4, 2]);
    assert_eq!(*completions.rc_deref(), 1);
  }
}
