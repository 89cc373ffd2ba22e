use std::mem::replace;
use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

use crate::subscription::{BoxSubscription, Subscription};

/// A subscription owning an ordered collection of children.
///
/// Disposal tears the children down in reverse insertion order, each
/// exactly once. Adding to an already-closed composite disposes the
/// incoming subscription immediately; the closed flag is published before
/// teardown begins, so re-entrant additions observed *during* teardown take
/// the same path.
#[derive(Clone, Default)]
pub struct CompositeSubscription {
  inner: Arc<Mutex<Inner>>,
}

enum Teardown {
  None,
  Once(BoxSubscription),
  Multi(SmallVec<[BoxSubscription; 2]>),
}

struct Inner {
  closed: bool,
  teardown: Teardown,
}

impl Default for Inner {
  fn default() -> Self {
    Inner { closed: false, teardown: Teardown::None }
  }
}

impl CompositeSubscription {
  pub fn new() -> Self {
    CompositeSubscription::default()
  }

  /// Add a child. If the composite is already closed the child is disposed
  /// on the spot instead of being stored.
  pub fn add(&self, subscription: impl Subscription + Send + 'static) {
    let mut subscription: BoxSubscription = Box::new(subscription);
    {
      let mut inner = lock(&self.inner);
      if !inner.closed {
        let teardown = replace(&mut inner.teardown, Teardown::None);
        inner.teardown = match teardown {
          Teardown::None => Teardown::Once(subscription),
          Teardown::Once(first) => {
            let mut subs = SmallVec::new();
            subs.push(first);
            subs.push(subscription);
            Teardown::Multi(subs)
          }
          Teardown::Multi(mut subs) => {
            subs.push(subscription);
            Teardown::Multi(subs)
          }
        };
        return;
      }
    }
    subscription.unsubscribe();
  }
}

impl Subscription for CompositeSubscription {
  fn unsubscribe(&mut self) {
    // Flip the flag and take the children inside the lock, dispose them
    // outside it: a child's teardown may re-enter `add`.
    let teardown = {
      let mut inner = lock(&self.inner);
      if inner.closed {
        return;
      }
      inner.closed = true;
      replace(&mut inner.teardown, Teardown::None)
    };
    match teardown {
      Teardown::None => {}
      Teardown::Once(mut sub) => sub.unsubscribe(),
      Teardown::Multi(mut subs) => {
        for sub in subs.iter_mut().rev() {
          sub.unsubscribe();
        }
      }
    }
  }

  fn is_closed(&self) -> bool {
    lock(&self.inner).closed
  }
}

fn lock(inner: &Arc<Mutex<Inner>>) -> std::sync::MutexGuard<'_, Inner> {
  inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rc::MutArc;

  struct Recorder {
    id: usize,
    order: MutArc<Vec<usize>>,
    closed: bool,
  }

  impl Subscription for Recorder {
    fn unsubscribe(&mut self) {
      if !self.closed {
        self.closed = true;
        self.order.rc_deref_mut().push(self.id);
      }
    }

    fn is_closed(&self) -> bool {
      self.closed
    }
  }

  #[test]
  fn disposes_children_in_reverse_insertion_order() {
    let order = MutArc::own(Vec::new());
    let mut composite = CompositeSubscription::new();
    for id in 0..4 {
      composite.add(Recorder { id, order: order.clone(), closed: false });
    }

    composite.unsubscribe();
    assert_eq!(*order.rc_deref(), vec![3, 2, 1, 0]);
  }

  #[test]
  fn add_after_close_disposes_immediately() {
    let order = MutArc::own(Vec::new());
    let mut composite = CompositeSubscription::new();
    composite.unsubscribe();

    composite.add(Recorder { id: 9, order: order.clone(), closed: false });
    assert_eq!(*order.rc_deref(), vec![9]);
  }

  #[test]
  fn each_child_disposed_exactly_once() {
    let order = MutArc::own(Vec::new());
    let mut composite = CompositeSubscription::new();
    composite.add(Recorder { id: 1, order: order.clone(), closed: false });

    composite.unsubscribe();
    composite.unsubscribe();
    assert_eq!(*order.rc_deref(), vec![1]);
  }
}
