//! Replayed iterables.

use crate::{observable::Observable, observer::Observer, subscription::SingleSubscription};

/// Creates an observable that replays the items of `iter`, `count` times
/// over, then completes.
pub fn repeat<I>(iter: I, count: usize) -> Repeat<I>
where
  I: IntoIterator + Clone,
{
  Repeat { iter, count }
}

#[derive(Clone)]
pub struct Repeat<I> {
  pub(crate) iter: I,
  pub(crate) count: usize,
}

impl<I> Observable for Repeat<I>
where
  I: IntoIterator + Clone,
{
  type Item = I::Item;
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = I::Item> + Send + 'static,
  {
    for _ in 0..self.count {
      for value in self.iter.clone() {
        if observer.is_closed() {
          return SingleSubscription::closed();
        }
        observer.next(value);
      }
    }
    observer.complete();
    SingleSubscription::closed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{observable::ObservableExt, rc::MutArc};

  #[test]
  fn replays_the_iterable_count_times() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    repeat([1, 2], 3).subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2, 1, 2, 1, 2]);
  }

  #[test]
  fn zero_repeats_complete_immediately() {
    let completed = MutArc::own(false);
    let c_completed = completed.clone();
    repeat([1, 2], 0).subscribe_all(
      |_| {},
      |_| {},
      move || *c_completed.rc_deref_mut() = true,
    );
    assert!(*completed.rc_deref());
  }
}
