//! Arithmetic sequences.

use crate::{observable::Observable, observer::Observer, subscription::SingleSubscription};

/// Creates an observable emitting `count` integers starting at `start`,
/// stepping by 1.
///
/// ```
/// use brook::prelude::*;
///
/// assert_eq!(observable::range(0, 4).count().wait().unwrap(), Some(4));
/// ```
pub fn range(start: i64, count: usize) -> Range {
  range_step(start, count, 1)
}

/// Creates an observable emitting `count` integers starting at `start`,
/// stepping by `step`.
///
/// # Panics
///
/// Panics if `step` is zero.
pub fn range_step(start: i64, count: usize, step: u32) -> Range {
  assert!(step >= 1, "range step must be at least 1");
  Range { start, count, step }
}

#[derive(Clone)]
pub struct Range {
  pub(crate) start: i64,
  pub(crate) count: usize,
  pub(crate) step: u32,
}

impl Observable for Range {
  type Item = i64;
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = i64> + Send + 'static,
  {
    let mut value = self.start;
    for _ in 0..self.count {
      if observer.is_closed() {
        return SingleSubscription::closed();
      }
      observer.next(value);
      value += i64::from(self.step);
    }
    observer.complete();
    SingleSubscription::closed()
  }
}
