use std::cmp::Ordering;

use crate::{error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Tracks the extreme value of the stream, initialized lazily on the
/// first value and emitted at completion. `prefer_greater` selects max
/// over min.
#[derive(Clone)]
pub struct MinMaxOp<S> {
  pub(crate) source: S,
  pub(crate) prefer_greater: bool,
}

impl<S> Observable for MinMaxOp<S>
where
  S: Observable,
  S::Item: PartialOrd + Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self.source.actual_subscribe(MinMaxObserver {
      observer,
      best: None,
      prefer_greater: self.prefer_greater,
    })
  }
}

pub struct MinMaxObserver<O, Item> {
  observer: O,
  best: Option<Item>,
  prefer_greater: bool,
}

impl<O, Item> Observer for MinMaxObserver<O, Item>
where
  O: Observer<Item = Item>,
  Item: PartialOrd,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let wanted = if self.prefer_greater { Ordering::Greater } else { Ordering::Less };
    let replace = match &self.best {
      None => true,
      Some(best) => value.partial_cmp(best) == Some(wanted),
    };
    if replace {
      self.best = Some(value);
    }
  }

  fn complete(&mut self) {
    if let Some(best) = self.best.take() {
      self.observer.next(best);
    }
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt};

  #[test]
  fn min_and_max_of_a_stream() {
    let values = vec![3, -1, 7, 0];
    assert_eq!(
      observable::from_iter(values.clone()).min().wait().unwrap(),
      Some(-1)
    );
    assert_eq!(observable::from_iter(values).max().wait().unwrap(), Some(7));
  }

  #[test]
  fn empty_streams_emit_nothing() {
    assert_eq!(observable::empty::<i32>().min().wait().unwrap(), None);
  }
}
