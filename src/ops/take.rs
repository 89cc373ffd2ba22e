use crate::{observable::Observable, observer::Observer};

/// Forwards the first `count` values, then synthesizes `complete` and
/// detaches from upstream. An earlier upstream terminal passes through.
#[derive(Clone)]
pub struct TakeOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S: Observable> Observable for TakeOp<S> {
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    let mut observer = TakeObserver { observer: Some(observer), remaining: self.count };
    // take(0) never needs the source at all.
    if self.count == 0 {
      if let Some(mut observer) = observer.observer.take() {
        observer.complete();
      }
    }
    self.source.actual_subscribe(observer)
  }
}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
}

impl<O, Item> Observer for TakeObserver<O>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      return;
    }
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
      self.remaining -= 1;
      if self.remaining == 0 {
        if let Some(mut observer) = self.observer.take() {
          observer.complete();
        }
      }
    }
  }

  fn error(&mut self, err: crate::error::StreamError) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.as_ref().map_or(true, |o| o.is_closed())
  }
}
