use crate::{observable::Observable, observer::Observer};

/// Emits only the first value, then completes. An empty source just
/// completes.
#[derive(Clone)]
pub struct FirstOp<S> {
  pub(crate) source: S,
}

impl<S: Observable> Observable for FirstOp<S> {
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(FirstObserver { observer: Some(observer) })
  }
}

pub struct FirstObserver<O> {
  observer: Option<O>,
}

impl<O, Item> Observer for FirstObserver<O>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if let Some(mut observer) = self.observer.take() {
      observer.next(value);
      observer.complete();
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
