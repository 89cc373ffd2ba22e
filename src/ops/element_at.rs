use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
};

/// Emits the value at `index`, then completes. Errors with
/// [`StreamError::IndexOutOfRange`] when the source ends first.
#[derive(Clone)]
pub struct ElementAtOp<S> {
  pub(crate) source: S,
  pub(crate) index: usize,
}

impl<S: Observable> Observable for ElementAtOp<S> {
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self.source.actual_subscribe(ElementAtObserver {
      observer: Some(observer),
      index: self.index,
      seen: 0,
    })
  }
}

pub struct ElementAtObserver<O> {
  observer: Option<O>,
  index: usize,
  seen: usize,
}

impl<O, Item> Observer for ElementAtObserver<O>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.observer.is_some() && self.seen == self.index {
      if let Some(mut observer) = self.observer.take() {
        observer.next(value);
        observer.complete();
      }
    }
    self.seen += 1;
  }

  fn error(&mut self, err: StreamError) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(StreamError::IndexOutOfRange { index: self.index, len: self.seen });
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.as_ref().map_or(true, |o| o.is_closed())
  }
}
