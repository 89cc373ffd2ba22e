use std::sync::mpsc::{channel, Receiver, Sender};

use crate::{
  error::StreamError,
  notification::Notification,
  observable::Observable,
  observer::Observer,
  subscription::{BoxSubscription, Subscription},
};

/// A blocking, pull-based view of a stream.
///
/// Each `next()` blocks until the producer delivers a value or a terminal
/// event. Values surface as `Ok`, a stream error as one final `Err`;
/// dropping the iterator cancels the subscription. A producer that
/// vanishes without any terminal event yields a
/// [`StreamError::Protocol`] item.
pub struct BlockingIter<Item> {
  events: Receiver<Notification<Item>>,
  subscription: BoxSubscription,
  done: bool,
}

impl<Item: Send + 'static> BlockingIter<Item> {
  pub(crate) fn subscribe<S>(source: S) -> Self
  where
    S: Observable<Item = Item>,
  {
    let (tx, rx) = channel();
    let subscription = source.actual_subscribe(ChannelObserver { tx, closed: false });
    BlockingIter {
      events: rx,
      subscription: Box::new(subscription),
      done: false,
    }
  }
}

impl<Item> Iterator for BlockingIter<Item> {
  type Item = Result<Item, StreamError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    match self.events.recv() {
      Ok(Notification::Next(value)) => Some(Ok(value)),
      Ok(Notification::Complete) => {
        self.done = true;
        None
      }
      Ok(Notification::Error(err)) => {
        self.done = true;
        Some(Err(err))
      }
      Err(_) => {
        // Producer dropped without a terminal event.
        self.done = true;
        Some(Err(StreamError::protocol(
          "stream producer vanished without a terminal event",
        )))
      }
    }
  }
}

impl<Item> Drop for BlockingIter<Item> {
  fn drop(&mut self) {
    self.subscription.unsubscribe();
  }
}

struct ChannelObserver<Item> {
  tx: Sender<Notification<Item>>,
  closed: bool,
}

impl<Item> Observer for ChannelObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    if !self.closed && self.tx.send(Notification::Next(value)).is_err() {
      // The consumer dropped the iterator.
      self.closed = true;
    }
  }

  fn error(&mut self, err: StreamError) {
    if !self.closed {
      self.closed = true;
      let _ = self.tx.send(Notification::Error(err));
    }
  }

  fn complete(&mut self) {
    if !self.closed {
      self.closed = true;
      let _ = self.tx.send(Notification::Complete);
    }
  }

  fn is_closed(&self) -> bool {
    self.closed
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::StreamError, observable, observable::ObservableExt};

  #[test]
  fn pulls_every_value_then_ends() {
    let collected: Result<Vec<_>, _> =
      observable::from_iter(vec![1, 2, 3]).blocking_iter().collect();
    assert_eq!(collected.unwrap(), vec![1, 2, 3]);
  }

  #[test]
  fn stream_errors_surface_as_the_final_item() {
    let mut iter = observable::of(1)
      .concat(observable::throw_err(StreamError::message("late failure")))
      .blocking_iter();

    assert_eq!(iter.next().unwrap().unwrap(), 1);
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
  }

  #[test]
  fn works_across_threads() {
    use crate::scheduler::NewThreadScheduler;

    let sum: i64 = observable::range(1, 10)
      .subscribe_on(NewThreadScheduler)
      .blocking_iter()
      .map(Result::unwrap)
      .sum();
    assert_eq!(sum, 55);
  }
}
