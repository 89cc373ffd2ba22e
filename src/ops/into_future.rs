use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use futures::channel::oneshot;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  subscription::{BoxSubscription, Subscription},
};

/// A future latching a stream's outcome: the last value at completion
/// (`Ok(None)` when the stream was empty), or the stream's error.
///
/// Built by [`into_future`](crate::observable::ObservableExt::into_future);
/// [`wait`](crate::observable::ObservableExt::wait) blocks on it.
pub struct StreamFuture<Item> {
  outcome: oneshot::Receiver<Result<Option<Item>, StreamError>>,
  subscription: BoxSubscription,
}

impl<Item: Send + 'static> StreamFuture<Item> {
  pub(crate) fn subscribe<S>(source: S) -> Self
  where
    S: Observable<Item = Item>,
  {
    let (tx, rx) = oneshot::channel();
    let subscription = source.actual_subscribe(LatchObserver {
      latest: None,
      outcome: Some(tx),
    });
    StreamFuture { outcome: rx, subscription: Box::new(subscription) }
  }
}

impl<Item> Future for StreamFuture<Item> {
  type Output = Result<Option<Item>, StreamError>;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    match Pin::new(&mut self.outcome).poll(cx) {
      Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
      // The producer dropped without terminating; treat as disposed.
      Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(StreamError::Disposed)),
      Poll::Pending => Poll::Pending,
    }
  }
}

impl<Item> Drop for StreamFuture<Item> {
  fn drop(&mut self) {
    self.subscription.unsubscribe();
  }
}

struct LatchObserver<Item> {
  latest: Option<Item>,
  outcome: Option<oneshot::Sender<Result<Option<Item>, StreamError>>>,
}

impl<Item> Observer for LatchObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.outcome.is_some() {
      self.latest = Some(value);
    }
  }

  fn error(&mut self, err: StreamError) {
    if let Some(tx) = self.outcome.take() {
      let _ = tx.send(Err(err));
    }
  }

  fn complete(&mut self) {
    if let Some(tx) = self.outcome.take() {
      let _ = tx.send(Ok(self.latest.take()));
    }
  }

  fn is_closed(&self) -> bool {
    self.outcome.is_none()
  }
}
