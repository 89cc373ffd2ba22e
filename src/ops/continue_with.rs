//! Switching to a continuation stream at a terminal event.

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, SerialSubscription},
};

/// Switches to `next` on *either* terminal event; the continuation never
/// learns whether the first stream completed or failed.
#[derive(Clone)]
pub struct ContinueWithOp<A, B> {
  pub(crate) source: A,
  pub(crate) next: B,
}

impl<A, B> Observable for ContinueWithOp<A, B>
where
  A: Observable,
  B: Observable<Item = A::Item> + Send + 'static,
  A::Item: Send + 'static,
{
  type Item = A::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = A::Item> + Send + 'static,
  {
    let serial = SerialSubscription::new();
    let subscription = CompositeSubscription::new();
    subscription.add(serial.clone());

    let continuing = ContinueObserver {
      observer: MutArc::own(Some(observer)),
      next: Some(self.next),
      serial: serial.clone(),
      on_error_only: false,
    };
    serial.set(self.source.actual_subscribe(continuing));
    subscription
  }
}

/// Switches to `next` only on error; completion passes through.
#[derive(Clone)]
pub struct OnErrorContinueWithOp<A, B> {
  pub(crate) source: A,
  pub(crate) next: B,
}

impl<A, B> Observable for OnErrorContinueWithOp<A, B>
where
  A: Observable,
  B: Observable<Item = A::Item> + Send + 'static,
  A::Item: Send + 'static,
{
  type Item = A::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = A::Item> + Send + 'static,
  {
    let serial = SerialSubscription::new();
    let subscription = CompositeSubscription::new();
    subscription.add(serial.clone());

    let continuing = ContinueObserver {
      observer: MutArc::own(Some(observer)),
      next: Some(self.next),
      serial: serial.clone(),
      on_error_only: true,
    };
    serial.set(self.source.actual_subscribe(continuing));
    subscription
  }
}

pub struct ContinueObserver<O, B> {
  observer: MutArc<Option<O>>,
  next: Option<B>,
  serial: SerialSubscription,
  on_error_only: bool,
}

impl<O, B> ContinueObserver<O, B>
where
  B: Observable + Send + 'static,
  B::Item: Send + 'static,
  O: Observer<Item = B::Item> + Send + 'static,
{
  fn switch(&mut self) {
    if let Some(next) = self.next.take() {
      if !self.observer.is_closed() {
        self.serial.set(next.actual_subscribe(self.observer.clone()));
      }
    }
  }
}

impl<O, B> Observer for ContinueObserver<O, B>
where
  B: Observable + Send + 'static,
  B::Item: Send + 'static,
  O: Observer<Item = B::Item> + Send + 'static,
{
  type Item = B::Item;

  fn next(&mut self, value: B::Item) {
    self.observer.next(value);
  }

  fn error(&mut self, _err: StreamError) {
    self.switch();
  }

  fn complete(&mut self) {
    if self.on_error_only {
      self.observer.complete();
    } else {
      self.switch();
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}
