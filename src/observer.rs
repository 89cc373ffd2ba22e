//! The consumer side of a stream.
//!
//! An [`Observer`] receives the events of one subscription. Per
//! subscription the event sequence always matches the grammar
//! `next* (complete | error)?`: a terminal event is delivered at most once
//! and nothing follows it. Sources poll [`Observer::is_closed`] between
//! synchronous emissions and at scheduled wakes; it is the upstream-visible
//! stop signal.

use std::{marker::PhantomData, panic::AssertUnwindSafe};

use crate::error::StreamError;

/// A consumer of values delivered by an observable: one method per event
/// kind.
pub trait Observer {
  /// The type of the elements being received.
  type Item;

  fn next(&mut self, value: Self::Item);
  fn error(&mut self, err: StreamError);
  fn complete(&mut self);

  /// Whether this observer stopped accepting events (terminated or
  /// detached). Sources use it to cut work short.
  fn is_closed(&self) -> bool;
}

/// Type-erased observer.
pub type BoxObserver<Item> = Box<dyn Observer<Item = Item> + Send>;

impl<O: Observer + ?Sized> Observer for Box<O> {
  type Item = O::Item;

  fn next(&mut self, value: Self::Item) {
    (**self).next(value);
  }

  fn error(&mut self, err: StreamError) {
    (**self).error(err);
  }

  fn complete(&mut self) {
    (**self).complete();
  }

  fn is_closed(&self) -> bool {
    (**self).is_closed()
  }
}

#[doc(hidden)]
#[macro_export]
macro_rules! error_proxy_impl {
  ($($name:tt $($parentheses:tt)?) .+) => {
    #[inline]
    fn error(&mut self, err: $crate::error::StreamError) {
      self.$($name $($parentheses)?).+.error(err);
    }
  }
}

#[doc(hidden)]
#[macro_export]
macro_rules! complete_proxy_impl {
  ($($name:tt $($parentheses:tt)?) .+) => {
    #[inline]
    fn complete(&mut self) { self.$($name $($parentheses)?).+.complete(); }
  }
}

#[doc(hidden)]
#[macro_export]
macro_rules! is_closed_proxy_impl {
  ($($name:tt $($parentheses:tt)?) .+) => {
    #[inline]
    fn is_closed(&self) -> bool { self.$($name $($parentheses)?).+.is_closed() }
  }
}

/// An observer assembled from three callbacks.
pub struct CallbackObserver<Item, N, E, C> {
  next: N,
  error: E,
  complete: C,
  closed: bool,
  _hint: PhantomData<fn(Item)>,
}

impl<Item, N, E, C> CallbackObserver<Item, N, E, C>
where
  N: FnMut(Item),
  E: FnMut(StreamError),
  C: FnMut(),
{
  pub fn new(next: N, error: E, complete: C) -> Self {
    CallbackObserver { next, error, complete, closed: false, _hint: PhantomData }
  }
}

impl<Item, N, E, C> Observer for CallbackObserver<Item, N, E, C>
where
  N: FnMut(Item),
  E: FnMut(StreamError),
  C: FnMut(),
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if !self.closed {
      (self.next)(value);
    }
  }

  fn error(&mut self, err: StreamError) {
    if !self.closed {
      self.closed = true;
      (self.error)(err);
    }
  }

  fn complete(&mut self) {
    if !self.closed {
      self.closed = true;
      (self.complete)();
    }
  }

  fn is_closed(&self) -> bool {
    self.closed
  }
}

/// The protocol gate installed at every subscribe boundary.
///
/// Makes terminal events idempotent and mutually exclusive, drops
/// post-terminal events, and converts a panic escaping the wrapped
/// observer's `next` into a single downstream
/// [`StreamError::Panicked`], after which the gate locks.
pub struct SafeObserver<O> {
  observer: Option<O>,
}

impl<O: Observer> SafeObserver<O> {
  pub fn new(observer: O) -> Self {
    SafeObserver { observer: Some(observer) }
  }
}

impl<O: Observer> Observer for SafeObserver<O> {
  type Item = O::Item;

  fn next(&mut self, value: Self::Item) {
    let Some(observer) = self.observer.as_mut() else {
      tracing::trace!("dropping a post-terminal next");
      return;
    };
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| observer.next(value)));
    if let Err(payload) = outcome {
      if let Some(mut observer) = self.observer.take() {
        observer.error(StreamError::from_panic(payload));
      }
    }
  }

  fn error(&mut self, err: StreamError) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    } else {
      tracing::trace!("dropping a post-terminal error");
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.complete();
    } else {
      tracing::trace!("dropping a post-terminal complete");
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.as_ref().map_or(true, |o| o.is_closed())
  }
}

/// The sink of `subscribe(next)` when the stream errors anyway: surface the
/// error on the delivering thread rather than swallow it.
pub(crate) fn unhandled_error(err: StreamError) {
  tracing::error!(error = %err, "unhandled stream error reached the sink");
  panic!("unhandled stream error: {err}");
}
