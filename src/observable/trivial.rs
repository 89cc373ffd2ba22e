//! The degenerate sources: one value, no values, no events, one error.

use std::marker::PhantomData;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  subscription::SingleSubscription,
};

/// Creates an observable emitting a single value, then completing.
///
/// ```
/// use brook::prelude::*;
///
/// let mut seen = None;
/// // Subscribing runs synchronously for this source.
/// observable::of(42).subscribe(move |v| seen = Some(v));
/// ```
pub fn of<Item>(value: Item) -> Of<Item> {
  Of(value)
}

#[derive(Clone)]
pub struct Of<Item>(pub(crate) Item);

impl<Item> Observable for Of<Item> {
  type Item = Item;
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    observer.next(self.0);
    observer.complete();
    SingleSubscription::closed()
  }
}

/// Creates an observable that completes immediately without emitting.
pub fn empty<Item>() -> Empty<Item> {
  Empty(PhantomData)
}

#[derive(Clone)]
pub struct Empty<Item>(PhantomData<fn() -> Item>);

impl<Item> Observable for Empty<Item> {
  type Item = Item;
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    observer.complete();
    SingleSubscription::closed()
  }
}

/// Creates an observable that never emits and never terminates.
///
/// Dropping values forever still allocates nothing; unsubscribe is the
/// only way out of the subscription.
pub fn never<Item>() -> Never<Item> {
  Never(PhantomData)
}

#[derive(Clone)]
pub struct Never<Item>(PhantomData<fn() -> Item>);

impl<Item> Observable for Never<Item> {
  type Item = Item;
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, _observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    SingleSubscription::new()
  }
}

/// Creates an observable that terminates with `err` immediately.
pub fn throw_err<Item>(err: StreamError) -> ThrowErr<Item> {
  ThrowErr { err, _hint: PhantomData }
}

#[derive(Clone)]
pub struct ThrowErr<Item> {
  pub(crate) err: StreamError,
  _hint: PhantomData<fn() -> Item>,
}

impl<Item> Observable for ThrowErr<Item> {
  type Item = Item;
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    observer.error(self.err);
    SingleSubscription::closed()
  }
}
