//! The escape hatch: hand-written subscription logic.

use std::marker::PhantomData;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::{BoxObserver, Observer},
  rc::MutArc,
  subscription::Subscription,
};

/// Creates an observable from a function that receives a [`Subscriber`]
/// and pushes events through it.
///
/// ```
/// use brook::prelude::*;
///
/// observable::create(|mut subscriber: Subscriber<i32>| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
/// })
/// .subscribe(|v| println!("{v}"));
/// ```
pub fn create<F, Item>(subscribe_fn: F) -> Create<F, Item>
where
  F: FnOnce(Subscriber<Item>),
{
  Create { subscribe_fn, _hint: PhantomData }
}

#[derive(Clone)]
pub struct Create<F, Item> {
  pub(crate) subscribe_fn: F,
  _hint: PhantomData<fn(Item)>,
}

impl<F, Item: 'static> Observable for Create<F, Item>
where
  F: FnOnce(Subscriber<Item>),
{
  type Item = Item;
  type Unsub = DetachSubscription<Item>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    let slot: MutArc<Option<BoxObserver<Item>>> = MutArc::own(Some(Box::new(observer)));
    (self.subscribe_fn)(Subscriber { slot: slot.clone() });
    DetachSubscription { slot }
  }
}

/// The emitter handed to a [`create`] function: an [`Observer`] tied to
/// one subscription, already terminal-idempotent.
pub struct Subscriber<Item> {
  slot: MutArc<Option<BoxObserver<Item>>>,
}

impl<Item> Clone for Subscriber<Item> {
  fn clone(&self) -> Self {
    Subscriber { slot: self.slot.clone() }
  }
}

impl<Item> Observer for Subscriber<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.slot.next(value);
  }

  fn error(&mut self, err: StreamError) {
    self.slot.error(err);
  }

  fn complete(&mut self) {
    self.slot.complete();
  }

  fn is_closed(&self) -> bool {
    self.slot.is_closed()
  }
}

/// Unsubscribing detaches the observer; a producer still holding the
/// [`Subscriber`] keeps pushing into an empty slot.
pub struct DetachSubscription<Item> {
  slot: MutArc<Option<BoxObserver<Item>>>,
}

impl<Item> Subscription for DetachSubscription<Item> {
  fn unsubscribe(&mut self) {
    self.slot.rc_deref_mut().take();
  }

  fn is_closed(&self) -> bool {
    self.slot.rc_deref().is_none()
  }
}
