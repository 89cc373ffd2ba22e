//! Multicast with explicit ignition.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
  observable::Observable,
  observer::Observer,
  subscription::{BoxSubscription, Subscription},
};

/// A cold source wired through a subject, with subscription to the source
/// deferred until [`connect`](Self::connect).
///
/// Consumers attach to the subject (via [`fork`](Self::fork) or by
/// subscribing the connectable itself); none of that touches the source.
/// `connect` subscribes the subject to the source and stores the
/// connection; calling it again while connected is a no-op.
/// [`disconnect`](Self::disconnect) disposes the connection, after which
/// `connect` may start the source anew. Clones share one connection.
pub struct ConnectableObservable<S, Sub> {
  pub(crate) source: S,
  pub(crate) subject: Sub,
  connection: Arc<Mutex<Option<BoxSubscription>>>,
}

impl<S: Clone, Sub: Clone> Clone for ConnectableObservable<S, Sub> {
  fn clone(&self) -> Self {
    ConnectableObservable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<S, Sub> ConnectableObservable<S, Sub> {
  pub(crate) fn new(source: S, subject: Sub) -> Self {
    ConnectableObservable { source, subject, connection: Arc::new(Mutex::new(None)) }
  }

  /// A consumer-side view of the subject; subscribe it as often as
  /// needed.
  pub fn fork(&self) -> Sub
  where
    Sub: Clone,
  {
    self.subject.clone()
  }

  /// Whether a live connection to the source exists.
  pub fn is_connected(&self) -> bool {
    lock(&self.connection)
      .as_ref()
      .map_or(false, |c| !c.is_closed())
  }

  /// Subscribe the subject to the source. No-op while already connected.
  ///
  /// Do not call from inside one of this connectable's own subscriber
  /// callbacks; the connection slot is held across the subscription.
  pub fn connect(&self)
  where
    S: Observable + Clone,
    Sub: Observer<Item = S::Item> + Clone + Send + 'static,
  {
    let mut guard = lock(&self.connection);
    if guard.as_ref().map_or(false, |c| !c.is_closed()) {
      return;
    }
    let connection = self.source.clone().actual_subscribe(self.subject.clone());
    *guard = Some(Box::new(connection));
  }

  /// Dispose the current connection, stopping the source.
  pub fn disconnect(&self) {
    let connection = lock(&self.connection).take();
    if let Some(mut connection) = connection {
      connection.unsubscribe();
    }
  }

  /// Connect on the first downstream subscription, disconnect on the
  /// last; see [`crate::ops::ref_count`].
  pub fn ref_count(self) -> crate::ops::ref_count::RefCountOp<S, Sub> {
    crate::ops::ref_count::RefCountOp::new(self)
  }
}

/// Subscribing a connectable attaches to its subject.
impl<S, Sub> Observable for ConnectableObservable<S, Sub>
where
  Sub: Observable,
{
  type Item = Sub::Item;
  type Unsub = Sub::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Sub::Item> + Send + 'static,
  {
    self.subject.actual_subscribe(observer)
  }
}

fn lock(
  connection: &Arc<Mutex<Option<BoxSubscription>>>,
) -> MutexGuard<'_, Option<BoxSubscription>> {
  connection
    .lock()
    .unwrap_or_else(|poisoned| poisoned.into_inner())
}
