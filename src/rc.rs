//! Shared mutable state for operators.
//!
//! Operators that fan work out across producers or scheduler tasks keep
//! their bookkeeping in a [`MutArc`], a thin wrapper over `Arc<Mutex<T>>`.
//! A poisoned lock is recovered rather than propagated: an operator's
//! bookkeeping stays usable even if a downstream callback panicked while a
//! guard was held.
//!
//! `MutArc<Option<O>>` doubles as the shared observer of the crate: `next`
//! goes to the inner observer while it is present, and a terminal event
//! *takes* the observer out, so the slot is terminal-idempotent and every
//! later event is a no-op. Time-based operators hand clones of such slots
//! to their scheduled tasks.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{error::StreamError, observer::Observer, subscription::Subscription};

/// Arc-based shared mutable cell used for operator bookkeeping.
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  /// Take ownership of `value` behind a fresh shared cell.
  pub fn own(value: T) -> Self {
    MutArc(Arc::new(Mutex::new(value)))
  }

  /// Lock and read the inner value.
  pub fn rc_deref(&self) -> MutexGuard<'_, T> {
    recover(&self.0)
  }

  /// Lock and mutate the inner value.
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> {
    recover(&self.0)
  }

  /// Try to obtain the guard without blocking.
  ///
  /// Used where synchronous re-entrancy must be detected instead of
  /// deadlocking (subject dispatch).
  pub fn try_rc_deref_mut(&self) -> Option<MutexGuard<'_, T>> {
    self.0.try_lock().ok()
  }
}

fn recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| {
    tracing::warn!("recovering a poisoned stream-state lock");
    poisoned.into_inner()
  })
}

impl<T> Clone for MutArc<T> {
  fn clone(&self) -> Self {
    MutArc(self.0.clone())
  }
}

impl<T: Default> Default for MutArc<T> {
  fn default() -> Self {
    MutArc::own(T::default())
  }
}

/// The shared observer slot: present until the first terminal event, empty
/// afterwards.
impl<O: Observer> Observer for MutArc<Option<O>> {
  type Item = O::Item;

  fn next(&mut self, value: Self::Item) {
    if let Some(observer) = self.rc_deref_mut().as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: StreamError) {
    let taken = self.rc_deref_mut().take();
    if let Some(mut observer) = taken {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    let taken = self.rc_deref_mut().take();
    if let Some(mut observer) = taken {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.rc_deref().as_ref().map_or(true, |o| o.is_closed())
  }
}

/// A shared slot of a subscription: unsubscribing takes the inner
/// subscription out and disposes it, so replacing the slot's content never
/// leaks a live handle.
impl<S: Subscription> Subscription for MutArc<Option<S>> {
  fn unsubscribe(&mut self) {
    let taken = self.rc_deref_mut().take();
    if let Some(mut sub) = taken {
      sub.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    self.rc_deref().as_ref().map_or(true, |s| s.is_closed())
  }
}
