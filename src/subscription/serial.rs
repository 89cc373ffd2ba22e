use std::sync::{Arc, Mutex};

use crate::subscription::{BoxSubscription, Subscription};

/// A subscription holding a single replaceable child.
///
/// `set` disposes the child it replaces; once the serial itself has been
/// disposed, every incoming child is disposed instead of stored. Operators
/// that switch between inner sources (`switch_on_next`, `retry`, `catch`)
/// route their current inner subscription through one of these.
#[derive(Clone, Default)]
pub struct SerialSubscription {
  inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
  closed: bool,
  current: Option<BoxSubscription>,
}

impl SerialSubscription {
  pub fn new() -> Self {
    SerialSubscription::default()
  }

  /// Install `subscription` as the current child, disposing the previous
  /// one. A closed serial disposes the incoming value without storing it.
  pub fn set(&self, subscription: impl Subscription + Send + 'static) {
    let incoming: BoxSubscription = Box::new(subscription);
    // Swap under the lock, dispose outside it.
    let stale = {
      let mut inner = lock(&self.inner);
      if inner.closed {
        Some(incoming)
      } else {
        inner.current.replace(incoming)
      }
    };
    if let Some(mut old) = stale {
      old.unsubscribe();
    }
  }
}

impl Subscription for SerialSubscription {
  fn unsubscribe(&mut self) {
    let current = {
      let mut inner = lock(&self.inner);
      if inner.closed {
        return;
      }
      inner.closed = true;
      inner.current.take()
    };
    if let Some(mut sub) = current {
      sub.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    lock(&self.inner).closed
  }
}

fn lock(inner: &Arc<Mutex<Inner>>) -> std::sync::MutexGuard<'_, Inner> {
  inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subscription::SingleSubscription;

  #[test]
  fn replacing_disposes_the_previous_child() {
    let serial = SerialSubscription::new();
    let first = SingleSubscription::new();
    let second = SingleSubscription::new();

    serial.set(first.clone());
    assert!(!first.is_closed());

    serial.set(second.clone());
    assert!(first.is_closed());
    assert!(!second.is_closed());
  }

  #[test]
  fn disposal_blocks_further_assignment() {
    let mut serial = SerialSubscription::new();
    let current = SingleSubscription::new();
    serial.set(current.clone());

    serial.unsubscribe();
    assert!(current.is_closed());

    let late = SingleSubscription::new();
    serial.set(late.clone());
    assert!(late.is_closed());
  }
}
