use std::sync::Arc;

use crossbeam_utils::atomic::AtomicCell;

use crate::subscription::Subscription;

/// The smallest subscription: a shared boolean flag.
///
/// Synchronous sources that finish during `subscribe` return one of these
/// already closed; sources that only need a stop signal poll it between
/// emissions.
#[derive(Clone, Default)]
pub struct SingleSubscription {
  closed: Arc<AtomicCell<bool>>,
}

impl SingleSubscription {
  /// A live subscription.
  pub fn new() -> Self {
    SingleSubscription::default()
  }

  /// A subscription representing work that already finished.
  pub fn closed() -> Self {
    let sub = SingleSubscription::default();
    sub.closed.store(true);
    sub
  }
}

impl Subscription for SingleSubscription {
  fn unsubscribe(&mut self) {
    self.closed.store(true);
  }

  fn is_closed(&self) -> bool {
    self.closed.load()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unsubscribe_is_idempotent_and_shared() {
    let a = SingleSubscription::new();
    let mut b = a.clone();

    assert!(!a.is_closed());
    b.unsubscribe();
    b.unsubscribe();
    assert!(a.is_closed());
  }

  #[test]
  fn closed_constructor_starts_closed() {
    assert!(SingleSubscription::closed().is_closed());
  }
}
