use std::sync::{Arc, Mutex};

use crate::{
  error::StreamError,
  subscription::{BoxSubscription, Subscription},
};

/// A subscription wrapping an inner teardown behind a reference count.
///
/// `add_reference` hands out [`RefHandle`]s; the inner teardown fires only
/// once the root has been disposed *and* every outstanding handle has been
/// released. Disposing the root while handles are live merely arms the
/// teardown.
#[derive(Clone)]
pub struct RefCountSubscription {
  inner: Arc<Mutex<Inner>>,
}

struct Inner {
  references: usize,
  armed: bool,
  fired: bool,
  underlying: Option<BoxSubscription>,
}

impl RefCountSubscription {
  pub fn new(underlying: impl Subscription + Send + 'static) -> Self {
    RefCountSubscription {
      inner: Arc::new(Mutex::new(Inner {
        references: 0,
        armed: false,
        fired: false,
        underlying: Some(Box::new(underlying)),
      })),
    }
  }

  /// Obtain a new reference to the underlying resource.
  ///
  /// Fails with [`StreamError::Disposed`] once the root has been disposed.
  pub fn add_reference(&self) -> Result<RefHandle, StreamError> {
    let mut inner = lock(&self.inner);
    if inner.armed || inner.fired {
      return Err(StreamError::Disposed);
    }
    inner.references += 1;
    Ok(RefHandle { parent: self.inner.clone(), released: false })
  }
}

impl Subscription for RefCountSubscription {
  fn unsubscribe(&mut self) {
    let underlying = {
      let mut inner = lock(&self.inner);
      if inner.armed || inner.fired {
        return;
      }
      inner.armed = true;
      if inner.references == 0 {
        inner.fired = true;
        inner.underlying.take()
      } else {
        None
      }
    };
    if let Some(mut sub) = underlying {
      sub.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    lock(&self.inner).fired
  }
}

/// One outstanding reference produced by
/// [`RefCountSubscription::add_reference`].
pub struct RefHandle {
  parent: Arc<Mutex<Inner>>,
  released: bool,
}

impl Subscription for RefHandle {
  fn unsubscribe(&mut self) {
    if self.released {
      return;
    }
    self.released = true;
    let underlying = {
      let mut inner = lock(&self.parent);
      inner.references -= 1;
      if inner.armed && !inner.fired && inner.references == 0 {
        inner.fired = true;
        inner.underlying.take()
      } else {
        None
      }
    };
    if let Some(mut sub) = underlying {
      sub.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    self.released
  }
}

fn lock(inner: &Arc<Mutex<Inner>>) -> std::sync::MutexGuard<'_, Inner> {
  inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
