//! Cancellation handles.
//!
//! Subscribing to an observable returns a [`Subscription`]: the handle
//! that, once unsubscribed, unwinds the whole downstream computation.
//! Disposal is idempotent and callable from any thread, including from
//! inside an observer callback.
//!
//! Composition shapes:
//! - [`SingleSubscription`]: a plain shared closed flag.
//! - [`CompositeSubscription`]: owns a set of children, torn down in
//!   reverse insertion order.
//! - [`SerialSubscription`]: one replaceable child; replacement disposes
//!   the previous child, disposal blocks further assignment.
//! - [`RefCountSubscription`]: a child guarded by a reference count; the
//!   teardown fires once the root is disposed *and* the count drains.

mod composite;
mod ref_count;
mod serial;
mod single;

pub use composite::CompositeSubscription;
pub use ref_count::{RefCountSubscription, RefHandle};
pub use serial::SerialSubscription;
pub use single::SingleSubscription;

/// A handle that cancels a running computation when disposed.
pub trait Subscription {
  /// Dispose the underlying computation. Idempotent: the second and any
  /// later calls return without work.
  fn unsubscribe(&mut self);

  /// Whether this handle has been disposed (or the computation finished).
  fn is_closed(&self) -> bool;
}

/// Type-erased subscription, the common currency of composites.
pub type BoxSubscription = Box<dyn Subscription + Send>;

impl<S: Subscription + ?Sized> Subscription for Box<S> {
  fn unsubscribe(&mut self) {
    (**self).unsubscribe();
  }

  fn is_closed(&self) -> bool {
    (**self).is_closed()
  }
}
