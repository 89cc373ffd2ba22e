//! # brook
//!
//! A push-based reactive streams library: lazy [`Observable`] sources, an
//! operator algebra to transform and combine them, and [`Scheduler`]s that
//! decide where and when the work runs.
//!
//! ```
//! use brook::prelude::*;
//!
//! let doubled_evens = observable::range(0, 5)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 10)
//!   .reduce(Vec::new(), |mut acc, v| {
//!     acc.push(v);
//!     acc
//!   })
//!   .wait()
//!   .unwrap();
//!
//! assert_eq!(doubled_evens, Some(vec![0, 20, 40]));
//! ```
//!
//! Data flows downstream (source → subscriber); control flows upstream:
//! disposing the [`Subscription`] returned by `subscribe` unwinds the whole
//! chain. Per subscription, the event sequence an observer receives always
//! matches `next* (complete | error)?`.
//!
//! [`Observable`]: crate::observable::Observable
//! [`Scheduler`]: crate::scheduler::Scheduler
//! [`Subscription`]: crate::subscription::Subscription

pub mod error;
pub mod joins;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscription;
pub mod type_hint;

pub mod prelude {
  //! Convenient glob import of the public surface.

  pub use std::time::Duration;

  pub use crate::error::StreamError;
  pub use crate::joins::{when, Pattern2, Pattern3, Plan, When};
  pub use crate::notification::Notification;
  pub use crate::observable;
  pub use crate::observable::{
    BoxObservable, ConnectableObservable, Observable, ObservableExt, Subscriber,
  };
  pub use crate::observer::{BoxObserver, CallbackObserver, Observer, SafeObserver};
  pub use crate::ops::group_by::GroupedObservable;
  pub use crate::ops::timestamp::{Elapsed, Stamped};
  pub use crate::rc::MutArc;
  pub use crate::scheduler::{
    CurrentThreadScheduler, ImmediateScheduler, NewThreadScheduler, Scheduler, Task, TaskHandle,
    TaskState, TestScheduler, ThreadPoolScheduler,
  };
  pub use crate::subject::{ReplaySubject, Subject};
  pub use crate::subscription::{
    BoxSubscription, CompositeSubscription, RefCountSubscription, SerialSubscription,
    SingleSubscription, Subscription,
  };
}
