//! The error channel shared by every stream in this crate.
//!
//! Streams carry a single concrete error type instead of a generic
//! parameter so that operators can *synthesize* errors: `timeout` produces
//! [`StreamError::Timeout`], `element_at` produces
//! [`StreamError::IndexOutOfRange`], without imposing conversion bounds on
//! every operator in a chain. User errors ride along in
//! [`StreamError::User`], reference-counted so the same error can be
//! replayed to any number of subscribers.

use std::{error::Error, fmt::Display, sync::Arc, time::Duration};

/// The error delivered through a stream's `error` channel.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
  /// An error value injected by user code (`throw_err`, `create`, …).
  #[error(transparent)]
  User(Arc<dyn Error + Send + Sync>),

  /// A time-based operator gave up waiting.
  #[error("stream timed out after {after:?}")]
  Timeout {
    /// The duration that elapsed without an event.
    after: Duration,
  },

  /// The requested element does not exist in the sequence.
  #[error("element index {index} out of range, sequence ended after {len} items")]
  IndexOutOfRange {
    /// The index that was requested.
    index: usize,
    /// How many items the sequence actually produced.
    len: usize,
  },

  /// The event sequence violated the `next* (complete | error)?` grammar in
  /// a way that is still observable downstream, e.g. a blocking consumer
  /// whose producer vanished without delivering a terminal event.
  #[error("observer protocol violated: {context}")]
  Protocol {
    /// What the misbehaving source did.
    context: String,
  },

  /// An operation was attempted on an already-disposed handle.
  #[error("subscription already disposed")]
  Disposed,

  /// A user-supplied callback panicked; the panic was caught at the
  /// protocol gate and converted into this error.
  #[error("observer callback panicked: {context}")]
  Panicked {
    /// The panic payload, rendered as text.
    context: String,
  },
}

impl StreamError {
  /// Wrap an arbitrary user error value.
  pub fn user(err: impl Error + Send + Sync + 'static) -> Self {
    StreamError::User(Arc::new(err))
  }

  /// Wrap a plain message as a user error.
  pub fn message(msg: impl Into<String>) -> Self {
    StreamError::User(Arc::new(MessageError(msg.into())))
  }

  pub(crate) fn protocol(context: impl Into<String>) -> Self {
    StreamError::Protocol { context: context.into() }
  }

  pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
    let context = payload
      .downcast_ref::<&str>()
      .map(|s| (*s).to_owned())
      .or_else(|| payload.downcast_ref::<String>().cloned())
      .unwrap_or_else(|| "non-string panic payload".to_owned());
    StreamError::Panicked { context }
  }
}

/// A bare-message error, for sources that only have text to report.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MessageError(String);

impl Display for MessageError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

impl Error for MessageError {}
