//! Zero-sized type markers.

use std::marker::PhantomData;

/// Pins a type parameter that would otherwise be unconstrained in an
/// `Observer` implementation (the wrapper consumes `T` but its downstream
/// observer emits something else).
pub struct TypeHint<T>(PhantomData<fn() -> T>);

impl<T> TypeHint<T> {
  pub fn new() -> Self {
    TypeHint(PhantomData)
  }
}

impl<T> Default for TypeHint<T> {
  fn default() -> Self {
    TypeHint::new()
  }
}

impl<T> Clone for TypeHint<T> {
  fn clone(&self) -> Self {
    TypeHint::new()
  }
}
