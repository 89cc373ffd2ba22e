//! Boolean queries over a stream: `any`, `all`, `contains`.
//!
//! All three share one shape: a verdict observer that emits its boolean
//! and synthesizes `complete` as soon as the answer is known, detaching
//! from upstream; an undecided stream answers at completion.

use crate::{observable::Observable, observer::Observer, type_hint::TypeHint};

#[derive(Clone)]
pub struct AnyOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for AnyOp<S, F>
where
  S: Observable,
  S::Item: 'static,
  F: FnMut(&S::Item) -> bool + Send + 'static,
{
  type Item = bool;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = bool> + Send + 'static,
  {
    let mut predicate = self.predicate;
    self.source.actual_subscribe(VerdictObserver {
      observer: Some(observer),
      test: move |v: &S::Item| predicate(v),
      on_match: true,
      _hint: TypeHint::new(),
    })
  }
}

#[derive(Clone)]
pub struct AllOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for AllOp<S, F>
where
  S: Observable,
  S::Item: 'static,
  F: FnMut(&S::Item) -> bool + Send + 'static,
{
  type Item = bool;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = bool> + Send + 'static,
  {
    let mut predicate = self.predicate;
    self.source.actual_subscribe(VerdictObserver {
      observer: Some(observer),
      test: move |v: &S::Item| !predicate(v),
      on_match: false,
      _hint: TypeHint::new(),
    })
  }
}

pub struct ContainsOp<S: Observable> {
  pub(crate) source: S,
  pub(crate) target: S::Item,
}

impl<S> Clone for ContainsOp<S>
where
  S: Observable + Clone,
  S::Item: Clone,
{
  fn clone(&self) -> Self {
    ContainsOp { source: self.source.clone(), target: self.target.clone() }
  }
}

impl<S> Observable for ContainsOp<S>
where
  S: Observable,
  S::Item: PartialEq + Send + 'static,
{
  type Item = bool;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = bool> + Send + 'static,
  {
    let target = self.target;
    self.source.actual_subscribe(VerdictObserver {
      observer: Some(observer),
      test: move |v: &S::Item| *v == target,
      on_match: true,
      _hint: TypeHint::new(),
    })
  }
}

/// Emits `on_match` when `test` fires, `!on_match` at completion.
pub struct VerdictObserver<O, F, Item> {
  observer: Option<O>,
  test: F,
  on_match: bool,
  _hint: TypeHint<Item>,
}

impl<O, F, Item> Observer for VerdictObserver<O, F, Item>
where
  O: Observer<Item = bool>,
  F: FnMut(&Item) -> bool,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.observer.is_some() && (self.test)(&value) {
      if let Some(mut observer) = self.observer.take() {
        observer.next(self.on_match);
        observer.complete();
      }
    }
  }

  fn error(&mut self, err: crate::error::StreamError) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.next(!self.on_match);
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.as_ref().map_or(true, |o| o.is_closed())
  }
}
