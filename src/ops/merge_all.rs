use std::collections::VecDeque;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, Subscription},
};

/// Flattens a stream of streams, running at most `concurrent` inner
/// streams at once; surplus inners wait in arrival order. `concurrent: 1`
/// is sequential concatenation.
///
/// The outer-complete/inner-complete race lives in one guarded state;
/// when an inner completes the four cases are:
/// 1. pending inners queued → subscribe the next one;
/// 2. queue empty, outer still live → drop the active count;
/// 3. queue empty, outer done, other inners active → drop the count only;
/// 4. queue empty, outer done, this was the last inner → complete.
/// Outer completion with anything still active only sets the flag.
#[derive(Clone)]
pub struct MergeAllOp<S> {
  pub(crate) source: S,
  pub(crate) concurrent: usize,
}

impl<S> Observable for MergeAllOp<S>
where
  S: Observable,
  S::Item: Observable + Send + 'static,
  <S::Item as Observable>::Item: Send + 'static,
{
  type Item = <S::Item as Observable>::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item> + Send + 'static,
  {
    let subscription = CompositeSubscription::new();
    let state = MutArc::own(MergeAllState {
      observer: Some(observer),
      active: 0,
      outer_done: false,
      pending: VecDeque::new(),
      concurrent: self.concurrent.max(1),
      subscription: subscription.clone(),
    });

    subscription.add(
      self
        .source
        .actual_subscribe(OuterObserver { state: state.clone() }),
    );
    subscription
  }
}

struct MergeAllState<O, Inner> {
  observer: Option<O>,
  active: usize,
  outer_done: bool,
  pending: VecDeque<Inner>,
  concurrent: usize,
  subscription: CompositeSubscription,
}

/// Subscribe `inner` outside the state lock; a synchronous inner re-enters
/// the state through its own observer immediately.
fn launch_inner<O, Inner>(state: &MutArc<MergeAllState<O, Inner>>, inner: Inner)
where
  Inner: Observable + Send + 'static,
  Inner::Item: Send + 'static,
  O: Observer<Item = Inner::Item> + Send + 'static,
{
  let subscription = state.rc_deref().subscription.clone();
  let inner_sub = inner.actual_subscribe(InnerObserver { state: state.clone() });
  subscription.add(inner_sub);
}

struct OuterObserver<O, Inner> {
  state: MutArc<MergeAllState<O, Inner>>,
}

impl<O, Inner> Observer for OuterObserver<O, Inner>
where
  Inner: Observable + Send + 'static,
  Inner::Item: Send + 'static,
  O: Observer<Item = Inner::Item> + Send + 'static,
{
  type Item = Inner;

  fn next(&mut self, inner: Inner) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.observer.is_none() {
        return;
      }
      if state.active >= state.concurrent {
        state.pending.push_back(inner);
        return;
      }
      state.active += 1;
    }
    launch_inner(&self.state, inner);
  }

  fn error(&mut self, err: StreamError) {
    let mut state = self.state.rc_deref_mut();
    if let Some(mut observer) = state.observer.take() {
      observer.error(err);
    }
    state.subscription.clone().unsubscribe();
  }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.outer_done = true;
    if state.active == 0 && state.pending.is_empty() {
      if let Some(mut observer) = state.observer.take() {
        observer.complete();
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}

struct InnerObserver<O, Inner> {
  state: MutArc<MergeAllState<O, Inner>>,
}

impl<O, Inner> Observer for InnerObserver<O, Inner>
where
  Inner: Observable + Send + 'static,
  Inner::Item: Send + 'static,
  O: Observer<Item = Inner::Item> + Send + 'static,
{
  type Item = Inner::Item;

  fn next(&mut self, value: Inner::Item) {
    if let Some(observer) = self.state.rc_deref_mut().observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: StreamError) {
    let mut state = self.state.rc_deref_mut();
    if let Some(mut observer) = state.observer.take() {
      observer.error(err);
    }
    state.subscription.clone().unsubscribe();
  }

  fn complete(&mut self) {
    let next_inner = {
      let mut state = self.state.rc_deref_mut();
      if state.observer.is_none() {
        return;
      }
      match state.pending.pop_front() {
        Some(inner) => Some(inner),
        None => {
          state.active = state.active.saturating_sub(1);
          if state.outer_done && state.active == 0 {
            if let Some(mut observer) = state.observer.take() {
              observer.complete();
            }
          }
          None
        }
      }
    };
    if let Some(inner) = next_inner {
      launch_inner(&self.state, inner);
    }
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}
