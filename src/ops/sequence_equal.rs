use std::collections::VecDeque;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, Subscription},
};

/// Compares two streams pairwise and emits a single boolean: `false` on
/// the first value or length mismatch, `true` at joint completion.
#[derive(Clone)]
pub struct SequenceEqualOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

impl<A, B> Observable for SequenceEqualOp<A, B>
where
  A: Observable,
  B: Observable<Item = A::Item>,
  A::Item: PartialEq + Send + 'static,
{
  type Item = bool;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = bool> + Send + 'static,
  {
    let subscription = CompositeSubscription::new();
    let state = MutArc::own(CompareState {
      observer: Some(observer),
      left: VecDeque::new(),
      right: VecDeque::new(),
      left_done: false,
      right_done: false,
      subscription: subscription.clone(),
    });

    subscription.add(
      self
        .a
        .actual_subscribe(SideObserver { state: state.clone(), left_side: true }),
    );
    subscription.add(
      self
        .b
        .actual_subscribe(SideObserver { state, left_side: false }),
    );
    subscription
  }
}

struct CompareState<O, Item> {
  observer: Option<O>,
  left: VecDeque<Item>,
  right: VecDeque<Item>,
  left_done: bool,
  right_done: bool,
  subscription: CompositeSubscription,
}

impl<O, Item> CompareState<O, Item>
where
  O: Observer<Item = bool>,
  Item: PartialEq,
{
  fn settle(&mut self, verdict: bool) {
    if let Some(mut observer) = self.observer.take() {
      observer.next(verdict);
      observer.complete();
    }
    self.subscription.clone().unsubscribe();
  }

  fn inspect(&mut self) {
    while !self.left.is_empty() && !self.right.is_empty() {
      let left = self.left.pop_front().expect("checked non-empty");
      let right = self.right.pop_front().expect("checked non-empty");
      if left != right {
        self.settle(false);
        return;
      }
    }
    // After draining matched pairs, at most one queue is non-empty.
    if self.left_done && self.right_done {
      let equal = self.left.is_empty() && self.right.is_empty();
      self.settle(equal);
    } else if (self.left_done && self.left.is_empty() && !self.right.is_empty())
      || (self.right_done && self.right.is_empty() && !self.left.is_empty())
    {
      // A finished side can never match the surplus on the other.
      self.settle(false);
    }
  }
}

struct SideObserver<O, Item> {
  state: MutArc<CompareState<O, Item>>,
  left_side: bool,
}

impl<O, Item> Observer for SideObserver<O, Item>
where
  O: Observer<Item = bool>,
  Item: PartialEq,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let mut state = self.state.rc_deref_mut();
    if state.observer.is_none() {
      return;
    }
    if self.left_side {
      state.left.push_back(value);
    } else {
      state.right.push_back(value);
    }
    state.inspect();
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
    if self.left_side {
      state.left_done = true;
    } else {
      state.right_done = true;
    }
    state.inspect();
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}
