use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, Subscription},
  type_hint::TypeHint,
};

/// Combines the freshest value of each side through a closure, emitting on
/// every arrival once both sides have produced at least once. Completes
/// when both sides completed; either error is fatal.
#[derive(Clone)]
pub struct CombineLatestOp<A, B, F> {
  pub(crate) a: A,
  pub(crate) b: B,
  pub(crate) func: F,
}

impl<A, B, F, R> Observable for CombineLatestOp<A, B, F>
where
  A: Observable,
  B: Observable,
  A::Item: Clone + Send + 'static,
  B::Item: Clone + Send + 'static,
  F: FnMut(A::Item, B::Item) -> R + Send + 'static,
{
  type Item = R;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = R> + Send + 'static,
  {
    let subscription = CompositeSubscription::new();
    let state = MutArc::own(CombineState {
      observer: Some(observer),
      func: self.func,
      latest_left: None,
      latest_right: None,
      live_sides: 2,
      subscription: subscription.clone(),
    });

    subscription.add(
      self
        .a
        .actual_subscribe(CombineLeftObserver { state: state.clone(), _hint: TypeHint::new() }),
    );
    subscription.add(
      self
        .b
        .actual_subscribe(CombineRightObserver { state, _hint: TypeHint::new() }),
    );
    subscription
  }
}

struct CombineState<O, F, A, B> {
  observer: Option<O>,
  func: F,
  latest_left: Option<A>,
  latest_right: Option<B>,
  live_sides: usize,
  subscription: CompositeSubscription,
}

impl<O, F, A, B, R> CombineState<O, F, A, B>
where
  O: Observer<Item = R>,
  F: FnMut(A, B) -> R,
  A: Clone,
  B: Clone,
{
  fn emit_if_ready(&mut self) {
    if let (Some(left), Some(right)) = (self.latest_left.clone(), self.latest_right.clone()) {
      let combined = (self.func)(left, right);
      if let Some(observer) = self.observer.as_mut() {
        observer.next(combined);
      }
    }
  }

  fn side_done(&mut self) {
    self.live_sides = self.live_sides.saturating_sub(1);
    if self.live_sides == 0 {
      if let Some(mut observer) = self.observer.take() {
        observer.complete();
      }
    }
  }

  fn fail(&mut self, err: StreamError) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
    self.subscription.clone().unsubscribe();
  }
}

macro_rules! combine_side_observer {
  ($name:ident, $side_item:ident, $slot:ident) => {
    pub struct $name<O, F, A, B> {
      state: MutArc<CombineState<O, F, A, B>>,
      _hint: TypeHint<$side_item>,
    }

    impl<O, F, A, B, R> Observer for $name<O, F, A, B>
    where
      O: Observer<Item = R>,
      F: FnMut(A, B) -> R,
      A: Clone,
      B: Clone,
    {
      type Item = $side_item;

      fn next(&mut self, value: $side_item) {
        let mut state = self.state.rc_deref_mut();
        if state.observer.is_none() {
          return;
        }
        state.$slot = Some(value);
        state.emit_if_ready();
      }

      fn error(&mut self, err: StreamError) {
        self.state.rc_deref_mut().fail(err);
      }

      fn complete(&mut self) {
        self.state.rc_deref_mut().side_done();
      }

      fn is_closed(&self) -> bool {
        self.state.rc_deref().observer.is_none()
      }
    }
  };
}

combine_side_observer!(CombineLeftObserver, A, latest_left);
combine_side_observer!(CombineRightObserver, B, latest_right);
