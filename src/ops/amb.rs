use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, SerialSubscription, Subscription},
};

/// Mirrors whichever of two streams produces an event first (any event,
/// a value or a terminal) and disposes the loser on the spot.
#[derive(Clone)]
pub struct AmbOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
  Left,
  Right,
}

impl<A, B> Observable for AmbOp<A, B>
where
  A: Observable,
  B: Observable<Item = A::Item>,
  A::Item: Send + 'static,
{
  type Item = A::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = A::Item> + Send + 'static,
  {
    let left_sub = SerialSubscription::new();
    let right_sub = SerialSubscription::new();
    let subscription = CompositeSubscription::new();
    subscription.add(left_sub.clone());
    subscription.add(right_sub.clone());

    let state = MutArc::own(AmbState {
      observer: Some(observer),
      winner: None,
      left_sub: left_sub.clone(),
      right_sub: right_sub.clone(),
    });

    left_sub.set(
      self
        .a
        .actual_subscribe(AmbSideObserver { state: state.clone(), side: Side::Left }),
    );
    // A synchronous left source may have already raced to a win.
    let right_pointless = state.rc_deref().winner == Some(Side::Left);
    if !right_pointless {
      right_sub.set(
        self
          .b
          .actual_subscribe(AmbSideObserver { state, side: Side::Right }),
      );
    }
    subscription
  }
}

struct AmbState<O> {
  observer: Option<O>,
  winner: Option<Side>,
  left_sub: SerialSubscription,
  right_sub: SerialSubscription,
}

impl<O> AmbState<O> {
  /// Returns whether `side` may deliver, claiming the race on first use
  /// and disposing the loser's subscription.
  fn claim(&mut self, side: Side) -> bool {
    match self.winner {
      Some(winner) => winner == side,
      None => {
        self.winner = Some(side);
        let loser = match side {
          Side::Left => self.right_sub.clone(),
          Side::Right => self.left_sub.clone(),
        };
        let mut loser = loser;
        loser.unsubscribe();
        true
      }
    }
  }
}

struct AmbSideObserver<O> {
  state: MutArc<AmbState<O>>,
  side: Side,
}

impl<O, Item> Observer for AmbSideObserver<O>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let mut state = self.state.rc_deref_mut();
    if state.claim(self.side) {
      if let Some(observer) = state.observer.as_mut() {
        observer.next(value);
      }
    }
  }

  fn error(&mut self, err: StreamError) {
    let mut state = self.state.rc_deref_mut();
    if state.claim(self.side) {
      if let Some(mut observer) = state.observer.take() {
        observer.error(err);
      }
    }
  }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    if state.claim(self.side) {
      if let Some(mut observer) = state.observer.take() {
        observer.complete();
      }
    }
  }

  fn is_closed(&self) -> bool {
    let state = self.state.rc_deref();
    match state.winner {
      Some(winner) => winner != self.side || state.observer.is_none(),
      None => false,
    }
  }
}
