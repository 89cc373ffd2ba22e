//! Join patterns: `and` / `then` / `when`.
//!
//! A pattern is a tuple of observables; [`Pattern2::then`] binds it to a
//! selector, producing a [`Plan`]; [`when`] activates any number of plans
//! of the same result type and emits their reductions.
//!
//! Execution keeps one FIFO queue per source. After every enqueue the
//! plan checks for a match: when every queue holds at least one element,
//! the heads are dequeued and reduced through the selector. A source
//! completing while its queue is empty retires its plan, since no further
//! match is possible; `when` completes once every plan has retired. Wider joins
//! than three sources compose structurally: any pattern source may itself
//! be a `zip` of narrower streams.

use std::collections::VecDeque;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::{BoxObserver, Observer},
  rc::MutArc,
  subscription::CompositeSubscription,
};

/// Two sources joined positionally; extend with [`and`](Self::and) or
/// bind a selector with [`then`](Self::then).
pub struct Pattern2<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

/// Three sources joined positionally.
pub struct Pattern3<A, B, C> {
  pub(crate) a: A,
  pub(crate) b: B,
  pub(crate) c: C,
}

impl<A, B> Pattern2<A, B>
where
  A: Observable + Send + 'static,
  B: Observable + Send + 'static,
  A::Item: Send + 'static,
  B::Item: Send + 'static,
{
  /// Widen the pattern with a third source.
  pub fn and<C>(self, c: C) -> Pattern3<A, B, C>
  where
    C: Observable,
  {
    Pattern3 { a: self.a, b: self.b, c }
  }

  /// Bind the pattern to a selector, yielding an activatable [`Plan`].
  pub fn then<R, F>(self, selector: F) -> Plan<R>
  where
    F: FnMut(A::Item, B::Item) -> R + Send + 'static,
    R: Send + 'static,
  {
    let Pattern2 { a, b } = self;
    Plan {
      activate: Box::new(move |sink, subscription| {
        let state = MutArc::own(JoinState {
          sink,
          selector,
          left: SourceQueue::default(),
          right: SourceQueue::default(),
          retired: false,
        });

        subscription.add(a.actual_subscribe(JoinLeftObserver { state: state.clone() }));
        subscription.add(b.actual_subscribe(JoinRightObserver { state }));
      }),
    }
  }
}

impl<A, B, C> Pattern3<A, B, C>
where
  A: Observable + Send + 'static,
  B: Observable + Send + 'static,
  C: Observable + Send + 'static,
  A::Item: Send + 'static,
  B::Item: Send + 'static,
  C::Item: Send + 'static,
{
  /// Bind the pattern to a ternary selector.
  pub fn then<R, F>(self, mut selector: F) -> Plan<R>
  where
    F: FnMut(A::Item, B::Item, C::Item) -> R + Send + 'static,
    R: Send + 'static,
  {
    // A three-way join is a two-way join over a zipped pair: the zip's
    // queue discipline is exactly the pattern's.
    use crate::observable::ObservableExt;
    let Pattern3 { a, b, c } = self;
    Pattern2 { a: a.zip(b), b: c }
      .then(move |(left, middle), right| selector(left, middle, right))
  }
}

/// A pattern bound to a selector, ready for [`when`].
pub struct Plan<R> {
  #[allow(clippy::type_complexity)]
  activate: Box<dyn FnOnce(PlanSink<R>, &CompositeSubscription) + Send>,
}

/// Activates `plans` as one observable of their reductions. Plans run
/// independently; each source delivers into its own plan's queues.
pub fn when<R: Send + 'static>(plans: Vec<Plan<R>>) -> When<R> {
  When { plans }
}

pub struct When<R> {
  plans: Vec<Plan<R>>,
}

impl<R: Send + 'static> Observable for When<R> {
  type Item = R;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = R> + Send + 'static,
  {
    let subscription = CompositeSubscription::new();
    if self.plans.is_empty() {
      observer.complete();
      return subscription;
    }

    let shared = MutArc::own(WhenState {
      observer: Some(Box::new(observer) as BoxObserver<R>),
      active_plans: self.plans.len(),
    });
    for plan in self.plans {
      (plan.activate)(PlanSink { state: shared.clone() }, &subscription);
    }
    subscription
  }
}

struct WhenState<R> {
  observer: Option<BoxObserver<R>>,
  active_plans: usize,
}

/// One plan's handle into the shared downstream.
struct PlanSink<R> {
  state: MutArc<WhenState<R>>,
}

impl<R> Clone for PlanSink<R> {
  fn clone(&self) -> Self {
    PlanSink { state: self.state.clone() }
  }
}

impl<R> PlanSink<R> {
  fn emit(&mut self, value: R) {
    if let Some(observer) = self.state.rc_deref_mut().observer.as_mut() {
      observer.next(value);
    }
  }

  fn fail(&mut self, err: StreamError) {
    if let Some(mut observer) = self.state.rc_deref_mut().observer.take() {
      observer.error(err);
    }
  }

  fn retire(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.active_plans = state.active_plans.saturating_sub(1);
    if state.active_plans == 0 {
      if let Some(mut observer) = state.observer.take() {
        observer.complete();
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}

struct SourceQueue<T> {
  values: VecDeque<T>,
  done: bool,
}

impl<T> Default for SourceQueue<T> {
  fn default() -> Self {
    SourceQueue { values: VecDeque::new(), done: false }
  }
}

struct JoinState<R, A, B, F> {
  sink: PlanSink<R>,
  selector: F,
  left: SourceQueue<A>,
  right: SourceQueue<B>,
  retired: bool,
}

impl<R, A, B, F> JoinState<R, A, B, F>
where
  F: FnMut(A, B) -> R,
{
  fn try_match(&mut self) {
    if self.retired {
      return;
    }
    while !self.left.values.is_empty() && !self.right.values.is_empty() {
      let left = self.left.values.pop_front().expect("checked non-empty");
      let right = self.right.values.pop_front().expect("checked non-empty");
      let reduced = (self.selector)(left, right);
      self.sink.emit(reduced);
    }
    if (self.left.done && self.left.values.is_empty())
      || (self.right.done && self.right.values.is_empty())
    {
      self.retired = true;
      self.sink.retire();
    }
  }

  fn fail(&mut self, err: StreamError) {
    if !self.retired {
      self.retired = true;
      self.sink.fail(err);
    }
  }
}

macro_rules! join_side_observer {
  ($name:ident, $side_item:ident, $queue:ident) => {
    struct $name<R, A, B, F> {
      state: MutArc<JoinState<R, A, B, F>>,
    }

    impl<R, A, B, F> Observer for $name<R, A, B, F>
    where
      F: FnMut(A, B) -> R,
    {
      type Item = $side_item;

      fn next(&mut self, value: $side_item) {
        let mut state = self.state.rc_deref_mut();
        if state.retired {
          return;
        }
        state.$queue.values.push_back(value);
        state.try_match();
      }

      fn error(&mut self, err: StreamError) {
        self.state.rc_deref_mut().fail(err);
      }

      fn complete(&mut self) {
        let mut state = self.state.rc_deref_mut();
        state.$queue.done = true;
        state.try_match();
      }

      fn is_closed(&self) -> bool {
        let state = self.state.rc_deref();
        state.retired || state.sink.is_closed()
      }
    }
  };
}

join_side_observer!(JoinLeftObserver, A, left);
join_side_observer!(JoinRightObserver, B, right);
