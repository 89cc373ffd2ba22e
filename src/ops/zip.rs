use std::collections::VecDeque;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, Subscription},
  type_hint::TypeHint,
};

/// Pairs two streams positionally through per-source FIFO queues. The
/// match-and-emit decision runs under one shared lock; the join completes
/// as soon as either side has completed with an empty queue.
#[derive(Clone)]
pub struct ZipOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

impl<A, B> Observable for ZipOp<A, B>
where
  A: Observable,
  B: Observable,
  A::Item: Send + 'static,
  B::Item: Send + 'static,
{
  type Item = (A::Item, B::Item);
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = (A::Item, B::Item)> + Send + 'static,
  {
    let subscription = CompositeSubscription::new();
    let state = MutArc::own(ZipState {
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
        .actual_subscribe(ZipLeftObserver { state: state.clone(), _hint: TypeHint::new() }),
    );
    subscription.add(
      self
        .b
        .actual_subscribe(ZipRightObserver { state, _hint: TypeHint::new() }),
    );
    subscription
  }
}

struct ZipState<O, A, B> {
  observer: Option<O>,
  left: VecDeque<A>,
  right: VecDeque<B>,
  left_done: bool,
  right_done: bool,
  subscription: CompositeSubscription,
}

impl<O, A, B> ZipState<O, A, B>
where
  O: Observer<Item = (A, B)>,
{
  fn drain_matches(&mut self) {
    while !self.left.is_empty() && !self.right.is_empty() {
      let left = self.left.pop_front().expect("checked non-empty");
      let right = self.right.pop_front().expect("checked non-empty");
      if let Some(observer) = self.observer.as_mut() {
        observer.next((left, right));
      }
    }
    // A completed side with an exhausted queue can never pair again.
    if (self.left_done && self.left.is_empty()) || (self.right_done && self.right.is_empty()) {
      if let Some(mut observer) = self.observer.take() {
        observer.complete();
      }
      self.subscription.clone().unsubscribe();
    }
  }

  fn fail(&mut self, err: StreamError) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
    self.subscription.clone().unsubscribe();
  }
}

pub struct ZipLeftObserver<O, A, B> {
  state: MutArc<ZipState<O, A, B>>,
  _hint: TypeHint<A>,
}

impl<O, A, B> Observer for ZipLeftObserver<O, A, B>
where
  O: Observer<Item = (A, B)>,
{
  type Item = A;

  fn next(&mut self, value: A) {
    let mut state = self.state.rc_deref_mut();
    if state.observer.is_none() {
      return;
    }
    state.left.push_back(value);
    state.drain_matches();
  }

  fn error(&mut self, err: StreamError) {
    self.state.rc_deref_mut().fail(err);
  }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.left_done = true;
    state.drain_matches();
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}

pub struct ZipRightObserver<O, A, B> {
  state: MutArc<ZipState<O, A, B>>,
  _hint: TypeHint<B>,
}

impl<O, A, B> Observer for ZipRightObserver<O, A, B>
where
  O: Observer<Item = (A, B)>,
{
  type Item = B;

  fn next(&mut self, value: B) {
    let mut state = self.state.rc_deref_mut();
    if state.observer.is_none() {
      return;
    }
    state.right.push_back(value);
    state.drain_matches();
  }

  fn error(&mut self, err: StreamError) {
    self.state.rc_deref_mut().fail(err);
  }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.right_done = true;
    state.drain_matches();
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, observer::Observer, rc::MutArc, subject::Subject};

  #[test]
  fn pairs_min_of_both_lengths() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 2, 3, 4])
      .zip(observable::from_iter(vec!["a", "b", "c"]))
      .subscribe(move |pair| c_seen.rc_deref_mut().push(pair));

    assert_eq!(*seen.rc_deref(), vec![(1, "a"), (2, "b"), (3, "c")]);
  }

  #[test]
  fn subject_driven_zip_pairs_in_arrival_order() {
    let mut letters = Subject::new();
    let mut numbers = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    letters
      .clone()
      .zip(numbers.clone())
      .subscribe(move |(l, n): (char, i32)| {
        c_seen.rc_deref_mut().push(format!("{l}{n}"))
      });

    letters.next('A');
    letters.next('B');
    numbers.next(1);
    letters.next('C');
    numbers.next(2);
    numbers.next(3);

    assert_eq!(*seen.rc_deref(), vec!["A1", "B2", "C3"]);
  }

  #[test]
  fn completes_when_a_done_side_has_an_empty_queue() {
    let mut letters = Subject::new();
    let mut numbers = Subject::<i32>::new();
    let completed = MutArc::own(false);

    let c_completed = completed.clone();
    letters
      .clone()
      .zip(numbers.clone())
      .subscribe_all(|_: (char, i32)| {}, |_| {}, move || {
        *c_completed.rc_deref_mut() = true
      });

    letters.next('A');
    numbers.complete();
    assert!(*completed.rc_deref());
  }

  #[test]
  fn ordering_within_each_side_is_preserved() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::range(0, 5)
      .zip(observable::range(10, 5))
      .subscribe(move |pair| c_seen.rc_deref_mut().push(pair));

    assert_eq!(
      *seen.rc_deref(),
      vec![(0, 10), (1, 11), (2, 12), (3, 13), (4, 14)]
    );
  }
}
