use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, Subscription},
};

/// Interleaves two streams of the same item type: values forward as they
/// arrive, either error is fatal, completion waits for both sides.
#[derive(Clone)]
pub struct MergeOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

impl<A, B> Observable for MergeOp<A, B>
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
    let subscription = CompositeSubscription::new();
    let state = MutArc::own(MergeState {
      observer: Some(observer),
      live_sides: 2,
      subscription: subscription.clone(),
    });

    subscription.add(
      self
        .a
        .actual_subscribe(MergeSideObserver { state: state.clone() }),
    );
    subscription.add(self.b.actual_subscribe(MergeSideObserver { state }));
    subscription
  }
}

struct MergeState<O> {
  observer: Option<O>,
  live_sides: usize,
  subscription: CompositeSubscription,
}

pub struct MergeSideObserver<O> {
  state: MutArc<MergeState<O>>,
}

impl<O, Item> Observer for MergeSideObserver<O>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
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
    let mut state = self.state.rc_deref_mut();
    state.live_sides = state.live_sides.saturating_sub(1);
    if state.live_sides == 0 {
      if let Some(mut observer) = state.observer.take() {
        observer.complete();
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::StreamError, observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn forwards_values_from_both_sides() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 2])
      .merge(observable::from_iter(vec![3, 4]))
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    let mut seen = seen.rc_deref().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3, 4]);
  }

  #[test]
  fn completes_only_after_both_sides() {
    let mut left = crate::subject::Subject::new();
    let mut right = crate::subject::Subject::new();
    let completed = MutArc::own(false);

    let c_completed = completed.clone();
    left
      .clone()
      .merge(right.clone())
      .subscribe_all(|_: i32| {}, |_| {}, move || *c_completed.rc_deref_mut() = true);

    use crate::observer::Observer;
    left.next(1);
    left.complete();
    assert!(!*completed.rc_deref());

    right.next(2);
    right.complete();
    assert!(*completed.rc_deref());
  }

  #[test]
  fn either_error_is_fatal() {
    let errors = MutArc::own(Vec::new());
    let c_errors = errors.clone();
    observable::from_iter(vec![1])
      .merge(observable::throw_err(StreamError::message("side failed")))
      .subscribe_err(|_| {}, move |e| c_errors.rc_deref_mut().push(e.to_string()));

    assert_eq!(*errors.rc_deref(), vec!["side failed".to_string()]);
  }
}
