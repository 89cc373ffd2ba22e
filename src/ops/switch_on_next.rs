use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscription::{CompositeSubscription, SerialSubscription, Subscription},
};

/// Flattens a stream of streams by mirroring only the newest inner: each
/// arriving inner cancels and replaces the previous one. Completes when
/// the outer has completed and the last inner finished.
#[derive(Clone)]
pub struct SwitchOnNextOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for SwitchOnNextOp<S>
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
    let serial = SerialSubscription::new();
    let subscription = CompositeSubscription::new();
    subscription.add(serial.clone());

    let state = MutArc::own(SwitchState {
      observer: Some(observer),
      epoch: 0,
      inner_active: false,
      outer_done: false,
      serial: serial.clone(),
    });

    subscription.add(self.source.actual_subscribe(SwitchOuterObserver {
      state,
      _marker: std::marker::PhantomData,
    }));
    subscription
  }
}

struct SwitchState<O> {
  observer: Option<O>,
  // Which inner generation is current; stale inners compare and drop out.
  epoch: usize,
  inner_active: bool,
  outer_done: bool,
  serial: SerialSubscription,
}

struct SwitchOuterObserver<O, Inner> {
  state: MutArc<SwitchState<O>>,
  _marker: std::marker::PhantomData<fn(Inner)>,
}

impl<O, Inner> Observer for SwitchOuterObserver<O, Inner>
where
  Inner: Observable + Send + 'static,
  Inner::Item: Send + 'static,
  O: Observer<Item = Inner::Item> + Send + 'static,
{
  type Item = Inner;

  fn next(&mut self, inner: Inner) {
    let epoch = {
      let mut state = self.state.rc_deref_mut();
      if state.observer.is_none() {
        return;
      }
      state.epoch += 1;
      state.inner_active = true;
      state.epoch
    };
    let inner_sub = inner.actual_subscribe(SwitchInnerObserver {
      state: self.state.clone(),
      epoch,
    });
    // Replacing through the serial cancels the previous inner.
    self.state.rc_deref().serial.set(inner_sub);
  }

  fn error(&mut self, err: StreamError) {
    let mut state = self.state.rc_deref_mut();
    if let Some(mut observer) = state.observer.take() {
      observer.error(err);
    }
    state.serial.clone().unsubscribe();
  }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.outer_done = true;
    if !state.inner_active {
      if let Some(mut observer) = state.observer.take() {
        observer.complete();
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}

struct SwitchInnerObserver<O> {
  state: MutArc<SwitchState<O>>,
  epoch: usize,
}

impl<O, Item> Observer for SwitchInnerObserver<O>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let mut state = self.state.rc_deref_mut();
    if state.epoch != self.epoch {
      return;
    }
    if let Some(observer) = state.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: StreamError) {
    let mut state = self.state.rc_deref_mut();
    if state.epoch != self.epoch {
      return;
    }
    if let Some(mut observer) = state.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    if state.epoch != self.epoch {
      return;
    }
    state.inner_active = false;
    if state.outer_done {
      if let Some(mut observer) = state.observer.take() {
        observer.complete();
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().observer.is_none()
  }
}
