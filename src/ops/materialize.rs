//! Events as values and back.

use crate::{
  error::StreamError,
  notification::Notification,
  observable::Observable,
  observer::Observer,
  type_hint::TypeHint,
};

/// Reifies every event as a [`Notification`] value: terminals become the
/// final `next`, followed by a `complete`.
#[derive(Clone)]
pub struct MaterializeOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for MaterializeOp<S>
where
  S: Observable,
  S::Item: Send + 'static,
{
  type Item = Notification<S::Item>;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Notification<S::Item>> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(MaterializeObserver { observer, _hint: TypeHint::new() })
  }
}

pub struct MaterializeObserver<O, Item> {
  observer: O,
  _hint: TypeHint<Item>,
}

impl<O, Item> Observer for MaterializeObserver<O, Item>
where
  O: Observer<Item = Notification<Item>>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.observer.next(Notification::Next(value));
  }

  fn error(&mut self, err: StreamError) {
    self.observer.next(Notification::Error(err));
    self.observer.complete();
  }

  fn complete(&mut self) {
    self.observer.next(Notification::Complete);
    self.observer.complete();
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}

/// Collapses a stream of [`Notification`]s back into plain events.
/// Notifications after a terminal one are dropped; there is nothing left
/// downstream to violate.
#[derive(Clone)]
pub struct DematerializeOp<S, T> {
  source: S,
  _value: TypeHint<T>,
}

impl<S, T> DematerializeOp<S, T> {
  pub(crate) fn new(source: S) -> Self {
    DematerializeOp { source, _value: TypeHint::new() }
  }
}

impl<S, T> Observable for DematerializeOp<S, T>
where
  S: Observable<Item = Notification<T>>,
  T: Send + 'static,
{
  type Item = T;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = T> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(DematerializeObserver { observer: Some(observer) })
  }
}

pub struct DematerializeObserver<O> {
  observer: Option<O>,
}

impl<O, T> Observer for DematerializeObserver<O>
where
  O: Observer<Item = T>,
{
  type Item = Notification<T>;

  fn next(&mut self, event: Notification<T>) {
    match event {
      Notification::Next(value) => {
        if let Some(observer) = self.observer.as_mut() {
          observer.next(value);
        }
      }
      Notification::Complete => {
        if let Some(mut observer) = self.observer.take() {
          observer.complete();
        }
      }
      Notification::Error(err) => {
        if let Some(mut observer) = self.observer.take() {
          observer.error(err);
        }
      }
    }
  }

  fn error(&mut self, err: StreamError) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.as_ref().map_or(true, |o| o.is_closed())
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    error::StreamError, notification::Notification, observable,
    observable::ObservableExt, rc::MutArc,
  };

  #[test]
  fn materialize_reifies_the_event_sequence() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 2])
      .materialize()
      .subscribe(move |n| c_seen.rc_deref_mut().push(n));

    assert_eq!(
      *seen.rc_deref(),
      vec![
        Notification::Next(1),
        Notification::Next(2),
        Notification::Complete,
      ]
    );
  }

  #[test]
  fn errors_materialize_as_values_then_complete() {
    let seen = MutArc::own(Vec::new());
    let completed = MutArc::own(false);

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    observable::throw_err::<i32>(StreamError::message("boom"))
      .materialize()
      .subscribe_all(
        move |n| c_seen.rc_deref_mut().push(n),
        |_| {},
        move || *c_completed.rc_deref_mut() = true,
      );

    assert_eq!(seen.rc_deref().len(), 1);
    assert!(matches!(seen.rc_deref()[0], Notification::Error(_)));
    assert!(*completed.rc_deref());
  }

  #[test]
  fn materialize_then_dematerialize_is_identity() {
    let seen = MutArc::own(Vec::new());
    let completed = MutArc::own(false);

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    observable::from_iter(vec![1, 2, 3])
      .materialize()
      .dematerialize()
      .subscribe_all(
        move |v| c_seen.rc_deref_mut().push(v),
        |_| {},
        move || *c_completed.rc_deref_mut() = true,
      );

    assert_eq!(*seen.rc_deref(), vec![1, 2, 3]);
    assert!(*completed.rc_deref());
  }

  #[test]
  fn dematerializing_an_error_notification_errors() {
    let errors = MutArc::own(Vec::new());

    let c_errors = errors.clone();
    observable::from_iter(vec![
      Notification::Next(1),
      Notification::Error(StreamError::message("wrapped")),
    ])
    .dematerialize()
    .subscribe_err(|_| {}, move |e| c_errors.rc_deref_mut().push(e.to_string()));

    assert_eq!(*errors.rc_deref(), vec!["wrapped".to_string()]);
  }
}
