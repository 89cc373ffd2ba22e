use crate::{observable::Observable, observer::Observer};

/// Forwards values while the predicate holds; the first failure completes
/// the stream (the failing value is not emitted).
#[derive(Clone)]
pub struct TakeWhileOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for TakeWhileOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool + Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self.source.actual_subscribe(TakeWhileObserver {
      observer: Some(observer),
      predicate: self.predicate,
    })
  }
}

pub struct TakeWhileObserver<O, F> {
  observer: Option<O>,
  predicate: F,
}

impl<O, F, Item> Observer for TakeWhileObserver<O, F>
where
  O: Observer<Item = Item>,
  F: FnMut(&Item) -> bool,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    if let Some(observer) = self.observer.as_mut() {
      if (self.predicate)(&value) {
        observer.next(value);
      } else if let Some(mut observer) = self.observer.take() {
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
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.as_ref().map_or(true, |o| o.is_closed())
  }
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn stops_at_the_first_failure() {
    let seen = MutArc::own(Vec::new());
    let completed = MutArc::own(false);

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    observable::from_iter(vec![1, 2, 9, 3]).take_while(|v| *v < 5).subscribe_all(
      move |v| c_seen.rc_deref_mut().push(v),
      |_| {},
      move || *c_completed.rc_deref_mut() = true,
    );

    assert_eq!(*seen.rc_deref(), vec![1, 2]);
    assert!(*completed.rc_deref());
  }
}
