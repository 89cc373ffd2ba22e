use crate::{error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Remembers the latest value and emits it at completion. An empty source
/// just completes.
#[derive(Clone)]
pub struct LastOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for LastOp<S>
where
  S: Observable,
  S::Item: Send + 'static,
{
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(LastObserver { observer, latest: None })
  }
}

pub struct LastObserver<O, Item> {
  observer: O,
  latest: Option<Item>,
}

impl<O, Item> Observer for LastObserver<O, Item>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.latest = Some(value);
  }

  fn complete(&mut self) {
    if let Some(latest) = self.latest.take() {
      self.observer.next(latest);
    }
    self.observer.complete();
  }

  error_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn emits_the_final_value_at_completion() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(vec![7, 8, 9])
      .last()
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![9]);
  }

  #[test]
  fn empty_sources_complete_silently() {
    let completed = MutArc::own(false);
    let c_completed = completed.clone();
    observable::empty::<i32>()
      .last()
      .subscribe_all(|_| {}, |_| {}, move || *c_completed.rc_deref_mut() = true);
    assert!(*completed.rc_deref());
  }
}
