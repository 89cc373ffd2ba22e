use crate::{complete_proxy_impl, error_proxy_impl, is_closed_proxy_impl};
use crate::{observable::Observable, observer::Observer};

/// Swallows every value, forwarding only the terminal event.
#[derive(Clone)]
pub struct IgnoreElementsOp<S> {
  pub(crate) source: S,
}

impl<S: Observable> Observable for IgnoreElementsOp<S> {
  type Item = S::Item;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(IgnoreElementsObserver { observer })
  }
}

pub struct IgnoreElementsObserver<O> {
  observer: O,
}

impl<O, Item> Observer for IgnoreElementsObserver<O>
where
  O: Observer<Item = Item>,
{
  type Item = Item;

  fn next(&mut self, _value: Item) {}

  error_proxy_impl!(observer);
  complete_proxy_impl!(observer);
  is_closed_proxy_impl!(observer);
}

#[cfg(test)]
mod tests {
  use crate::{observable, observable::ObservableExt, rc::MutArc};

  #[test]
  fn only_the_terminal_survives() {
    let hits = MutArc::own(0);
    let completed = MutArc::own(false);

    let c_hits = hits.clone();
    let c_completed = completed.clone();
    observable::from_iter(1..=10).ignore_elements().subscribe_all(
      move |_| *c_hits.rc_deref_mut() += 1,
      |_| {},
      move || *c_completed.rc_deref_mut() = true,
    );

    assert_eq!(*hits.rc_deref(), 0);
    assert!(*completed.rc_deref());
  }
}
