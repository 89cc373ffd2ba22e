//! Type erasure for observables.

use crate::{
  observable::Observable,
  observer::{BoxObserver, Observer},
  subscription::BoxSubscription,
};

/// An observable with its concrete operator type erased, the form returned
/// across API boundaries that cannot name a whole operator chain.
///
/// Built with [`box_it`](crate::observable::ObservableExt::box_it). Boxed
/// observables subscribe once; re-subscription needs the unerased value.
pub struct BoxObservable<Item> {
  subscribe_fn: Box<dyn FnOnce(BoxObserver<Item>) -> BoxSubscription + Send>,
}

impl<Item: 'static> BoxObservable<Item> {
  pub(crate) fn new<S>(source: S) -> Self
  where
    S: Observable<Item = Item> + Send + 'static,
  {
    BoxObservable {
      subscribe_fn: Box::new(move |observer| Box::new(source.actual_subscribe(observer))),
    }
  }
}

impl<Item: 'static> Observable for BoxObservable<Item> {
  type Item = Item;
  type Unsub = BoxSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    (self.subscribe_fn)(Box::new(observer))
  }
}
