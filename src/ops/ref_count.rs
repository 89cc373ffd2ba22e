use std::sync::{Arc, Mutex};

use crate::{
  observable::{ConnectableObservable, Observable},
  observer::Observer,
  subscription::Subscription,
};

/// Makes a connectable observable automatic: the first downstream
/// subscriber connects it, the last one disconnecting tears the source
/// down. Clones share one counter.
pub struct RefCountOp<S, Sub> {
  connectable: ConnectableObservable<S, Sub>,
  subscribers: Arc<Mutex<usize>>,
}

impl<S: Clone, Sub: Clone> Clone for RefCountOp<S, Sub> {
  fn clone(&self) -> Self {
    RefCountOp {
      connectable: self.connectable.clone(),
      subscribers: self.subscribers.clone(),
    }
  }
}

impl<S, Sub> RefCountOp<S, Sub> {
  pub(crate) fn new(connectable: ConnectableObservable<S, Sub>) -> Self {
    RefCountOp { connectable, subscribers: Arc::new(Mutex::new(0)) }
  }
}

impl<S, Sub> Observable for RefCountOp<S, Sub>
where
  S: Observable + Clone + Send + 'static,
  Sub: Observable + Observer<Item = S::Item> + Clone + Send + 'static,
{
  type Item = <Sub as Observable>::Item;
  type Unsub = RefCountGuard<S, Sub>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item> + Send + 'static,
  {
    // Attach the subscriber before igniting the source, so the first
    // subscriber observes the very first value the source produces.
    let inner = self.connectable.fork().actual_subscribe(observer);
    {
      let mut count = lock(&self.subscribers);
      *count += 1;
      if *count == 1 {
        self.connectable.connect();
      }
    }
    RefCountGuard {
      inner: Some(inner),
      connectable: self.connectable,
      subscribers: self.subscribers,
    }
  }
}

/// Unsubscribing releases one share of the connection; the last release
/// disconnects the source.
pub struct RefCountGuard<S, Sub>
where
  Sub: Observable,
{
  inner: Option<<Sub as Observable>::Unsub>,
  connectable: ConnectableObservable<S, Sub>,
  subscribers: Arc<Mutex<usize>>,
}

impl<S, Sub> Subscription for RefCountGuard<S, Sub>
where
  S: Send + 'static,
  Sub: Observable + Send + 'static,
{
  fn unsubscribe(&mut self) {
    if let Some(mut inner) = self.inner.take() {
      inner.unsubscribe();
      let mut count = lock(&self.subscribers);
      *count = count.saturating_sub(1);
      if *count == 0 {
        self.connectable.disconnect();
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.inner.as_ref().map_or(true, |i| i.is_closed())
  }
}

fn lock(count: &Arc<Mutex<usize>>) -> std::sync::MutexGuard<'_, usize> {
  count.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
  use crate::{
    observable::ObservableExt, observer::Observer, rc::MutArc, subject::Subject,
    subscription::Subscription,
  };

  #[test]
  fn first_subscriber_connects_last_disconnects() {
    let mut producer = Subject::new();
    let auto = producer.clone().publish().ref_count();

    let first = MutArc::own(Vec::new());
    let second = MutArc::own(Vec::new());

    let c_first = first.clone();
    let mut sub_first = auto
      .clone()
      .subscribe(move |v| c_first.rc_deref_mut().push(v));
    assert_eq!(producer.subscriber_count(), 1);

    let c_second = second.clone();
    let mut sub_second = auto
      .clone()
      .subscribe(move |v| c_second.rc_deref_mut().push(v));

    producer.next(1);
    assert_eq!(*first.rc_deref(), vec![1]);
    assert_eq!(*second.rc_deref(), vec![1]);

    sub_first.unsubscribe();
    producer.next(2);
    assert_eq!(*first.rc_deref(), vec![1]);
    assert_eq!(*second.rc_deref(), vec![1, 2]);

    sub_second.unsubscribe();
    assert_eq!(producer.subscriber_count(), 0);
  }
}
