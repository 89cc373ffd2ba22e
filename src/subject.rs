//! Multicast hubs.
//!
//! A [`Subject`] is an observer and an observable at once: values pushed
//! into it fan out to every current subscriber. Cloning a subject clones
//! the handle, not the hub: all clones share one subscriber list, which is
//! what lets one clone act as the producer while others are handed out for
//! subscription.
//!
//! Dispatch iterates a snapshot of the subscriber list taken under the
//! list lock, then delivers outside it: subscribers added mid-dispatch see
//! only subsequent events, and a subscriber removed mid-dispatch has its
//! slot emptied and is skipped (an event already in flight to it may still
//! land; both outcomes satisfy the cancellation contract). Each
//! subscriber sits behind its own slot lock, which serializes deliveries
//! from concurrent producers.
//!
//! Re-entrant emission (calling `next` on a subject from inside one of
//! that subject's own callbacks) is not supported; route feedback loops
//! through an async boundary (e.g. `delay(Duration::ZERO)`) instead.

mod replay;

pub use replay::ReplaySubject;

use std::sync::{Arc, Mutex};

use crate::{
  error::StreamError,
  observable::Observable,
  observer::{BoxObserver, Observer},
  subscription::Subscription,
};

pub(crate) type ObserverSlot<Item> = Arc<Mutex<Option<BoxObserver<Item>>>>;

#[derive(Debug, Clone)]
pub(crate) enum Terminal {
  Completed,
  Failed(StreamError),
}

pub(crate) struct SubjectState<Item> {
  entries: Vec<Entry<Item>>,
  terminal: Option<Terminal>,
  next_id: usize,
}

struct Entry<Item> {
  id: usize,
  slot: ObserverSlot<Item>,
}

impl<Item> Default for SubjectState<Item> {
  fn default() -> Self {
    SubjectState { entries: Vec::new(), terminal: None, next_id: 0 }
  }
}

impl<Item> SubjectState<Item> {
  fn snapshot(&self) -> Vec<ObserverSlot<Item>> {
    self.entries.iter().map(|e| e.slot.clone()).collect()
  }
}

/// A hot, multicast hub: push values in with [`Observer`] methods, attach
/// consumers by subscribing.
pub struct Subject<Item> {
  state: Arc<Mutex<SubjectState<Item>>>,
}

impl<Item> Clone for Subject<Item> {
  fn clone(&self) -> Self {
    Subject { state: self.state.clone() }
  }
}

impl<Item> Default for Subject<Item> {
  fn default() -> Self {
    Subject::new()
  }
}

impl<Item> Subject<Item> {
  pub fn new() -> Self {
    Subject { state: Arc::new(Mutex::new(SubjectState::default())) }
  }

  /// Number of current subscribers.
  pub fn subscriber_count(&self) -> usize {
    lock(&self.state).entries.len()
  }

  /// Whether a terminal event has been dispatched.
  pub fn is_terminated(&self) -> bool {
    lock(&self.state).terminal.is_some()
  }

  fn attach(&self, observer: BoxObserver<Item>) -> SubjectSubscription<Item> {
    let mut state = lock(&self.state);
    if let Some(terminal) = state.terminal.clone() {
      drop(state);
      let mut observer = observer;
      match terminal {
        Terminal::Completed => observer.complete(),
        Terminal::Failed(err) => observer.error(err),
      }
      return SubjectSubscription { id: usize::MAX, state: self.state.clone() };
    }
    let id = state.next_id;
    state.next_id += 1;
    state
      .entries
      .push(Entry { id, slot: Arc::new(Mutex::new(Some(observer))) });
    SubjectSubscription { id, state: self.state.clone() }
  }

  fn terminate(&mut self, terminal: Terminal) {
    let slots = {
      let mut state = lock(&self.state);
      if state.terminal.is_some() {
        tracing::trace!("ignoring input into a terminated subject");
        return;
      }
      state.terminal = Some(terminal.clone());
      let slots = state.snapshot();
      state.entries.clear();
      slots
    };
    for slot in slots {
      let taken = lock_slot(&slot).take();
      if let Some(mut observer) = taken {
        match &terminal {
          Terminal::Completed => observer.complete(),
          Terminal::Failed(err) => observer.error(err.clone()),
        }
      }
    }
  }
}

impl<Item: Clone> Observer for Subject<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    let slots = {
      let state = lock(&self.state);
      if state.terminal.is_some() {
        tracing::trace!("ignoring input into a terminated subject");
        return;
      }
      state.snapshot()
    };
    // Clone for every slot but the last; the final one takes the value.
    let mut slots = slots.into_iter().peekable();
    while let Some(slot) = slots.next() {
      let mut guard = lock_slot(&slot);
      if let Some(observer) = guard.as_mut() {
        if slots.peek().is_some() {
          observer.next(value.clone());
        } else {
          observer.next(value);
          break;
        }
      }
    }
  }

  fn error(&mut self, err: StreamError) {
    self.terminate(Terminal::Failed(err));
  }

  fn complete(&mut self) {
    self.terminate(Terminal::Completed);
  }

  fn is_closed(&self) -> bool {
    lock(&self.state).terminal.is_some()
  }
}

impl<Item: 'static> Observable for Subject<Item> {
  type Item = Item;
  type Unsub = SubjectSubscription<Item>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    self.attach(Box::new(observer))
  }
}

/// Membership handle of one subject subscriber.
pub struct SubjectSubscription<Item> {
  id: usize,
  state: Arc<Mutex<SubjectState<Item>>>,
}

impl<Item> Subscription for SubjectSubscription<Item> {
  fn unsubscribe(&mut self) {
    let slot = {
      let mut state = lock(&self.state);
      match state.entries.iter().position(|e| e.id == self.id) {
        Some(index) => Some(state.entries.remove(index).slot),
        None => None,
      }
    };
    // Empty the slot so an in-flight dispatch skips this observer; if the
    // slot is busy delivering right now, the entry removal above already
    // excludes it from any later snapshot.
    if let Some(slot) = slot {
      if let Ok(mut guard) = slot.try_lock() {
        guard.take();
      }
    }
  }

  fn is_closed(&self) -> bool {
    !lock(&self.state).entries.iter().any(|e| e.id == self.id)
  }
}

fn lock<Item>(
  state: &Arc<Mutex<SubjectState<Item>>>,
) -> std::sync::MutexGuard<'_, SubjectState<Item>> {
  state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock_slot<Item>(
  slot: &ObserverSlot<Item>,
) -> std::sync::MutexGuard<'_, Option<BoxObserver<Item>>> {
  slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{observable::ObservableExt, rc::MutArc};

  #[test]
  fn broadcasts_to_every_subscriber() {
    let mut subject = Subject::new();
    let first = MutArc::own(Vec::new());
    let second = MutArc::own(Vec::new());

    let c_first = first.clone();
    subject
      .clone()
      .subscribe(move |v| c_first.rc_deref_mut().push(v));

    subject.next(1);

    let c_second = second.clone();
    subject
      .clone()
      .subscribe(move |v| c_second.rc_deref_mut().push(v));

    subject.next(2);

    assert_eq!(*first.rc_deref(), vec![1, 2]);
    assert_eq!(*second.rc_deref(), vec![2]);
  }

  #[test]
  fn unsubscribed_observers_stop_receiving() {
    let mut subject = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    let mut sub = subject
      .clone()
      .subscribe(move |v| c_seen.rc_deref_mut().push(v));

    subject.next(1);
    sub.unsubscribe();
    subject.next(2);

    assert_eq!(*seen.rc_deref(), vec![1]);
    assert!(sub.is_closed());
  }

  #[test]
  fn terminal_is_sticky_and_late_subscribers_get_it() {
    let mut subject = Subject::new();
    let seen = MutArc::own(Vec::new());
    let completions = MutArc::own(0);

    let c_seen = seen.clone();
    let c_completions = completions.clone();
    subject.clone().subscribe_all(
      move |v| c_seen.rc_deref_mut().push(v),
      |_| {},
      move || *c_completions.rc_deref_mut() += 1,
    );

    subject.next(1);
    subject.complete();
    subject.next(2);
    subject.complete();

    assert_eq!(*seen.rc_deref(), vec![1]);
    assert_eq!(*completions.rc_deref(), 1);

    let late_completions = completions.clone();
    subject
      .clone()
      .subscribe_all(|_: i32| {}, |_| {}, move || {
        *late_completions.rc_deref_mut() += 1
      });
    assert_eq!(*completions.rc_deref(), 2);
  }

  #[test]
  fn error_reaches_all_then_terminates() {
    let mut subject = Subject::<i32>::new();
    let errors = MutArc::own(Vec::new());

    for _ in 0..2 {
      let c_errors = errors.clone();
      subject
        .clone()
        .subscribe_err(|_| {}, move |e| c_errors.rc_deref_mut().push(e.to_string()));
    }

    subject.error(StreamError::message("bust"));
    assert_eq!(errors.rc_deref().len(), 2);
    assert!(subject.is_terminated());
    assert_eq!(subject.subscriber_count(), 0);
  }

  #[test]
  fn subscribing_during_dispatch_misses_the_inflight_event() {
    let mut subject = Subject::new();
    let late_seen = MutArc::own(Vec::new());

    let c_subject = subject.clone();
    let c_late_seen = late_seen.clone();
    subject.clone().subscribe(move |v: i32| {
      if v == 1 {
        let inner_seen = c_late_seen.clone();
        c_subject
          .clone()
          .subscribe(move |v| inner_seen.rc_deref_mut().push(v));
      }
    });

    subject.next(1);
    assert!(late_seen.rc_deref().is_empty());

    subject.next(2);
    assert_eq!(*late_seen.rc_deref(), vec![2]);
  }
}
