use std::{collections::VecDeque, sync::Arc, time::Duration};

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  scheduler::{Scheduler, ThreadPoolScheduler},
  subject::{Subject, SubjectSubscription},
};

/// A [`Subject`] that records what it relays.
///
/// Every value is stamped with the clock of the configured scheduler and
/// kept while it fits the buffer capacity and the time window. A new
/// subscriber first receives the still-eligible recorded values, then
/// attaches live; after termination it receives the eligible values
/// followed by the terminal event.
pub struct ReplaySubject<Item> {
  subject: Subject<Item>,
  buffer: crate::rc::MutArc<ReplayBuffer<Item>>,
  clock: Arc<dyn Scheduler>,
}

struct ReplayBuffer<Item> {
  recorded: VecDeque<(Duration, Item)>,
  capacity: Option<usize>,
  window: Option<Duration>,
  terminal: Option<super::Terminal>,
}

impl<Item> ReplayBuffer<Item> {
  fn prune(&mut self, now: Duration) {
    if let Some(capacity) = self.capacity {
      while self.recorded.len() > capacity {
        self.recorded.pop_front();
      }
    }
    if let Some(window) = self.window {
      let horizon = now.saturating_sub(window);
      while self
        .recorded
        .front()
        .is_some_and(|(stamp, _)| *stamp < horizon)
      {
        self.recorded.pop_front();
      }
    }
  }
}

impl<Item> Clone for ReplaySubject<Item> {
  fn clone(&self) -> Self {
    ReplaySubject {
      subject: self.subject.clone(),
      buffer: self.buffer.clone(),
      clock: self.clock.clone(),
    }
  }
}

impl<Item> ReplaySubject<Item> {
  /// Record every value, without bound.
  pub fn unbounded() -> Self {
    Self::bounded(None, None, Arc::new(ThreadPoolScheduler::default()))
  }

  /// Keep at most the latest `capacity` values.
  pub fn with_buffer(capacity: usize) -> Self {
    Self::bounded(Some(capacity), None, Arc::new(ThreadPoolScheduler::default()))
  }

  /// Keep only values younger than `window`.
  pub fn with_window(window: Duration) -> Self {
    Self::bounded(None, Some(window), Arc::new(ThreadPoolScheduler::default()))
  }

  /// Combine a capacity bound and a time window.
  pub fn with_buffer_and_window(capacity: usize, window: Duration) -> Self {
    Self::bounded(Some(capacity), Some(window), Arc::new(ThreadPoolScheduler::default()))
  }

  /// Like [`with_window`](Self::with_window), but stamping values against
  /// `scheduler`'s clock, the way tests pair it with virtual time.
  pub fn with_window_on(window: Duration, scheduler: impl Scheduler) -> Self {
    Self::bounded(None, Some(window), Arc::new(scheduler))
  }

  fn bounded(
    capacity: Option<usize>, window: Option<Duration>, clock: Arc<dyn Scheduler>,
  ) -> Self {
    ReplaySubject {
      subject: Subject::new(),
      buffer: crate::rc::MutArc::own(ReplayBuffer {
        recorded: VecDeque::new(),
        capacity,
        window,
        terminal: None,
      }),
      clock,
    }
  }

  /// Number of live (non-replay) subscribers.
  pub fn subscriber_count(&self) -> usize {
    self.subject.subscriber_count()
  }
}

impl<Item: Clone> Observer for ReplaySubject<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    {
      let mut buffer = self.buffer.rc_deref_mut();
      if buffer.terminal.is_some() {
        tracing::trace!("ignoring input into a terminated replay subject");
        return;
      }
      let now = self.clock.now();
      buffer.recorded.push_back((now, value.clone()));
      buffer.prune(now);
    }
    self.subject.next(value);
  }

  fn error(&mut self, err: StreamError) {
    {
      let mut buffer = self.buffer.rc_deref_mut();
      if buffer.terminal.is_some() {
        return;
      }
      buffer.terminal = Some(super::Terminal::Failed(err.clone()));
    }
    self.subject.error(err);
  }

  fn complete(&mut self) {
    {
      let mut buffer = self.buffer.rc_deref_mut();
      if buffer.terminal.is_some() {
        return;
      }
      buffer.terminal = Some(super::Terminal::Completed);
    }
    self.subject.complete();
  }

  fn is_closed(&self) -> bool {
    self.buffer.rc_deref().terminal.is_some()
  }
}

impl<Item: Clone + Send + 'static> Observable for ReplaySubject<Item> {
  type Item = Item;
  type Unsub = SubjectSubscription<Item>;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    // Replay the eligible history before going live. Values pushed while
    // replaying land in the live subject, which the observer joins next.
    let (eligible, terminal) = {
      let mut buffer = self.buffer.rc_deref_mut();
      let now = self.clock.now();
      buffer.prune(now);
      (
        buffer.recorded.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>(),
        buffer.terminal.clone(),
      )
    };
    for value in eligible {
      observer.next(value);
    }
    match terminal {
      None => self.subject.actual_subscribe(observer),
      Some(terminal) => {
        match terminal {
          super::Terminal::Completed => observer.complete(),
          super::Terminal::Failed(err) => observer.error(err),
        }
        // The subject is terminated; attaching just hands back a closed
        // membership handle.
        self.subject.actual_subscribe(NoopObserver(std::marker::PhantomData))
      }
    }
  }
}

struct NoopObserver<Item>(std::marker::PhantomData<fn(Item)>);

impl<Item> Observer for NoopObserver<Item> {
  type Item = Item;

  fn next(&mut self, _value: Item) {}
  fn error(&mut self, _err: StreamError) {}
  fn complete(&mut self) {}
  fn is_closed(&self) -> bool {
    true
  }
}
