use std::{mem, time::Duration};

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
  subscription::CompositeSubscription,
};

/// Collects values into chunks, flushed by whichever bound trips first:
/// the time `window` (when set) or the `max` count (when set). A time
/// flush emits the chunk even when it is empty; the final flush at
/// completion only emits a non-empty remainder.
#[derive(Clone)]
pub struct BufferOp<S, SD> {
  pub(crate) source: S,
  pub(crate) window: Option<Duration>,
  pub(crate) max: Option<usize>,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for BufferOp<S, SD>
where
  S: Observable,
  S::Item: Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = Vec<S::Item>;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Vec<S::Item>> + Send + 'static,
  {
    let BufferOp { source, window, max, scheduler } = self;
    let observer = MutArc::own(Some(observer));
    let chunk: MutArc<Vec<S::Item>> = MutArc::own(Vec::new());

    let subscription = CompositeSubscription::new();

    if let Some(window) = window {
      let mut tick_observer = observer.clone();
      let tick_chunk = chunk.clone();
      let ticker: TaskHandle = scheduler.schedule(
        Task::new(move || {
          if tick_observer.is_closed() {
            return TaskState::Finished;
          }
          let flushed = mem::take(&mut *tick_chunk.rc_deref_mut());
          tick_observer.next(flushed);
          TaskState::Sleeping(window)
        }),
        Some(window),
      );
      subscription.add(ticker);
    }

    subscription.add(source.actual_subscribe(BufferObserver { observer, chunk, max }));
    subscription
  }
}

pub struct BufferObserver<O, Item> {
  observer: MutArc<Option<O>>,
  chunk: MutArc<Vec<Item>>,
  max: Option<usize>,
}

impl<O, Item> Observer for BufferObserver<O, Item>
where
  O: Observer<Item = Vec<Item>>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let full = {
      let mut chunk = self.chunk.rc_deref_mut();
      chunk.push(value);
      self.max.is_some_and(|max| chunk.len() >= max)
    };
    if full {
      let flushed = mem::take(&mut *self.chunk.rc_deref_mut());
      self.observer.next(flushed);
    }
  }

  fn error(&mut self, err: StreamError) {
    self.chunk.rc_deref_mut().clear();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    let flushed = mem::take(&mut *self.chunk.rc_deref_mut());
    if !flushed.is_empty() {
      self.observer.next(flushed);
    }
    self.observer.complete();
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{observable, observable::ObservableExt, scheduler::TestScheduler, subject::Subject};

  #[test]
  fn count_buffers_flush_at_the_threshold() {
    let seen = MutArc::own(Vec::new());
    let c_seen = seen.clone();
    observable::from_iter(1..=7)
      .buffer_count(3)
      .subscribe(move |chunk| c_seen.rc_deref_mut().push(chunk));

    assert_eq!(
      *seen.rc_deref(),
      vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]
    );
  }

  #[test]
  fn time_buffers_flush_each_window() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    input
      .clone()
      .buffer_time_with(Duration::from_millis(10), TestScheduler)
      .subscribe(move |chunk| c_seen.rc_deref_mut().push(chunk));

    input.next(1);
    input.next(2);
    TestScheduler::advance_by(Duration::from_millis(10));
    input.next(3);
    TestScheduler::advance_by(Duration::from_millis(10));

    assert_eq!(*seen.rc_deref(), vec![vec![1, 2], vec![3]]);
  }

  #[test]
  fn either_bound_can_trip_first() {
    TestScheduler::init();
    let mut input = Subject::new();
    let seen = MutArc::own(Vec::new());

    let c_seen = seen.clone();
    input
      .clone()
      .buffer_time_count_with(Duration::from_millis(10), 2, TestScheduler)
      .subscribe(move |chunk| c_seen.rc_deref_mut().push(chunk));

    // Count trips before the window.
    input.next(1);
    input.next(2);
    assert_eq!(*seen.rc_deref(), vec![vec![1, 2]]);

    // Window trips with a single value held.
    input.next(3);
    TestScheduler::advance_by(Duration::from_millis(10));
    assert_eq!(*seen.rc_deref(), vec![vec![1, 2], vec![3]]);
  }
}
