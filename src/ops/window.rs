use std::time::Duration;

use crate::{
  error::StreamError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
  subject::Subject,
  subscription::CompositeSubscription,
};

/// Splits the stream into consecutive time windows, each exposed
/// downstream as its own inner observable (a subject living for `window`
/// time). The first window opens at subscribe; values route into the
/// window current at their arrival.
#[derive(Clone)]
pub struct WindowOp<S, SD> {
  pub(crate) source: S,
  pub(crate) window: Duration,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for WindowOp<S, SD>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = Subject<S::Item>;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Subject<S::Item>> + Send + 'static,
  {
    let WindowOp { source, window, scheduler } = self;
    let mut observer = MutArc::own(Some(observer));
    let current: MutArc<Subject<S::Item>> = MutArc::own(Subject::new());

    // Open the first window right away.
    observer.next(current.rc_deref().clone());

    let mut rotate_observer = observer.clone();
    let rotate_current = current.clone();
    let rotator: TaskHandle = scheduler.schedule(
      Task::new(move || {
        if rotate_observer.is_closed() {
          return TaskState::Finished;
        }
        let fresh = Subject::new();
        let mut stale = {
          let mut current = rotate_current.rc_deref_mut();
          std::mem::replace(&mut *current, fresh.clone())
        };
        stale.complete();
        rotate_observer.next(fresh);
        TaskState::Sleeping(window)
      }),
      Some(window),
    );

    let subscription = CompositeSubscription::new();
    subscription.add(rotator);
    subscription.add(source.actual_subscribe(WindowObserver { observer, current }));
    subscription
  }
}

pub struct WindowObserver<O, Item> {
  observer: MutArc<Option<O>>,
  current: MutArc<Subject<Item>>,
}

impl<O, Item> Observer for WindowObserver<O, Item>
where
  O: Observer<Item = Subject<Item>>,
  Item: Clone,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    let mut window = self.current.rc_deref().clone();
    window.next(value);
  }

  fn error(&mut self, err: StreamError) {
    let mut window = self.current.rc_deref().clone();
    window.error(err.clone());
    self.observer.error(err);
  }

  fn complete(&mut self) {
    let mut window = self.current.rc_deref().clone();
    window.complete();
    self.observer.complete();
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{observable::ObservableExt, scheduler::TestScheduler};

  #[test]
  fn values_land_in_the_window_open_at_arrival() {
    TestScheduler::init();
    let mut input = Subject::new();
    let windows = MutArc::own(Vec::new());

    let c_windows = windows.clone();
    input
      .clone()
      .window_with(Duration::from_millis(10), TestScheduler)
      .subscribe(move |window| {
        let sink = MutArc::own(Vec::new());
        let c_sink = sink.clone();
        window.subscribe(move |v| c_sink.rc_deref_mut().push(v));
        c_windows.rc_deref_mut().push(sink);
      });

    input.next(1);
    input.next(2);
    TestScheduler::advance_by(Duration::from_millis(10));
    input.next(3);
    input.complete();

    let windows = windows.rc_deref();
    assert_eq!(windows.len(), 2);
    assert_eq!(*windows[0].rc_deref(), vec![1, 2]);
    assert_eq!(*windows[1].rc_deref(), vec![3]);
  }
}
