use std::collections::VecDeque;

use crate::{
  error::StreamError,
  notification::Notification,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, Task, TaskState},
  subscription::{CompositeSubscription, Subscription},
};

/// Re-delivers every event through a scheduler, moving consumption off the
/// producing thread. Events queue in arrival order and one drain task at a
/// time empties the queue, so FIFO order survives the hop even on a pool.
#[derive(Clone)]
pub struct ObserveOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for ObserveOnOp<S, SD>
where
  S: Observable,
  S::Item: Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = S::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    let state = MutArc::own(ObserveOnState {
      observer: Some(observer),
      queue: VecDeque::new(),
      draining: false,
      stopped: false,
    });

    let subscription = CompositeSubscription::new();
    subscription.add(self.source.actual_subscribe(ObserveOnObserver {
      state: state.clone(),
      scheduler: self.scheduler,
    }));
    subscription.add(StopDelivery { state });
    subscription
  }
}

struct ObserveOnState<O, Item> {
  observer: Option<O>,
  queue: VecDeque<Notification<Item>>,
  draining: bool,
  stopped: bool,
}

/// Unsubscribing stops delivery even for events already queued.
struct StopDelivery<O, Item> {
  state: MutArc<ObserveOnState<O, Item>>,
}

impl<O: Send, Item: Send> Subscription for StopDelivery<O, Item> {
  fn unsubscribe(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.stopped = true;
    state.queue.clear();
    state.observer.take();
  }

  fn is_closed(&self) -> bool {
    self.state.rc_deref().stopped
  }
}

pub struct ObserveOnObserver<O, SD, Item> {
  state: MutArc<ObserveOnState<O, Item>>,
  scheduler: SD,
}

impl<O, SD, Item> ObserveOnObserver<O, SD, Item>
where
  O: Observer<Item = Item> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler + Clone,
{
  fn enqueue(&mut self, event: Notification<Item>) {
    let start_drain = {
      let mut state = self.state.rc_deref_mut();
      if state.stopped || state.observer.is_none() {
        return;
      }
      state.queue.push_back(event);
      if state.draining {
        false
      } else {
        state.draining = true;
        true
      }
    };
    if !start_drain {
      return;
    }

    let state = self.state.clone();
    self.scheduler.schedule(
      Task::new(move || {
        let mut state = state.rc_deref_mut();
        loop {
          let Some(event) = state.queue.pop_front() else {
            state.draining = false;
            return TaskState::Finished;
          };
          match event {
            Notification::Next(value) => {
              if let Some(observer) = state.observer.as_mut() {
                observer.next(value);
              }
            }
            Notification::Complete => {
              if let Some(mut observer) = state.observer.take() {
                observer.complete();
              }
            }
            Notification::Error(err) => {
              if let Some(mut observer) = state.observer.take() {
                observer.error(err);
              }
            }
          }
        }
      }),
      None,
    );
  }
}

impl<O, SD, Item> Observer for ObserveOnObserver<O, SD, Item>
where
  O: Observer<Item = Item> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.enqueue(Notification::Next(value));
  }

  fn error(&mut self, err: StreamError) {
    self.enqueue(Notification::Error(err));
  }

  fn complete(&mut self) {
    self.enqueue(Notification::Complete);
  }

  fn is_closed(&self) -> bool {
    let state = self.state.rc_deref();
    state.stopped || state.observer.is_none()
  }
}
