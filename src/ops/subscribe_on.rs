use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::{Scheduler, Task},
  subscription::{CompositeSubscription, SerialSubscription},
};

/// Runs the subscription itself, source setup included, as a work unit
/// on the scheduler, so a blocking `actual_subscribe` never stalls the
/// caller's thread.
#[derive(Clone)]
pub struct SubscribeOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for SubscribeOnOp<S, SD>
where
  S: Observable + Send + 'static,
  SD: Scheduler + Clone,
{
  type Item = S::Item;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = S::Item> + Send + 'static,
  {
    let SubscribeOnOp { source, scheduler } = self;
    let serial = SerialSubscription::new();
    let subscription = CompositeSubscription::new();
    subscription.add(serial.clone());

    let task_serial = serial.clone();
    let handle = scheduler.schedule(
      Task::once(move || {
        // An already-disposed serial swallows the fresh subscription,
        // cancelling before the source ever started.
        task_serial.set(source.actual_subscribe(observer));
      }),
      None,
    );
    subscription.add(handle);
    subscription
  }
}
