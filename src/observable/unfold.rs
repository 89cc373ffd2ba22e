//! State-machine sources.

use crate::{observable::Observable, observer::Observer, subscription::SingleSubscription};

/// Creates an observable by unfolding `seed`: while `condition(&state)`
/// holds, emit `select(&state)` and advance with `state = iterate(state)`.
/// The seed itself is tested before the first emission.
///
/// ```
/// use brook::prelude::*;
///
/// // Powers of two below 100.
/// let powers = observable::unfold(1u32, |s| *s < 100, |s| s * 2, |s| *s)
///   .reduce(Vec::new(), |mut acc, v| {
///     acc.push(v);
///     acc
///   })
///   .wait()
///   .unwrap();
/// assert_eq!(powers, Some(vec![1, 2, 4, 8, 16, 32, 64]));
/// ```
pub fn unfold<State, Item, C, I, S>(
  seed: State, condition: C, iterate: I, select: S,
) -> Unfold<State, C, I, S>
where
  C: FnMut(&State) -> bool,
  I: FnMut(State) -> State,
  S: FnMut(&State) -> Item,
{
  Unfold { seed, condition, iterate, select }
}

#[derive(Clone)]
pub struct Unfold<State, C, I, S> {
  pub(crate) seed: State,
  pub(crate) condition: C,
  pub(crate) iterate: I,
  pub(crate) select: S,
}

impl<State, Item, C, I, S> Observable for Unfold<State, C, I, S>
where
  C: FnMut(&State) -> bool,
  I: FnMut(State) -> State,
  S: FnMut(&State) -> Item,
{
  type Item = Item;
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    let Unfold { mut seed, mut condition, mut iterate, mut select } = self;
    while condition(&seed) {
      if observer.is_closed() {
        return SingleSubscription::closed();
      }
      observer.next(select(&seed));
      seed = iterate(seed);
    }
    observer.complete();
    SingleSubscription::closed()
  }
}
