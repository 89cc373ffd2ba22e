//! The producer side of a stream, and the operator surface.
//!
//! An [`Observable`] is a lazy specification of a stream: nothing runs
//! until [`actual_subscribe`](Observable::actual_subscribe) installs an
//! observer, and every subscription gets its own independent run (unless
//! multicast through a subject). The returned [`Subscription`] unwinds the
//! computation when disposed.
//!
//! [`ObservableExt`] carries the operator methods; it is implemented for
//! every observable. Operators are plain structs wrapping their source:
//! composition builds a value, subscription builds the machine.

pub mod boxed;
pub mod connectable_observable;
pub mod create;
pub mod defer;
pub mod from_iter;
pub mod interval;
pub mod range;
pub mod repeat;
pub mod start;
pub mod timer;
pub mod trivial;
pub mod unfold;

pub use boxed::BoxObservable;
pub use connectable_observable::ConnectableObservable;
pub use create::{create, Subscriber};
pub use defer::{defer, Defer};
pub use from_iter::{from_iter, from_iter_with, FromIter, FromIterWith};
pub use interval::{interval, interval_at, interval_at_with, interval_with, Interval};
pub use range::{range, range_step, Range};
pub use repeat::{repeat, Repeat};
pub use start::{start, start_with, Start};
pub use timer::{timer, timer_with, Timer};
pub use trivial::{empty, never, of, throw_err, Empty, Never, Of, ThrowErr};
pub use unfold::{unfold, Unfold};

use std::time::Duration;

use crate::{
  error::StreamError,
  notification::Notification,
  observer::{CallbackObserver, Observer, SafeObserver},
  ops::{
    blocking_iter::BlockingIter,
    buffer::BufferOp,
    catch_err::CatchErrOp,
    combine_latest::CombineLatestOp,
    concat::ConcatOp,
    contains::{AllOp, AnyOp, ContainsOp},
    count::CountOp,
    debounce::DebounceOp,
    default_if_empty::DefaultIfEmptyOp,
    delay::{DelayByOp, DelayOp},
    distinct::{DistinctOp, DistinctUntilChangedOp},
    element_at::ElementAtOp,
    filter::FilterOp,
    filter_map::FilterMapOp,
    first::FirstOp,
    group_by::GroupByOp,
    ignore_elements::IgnoreElementsOp,
    into_future::StreamFuture,
    last::LastOp,
    map::MapOp,
    map_to::MapToOp,
    materialize::{DematerializeOp, MaterializeOp},
    merge::MergeOp,
    merge_all::MergeAllOp,
    minmax::MinMaxOp,
    observe_on::ObserveOnOp,
    of_type::OfTypeOp,
    reduce::ReduceOp,
    retry::RetryOp,
    sample::SampleOp,
    scan::ScanOp,
    sequence_equal::SequenceEqualOp,
    skip::SkipOp,
    skip_last::SkipLastOp,
    skip_while::SkipWhileOp,
    start_with::{EndWithOp, StartWithOp},
    subscribe_on::SubscribeOnOp,
    sum::{AverageOp, SumOp},
    switch_on_next::SwitchOnNextOp,
    take::TakeOp,
    take_last::TakeLastOp,
    take_while::TakeWhileOp,
    timeout::TimeoutOp,
    timestamp::{TimeIntervalOp, TimestampOp},
    window::WindowOp,
    zip::ZipOp,
  },
  scheduler::ThreadPoolScheduler,
  subject::{ReplaySubject, Subject},
  subscription::Subscription,
};

/// A lazy, push-based stream of values.
pub trait Observable: Sized {
  /// The type of the elements being emitted.
  type Item;
  /// The handle returned by subscribing.
  type Unsub: Subscription + Send + 'static;

  /// Install `observer` and start the stream. The name leaves `subscribe`
  /// free for the callback-taking conveniences on [`ObservableExt`].
  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item> + Send + 'static;
}

/// Operator methods, available on every observable.
pub trait ObservableExt: Observable {
  // ==================== Subscribing ====================

  /// Subscribe with a `next` callback. An error reaching this sink is
  /// surfaced by panicking on the delivering thread; use
  /// [`subscribe_err`](Self::subscribe_err) when errors are expected.
  fn subscribe<N>(self, next: N) -> Self::Unsub
  where
    Self::Item: 'static,
    N: FnMut(Self::Item) + Send + 'static,
  {
    self.subscribe_all(next, crate::observer::unhandled_error, || {})
  }

  /// Subscribe with `next` and `error` callbacks.
  fn subscribe_err<N, E>(self, next: N, error: E) -> Self::Unsub
  where
    Self::Item: 'static,
    N: FnMut(Self::Item) + Send + 'static,
    E: FnMut(StreamError) + Send + 'static,
  {
    self.subscribe_all(next, error, || {})
  }

  /// Subscribe with the full callback triple.
  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Self::Unsub
  where
    Self::Item: 'static,
    N: FnMut(Self::Item) + Send + 'static,
    E: FnMut(StreamError) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_with(CallbackObserver::new(next, error, complete))
  }

  /// Subscribe with a prebuilt observer, wrapped in the protocol gate.
  fn subscribe_with<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item> + Send + 'static,
  {
    self.actual_subscribe(SafeObserver::new(observer))
  }

  /// Erase the concrete operator type.
  fn box_it(self) -> BoxObservable<Self::Item>
  where
    Self: Send + 'static,
    Self::Item: 'static,
  {
    BoxObservable::new(self)
  }

  // ==================== Transformation ====================

  /// Transform every value with `f`.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp { source: self, func: f }
  }

  /// Replace every value with a clone of `value`.
  fn map_to<B: Clone>(self, value: B) -> MapToOp<Self, B> {
    MapToOp { source: self, value }
  }

  /// Keep only the values satisfying `predicate`.
  fn filter<F>(self, predicate: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp { source: self, predicate }
  }

  /// Map and filter in one step.
  fn filter_map<B, F>(self, f: F) -> FilterMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Option<B>,
  {
    FilterMapOp { source: self, func: f }
  }

  /// Emit only values whose runtime type is `U`.
  fn of_type<U: 'static>(self) -> OfTypeOp<Self, U>
  where
    Self::Item: std::any::Any,
  {
    OfTypeOp::new(self)
  }

  // ==================== Slicing ====================

  /// Forward the first `count` values, then complete and drop upstream.
  fn take(self, count: usize) -> TakeOp<Self> {
    TakeOp { source: self, count }
  }

  /// Drop the first `count` values.
  fn skip(self, count: usize) -> SkipOp<Self> {
    SkipOp { source: self, count }
  }

  /// Forward values while `predicate` holds, then complete.
  fn take_while<F>(self, predicate: F) -> TakeWhileOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    TakeWhileOp { source: self, predicate }
  }

  /// Drop values while `predicate` holds, forward the rest.
  fn skip_while<F>(self, predicate: F) -> SkipWhileOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    SkipWhileOp { source: self, predicate }
  }

  /// Emit only the trailing `count` values, at completion.
  fn take_last(self, count: usize) -> TakeLastOp<Self> {
    TakeLastOp { source: self, count }
  }

  /// Emit everything but the trailing `count` values.
  fn skip_last(self, count: usize) -> SkipLastOp<Self> {
    SkipLastOp { source: self, count }
  }

  /// Emit only the first value (if any), then complete.
  fn first(self) -> FirstOp<Self> {
    FirstOp { source: self }
  }

  /// Emit only the final value (if any), at completion.
  fn last(self) -> LastOp<Self> {
    LastOp { source: self }
  }

  /// Emit the value at `index`, or error with
  /// [`StreamError::IndexOutOfRange`] if the stream ends first.
  fn element_at(self, index: usize) -> ElementAtOp<Self> {
    ElementAtOp { source: self, index }
  }

  /// Drop every value, keeping only the terminal event.
  fn ignore_elements(self) -> IgnoreElementsOp<Self> {
    IgnoreElementsOp { source: self }
  }

  /// Deduplicate values over the whole stream.
  fn distinct(self) -> DistinctOp<Self> {
    DistinctOp { source: self }
  }

  /// Forward a value only when it differs from its predecessor.
  fn distinct_until_changed(self) -> DistinctUntilChangedOp<Self> {
    DistinctUntilChangedOp { source: self }
  }

  // ==================== Aggregation ====================

  /// Fold the stream, emitting the final accumulator at completion.
  fn reduce<B, F>(self, seed: B, f: F) -> ReduceOp<Self, B, F>
  where
    F: FnMut(B, Self::Item) -> B,
  {
    ReduceOp { source: self, seed, func: f }
  }

  /// Fold the stream, emitting every intermediate accumulator.
  fn scan<B, F>(self, seed: B, f: F) -> ScanOp<Self, B, F>
  where
    B: Clone,
    F: FnMut(B, Self::Item) -> B,
  {
    ScanOp { source: self, seed, func: f }
  }

  /// Emit the number of values at completion.
  fn count(self) -> CountOp<Self> {
    CountOp { source: self }
  }

  /// Emit the smallest value at completion.
  fn min(self) -> MinMaxOp<Self> {
    MinMaxOp { source: self, prefer_greater: false }
  }

  /// Emit the greatest value at completion.
  fn max(self) -> MinMaxOp<Self> {
    MinMaxOp { source: self, prefer_greater: true }
  }

  /// Emit the sum of all values at completion.
  fn sum(self) -> SumOp<Self> {
    SumOp { source: self }
  }

  /// Emit the arithmetic mean of all values at completion (empty streams
  /// just complete).
  fn average(self) -> AverageOp<Self> {
    AverageOp { source: self }
  }

  /// Emit `true` as soon as any value satisfies `predicate`, else `false`
  /// at completion. Short-circuits upstream.
  fn any<F>(self, predicate: F) -> AnyOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    AnyOp { source: self, predicate }
  }

  /// Emit `false` as soon as any value violates `predicate`, else `true`
  /// at completion. Short-circuits upstream.
  fn all<F>(self, predicate: F) -> AllOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    AllOp { source: self, predicate }
  }

  /// Emit whether the stream contains `target`. Short-circuits upstream.
  fn contains(self, target: Self::Item) -> ContainsOp<Self>
  where
    Self::Item: PartialEq,
  {
    ContainsOp { source: self, target }
  }

  /// Pairwise-compare this stream with `other`; emit one boolean.
  fn sequence_equal<B>(self, other: B) -> SequenceEqualOp<Self, B>
  where
    B: Observable<Item = Self::Item>,
    Self::Item: PartialEq,
  {
    SequenceEqualOp { a: self, b: other }
  }

  /// Emit `default` if the stream completes without a value.
  fn default_if_empty(self, default: Self::Item) -> DefaultIfEmptyOp<Self>
  where
    Self::Item: Clone,
  {
    DefaultIfEmptyOp { source: self, default }
  }

  // ==================== Combination ====================

  /// Interleave this stream with `other` as values arrive.
  fn merge<B>(self, other: B) -> MergeOp<Self, B>
  where
    B: Observable<Item = Self::Item>,
  {
    MergeOp { a: self, b: other }
  }

  /// Flatten a stream of streams, running at most `concurrent` inners at a
  /// time; surplus inners queue in arrival order.
  fn merge_all(self, concurrent: usize) -> MergeAllOp<Self>
  where
    Self::Item: Observable,
  {
    MergeAllOp { source: self, concurrent }
  }

  /// Run `other` after this stream completes.
  fn concat<B>(self, other: B) -> ConcatOp<Self, B>
  where
    B: Observable<Item = Self::Item>,
  {
    ConcatOp { a: self, b: other }
  }

  /// Flatten a stream of streams one inner at a time, in order.
  fn concat_all(self) -> MergeAllOp<Self>
  where
    Self::Item: Observable,
  {
    self.merge_all(1)
  }

  /// Map every value to an inner stream and merge them all.
  fn flat_map<B, F>(self, f: F) -> MergeAllOp<MapOp<Self, F>>
  where
    Self::Item: 'static,
    F: FnMut(Self::Item) -> B + Send + 'static,
    B: Observable,
  {
    self.map(f).merge_all(usize::MAX)
  }

  /// Pair values of two streams positionally.
  fn zip<B>(self, other: B) -> ZipOp<Self, B>
  where
    B: Observable,
  {
    ZipOp { a: self, b: other }
  }

  /// Combine the latest values of two streams through `f` on every
  /// emission once both have produced.
  fn combine_latest<B, F, R>(self, other: B, f: F) -> CombineLatestOp<Self, B, F>
  where
    B: Observable,
    F: FnMut(Self::Item, B::Item) -> R,
  {
    CombineLatestOp { a: self, b: other, func: f }
  }

  /// Flatten a stream of streams by always following the newest inner.
  fn switch_on_next(self) -> SwitchOnNextOp<Self>
  where
    Self::Item: Observable,
  {
    SwitchOnNextOp { source: self }
  }

  /// Mirror whichever of the two streams produces an event first.
  fn amb<B>(self, other: B) -> crate::ops::amb::AmbOp<Self, B>
  where
    B: Observable<Item = Self::Item>,
  {
    crate::ops::amb::AmbOp { a: self, b: other }
  }

  /// Prepend `values` to the stream.
  fn start_with(self, values: Vec<Self::Item>) -> StartWithOp<Self> {
    StartWithOp { source: self, values }
  }

  /// Append `values` after the stream completes.
  fn end_with(self, values: Vec<Self::Item>) -> EndWithOp<Self> {
    EndWithOp { source: self, values }
  }

  /// Split the stream into per-key substreams, emitted in first-seen key
  /// order.
  fn group_by<K, KF>(self, key_fn: KF) -> GroupByOp<Self, KF>
  where
    KF: FnMut(&Self::Item) -> K,
    K: std::hash::Hash + Eq + Clone,
  {
    GroupByOp { source: self, key_fn }
  }

  /// Open a join pattern with `other`; see [`crate::joins`].
  fn and<B>(self, other: B) -> crate::joins::Pattern2<Self, B>
  where
    B: Observable,
  {
    crate::joins::Pattern2 { a: self, b: other }
  }

  // ==================== Multicast ====================

  /// Multicast through a plain [`Subject`]; upstream stays cold until
  /// [`connect`](ConnectableObservable::connect).
  fn publish(self) -> ConnectableObservable<Self, Subject<Self::Item>>
  where
    Self::Item: Clone + Send + 'static,
  {
    ConnectableObservable::new(self, Subject::new())
  }

  /// Multicast through a [`ReplaySubject`] retaining the last
  /// `buffer_size` values for late subscribers.
  fn publish_replay(
    self, buffer_size: usize,
  ) -> ConnectableObservable<Self, ReplaySubject<Self::Item>>
  where
    Self::Item: Clone + Send + 'static,
  {
    ConnectableObservable::new(self, ReplaySubject::with_buffer(buffer_size))
  }

  // ==================== Time ====================

  /// Emit a value only after `duration` has passed without a newer one.
  fn debounce(self, duration: Duration) -> DebounceOp<Self, ThreadPoolScheduler> {
    self.debounce_with(duration, ThreadPoolScheduler::default())
  }

  /// [`debounce`](Self::debounce) driven by an explicit scheduler.
  fn debounce_with<SD>(self, duration: Duration, scheduler: SD) -> DebounceOp<Self, SD> {
    DebounceOp { source: self, duration, scheduler }
  }

  /// Emit the latest value every `period`, if it is fresh.
  fn sample(self, period: Duration) -> SampleOp<Self, ThreadPoolScheduler> {
    self.sample_with(period, ThreadPoolScheduler::default())
  }

  /// [`sample`](Self::sample) driven by an explicit scheduler.
  fn sample_with<SD>(self, period: Duration, scheduler: SD) -> SampleOp<Self, SD> {
    SampleOp { source: self, period, scheduler }
  }

  /// Collect values into chunks of `count`.
  fn buffer_count(self, count: usize) -> BufferOp<Self, ThreadPoolScheduler> {
    BufferOp {
      source: self,
      window: None,
      max: Some(count),
      scheduler: ThreadPoolScheduler::default(),
    }
  }

  /// Collect values into chunks flushed every `window`.
  fn buffer_time(self, window: Duration) -> BufferOp<Self, ThreadPoolScheduler> {
    self.buffer_time_with(window, ThreadPoolScheduler::default())
  }

  /// [`buffer_time`](Self::buffer_time) driven by an explicit scheduler.
  fn buffer_time_with<SD>(self, window: Duration, scheduler: SD) -> BufferOp<Self, SD> {
    BufferOp { source: self, window: Some(window), max: None, scheduler }
  }

  /// Collect values into chunks flushed on whichever of the time window or
  /// the count threshold is reached first.
  fn buffer_time_count(
    self, window: Duration, count: usize,
  ) -> BufferOp<Self, ThreadPoolScheduler> {
    self.buffer_time_count_with(window, count, ThreadPoolScheduler::default())
  }

  /// [`buffer_time_count`](Self::buffer_time_count) with a scheduler.
  fn buffer_time_count_with<SD>(
    self, window: Duration, count: usize, scheduler: SD,
  ) -> BufferOp<Self, SD> {
    BufferOp { source: self, window: Some(window), max: Some(count), scheduler }
  }

  /// Split the stream into consecutive subject-backed windows of `window`
  /// duration, emitted as inner observables.
  fn window(self, window: Duration) -> WindowOp<Self, ThreadPoolScheduler> {
    self.window_with(window, ThreadPoolScheduler::default())
  }

  /// [`window`](Self::window) driven by an explicit scheduler.
  fn window_with<SD>(self, window: Duration, scheduler: SD) -> WindowOp<Self, SD> {
    WindowOp { source: self, window, scheduler }
  }

  /// Shift every value (and completion) later by `delay`.
  fn delay(self, delay: Duration) -> DelayOp<Self, ThreadPoolScheduler> {
    self.delay_with(delay, ThreadPoolScheduler::default())
  }

  /// [`delay`](Self::delay) driven by an explicit scheduler.
  fn delay_with<SD>(self, delay: Duration, scheduler: SD) -> DelayOp<Self, SD> {
    DelayOp { source: self, delay, scheduler }
  }

  /// Delay each value by its own `f(&value)` duration. Values whose delays
  /// differ may arrive out of order.
  fn delay_by<F>(self, f: F) -> DelayByOp<Self, F, ThreadPoolScheduler>
  where
    F: FnMut(&Self::Item) -> Duration,
  {
    self.delay_by_with(f, ThreadPoolScheduler::default())
  }

  /// [`delay_by`](Self::delay_by) driven by an explicit scheduler.
  fn delay_by_with<F, SD>(self, f: F, scheduler: SD) -> DelayByOp<Self, F, SD>
  where
    F: FnMut(&Self::Item) -> Duration,
  {
    DelayByOp { source: self, func: f, scheduler }
  }

  /// Error with [`StreamError::Timeout`] when `duration` passes without an
  /// event; every arrival restarts the clock.
  fn timeout(self, duration: Duration) -> TimeoutOp<Self, ThreadPoolScheduler> {
    self.timeout_with(duration, ThreadPoolScheduler::default())
  }

  /// [`timeout`](Self::timeout) driven by an explicit scheduler.
  fn timeout_with<SD>(self, duration: Duration, scheduler: SD) -> TimeoutOp<Self, SD> {
    TimeoutOp { source: self, duration, scheduler }
  }

  /// Wrap each value with the monotonic time it was emitted.
  fn timestamp(self) -> TimestampOp<Self, ThreadPoolScheduler> {
    self.timestamp_with(ThreadPoolScheduler::default())
  }

  /// [`timestamp`](Self::timestamp) reading a specific scheduler's clock.
  fn timestamp_with<SD>(self, scheduler: SD) -> TimestampOp<Self, SD> {
    TimestampOp { source: self, scheduler }
  }

  /// Wrap each value with the time elapsed since the previous one.
  fn time_interval(self) -> TimeIntervalOp<Self, ThreadPoolScheduler> {
    self.time_interval_with(ThreadPoolScheduler::default())
  }

  /// [`time_interval`](Self::time_interval) reading a specific scheduler's
  /// clock.
  fn time_interval_with<SD>(self, scheduler: SD) -> TimeIntervalOp<Self, SD> {
    TimeIntervalOp { source: self, scheduler }
  }

  // ==================== Error handling ====================

  /// On error, consult `handler`: `Some(fallback)` resumes with the
  /// fallback stream, `None` lets the error propagate.
  fn catch_err<B, F>(self, handler: F) -> CatchErrOp<Self, F>
  where
    F: FnMut(&StreamError) -> Option<B>,
    B: Observable<Item = Self::Item>,
  {
    CatchErrOp { source: self, handler }
  }

  /// Re-subscribe on error, up to `budget` additional attempts after the
  /// initial failure; the final error is forwarded once exhausted.
  fn retry(self, budget: usize) -> RetryOp<Self>
  where
    Self: Clone,
  {
    RetryOp { source: self, budget: Some(budget) }
  }

  /// Re-subscribe on error without limit.
  fn retry_forever(self) -> RetryOp<Self>
  where
    Self: Clone,
  {
    RetryOp { source: self, budget: None }
  }

  /// On error, switch to `next` (completions pass through untouched).
  fn on_error_continue_with<B>(self, next: B) -> crate::ops::continue_with::OnErrorContinueWithOp<Self, B>
  where
    B: Observable<Item = Self::Item>,
  {
    crate::ops::continue_with::OnErrorContinueWithOp { source: self, next }
  }

  /// On either terminal event, switch to `next`; the continuation never
  /// learns which terminal it was.
  fn continue_with<B>(self, next: B) -> crate::ops::continue_with::ContinueWithOp<Self, B>
  where
    B: Observable<Item = Self::Item>,
  {
    crate::ops::continue_with::ContinueWithOp { source: self, next }
  }

  // ==================== Scheduling ====================

  /// Re-deliver `next`/`complete`/`error` through `scheduler`, moving
  /// consumption off the producing thread while preserving order.
  fn observe_on<SD>(self, scheduler: SD) -> ObserveOnOp<Self, SD> {
    ObserveOnOp { source: self, scheduler }
  }

  /// Run the subscription itself (source setup included) on `scheduler`.
  fn subscribe_on<SD>(self, scheduler: SD) -> SubscribeOnOp<Self, SD> {
    SubscribeOnOp { source: self, scheduler }
  }

  // ==================== Bridges ====================

  /// Reify events as [`Notification`] values.
  fn materialize(self) -> MaterializeOp<Self> {
    MaterializeOp { source: self }
  }

  /// Collapse a stream of [`Notification`]s back into events.
  fn dematerialize<T>(self) -> DematerializeOp<Self, T>
  where
    Self: Observable<Item = Notification<T>>,
  {
    DematerializeOp::new(self)
  }

  /// A blocking, pull-based view of the stream. Dropping the iterator
  /// cancels the subscription.
  fn blocking_iter(self) -> BlockingIter<Self::Item>
  where
    Self::Item: Send + 'static,
  {
    BlockingIter::subscribe(self)
  }

  /// A future resolving with the stream's last value at completion
  /// (`Ok(None)` for an empty stream) or its error.
  fn into_future(self) -> StreamFuture<Self::Item>
  where
    Self::Item: Send + 'static,
  {
    StreamFuture::subscribe(self)
  }

  /// Block until the stream terminates; returns what
  /// [`into_future`](Self::into_future) would resolve with.
  fn wait(self) -> Result<Option<Self::Item>, StreamError>
  where
    Self::Item: Send + 'static,
  {
    futures::executor::block_on(self.into_future())
  }
}

impl<T: Observable> ObservableExt for T {}
