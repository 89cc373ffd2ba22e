//! End-to-end scenarios across the operator algebra.

use std::time::Duration;

use brook::prelude::*;

fn collect<S>(source: S) -> (Vec<S::Item>, bool)
where
  S: ObservableExt,
  S::Item: Send + Clone + 'static,
{
  let seen = MutArc::own(Vec::new());
  let completed = MutArc::own(false);

  let c_seen = seen.clone();
  let c_completed = completed.clone();
  source.subscribe_all(
    move |v| c_seen.rc_deref_mut().push(v),
    |_| {},
    move || *c_completed.rc_deref_mut() = true,
  );

  let collected = seen.rc_deref().clone();
  let done = *completed.rc_deref();
  (collected, done)
}

#[test]
fn filtered_mapped_range() {
  let (seen, done) = collect(
    observable::range(0, 5)
      .filter(|v| v % 2 == 0)
      .map(|v| v * 10),
  );
  assert_eq!(seen, vec![0, 20, 40]);
  assert!(done);
}

#[test]
fn subject_driven_zip_pairs_positionally() {
  let mut letters = Subject::new();
  let mut numbers = Subject::new();

  let seen = MutArc::own(Vec::new());
  let completed = MutArc::own(false);

  let c_seen = seen.clone();
  let c_completed = completed.clone();
  letters
    .clone()
    .zip(numbers.clone())
    .subscribe_all(
      move |(l, n): (char, i32)| c_seen.rc_deref_mut().push(format!("{l}{n}")),
      |_| {},
      move || *c_completed.rc_deref_mut() = true,
    );

  for l in ['A', 'B', 'C', 'D', 'E'] {
    letters.next(l);
  }
  for n in 1..=5 {
    numbers.next(n);
  }
  letters.complete();
  numbers.complete();

  assert_eq!(*seen.rc_deref(), vec!["A1", "B2", "C3", "D4", "E5"]);
  assert!(*completed.rc_deref());
}

#[test]
fn flat_map_expands_sequentially_on_the_calling_thread() {
  let (seen, done) = collect(
    observable::range(1, 3).flat_map(|v| observable::range(1, v as usize)),
  );
  assert_eq!(seen, vec![1, 1, 2, 1, 2, 3]);
  assert!(done);
}

#[test]
fn combine_latest_interleaving() {
  let mut letters = Subject::new();
  let mut numbers = Subject::new();
  let seen = MutArc::own(Vec::new());

  let c_seen = seen.clone();
  letters
    .clone()
    .combine_latest(numbers.clone(), |l: char, n: i32| format!("{l}{n}"))
    .subscribe(move |v| c_seen.rc_deref_mut().push(v));

  letters.next('A');
  numbers.next(1);
  letters.next('B');
  letters.next('C');
  numbers.next(2);
  numbers.next(3);
  numbers.next(4);
  numbers.next(5);
  letters.next('D');
  letters.next('E');

  assert_eq!(
    *seen.rc_deref(),
    vec!["A1", "B1", "C1", "C2", "C3", "C4", "C5", "D5", "E5"]
  );
}

#[test]
fn chained_concat_emits_in_order() {
  let (seen, done) = collect(
    observable::of(1)
      .concat(observable::of(2))
      .concat(observable::of(3)),
  );
  assert_eq!(seen, vec![1, 2, 3]);
  assert!(done);
}

#[test]
fn amb_follows_the_fastest_timer() {
  TestScheduler::init();
  let seen = MutArc::own(Vec::new());

  let c_seen = seen.clone();
  observable::timer_with(Duration::from_secs(1), TestScheduler)
    .map_to("first")
    .amb(observable::timer_with(Duration::from_millis(100), TestScheduler).map_to("second"))
    .amb(observable::timer_with(Duration::from_millis(1), TestScheduler).map_to("third"))
    .subscribe(move |v| c_seen.rc_deref_mut().push(v));

  TestScheduler::flush();
  assert_eq!(*seen.rc_deref(), vec!["third"]);
}

#[test]
fn waiting_on_counted_ranges() {
  assert_eq!(observable::range(0, 7).count().wait().unwrap(), Some(7));
  assert_eq!(
    observable::range(0, 7).take(3).count().wait().unwrap(),
    Some(3)
  );
  assert_eq!(
    observable::range(0, 2).take(9).count().wait().unwrap(),
    Some(2)
  );
}

#[test]
fn gauss_sum_via_reduce() {
  let n = 100;
  assert_eq!(
    observable::range(1, n)
      .reduce(0i64, |acc, v| acc + v)
      .wait()
      .unwrap(),
    Some((n as i64) * (n as i64 + 1) / 2)
  );
}

#[test]
fn sequence_equal_detects_single_changes() {
  let xs = vec![1, 5, 9, 13];
  let mut ys = xs.clone();
  ys[2] = 0;

  assert_eq!(
    observable::from_iter(xs.clone())
      .sequence_equal(observable::from_iter(xs))
      .wait()
      .unwrap(),
    Some(true)
  );
  assert_eq!(
    observable::from_iter(vec![1, 5, 9, 13])
      .sequence_equal(observable::from_iter(ys))
      .wait()
      .unwrap(),
    Some(false)
  );
}

#[test]
fn materialize_dematerialize_round_trip() {
  let (seen, done) = collect(
    observable::from_iter(vec![7, 8, 9])
      .materialize()
      .dematerialize(),
  );
  assert_eq!(seen, vec![7, 8, 9]);
  assert!(done);
}

#[test]
fn disposal_cuts_the_whole_chain() {
  let mut input = Subject::new();
  let seen = MutArc::own(Vec::new());

  let c_seen = seen.clone();
  let mut sub = input
    .clone()
    .map(|v: i32| v * 2)
    .filter(|v| *v > 0)
    .subscribe(move |v| c_seen.rc_deref_mut().push(v));

  input.next(1);
  sub.unsubscribe();
  input.next(2);

  assert_eq!(*seen.rc_deref(), vec![2]);
  assert_eq!(input.subscriber_count(), 0);
}

#[test]
fn publish_defers_production_until_connect() {
  let pulls = MutArc::own(0);
  let c_pulls = pulls.clone();
  let source = observable::defer(move || {
    *c_pulls.rc_deref_mut() += 1;
    observable::from_iter(vec![1, 2, 3])
  });

  let connectable = source.publish();

  let before = MutArc::own(Vec::new());
  let c_before = before.clone();
  connectable
    .fork()
    .subscribe(move |v| c_before.rc_deref_mut().push(v));

  assert_eq!(*pulls.rc_deref(), 0);
  connectable.connect();

  // The subscriber attached before connect saw the first value.
  assert_eq!(before.rc_deref().first(), Some(&1));
}

#[test]
fn debounced_bursts_keep_only_their_last_value() {
  TestScheduler::init();
  let mut input = Subject::new();
  let seen = MutArc::own(Vec::new());

  let c_seen = seen.clone();
  input
    .clone()
    .debounce_with(Duration::from_millis(10), TestScheduler)
    .subscribe(move |v| c_seen.rc_deref_mut().push(v));

  for v in [1, 2, 3] {
    input.next(v);
    TestScheduler::advance_by(Duration::from_millis(3));
  }
  TestScheduler::advance_by(Duration::from_millis(10));

  for v in [4, 5] {
    input.next(v);
    TestScheduler::advance_by(Duration::from_millis(3));
  }
  TestScheduler::advance_by(Duration::from_millis(10));

  assert_eq!(*seen.rc_deref(), vec![3, 5]);
}

#[test]
fn retry_resubscribes_up_to_the_budget() {
  let attempts = MutArc::own(0);
  let errors = MutArc::own(0);

  let c_attempts = attempts.clone();
  let flaky = observable::defer(move || {
    *c_attempts.rc_deref_mut() += 1;
    observable::throw_err::<i32>(StreamError::message("still down"))
  });

  let c_errors = errors.clone();
  flaky
    .retry(3)
    .subscribe_err(|_| {}, move |_| *c_errors.rc_deref_mut() += 1);

  assert_eq!(*attempts.rc_deref(), 4);
  assert_eq!(*errors.rc_deref(), 1);
}

#[test]
fn grammar_holds_for_every_operator_output() {
  // A stream that errors mid-flight, pushed through a long chain, still
  // delivers exactly one terminal event.
  let events = MutArc::own(Vec::new());

  let c_events = events.clone();
  let c_events_err = events.clone();
  let c_events_done = events.clone();
  observable::from_iter(vec![1, 2, 3])
    .concat(observable::throw_err(StreamError::message("mid-flight")))
    .map(|v| v + 1)
    .filter(|v| *v > 0)
    .scan(0, |acc, v| acc + v)
    .subscribe_all(
      move |_| c_events.rc_deref_mut().push("next"),
      move |_| c_events_err.rc_deref_mut().push("error"),
      move || c_events_done.rc_deref_mut().push("complete"),
    );

  assert_eq!(*events.rc_deref(), vec!["next", "next", "next", "error"]);
}

#[test]
fn group_by_partitions_with_inherited_lifecycle() {
  let odds = MutArc::own(Vec::new());
  let evens = MutArc::own(Vec::new());
  let group_completions = MutArc::own(0);

  let c_odds = odds.clone();
  let c_evens = evens.clone();
  let c_group_completions = group_completions.clone();
  observable::range(1, 6)
    .group_by(|v| v % 2)
    .subscribe(move |group| {
      let target = if *group.key() == 0 { c_evens.clone() } else { c_odds.clone() };
      let completions = c_group_completions.clone();
      group.subscribe_all(
        move |v| target.rc_deref_mut().push(v),
        |_| {},
        move || *completions.rc_deref_mut() += 1,
      );
    });

  assert_eq!(*odds.rc_deref(), vec![1, 3, 5]);
  assert_eq!(*evens.rc_deref(), vec![2, 4, 6]);
  assert_eq!(*group_completions.rc_deref(), 2);
}

#[test]
fn blocking_iteration_pulls_a_pushed_stream() {
  let values: Vec<i64> = observable::range(0, 5)
    .map(|v| v * v)
    .blocking_iter()
    .map(Result::unwrap)
    .collect();
  assert_eq!(values, vec![0, 1, 4, 9, 16]);
}

#[test]
fn current_thread_scheduler_drains_deterministically() {
  let scheduler = CurrentThreadScheduler::new();
  let seen = MutArc::own(Vec::new());

  let c_seen = seen.clone();
  observable::from_iter_with(0..4, scheduler.clone())
    .map(|v| v * 10)
    .subscribe(move |v| c_seen.rc_deref_mut().push(v));

  assert!(seen.rc_deref().is_empty());
  scheduler.work();
  assert_eq!(*seen.rc_deref(), vec![0, 10, 20, 30]);
}

#[test]
fn thread_pool_pipeline_reaches_the_sink() {
  use std::{thread, time::Instant};

  let seen = MutArc::own(Vec::new());
  let completed = MutArc::own(false);

  let c_seen = seen.clone();
  let c_completed = completed.clone();
  observable::range(0, 20)
    .subscribe_on(ThreadPoolScheduler::default())
    .observe_on(ThreadPoolScheduler::default())
    .subscribe_all(
      move |v| c_seen.rc_deref_mut().push(v),
      |_| {},
      move || *c_completed.rc_deref_mut() = true,
    );

  let deadline = Instant::now() + Duration::from_secs(3);
  while !*completed.rc_deref() && Instant::now() < deadline {
    thread::sleep(Duration::from_millis(2));
  }

  assert_eq!(*seen.rc_deref(), (0..20).collect::<Vec<_>>());
}
