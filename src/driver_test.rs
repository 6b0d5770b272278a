//! Tests for the rate-limited batch driver.

use std::sync::Mutex;

use proptest::prelude::*;
use tokio::time::{Duration, Instant};

use crate::budget::ContinuationBudget;
use crate::driver::{ListOutcome, WindowConfig, drive_list, drive_window};
use crate::error::BoxError;

fn ids(names: &[&str]) -> Vec<String> {
  names.iter().map(|s| s.to_string()).collect()
}

fn window(size: usize) -> WindowConfig {
  WindowConfig {
    size,
    pacing: Duration::ZERO,
  }
}

fn never_exhausted() -> ContinuationBudget {
  ContinuationBudget::pages(u32::MAX)
}

#[tokio::test]
async fn window_aggregates_failures_without_failing() {
  let batch = ids(&["dev-0", "dev-1", "dev-2"]);
  let report = drive_window(&batch, Duration::ZERO, |id| async move {
    if id == "dev-1" {
      Err("throttled".into())
    } else {
      Ok(())
    }
  })
  .await;
  assert_eq!(report.attempted, 3);
  assert_eq!(report.succeeded, 2);
  assert_eq!(report.failed(), 1);
  assert_eq!(report.failures[0].device_id, "dev-1");
  assert_eq!(report.failures[0].error, "throttled");
}

#[tokio::test(start_paused = true)]
async fn window_takes_at_least_one_pacing_period() {
  let batch = ids(&["dev-0"]);
  let started = Instant::now();
  drive_window(&batch, Duration::from_secs(1), |_| async { Ok(()) }).await;
  assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn empty_entries_skip_without_consuming_a_slot() {
  // list = ["a", "", "b", "c"], window 2 -> windows ["a","b"] then ["c"].
  let items = ids(&["a", "", "b", "c"]);
  let called: Mutex<Vec<String>> = Mutex::new(vec![]);

  let outcome = drive_list(&items, 0, 0, &window(2), &never_exhausted(), |id| {
    called.lock().unwrap().push(id);
    async { Ok(()) }
  })
  .await;

  assert_eq!(called.into_inner().unwrap(), ids(&["a", "b", "c"]));
  match outcome {
    ListOutcome::Complete {
      processed,
      windows,
      report,
    } => {
      assert_eq!(processed, 3);
      assert_eq!(windows, 2);
      assert_eq!(report.attempted, 3);
      assert_eq!(report.succeeded, 3);
    }
    other => panic!("expected Complete, got {other:?}"),
  }
}

#[tokio::test]
async fn first_window_spans_list_entries_up_to_the_second_nonempty_id() {
  // A one-page budget surfaces the boundary: the window covering ["a","b"]
  // ends after list index 2, so the checkpoint points at index 3.
  let items = ids(&["a", "", "b", "c"]);
  let outcome = drive_list(
    &items,
    0,
    0,
    &window(2),
    &ContinuationBudget::pages(1),
    |_| async { Ok(()) },
  )
  .await;

  match outcome {
    ListOutcome::BudgetExhausted {
      next_index,
      processed,
      windows,
      ..
    } => {
      assert_eq!(next_index, 3);
      assert_eq!(processed, 2);
      assert_eq!(windows, 1);
    }
    other => panic!("expected BudgetExhausted, got {other:?}"),
  }
}

#[tokio::test(start_paused = true)]
async fn zero_budget_stops_after_first_window_with_checkpoint() {
  // budget = 0, list length 5, window 2 -> 2 processed, next index 2.
  let items = ids(&["d0", "d1", "d2", "d3", "d4"]);
  let called: Mutex<Vec<String>> = Mutex::new(vec![]);
  let budget = ContinuationBudget::wall_clock(Duration::ZERO);

  let outcome = drive_list(
    &items,
    0,
    0,
    &WindowConfig {
      size: 2,
      pacing: Duration::from_secs(1),
    },
    &budget,
    |id| {
      called.lock().unwrap().push(id);
      async { Ok(()) }
    },
  )
  .await;

  match outcome {
    ListOutcome::BudgetExhausted {
      next_index,
      processed,
      ..
    } => {
      assert_eq!(next_index, 2);
      assert_eq!(processed, 2);
    }
    other => panic!("expected BudgetExhausted, got {other:?}"),
  }
  assert_eq!(called.into_inner().unwrap(), ids(&["d0", "d1"]));
}

#[tokio::test]
async fn resume_from_index_touches_exactly_the_tail() {
  let items: Vec<String> = (0..9).map(|i| format!("dev-{i}")).collect();
  let called: Mutex<Vec<String>> = Mutex::new(vec![]);

  let outcome = drive_list(&items, 4, 4, &window(3), &never_exhausted(), |id| {
    called.lock().unwrap().push(id);
    async { Ok(()) }
  })
  .await;

  let called = called.into_inner().unwrap();
  assert_eq!(called, items[4..].to_vec());
  match outcome {
    ListOutcome::Complete { processed, .. } => assert_eq!(processed, 9),
    other => panic!("expected Complete, got {other:?}"),
  }
}

#[tokio::test]
async fn cumulative_count_carries_prior_invocations() {
  let items = ids(&["x", "y"]);
  let outcome = drive_list(&items, 0, 1000, &window(2), &never_exhausted(), |_| async {
    Ok(())
  })
  .await;
  match outcome {
    ListOutcome::Complete { processed, .. } => assert_eq!(processed, 1002),
    other => panic!("expected Complete, got {other:?}"),
  }
}

proptest! {
  // ceil(N/W) windows for N non-empty items; attempted equals N.
  #[test]
  fn window_count_is_ceil_of_nonempty_over_size(
    entries in proptest::collection::vec(proptest::bool::ANY, 0..40),
    size in 1usize..6,
  ) {
    let items: Vec<String> = entries
      .iter()
      .enumerate()
      .map(|(i, nonempty)| if *nonempty { format!("dev-{i}") } else { String::new() })
      .collect();
    let nonempty = items.iter().filter(|s| !s.is_empty()).count() as u64;
    let expected_windows = nonempty.div_ceil(size as u64) as u32;

    let rt = tokio::runtime::Builder::new_current_thread()
      .enable_time()
      .build()
      .unwrap();
    let outcome = rt.block_on(drive_list(
      &items,
      0,
      0,
      &WindowConfig { size, pacing: Duration::ZERO },
      &never_exhausted(),
      |_| async { Ok::<(), BoxError>(()) },
    ));
    match outcome {
      ListOutcome::Complete { processed, windows, report } => {
        prop_assert_eq!(processed, nonempty);
        prop_assert_eq!(windows, expected_windows);
        prop_assert_eq!(report.attempted, nonempty);
        prop_assert_eq!(report.succeeded, nonempty);
      }
      _ => prop_assert!(false, "never-exhausted budget must complete"),
    }
  }
}
