// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Reconstruct a task's active cycle time from its ordered workflow status transitions
// role: core/cycle-time
// inputs: Status change events, started/completed status id sets, task resolution, "now"
// outputs: Option<CycleTime>; None when the task never started or its resolution excludes it
// invariants:
// - events are processed in ascending timestamp order; ties keep input order
// - hours_between never returns less than 1
// - the clock only runs between entering a started status and leaving it
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

const MS_PER_HOUR: f64 = 1000.0 * 60.0 * 60.0;

/// Resolutions that count as finished even without a transition into a completed status.
pub const COMPLETED_RESOLUTIONS: [&str; 3] = ["Done", "Deployed", "N/A"];

/// Resolutions that remove a task from cycle-time accounting entirely.
pub const INAPPLICABLE_RESOLUTIONS: [&str; 4] = ["Duplicate", "No Fix", "Won't Fix", "Won't Do"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeEvent {
  pub timestamp: NaiveDateTime,
  pub from: String,
  pub to: String,
}

/// Status ids sorted into "active work" and "done". Disjointness is assumed, not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusClassification {
  pub started: HashSet<String>,
  pub completed: HashSet<String>,
}

impl StatusClassification {
  pub fn new<I, J, S>(started: I, completed: J) -> Self
  where
    I: IntoIterator<Item = S>,
    J: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      started: started.into_iter().map(Into::into).collect(),
      completed: completed.into_iter().map(Into::into).collect(),
    }
  }

  fn is_started(&self, status: &str) -> bool {
    self.started.contains(status)
  }

  fn is_completed(&self, status: &str) -> bool {
    self.completed.contains(status)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskResolution {
  pub name: Option<String>,
  pub date: Option<NaiveDateTime>,
}

impl TaskResolution {
  pub fn is_inapplicable(&self) -> bool {
    self.name.as_deref().is_some_and(|n| INAPPLICABLE_RESOLUTIONS.contains(&n))
  }

  /// The resolution date, when the resolution itself signals completion.
  pub fn completion_date(&self) -> Option<NaiveDateTime> {
    match self.name.as_deref() {
      Some(n) if COMPLETED_RESOLUTIONS.contains(&n) => self.date,
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleTime {
  pub date_started: NaiveDateTime,
  pub date_completed: Option<NaiveDateTime>,
  pub hours_worked: i64,
}

/// Whole hours between two instants, rounded to nearest; anything under an hour counts as one.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
  let hours = (end - start).num_milliseconds() as f64 / MS_PER_HOUR;

  if hours < 1.0 {
    return 1;
  }

  hours.round() as i64
}

fn hours_since(last_started: Option<NaiveDateTime>, at: NaiveDateTime) -> i64 {
  last_started.map_or(0, |started| hours_between(started, at))
}

/// Replay a task's status transitions and measure how long its clock was running.
pub fn reconstruct(
  resolution: &TaskResolution,
  changes: &[StatusChangeEvent],
  statuses: &StatusClassification,
  now: NaiveDateTime,
) -> Option<CycleTime> {
  if resolution.is_inapplicable() {
    return None;
  }

  let mut ordered: Vec<&StatusChangeEvent> = changes.iter().collect();
  ordered.sort_by_key(|c| c.timestamp);

  let resolved_at = resolution.completion_date();
  let mut hours_worked = 0i64;
  let mut first_started: Option<NaiveDateTime> = None;
  let mut last_started: Option<NaiveDateTime> = None;
  let mut date_completed: Option<NaiveDateTime> = None;

  for change in ordered {
    let to_started = statuses.is_started(&change.to);
    let from_started = statuses.is_started(&change.from);
    let to_completed = statuses.is_completed(&change.to);
    let from_completed = statuses.is_completed(&change.from);

    if to_started {
      last_started = Some(change.timestamp);
      first_started.get_or_insert(change.timestamp);
    }

    // paused: back to a non-terminal, non-progress status
    if from_started && !(to_started || to_completed) {
      hours_worked += hours_since(last_started, change.timestamp);
    }

    if to_completed && !from_completed {
      date_completed = Some(change.timestamp);
      hours_worked += hours_since(last_started, change.timestamp);
    } else if let Some(resolved) = resolved_at {
      // Re-adds on every later non-completing event; kept as-is.
      date_completed = Some(resolved);
      hours_worked += hours_since(last_started, change.timestamp);
    }
  }

  // Completed without ever being marked started: assume same-day work.
  if first_started.is_none() && date_completed.is_some() {
    first_started = date_completed;
    hours_worked = 1;
  }

  let date_started = first_started?;

  if date_completed.is_none() {
    hours_worked += hours_since(last_started, now);
  }

  Some(CycleTime { date_started, date_completed, hours_worked })
}
