// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn per-task work intervals into per-assignee hours using weekday buckets capped at 8h per day
// role: core/aggregation
// inputs: TaskInterval slices (assignee, start, completion-or-now) in report wall-clock time
// outputs: (assignee, AssigneeAggregate) pairs in first-seen assignee order
// invariants:
// - no calendar day credits more than MAX_HOURS_PER_DAY for one assignee, however many tasks overlap it
// - Saturdays and Sundays (wall-clock fields, no timezone correction) never receive credit
// - day credit is hours from the cursor to task completion, not a per-day slice
// - assignees whose tasks visit no day are omitted
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::cycle_time::hours_between;
use crate::util::group_ordered;

/// Naive assumption of a full working day per person.
pub const MAX_HOURS_PER_DAY: i64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInterval {
  pub assignee: String,
  pub date_started: NaiveDateTime,
  pub date_completed_or_now: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssigneeAggregate {
  pub hours_worked: i64,
  pub first_task_started: NaiveDateTime,
  pub last_task_completed: NaiveDateTime,
}

/// One assignee's credited hours per calendar day, plus the extrema seen when last visited.
#[derive(Debug)]
struct DayLedger {
  hours_by_day: BTreeMap<NaiveDate, i64>,
  first_task_started: NaiveDateTime,
  last_task_completed: NaiveDateTime,
}

impl DayLedger {
  fn new(first_task_started: NaiveDateTime, last_task_completed: NaiveDateTime) -> Self {
    Self { hours_by_day: BTreeMap::new(), first_task_started, last_task_completed }
  }

  fn credit(&mut self, cursor: NaiveDateTime, completed: NaiveDateTime) {
    let day = self.hours_by_day.entry(cursor.date()).or_insert(0);
    *day = (*day + hours_between(cursor, completed)).min(MAX_HOURS_PER_DAY);
  }

  fn into_aggregate(self) -> AssigneeAggregate {
    AssigneeAggregate {
      hours_worked: self.hours_by_day.values().sum(),
      first_task_started: self.first_task_started,
      last_task_completed: self.last_task_completed,
    }
  }
}

pub fn is_weekend(dt: NaiveDateTime) -> bool {
  matches!(dt.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Total hours worked per assignee across possibly overlapping tasks.
pub fn aggregate_by_assignee(tasks: &[TaskInterval]) -> Vec<(String, AssigneeAggregate)> {
  group_ordered(tasks, |t| Some((t.assignee.clone(), t)))
    .into_iter()
    .filter_map(|(assignee, mut owned)| {
      owned.sort_by_key(|t| t.date_started);
      aggregate_assignee(&owned).map(|agg| (assignee, agg))
    })
    .collect()
}

fn aggregate_assignee(tasks: &[&TaskInterval]) -> Option<AssigneeAggregate> {
  let mut ledger: Option<DayLedger> = None;
  let mut first: Option<NaiveDateTime> = None;
  let mut last: Option<NaiveDateTime> = None;

  for task in tasks {
    let started = task.date_started;
    let completed = task.date_completed_or_now;

    let lo = first.map_or(started, |f| f.min(started));
    let hi = last.map_or(completed, |l| l.max(completed));
    first = Some(lo);
    last = Some(hi);

    let mut cursor = started;

    while cursor <= completed {
      let entry = ledger.get_or_insert_with(|| DayLedger::new(lo, hi));

      if !is_weekend(cursor) {
        entry.credit(cursor, completed);
      }

      entry.first_task_started = lo;
      entry.last_task_completed = hi;

      cursor += Duration::days(1);
    }
  }

  ledger.map(DayLedger::into_aggregate)
}
