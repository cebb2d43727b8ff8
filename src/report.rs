// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Clamp reconstructed tasks to a reporting window, group them by parent key, and emit one row per (group, assignee)
// role: core/windowing
// inputs: TaskWithCycleTime slice, grouping closure, window start/end, "now"
// outputs: Vec<ReportRow> in first-seen group order, assignees in aggregation order
// invariants:
// - tasks that started before the window start contribute nothing
// - no credited interval extends past the window end
// - tasks without a resolvable group or assignee are dropped
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{aggregate_by_assignee, TaskInterval};
use crate::model::TaskWithCycleTime;
use crate::util::{group_ordered, serialize_wall};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
  pub group_key: String,
  pub group_label: String,
  pub assignee: String,
  pub hours_worked: i64,
  #[serde(serialize_with = "serialize_wall")]
  pub first_task_started: NaiveDateTime,
  #[serde(serialize_with = "serialize_wall")]
  pub last_task_completed: NaiveDateTime,
}

/// A task that survived the window filter, with its completion clamped to the window end.
#[derive(Debug, Clone, Copy)]
pub struct ClampedTask<'a> {
  pub task: &'a TaskWithCycleTime,
  pub date_completed: NaiveDateTime,
}

pub fn clamp_to_window(
  tasks: &[TaskWithCycleTime],
  start: NaiveDateTime,
  end: NaiveDateTime,
  now: NaiveDateTime,
) -> Vec<ClampedTask<'_>> {
  tasks
    .iter()
    .filter(|t| t.cycle_time.date_started >= start)
    .map(|task| {
      let completed_or_resolved = task
        .cycle_time
        .date_completed
        .or(task.task.resolution.date)
        .unwrap_or(now);

      ClampedTask { task, date_completed: completed_or_resolved.min(end) }
    })
    .collect()
}

/// Build report rows for one window.
///
/// `group_of` resolves a task to its `(group_key, group_label)`; returning `None`
/// drops the task (inner join against known groups).
pub fn build_report<F>(
  tasks: &[TaskWithCycleTime],
  group_of: F,
  start: NaiveDateTime,
  end: NaiveDateTime,
  now: NaiveDateTime,
) -> Vec<ReportRow>
where
  F: Fn(&TaskWithCycleTime) -> Option<(String, String)>,
{
  let clamped = clamp_to_window(tasks, start, end, now);

  let groups = group_ordered(clamped, |c| match group_of(c.task) {
    Some(group) => Some((group, c)),
    None => {
      debug!(task = %c.task.task.key, "dropping task without a known group");
      None
    }
  });

  groups
    .into_iter()
    .flat_map(|((group_key, group_label), members)| {
      let intervals: Vec<TaskInterval> = members
        .iter()
        .filter_map(|c| {
          let Some(assignee) = c.task.assignee_key() else {
            debug!(task = %c.task.task.key, "dropping task without an assignee");
            return None;
          };

          Some(TaskInterval {
            assignee,
            date_started: c.task.cycle_time.date_started,
            date_completed_or_now: c.date_completed,
          })
        })
        .collect();

      aggregate_by_assignee(&intervals)
        .into_iter()
        .map(move |(assignee, agg)| ReportRow {
          group_key: group_key.clone(),
          group_label: group_label.clone(),
          assignee,
          hours_worked: agg.hours_worked,
          first_task_started: agg.first_task_started,
          last_task_completed: agg.last_task_completed,
        })
    })
    .collect()
}
