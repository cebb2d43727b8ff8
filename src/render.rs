// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Reconstruct cycle times for loaded projects and render one ReportDocument per reporting window
// role: report/rendering
// inputs: ProjectHistory values, ReportParams (window, label filter, include_tasks, tz, now)
// outputs: ReconstructedProject values; ReportDocument with rows, summary, and optional task detail
// invariants:
// - rows concatenate per-project rows in input order
// - a label filter that matches no epic in a project is an error, never an empty report
// - reconstruction order matches issue order even when run in parallel
// errors: Label filter misses surface as anyhow errors naming project and label
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cycle_time::reconstruct;
use crate::model::{Epic, ProjectHistory, ReportDocument, ReportSummary, TaskDetail, TaskWithCycleTime};
use crate::report::{build_report, clamp_to_window, ClampedTask, ReportRow};
use crate::util::{percentiles, ReportTz};
use crate::window::ReportWindow;

#[derive(Debug, Clone)]
pub struct ReportParams {
  pub window: ReportWindow,
  pub label_filter: Option<String>,
  pub include_tasks: bool,
  pub tz: ReportTz,
  pub now: NaiveDateTime,
}

/// A project's epics (after label filtering) and every task that reconstructed to a cycle time.
#[derive(Debug, Clone)]
pub struct ReconstructedProject {
  pub project: String,
  pub epics: Vec<Epic>,
  pub tasks: Vec<TaskWithCycleTime>,
}

impl ReconstructedProject {
  fn epics_by_key(&self) -> HashMap<&str, &Epic> {
    self.epics.iter().map(|e| (e.key.as_str(), e)).collect()
  }
}

pub fn reconstruct_project(
  project: &ProjectHistory,
  label_filter: Option<&str>,
  now: NaiveDateTime,
) -> Result<ReconstructedProject> {
  let epics: Vec<Epic> = match label_filter {
    Some(label) => project.epics.iter().filter(|e| e.has_label(label)).cloned().collect(),
    None => project.epics.clone(),
  };

  if let Some(label) = label_filter {
    if epics.is_empty() {
      bail!("{} has no epics with the label {}", project.project, label);
    }
  }

  let tasks: Vec<TaskWithCycleTime> = project
    .issues
    .par_iter()
    .filter_map(|issue| {
      let cycle_time = reconstruct(&issue.task.resolution, &issue.changes, &project.statuses, now);

      if cycle_time.is_none() {
        debug!(
          task = %issue.task.key,
          resolution = ?issue.task.resolution.name,
          "no cycle time (never started or excluded resolution)"
        );
      }

      cycle_time.map(|cycle_time| TaskWithCycleTime { task: issue.task.clone(), cycle_time })
    })
    .collect();

  info!(
    project = %project.project,
    epics = epics.len(),
    issues = project.issues.len(),
    reconstructed = tasks.len(),
    "reconstructed cycle times"
  );

  Ok(ReconstructedProject { project: project.project.clone(), epics, tasks })
}

fn task_detail(project: &str, group_key: &str, clamped: &ClampedTask<'_>) -> TaskDetail {
  let t = clamped.task;
  TaskDetail {
    project: project.to_string(),
    key: t.task.key.clone(),
    summary: t.task.summary.clone(),
    assignee: t.assignee_key(),
    group_key: group_key.to_string(),
    date_started: t.cycle_time.date_started,
    date_completed: clamped.date_completed,
    hours_worked: t.cycle_time.hours_worked,
  }
}

pub fn run_report(params: &ReportParams, projects: &[ReconstructedProject]) -> Result<ReportDocument> {
  let (start, end) = (params.window.start, params.window.end);
  let mut rows: Vec<ReportRow> = Vec::new();
  let mut groups: HashSet<(String, String)> = HashSet::new();
  let mut cycle_hours: Vec<i64> = Vec::new();
  let mut details: Vec<TaskDetail> = Vec::new();

  for project in projects {
    let by_key = project.epics_by_key();

    let project_rows = build_report(
      &project.tasks,
      |t| {
        let parent = t.task.parent_key.as_deref()?;
        by_key.get(parent).map(|e| (e.key.clone(), e.summary.clone()))
      },
      start,
      end,
      params.now,
    );

    // summary and detail cover grouped tasks that started inside the window
    for clamped in clamp_to_window(&project.tasks, start, end, params.now) {
      if clamped.task.cycle_time.date_started >= end {
        continue;
      }
      let Some(group_key) = clamped.task.task.parent_key.as_deref().filter(|k| by_key.contains_key(k)) else {
        continue;
      };
      cycle_hours.push(clamped.task.cycle_time.hours_worked);
      if params.include_tasks {
        details.push(task_detail(&project.project, group_key, &clamped));
      }
    }

    for row in &project_rows {
      groups.insert((project.project.clone(), row.group_key.clone()));
    }

    info!(project = %project.project, window = %params.window.label, rows = project_rows.len(), "built report rows");
    rows.extend(project_rows);
  }

  let assignees: HashSet<&str> = rows.iter().map(|r| r.assignee.as_str()).collect();

  let summary = ReportSummary {
    rows: rows.len(),
    groups: groups.len(),
    assignees: assignees.len(),
    tasks: cycle_hours.len(),
    total_hours: rows.iter().map(|r| r.hours_worked).sum(),
    cycle_time_hours: percentiles(&cycle_hours),
  };

  Ok(ReportDocument {
    projects: projects.iter().map(|p| p.project.clone()).collect(),
    window: params.window.clone(),
    timezone: params.tz.label(),
    generated_at: params.now,
    label_filter: params.label_filter.clone(),
    rows,
    summary,
    tasks: params.include_tasks.then_some(details),
  })
}
