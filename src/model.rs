// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define tracker-neutral task/epic types and the JSON report document shared by tracker mapping, rendering, and orchestration
// role: model/types
// outputs: Plain structs; output types are Serializable with stable snake_case field names
// invariants: Timestamps are report wall-clock NaiveDateTime values; optional detail fields are omitted when absent
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::cycle_time::{CycleTime, StatusChangeEvent, StatusClassification, TaskResolution};
use crate::report::ReportRow;
use crate::util::{serialize_wall, Percentiles};
use crate::window::ReportWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignee {
  pub id: Option<String>,
  pub name: Option<String>,
}

impl Assignee {
  /// Reports key people by display name, falling back to the account id.
  pub fn report_key(&self) -> Option<String> {
    self.name.clone().or_else(|| self.id.clone())
  }
}

/// Internal representation of a task, abstracted from any one tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
  pub id: Option<String>,
  pub key: String,
  pub summary: String,
  pub assignee: Option<Assignee>,
  pub parent_key: Option<String>,
  pub resolution: TaskResolution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epic {
  pub key: String,
  pub summary: String,
  pub labels: Vec<String>,
}

impl Epic {
  pub fn has_label(&self, label: &str) -> bool {
    self.labels.iter().any(|l| l == label)
  }
}

#[derive(Debug, Clone)]
pub struct IssueHistory {
  pub task: Task,
  pub changes: Vec<StatusChangeEvent>,
}

/// Everything read from one tracker export, already mapped into report wall-clock time.
#[derive(Debug, Clone)]
pub struct ProjectHistory {
  pub project: String,
  pub statuses: StatusClassification,
  pub epics: Vec<Epic>,
  pub issues: Vec<IssueHistory>,
}

#[derive(Debug, Clone)]
pub struct TaskWithCycleTime {
  pub task: Task,
  pub cycle_time: CycleTime,
}

impl TaskWithCycleTime {
  pub fn assignee_key(&self) -> Option<String> {
    self.task.assignee.as_ref().and_then(Assignee::report_key)
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
  pub rows: usize,
  pub groups: usize,
  pub assignees: usize,
  pub tasks: usize,
  pub total_hours: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cycle_time_hours: Option<Percentiles>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
  pub project: String,
  pub key: String,
  pub summary: String,
  pub assignee: Option<String>,
  pub group_key: String,
  #[serde(serialize_with = "serialize_wall")]
  pub date_started: NaiveDateTime,
  #[serde(serialize_with = "serialize_wall")]
  pub date_completed: NaiveDateTime,
  pub hours_worked: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
  pub projects: Vec<String>,
  pub window: ReportWindow,
  pub timezone: String,
  #[serde(serialize_with = "serialize_wall")]
  pub generated_at: NaiveDateTime,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label_filter: Option<String>,
  pub rows: Vec<ReportRow>,
  pub summary: ReportSummary,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tasks: Option<Vec<TaskDetail>>,
}
