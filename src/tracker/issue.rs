use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

use crate::cycle_time::TaskResolution;
use crate::ext::serde_json::JsonFetch;
use crate::model::{Assignee, Epic, Task};
use crate::util::{parse_wall_clock, ReportTz};

fn assignee(issue: &Value) -> Option<Assignee> {
  let id = issue.fetch("fields.assignee.accountId").text();
  let name = issue.fetch("fields.assignee.displayName").text();

  if id.is_none() && name.is_none() {
    return None;
  }

  Some(Assignee { id, name })
}

fn resolution(issue: &Value, key: &str, tz: &ReportTz) -> TaskResolution {
  let name = issue.fetch("fields.resolution.name").text();
  let date = issue.fetch("fields.resolutiondate").text().and_then(|raw| {
    let parsed = parse_wall_clock(&raw, tz);
    if parsed.is_none() {
      warn!(issue = %key, value = %raw, "ignoring unparsable resolution date");
    }
    parsed
  });

  TaskResolution { name, date }
}

pub fn map_task(issue: &Value, tz: &ReportTz) -> Result<Task> {
  let key = issue.fetch("key").text().context("issue without a key")?;

  Ok(Task {
    id: issue.fetch("id").text(),
    summary: issue.fetch("fields.summary").text().unwrap_or_default(),
    assignee: assignee(issue),
    parent_key: issue.fetch("fields.parent.key").text(),
    resolution: resolution(issue, &key, tz),
    key,
  })
}

pub fn map_epic(issue: &Value) -> Result<Epic> {
  let key = issue.fetch("key").text().context("epic without a key")?;

  Ok(Epic {
    summary: issue.fetch("fields.summary").text().unwrap_or_else(|| key.clone()),
    labels: issue.fetch("fields.labels").to::<Vec<String>>().unwrap_or_default(),
    key,
  })
}
