use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::cycle_time::StatusChangeEvent;
use crate::ext::serde_json::JsonFetch;
use crate::util::{parse_wall_clock, ReportTz};

const STATUS_FIELD: &str = "status";

/// Bulk change logs keyed by issue id. Paginated entries for the same issue
/// are appended in list order.
pub fn index_bulk_changelogs(changelogs: &[Value]) -> HashMap<String, Vec<&Value>> {
  let mut index: HashMap<String, Vec<&Value>> = HashMap::new();

  for log in changelogs {
    let Some(id) = log.fetch("issueId").text() else {
      continue;
    };
    index.entry(id).or_default().extend(log.fetch("changeHistories").items());
  }

  index
}

/// The item a history contributes: the first status item, or the first item
/// when no item names its field.
fn status_item(history: &Value) -> Option<&Value> {
  let items = history.fetch("items").items();

  if let Some(item) = items.iter().find(|i| i.fetch("field").text().as_deref() == Some(STATUS_FIELD)) {
    return Some(item);
  }

  if items.iter().all(|i| !i.fetch("field").is_present()) {
    return items.first();
  }

  None
}

/// Turn change histories into status change events, oldest first.
///
/// Histories without a usable status item or timestamp are skipped.
pub fn status_changes<'a, I>(histories: I, issue_key: &str, tz: &ReportTz) -> Vec<StatusChangeEvent>
where
  I: IntoIterator<Item = &'a Value>,
{
  let mut changes: Vec<StatusChangeEvent> = histories
    .into_iter()
    .filter_map(|history| {
      let created = history.fetch("created").text().unwrap_or_default();

      let Some(timestamp) = parse_wall_clock(&created, tz) else {
        warn!(issue = %issue_key, value = %created, "skipping change history with unparsable timestamp");
        return None;
      };

      let Some(item) = status_item(history) else {
        warn!(issue = %issue_key, at = %created, "skipping change history without a status item");
        return None;
      };

      let Some(to) = item.fetch("to").text() else {
        warn!(issue = %issue_key, at = %created, "skipping status change without a target status");
        return None;
      };

      Some(StatusChangeEvent { timestamp, from: item.fetch("from").text().unwrap_or_default(), to })
    })
    .collect();

  changes.sort_by_key(|c| c.timestamp);
  changes
}
