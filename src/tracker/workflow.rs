use serde_json::Value;
use tracing::debug;

use crate::cycle_time::StatusClassification;
use crate::ext::serde_json::JsonFetch;

/// Status category names that mark active work and finished work.
pub const STARTED_CATEGORY: &str = "In Progress";
pub const COMPLETED_CATEGORY: &str = "Done";

/// Split workflow statuses into started/completed id sets by their category.
/// Statuses in any other category (e.g. "To Do") land in neither set.
pub fn classify_statuses(statuses: &[Value]) -> StatusClassification {
  let mut classification = StatusClassification::default();

  for status in statuses {
    let Some(id) = status.fetch("id").text() else { continue };

    match status.fetch("statusCategory.name").text().as_deref() {
      Some(STARTED_CATEGORY) => {
        classification.started.insert(id);
      }
      Some(COMPLETED_CATEGORY) => {
        classification.completed.insert(id);
      }
      _ => {}
    }
  }

  debug!(
    started = classification.started.len(),
    completed = classification.completed.len(),
    "classified workflow statuses"
  );

  classification
}
