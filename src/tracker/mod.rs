// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read tracker export documents, validate them against the embedded schema, and map them into ProjectHistory values
// role: io/tracker-adapter
// inputs: Export file paths ("-" for stdin), report timezone
// outputs: ProjectHistory per input, in input order
// side_effects: Reads files or stdin
// invariants:
// - every document is schema-validated before mapping; all violations are reported together
// - bulk change logs for an issue (all pages, in list order) replace the histories embedded in the issue
// - all timestamps are converted into report wall-clock time
// errors: I/O, JSON, and schema failures carry the source path as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod changelog;
pub mod issue;
pub mod workflow;

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use tracing::info;

use crate::ext::serde_json::JsonFetch;
use crate::model::{IssueHistory, ProjectHistory};
use crate::util::ReportTz;

const EXPORT_SCHEMA: &str = include_str!("export.schema.json");

const STDIN: &str = "-";

fn read_source(source: &str) -> Result<Vec<u8>> {
  if source == STDIN {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf).context("reading export from stdin")?;
    return Ok(buf);
  }

  std::fs::read(source).with_context(|| format!("reading export {source}"))
}

pub fn read_export(source: &str) -> Result<Value> {
  let bytes = read_source(source)?;
  serde_json::from_slice(&bytes).with_context(|| format!("parsing export {source} as JSON"))
}

pub fn validate_export(doc: &Value, source: &str) -> Result<()> {
  let schema: Value = serde_json::from_str(EXPORT_SCHEMA).context("parsing embedded export schema")?;
  let validator = jsonschema::validator_for(&schema).map_err(|e| anyhow!("compiling export schema: {e}"))?;

  let errors: Vec<String> = validator
    .iter_errors(doc)
    .map(|e| format!("{} at {}", e, e.instance_path))
    .collect();

  if !errors.is_empty() {
    bail!("{source} is not a valid tracker export:\n  {}", errors.join("\n  "));
  }

  Ok(())
}

fn project_name(doc: &Value, source: &str) -> String {
  if let Some(name) = doc.fetch("project").text() {
    return name;
  }

  if source == STDIN {
    return "stdin".to_string();
  }

  Path::new(source)
    .file_stem()
    .map(|s| s.to_string_lossy().to_string())
    .unwrap_or_else(|| source.to_string())
}

pub fn map_project(doc: &Value, source: &str, tz: &ReportTz) -> Result<ProjectHistory> {
  let project = project_name(doc, source);
  let statuses = workflow::classify_statuses(doc.fetch("statuses").items());

  let epics = doc
    .fetch("epics")
    .items()
    .iter()
    .map(issue::map_epic)
    .collect::<Result<Vec<_>>>()
    .with_context(|| format!("mapping epics in {source}"))?;

  let bulk = changelog::index_bulk_changelogs(doc.fetch("changelogs").items());

  let issues = doc
    .fetch("issues")
    .items()
    .iter()
    .map(|raw| -> Result<IssueHistory> {
      let task = issue::map_task(raw, tz)?;
      let changes = match task.id.as_deref().and_then(|id| bulk.get(id)) {
        Some(histories) => changelog::status_changes(histories.iter().copied(), &task.key, tz),
        None => changelog::status_changes(raw.fetch("changelog.histories").items(), &task.key, tz),
      };

      Ok(IssueHistory { task, changes })
    })
    .collect::<Result<Vec<_>>>()
    .with_context(|| format!("mapping issues in {source}"))?;

  info!(
    project = %project,
    epics = epics.len(),
    issues = issues.len(),
    started_statuses = statuses.started.len(),
    completed_statuses = statuses.completed.len(),
    "loaded tracker export"
  );

  Ok(ProjectHistory { project, statuses, epics, issues })
}

pub fn read_project(source: &str, tz: &ReportTz) -> Result<ProjectHistory> {
  let doc = read_export(source)?;
  validate_export(&doc, source)?;
  map_project(&doc, source, tz)
}

pub fn load_projects(sources: &[String], tz: &ReportTz) -> Result<Vec<ProjectHistory>> {
  if sources.iter().filter(|s| s.as_str() == STDIN).count() > 1 {
    bail!("stdin (-) can only be given once as --input");
  }

  sources.iter().map(|s| read_project(s, tz)).collect()
}
