// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build and write the overall manifest for multi-window runs
// role: persistence/manifest
// inputs: input export paths, generated_at, label filter, base_dir, RangeEntry[]
// outputs: manifest.json file written under base_dir
// side_effects: Writes to filesystem
// invariants:
// - manifest contains ranges[] in chronological order of entries provided
// - file paths in entries are relative to base_dir and point to report-<label>.json
// - timestamps are serialized as %Y-%m-%dT%H:%M:%S report wall-clock time
// errors: IO errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde_json::{json, Value};

use crate::util::format_wall;

/// Helper to build and write the overall/top manifest for multi-window runs.
pub struct OverallManifest {
  header: Value,
  ranges: Vec<Value>,
}

impl OverallManifest {
  pub fn new(inputs: &[String], generated_at: NaiveDateTime, label_filter: Option<&str>) -> Self {
    let header = json!({
      "generated_at": format_wall(&generated_at),
      "inputs": inputs,
      "label_filter": label_filter,
    });
    Self { header, ranges: Vec::new() }
  }

  pub fn push_entry(&mut self, entry: &RangeEntry) {
    self.ranges.push(json!({
      "label": entry.label,
      "range": {"start": format_wall(&entry.start), "end": format_wall(&entry.end)},
      "file": entry.file,
    }));
  }

  fn to_value(&self) -> Value {
    let mut v = self.header.clone();
    v["ranges"] = Value::Array(self.ranges.clone());
    v
  }

  pub fn write_to(&self, base_dir: &str) -> Result<PathBuf> {
    let path = Path::new(base_dir).join("manifest.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&self.to_value())?)
      .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEntry {
  pub label: String,
  pub start: NaiveDateTime,
  pub end: NaiveDateTime,
  pub file: String,
}

/// Build and write an overall manifest given pre-computed entries.
pub fn write_overall_manifest(
  inputs: &[String],
  generated_at: NaiveDateTime,
  label_filter: Option<&str>,
  base_dir: &str,
  entries: &[RangeEntry],
) -> Result<PathBuf> {
  let mut overall = OverallManifest::new(inputs, generated_at, label_filter);
  for e in entries {
    overall.push_entry(e);
  }
  overall.write_to(base_dir)
}
