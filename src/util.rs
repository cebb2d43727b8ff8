// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for report timezones, timestamp parsing, ordered grouping, percentiles, output dirs, and man page rendering
// role: utilities/helpers
// inputs: Raw timestamp strings; DateTime values; iterators of items; clap CommandFactory
// outputs: Wall-clock NaiveDateTime values, grouped vectors, percentile summaries, directories ensured, man page text
// side_effects: prepare_out_dir creates directories
// invariants:
// - wall-clock conversion never applies a second timezone shift; naive inputs are taken as already local to the report tz
// - group_ordered preserves first-seen key order and in-group item order
// - prepare_out_dir returns an existing directory (either provided or temp timestamped)
// errors: Unknown timezone names and unparsable now overrides surface as anyhow errors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use clap::CommandFactory;
use serde::{Serialize, Serializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Timezone whose wall clock defines calendar days, weekends, and output timestamps.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReportTz {
  Local,
  Utc,
  Named(chrono_tz::Tz),
}

impl FromStr for ReportTz {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    let trimmed = s.trim();

    if trimmed.eq_ignore_ascii_case("local") {
      return Ok(ReportTz::Local);
    }

    if trimmed.eq_ignore_ascii_case("utc") {
      return Ok(ReportTz::Utc);
    }

    trimmed
      .parse::<chrono_tz::Tz>()
      .map(ReportTz::Named)
      .map_err(|e| anyhow!("unknown timezone {trimmed:?} (expected local, utc, or an IANA name): {e}"))
  }
}

impl ReportTz {
  /// Project an absolute instant onto this timezone's wall clock.
  pub fn wall_clock(&self, instant: &DateTime<FixedOffset>) -> NaiveDateTime {
    match self {
      ReportTz::Local => instant.with_timezone(&Local).naive_local(),
      ReportTz::Utc => instant.naive_utc(),
      ReportTz::Named(zone) => instant.with_timezone(zone).naive_local(),
    }
  }

  /// The current instant on this timezone's wall clock.
  pub fn now(&self) -> NaiveDateTime {
    self.wall_clock(&Utc::now().fixed_offset())
  }

  pub fn label(&self) -> String {
    match self {
      ReportTz::Local => "local".to_string(),
      ReportTz::Utc => "utc".to_string(),
      ReportTz::Named(zone) => zone.name().to_string(),
    }
  }
}

/// Parse an offset-bearing timestamp: RFC3339 or the tracker's `2024-01-01T10:00:00.000+0000` form.
pub fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
  let raw = raw.trim();
  DateTime::parse_from_rfc3339(raw)
    .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
    .ok()
}

/// Parse a timestamp into report wall-clock time.
///
/// Offset-bearing timestamps are converted into `tz`; naive timestamps are
/// taken as already expressed in the report timezone.
pub fn parse_wall_clock(raw: &str, tz: &ReportTz) -> Option<NaiveDateTime> {
  if let Some(instant) = parse_instant(raw) {
    return Some(tz.wall_clock(&instant));
  }

  let raw = raw.trim();
  NAIVE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Returns the effective "now" given an optional override.
///
/// Centralizes test determinism so the pipeline never reads the clock directly.
pub fn effective_now(override_now: Option<&str>, tz: &ReportTz) -> Result<NaiveDateTime> {
  match override_now {
    Some(raw) => parse_wall_clock(raw, tz).with_context(|| format!("parsing --now-override {raw:?}")),
    None => Ok(tz.now()),
  }
}

/// Format a wall-clock timestamp the way reports and manifests print it.
pub fn format_wall(dt: &NaiveDateTime) -> String {
  dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// `serialize_with` adapter writing timestamps through [`format_wall`], whole seconds only.
pub fn serialize_wall<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error> {
  serializer.serialize_str(&format_wall(dt))
}

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

/// Group items by key, keeping keys in first-seen order. Items mapped to `None` are dropped.
pub fn group_ordered<T, K, V, F>(items: impl IntoIterator<Item = T>, mut f: F) -> Vec<(K, Vec<V>)>
where
  K: Eq + Hash + Clone,
  F: FnMut(T) -> Option<(K, V)>,
{
  let mut index: HashMap<K, usize> = HashMap::new();
  let mut groups: Vec<(K, Vec<V>)> = Vec::new();

  for item in items {
    let Some((key, value)) = f(item) else { continue };

    match index.get(&key) {
      Some(&slot) => groups[slot].1.push(value),
      None => {
        index.insert(key.clone(), groups.len());
        groups.push((key, vec![value]));
      }
    }
  }

  groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Percentiles {
  pub min: i64,
  pub p15: i64,
  pub p25: i64,
  pub p50: i64,
  pub p75: i64,
  pub p85: i64,
  pub p95: i64,
  pub max: i64,
}

/// Nearest-rank style percentiles (index `floor(len * p)` into the sorted values).
pub fn percentiles(values: &[i64]) -> Option<Percentiles> {
  if values.is_empty() {
    return None;
  }

  let mut sorted = values.to_vec();
  sorted.sort_unstable();
  let len = sorted.len();
  let at = |p: f64| sorted[((len as f64) * p).floor() as usize];

  Some(Percentiles {
    min: sorted[0],
    p15: at(0.15),
    p25: at(0.25),
    p50: at(0.5),
    p75: at(0.75),
    p85: at(0.85),
    p95: at(0.95),
    max: sorted[len - 1],
  })
}

/// Prepare an output directory for multi-window runs.
///
/// - When `out` is not "-", it is treated as the target directory; it will be created if needed.
/// - When `out` is "-", a temp directory is created with a timestamped name.
///   Returns the absolute path as a String.
pub fn prepare_out_dir(out: &str, now: NaiveDateTime) -> Result<String> {
  let dir = if out != "-" {
    out.to_string()
  } else {
    std::env::temp_dir()
      .join(format!("capex-report-{}", now.format("%Y%m%d-%H%M%S")))
      .to_string_lossy()
      .to_string()
  };
  std::fs::create_dir_all(&dir).with_context(|| format!("creating output directory {dir}"))?;

  Ok(dir)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
