// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve --month, --for, and --since/--until selections into labeled reporting windows
// role: time/windowing
// inputs: WindowSpec, effective "now" in report wall-clock time, report timezone
// outputs: Vec<ReportWindow> in chronological order (one entry unless a multi-bucket phrase was given)
// invariants:
// - every returned window satisfies start < end
// - month windows run from the first of the month to the first of the next month, both at 00:00
// - bare dates resolve to 00:00:00 of that day
// errors: Malformed months, bounds, and unrecognized phrases surface as anyhow errors naming the flag
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_english::{parse_duration, Interval};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use two_timer::{parse as parse_natural, Config as NaturalConfig};

use crate::util::{parse_wall_clock, serialize_wall, ReportTz};

static LAST_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^last\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)$").expect("weekday pattern")
});

static EVERY_MONTH: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^every\s+month\s+for\s+the\s+last\s+(\d+)\s+months?$").expect("monthly pattern"));

static EVERY_WEEK: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^every\s+week\s+for\s+the\s+last\s+(\d+)\s+weeks?$").expect("weekly pattern"));

/// Upper bound on "every month/week for the last N" bucket counts.
const MAX_BUCKETS: u32 = 1000;

/// Label for windows that are not named after a calendar bucket.
pub const SINGLE_WINDOW_LABEL: &str = "window";

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum WindowSpec {
  Month { ym: String },
  ForPhrase { phrase: String },
  SinceUntil { since: String, until: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
  pub label: String,
  #[serde(serialize_with = "serialize_wall")]
  pub start: NaiveDateTime,
  #[serde(serialize_with = "serialize_wall")]
  pub end: NaiveDateTime,
}

impl ReportWindow {
  fn new(label: impl Into<String>, (start, end): (NaiveDateTime, NaiveDateTime)) -> Self {
    Self { label: label.into(), start, end }
  }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
  date.and_time(NaiveTime::MIN)
}

fn first_of_month(dt: NaiveDateTime) -> Result<NaiveDateTime> {
  let date = dt.date().with_day(1).context("computing first of month")?;
  Ok(midnight(date))
}

fn start_of_week(dt: NaiveDateTime) -> NaiveDateTime {
  let offset = dt.weekday().num_days_from_monday() as i64;
  midnight(dt.date() - Duration::days(offset))
}

pub fn month_bounds(year_month: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
  let parts: Vec<&str> = year_month.split('-').collect();

  if parts.len() != 2 {
    bail!("invalid --month, expected YYYY-MM");
  }
  let y: i32 = parts[0].parse().context("parsing year in --month")?;
  let m: u32 = parts[1].parse().context("parsing month in --month")?;

  let Some(first) = NaiveDate::from_ymd_opt(y, m, 1) else {
    bail!("invalid month in --month");
  };
  let next = first.checked_add_months(Months::new(1)).context("month out of range in --month")?;

  Ok((midnight(first), midnight(next)))
}

/// Parse a --since/--until value: a bare `YYYY-MM-DD` date, a naive timestamp, or an offset timestamp.
pub fn parse_window_bound(raw: &str, tz: &ReportTz) -> Result<NaiveDateTime> {
  let trimmed = raw.trim();

  if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
    return Ok(midnight(date));
  }

  parse_wall_clock(trimmed, tz)
    .with_context(|| format!("invalid window bound {raw:?}, expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"))
}

fn last_month_range(now: NaiveDateTime) -> Result<(NaiveDateTime, NaiveDateTime)> {
  let this_month = first_of_month(now)?;
  let last_month = this_month.checked_sub_months(Months::new(1)).context("computing last month")?;
  Ok((last_month, this_month))
}

fn weeks_before(dt: NaiveDateTime, weeks: i64) -> Result<NaiveDateTime> {
  dt.checked_sub_signed(Duration::weeks(weeks)).context("week offset out of range")
}

fn last_week_range(now: NaiveDateTime) -> Result<(NaiveDateTime, NaiveDateTime)> {
  let this_week = start_of_week(now);
  Ok((weeks_before(this_week, 1)?, this_week))
}

fn weekday_named(name: &str) -> Option<Weekday> {
  name.parse::<Weekday>().ok()
}

fn shift_months(now: NaiveDateTime, months: i32) -> Result<NaiveDateTime> {
  let span = Months::new(months.unsigned_abs());
  let shifted = if months < 0 { now.checked_sub_months(span) } else { now.checked_add_months(span) };
  shifted.context("month offset out of range")
}

fn ordered(a: NaiveDateTime, b: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
  if a <= b { (a, b) } else { (b, a) }
}

/// Compute a single range for a natural-language phrase relative to `now`.
fn for_phrase_bounds(input: &str, now: NaiveDateTime) -> Result<(NaiveDateTime, NaiveDateTime)> {
  let phrase = input.trim().to_lowercase();

  if phrase == "today" {
    return Ok((midnight(now.date()), now));
  }

  if phrase == "yesterday" {
    return Ok((now - Duration::days(1), now));
  }

  // previous calendar week, Monday to Monday
  if phrase == "last week" {
    return last_week_range(now);
  }

  if phrase == "last month" {
    return last_month_range(now);
  }

  // strictly previous occurrence, never today
  if let Some(target) = LAST_WEEKDAY.captures(&phrase).and_then(|c| weekday_named(&c[1])) {
    let today = midnight(now.date());
    let mut delta = today.weekday().num_days_from_monday() as i64 - target.num_days_from_monday() as i64;
    if delta <= 0 {
      delta += 7;
    }

    return Ok((today - Duration::days(delta), now));
  }

  // durations ("3 weeks ago", "10 minutes") before the calendar parser
  if let Ok(interval) = parse_duration(&phrase) {
    let other = match interval {
      Interval::Seconds(secs) => now.checked_add_signed(Duration::seconds(secs.into())),
      Interval::Days(days) => now.checked_add_signed(Duration::days(days.into())),
      Interval::Months(months) => Some(shift_months(now, months)?),
    }
    .context("duration out of range")?;

    return Ok(ordered(now, other));
  }

  let config = NaturalConfig::new().now(now);
  if let Ok((start, end, _)) = parse_natural(&phrase, Some(config)) {
    return Ok((start, end.min(now)));
  }

  bail!("unrecognized --for phrase {input:?}")
}

fn bucket_count(raw: &str) -> Result<u32> {
  let n: u32 = raw.parse().context("parsing bucket count in --for")?;
  if n > MAX_BUCKETS {
    bail!("--for asks for {n} buckets, at most {MAX_BUCKETS} are supported");
  }
  Ok(n)
}

/// Labeled, chronological buckets for "every month/week for the last N" phrases; None otherwise.
pub fn for_phrase_buckets(input: &str, now: NaiveDateTime) -> Result<Option<Vec<ReportWindow>>> {
  let phrase = input.trim().to_lowercase();

  if let Some(caps) = EVERY_MONTH.captures(&phrase) {
    let n = bucket_count(&caps[1])?;
    let mut cursor = first_of_month(now)?;
    let mut out = Vec::new();

    for _ in 0..n {
      let start = cursor.checked_sub_months(Months::new(1)).context("computing monthly bucket")?;
      let label = format!("{:04}-{:02}", start.year(), start.month());
      out.push(ReportWindow::new(label, (start, cursor)));
      cursor = start;
    }

    out.reverse();
    return Ok(Some(out));
  }

  if let Some(caps) = EVERY_WEEK.captures(&phrase) {
    let n = bucket_count(&caps[1])?;
    let mut cursor = start_of_week(now);
    let mut out = Vec::new();

    for _ in 0..n {
      let start = weeks_before(cursor, 1).context("computing weekly bucket")?;
      let iso = start.date().iso_week();
      out.push(ReportWindow::new(format!("{}-W{:02}", iso.year(), iso.week()), (start, cursor)));
      cursor = start;
    }

    out.reverse();
    return Ok(Some(out));
  }

  Ok(None)
}

/// Resolve a window selection into one or more labeled windows.
pub fn resolve_windows(spec: &WindowSpec, now: NaiveDateTime, tz: &ReportTz) -> Result<Vec<ReportWindow>> {
  let windows = match spec {
    WindowSpec::Month { ym } => vec![ReportWindow::new(ym.clone(), month_bounds(ym)?)],
    WindowSpec::SinceUntil { since, until } => {
      let start = parse_window_bound(since, tz).context("parsing --since")?;
      let end = parse_window_bound(until, tz).context("parsing --until")?;
      vec![ReportWindow::new(SINGLE_WINDOW_LABEL, (start, end))]
    }
    WindowSpec::ForPhrase { phrase } => match for_phrase_buckets(phrase, now)? {
      Some(buckets) => buckets,
      None => vec![ReportWindow::new(SINGLE_WINDOW_LABEL, for_phrase_bounds(phrase, now)?)],
    },
  };

  if windows.is_empty() {
    bail!("window selection produced no windows");
  }

  if windows.iter().any(|w| w.start >= w.end) {
    bail!("Start date must be before end date");
  }

  Ok(windows)
}
