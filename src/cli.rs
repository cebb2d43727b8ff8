use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;

use crate::util::{self, ReportTz};
use crate::window::WindowSpec;

#[derive(Parser, Debug)]
#[command(
    name = "capex-report",
    version,
    about = "Derive per-epic, per-person CapEx labor hours from issue tracker status history",
    long_about = None
)]
pub struct Cli {
  /// Tracker export JSON (one per project); "-" reads stdin. Repeatable.
  #[arg(long = "input", value_name = "FILE")]
  pub inputs: Vec<String>,

  /// Calendar month, e.g. 2025-08
  #[arg(long)]
  pub month: Option<String>,

  /// Natural language window, e.g. "last month" or "every month for the last 6 months"
  #[arg(long = "for")]
  pub for_str: Option<String>,

  /// Window start (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS); must be paired with --until
  #[arg(long, alias = "start")]
  pub since: Option<String>,

  /// Window end (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS); must be paired with --since
  #[arg(long, alias = "end")]
  pub until: Option<String>,

  /// Only epics carrying this label form report groups
  #[arg(long)]
  pub label: Option<String>,

  /// Timezone whose wall clock defines days and weekends: local, utc, or an IANA name
  #[arg(long, default_value = "local")]
  pub tz: String,

  /// Output location:
  /// - single window: file path (default stdout "-")
  /// - multi-window runs: base directory (default: auto-named temp dir)
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Embed per-task cycle-time detail in each report
  #[arg(long)]
  pub include_tasks: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
  pub inputs: Vec<String>, // absolute paths for stability; "-" kept as-is
  pub window: WindowSpec,
  pub multi_windows: bool,
  pub label: Option<String>,
  #[serde(skip)]
  pub tz: ReportTz,
  pub out: String,
  pub include_tasks: bool,
  pub now_override: Option<String>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let window = match (&cli.month, &cli.for_str, &cli.since, &cli.until) {
    (Some(ym), None, None, None) => WindowSpec::Month { ym: ym.clone() },
    (None, Some(p), None, None) => WindowSpec::ForPhrase { phrase: p.clone() },
    (None, None, Some(s), Some(u)) => WindowSpec::SinceUntil {
      since: s.clone(),
      until: u.clone(),
    },
    (None, None, None, None) => {
      bail!("Provide one of --month, --for, or (--since AND --until)")
    }
    (None, None, Some(_), None) | (None, None, None, Some(_)) => {
      bail!("--since and --until must be given together")
    }
    _ => bail!("Ambiguous time selection: choose only one of --month | --for | --since/--until"),
  };

  if cli.inputs.is_empty() {
    bail!("Provide at least one --input export file (or - for stdin)");
  }

  let tz: ReportTz = cli.tz.parse()?;

  let inputs = cli
    .inputs
    .iter()
    .map(|p| if p == "-" { p.clone() } else { util::canonicalize_lossy(p) })
    .collect();

  Ok(EffectiveConfig {
    inputs,
    window,
    multi_windows: false, // set once windows are resolved
    label: cli.label.filter(|l| !l.trim().is_empty()),
    tz,
    out: cli.out,
    include_tasks: cli.include_tasks,
    now_override: cli.now_override,
  })
}
