use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod cli;
mod cycle_time;
mod ext;
mod manifest;
mod model;
mod params;
mod range_processor;
mod render;
mod report;
mod tracker;
mod util;
mod window;

use crate::cli::{normalize, Cli};

/// Logs go to stderr so stdout stays machine-readable JSON.
fn init_tracing() {
  let filter = EnvFilter::try_from_env("CAPEX_LOG")
    .or_else(|_| EnvFilter::try_from_default_env())
    .unwrap_or_else(|_| EnvFilter::new("warn"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .compact()
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing();

  // Phase 1: normalize CLI
  let mut cfg = normalize(cli)?;
  debug!(config = ?cfg, "effective configuration");

  // Phase 2: resolve now and windows
  let now = util::effective_now(cfg.now_override.as_deref(), &cfg.tz)?;
  let windows = window::resolve_windows(&cfg.window, now, &cfg.tz)?;
  cfg.multi_windows = windows.len() > 1;

  // Phase 3: load exports and reconstruct cycle times once for every window
  let projects = tracker::load_projects(&cfg.inputs, &cfg.tz)?
    .iter()
    .map(|p| render::reconstruct_project(p, cfg.label.as_deref(), now))
    .collect::<Result<Vec<_>>>()?;

  // Phase 4: process windows (single or multi) in a unified flow
  range_processor::process_ranges(&cfg, windows, &projects, now)
}
