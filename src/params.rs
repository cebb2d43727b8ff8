use chrono::NaiveDateTime;

use crate::cli::EffectiveConfig;
use crate::render::ReportParams;
use crate::window::ReportWindow;

pub fn build_report_params(cfg: &EffectiveConfig, window: &ReportWindow, now: NaiveDateTime) -> ReportParams {
  ReportParams {
    window: window.clone(),
    label_filter: cfg.label.clone(),
    include_tasks: cfg.include_tasks,
    tz: cfg.tz,
    now,
  }
}
