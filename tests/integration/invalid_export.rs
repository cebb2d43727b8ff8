use predicates::prelude::*;
use test_support::{fixture_path, report_cmd};

#[test]
fn malformed_export_reports_schema_violations() {
  report_cmd("2025-02-03T09:00:00")
    .args(["--month", "2025-01", "--input", &fixture_path("invalid-export.json")])
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not a valid tracker export"))
    .stderr(predicate::str::contains("/statuses"));
}

#[test]
fn missing_export_file_is_an_error() {
  report_cmd("2025-02-03T09:00:00")
    .args(["--month", "2025-01", "--input", "/nonexistent/capex/export.json"])
    .assert()
    .failure();
}

#[test]
fn stdin_cannot_be_read_twice() {
  report_cmd("2025-02-03T09:00:00")
    .args(["--month", "2025-01", "--input", "-", "--input", "-"])
    .write_stdin("{}")
    .assert()
    .failure()
    .stderr(predicate::str::contains("can only be given once"));
}
