use predicates::prelude::*;
use serde_json::{json, Value};
use test_support::{fixture_path, read_fixture_text, report_cmd, stdout_json};

const NOW: &str = "2025-02-03T09:00:00";

fn january(extra: &[&str]) -> Value {
  let out = report_cmd(NOW)
    .args(["--month", "2025-01", "--input", &fixture_path("foo-export.json")])
    .args(extra)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  stdout_json(&out)
}

fn row<'a>(v: &'a Value, group: &str, assignee: &str) -> &'a Value {
  v["rows"]
    .as_array()
    .unwrap()
    .iter()
    .find(|r| r["group_key"] == group && r["assignee"] == assignee)
    .unwrap_or_else(|| panic!("no row for {group}/{assignee} in {}", v["rows"]))
}

#[test]
fn labeled_month_report_rows_and_summary() {
  let v = january(&["--label", "capex"]);

  assert_eq!(v["projects"], json!(["FOO"]));
  assert_eq!(v["timezone"], "utc");
  assert_eq!(v["generated_at"], "2025-02-03T09:00:00");
  assert_eq!(v["label_filter"], "capex");
  assert!(v.get("tasks").is_none());

  let rows = v["rows"].as_array().unwrap();
  assert_eq!(rows.len(), 2);

  let bob = row(&v, "FOO-1", "Bob");
  assert_eq!(bob["group_label"], "Billing");
  assert_eq!(bob["hours_worked"], 22);
  assert_eq!(bob["first_task_started"], "2025-01-02T09:00:00");
  // open task clamped to the window end
  assert_eq!(bob["last_task_completed"], "2025-02-01T00:00:00");

  let ann = row(&v, "FOO-1", "Ann");
  assert_eq!(ann["hours_worked"], 10);
  assert_eq!(ann["first_task_started"], "2025-01-06T09:00:00");
  assert_eq!(ann["last_task_completed"], "2025-01-13T10:00:00");

  let summary = &v["summary"];
  assert_eq!(summary["rows"], 2);
  assert_eq!(summary["groups"], 1);
  assert_eq!(summary["assignees"], 2);
  assert_eq!(summary["tasks"], 5);
  assert_eq!(summary["total_hours"], 32);
  assert_eq!(
    summary["cycle_time_hours"],
    json!({"min": 1, "p15": 1, "p25": 2, "p50": 7, "p75": 24, "p85": 95, "p95": 95, "max": 95})
  );
}

#[test]
fn unlabeled_report_groups_under_every_epic() {
  let v = january(&[]);

  assert!(v.get("label_filter").is_none());
  assert_eq!(v["rows"].as_array().unwrap().len(), 3);
  assert_eq!(row(&v, "FOO-1", "Bob")["hours_worked"], 22);
  assert_eq!(row(&v, "FOO-1", "Ann")["hours_worked"], 10);

  let support = row(&v, "FOO-10", "Ann");
  assert_eq!(support["group_label"], "Support");
  assert_eq!(support["hours_worked"], 3);
  assert_eq!(support["first_task_started"], "2025-01-09T13:00:00");
  assert_eq!(support["last_task_completed"], "2025-01-09T16:00:00");

  assert_eq!(v["summary"]["groups"], 2);
  assert_eq!(v["summary"]["tasks"], 6);
  assert_eq!(v["summary"]["total_hours"], 35);
}

#[test]
fn include_tasks_lists_task_detail() {
  let v = january(&["--label", "capex", "--include-tasks"]);

  let tasks = v["tasks"].as_array().expect("tasks array");
  let mut keys: Vec<&str> = tasks.iter().map(|t| t["key"].as_str().unwrap()).collect();
  keys.sort_unstable();
  assert_eq!(keys, ["FOO-2", "FOO-3", "FOO-4", "FOO-7", "FOO-9"]);

  let by_key = |k: &str| tasks.iter().find(|t| t["key"] == k).unwrap();

  let invoice = by_key("FOO-2");
  assert_eq!(invoice["project"], "FOO");
  assert_eq!(invoice["summary"], "Invoice PDFs");
  assert_eq!(invoice["assignee"], "Bob");
  assert_eq!(invoice["group_key"], "FOO-1");
  assert_eq!(invoice["date_started"], "2025-01-02T09:00:00");
  assert_eq!(invoice["date_completed"], "2025-01-02T15:00:00");
  assert_eq!(invoice["hours_worked"], 7);

  let open = by_key("FOO-4");
  assert_eq!(open["date_completed"], "2025-02-01T00:00:00");
  assert_eq!(open["hours_worked"], 95);

  // unassigned work still counts toward cycle-time statistics
  assert!(by_key("FOO-7")["assignee"].is_null());
}

#[test]
fn previous_month_picks_up_task_started_before_new_year() {
  let out = report_cmd(NOW)
    .args(["--month", "2024-12", "--label", "capex", "--include-tasks", "--input", &fixture_path("foo-export.json")])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let v = stdout_json(&out);

  let rows = v["rows"].as_array().unwrap();
  assert_eq!(rows.len(), 1);
  let ann = row(&v, "FOO-1", "Ann");
  assert_eq!(ann["hours_worked"], 16);
  assert_eq!(ann["first_task_started"], "2024-12-30T09:00:00");
  assert_eq!(ann["last_task_completed"], "2025-01-01T00:00:00");

  let tasks = v["tasks"].as_array().unwrap();
  assert_eq!(tasks.len(), 1);
  assert_eq!(tasks[0]["key"], "FOO-8");
  assert_eq!(tasks[0]["hours_worked"], 72);
}

#[test]
fn multiple_inputs_concatenate_projects_in_order() {
  let out = report_cmd(NOW)
    .args([
      "--month",
      "2025-01",
      "--label",
      "capex",
      "--input",
      &fixture_path("foo-export.json"),
      "--input",
      &fixture_path("bar-export.json"),
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let v = stdout_json(&out);

  assert_eq!(v["projects"], json!(["FOO", "BAR"]));
  let rows = v["rows"].as_array().unwrap();
  assert_eq!(rows.len(), 3);

  let platform = &rows[2];
  assert_eq!(platform["group_key"], "BAR-1");
  assert_eq!(platform["group_label"], "Platform");
  // no display name, so the account id identifies the assignee
  assert_eq!(platform["assignee"], "a-cy");
  assert_eq!(platform["hours_worked"], 4);
  assert_eq!(platform["first_task_started"], "2025-01-14T09:00:00");
  assert_eq!(platform["last_task_completed"], "2025-01-14T13:00:00");

  assert_eq!(v["summary"]["groups"], 2);
  assert_eq!(v["summary"]["total_hours"], 36);
}

#[test]
fn stdin_input_reads_the_export() {
  let out = report_cmd(NOW)
    .args(["--month", "2025-01", "--label", "capex", "--input", "-"])
    .write_stdin(read_fixture_text("foo-export.json"))
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let v = stdout_json(&out);
  assert_eq!(v["projects"], json!(["FOO"]));
  assert_eq!(v["summary"]["total_hours"], 32);
}

#[test]
fn missing_label_is_an_error() {
  report_cmd(NOW)
    .args(["--month", "2025-01", "--label", "opex", "--input", &fixture_path("foo-export.json")])
    .assert()
    .failure()
    .stderr(predicate::str::contains("FOO has no epics with the label opex"));
}

#[test]
fn out_file_receives_the_report() {
  let td = test_support::tempdir();
  let target = td.path().join("reports/jan.json");

  report_cmd(NOW)
    .args(["--month", "2025-01", "--label", "capex", "--input", &fixture_path("foo-export.json")])
    .args(["--out", target.to_str().unwrap()])
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let v: Value = serde_json::from_slice(&std::fs::read(&target).unwrap()).unwrap();
  assert_eq!(v["window"]["label"], "2025-01");
  assert_eq!(v["summary"]["total_hours"], 32);
}
