use serde_json::Value;
use test_support::{fixture_path, report_cmd, stdout_json};

fn read_json(path: &std::path::Path) -> Value {
  let data = std::fs::read(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()));
  serde_json::from_slice(&data).expect("json file")
}

#[test]
fn every_month_run_writes_reports_and_manifest() {
  let outdir = test_support::tempdir();
  let out_path = outdir.path().to_str().unwrap();

  let out = report_cmd("2025-02-03T09:00:00")
    .args([
      "--for",
      "every month for the last 2 months",
      "--label",
      "capex",
      "--input",
      &fixture_path("foo-export.json"),
      "--out",
      out_path,
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let pointer = stdout_json(&out);
  assert_eq!(pointer["dir"], out_path);
  assert_eq!(pointer["manifest"], "manifest.json");

  let manifest = read_json(&outdir.path().join("manifest.json"));
  assert_eq!(manifest["generated_at"], "2025-02-03T09:00:00");
  assert_eq!(manifest["label_filter"], "capex");
  assert!(manifest["inputs"][0].as_str().unwrap().ends_with("foo-export.json"));

  let ranges = manifest["ranges"].as_array().unwrap();
  let labels: Vec<&str> = ranges.iter().map(|r| r["label"].as_str().unwrap()).collect();
  assert_eq!(labels, ["2024-12", "2025-01"]);
  assert_eq!(ranges[0]["range"]["start"], "2024-12-01T00:00:00");
  assert_eq!(ranges[1]["range"]["end"], "2025-02-01T00:00:00");

  for r in ranges {
    let file = r["file"].as_str().unwrap();
    assert!(outdir.path().join(file).exists(), "missing {file}");
  }

  let december = read_json(&outdir.path().join("report-2024-12.json"));
  assert_eq!(december["window"]["label"], "2024-12");
  assert_eq!(december["summary"]["total_hours"], 16);

  let january = read_json(&outdir.path().join("report-2025-01.json"));
  assert_eq!(january["summary"]["total_hours"], 32);
  assert_eq!(january["summary"]["tasks"], 5);
}
