//! Integration tests for the ompt-timeline binary.

use std::io::Write;
use std::process::Stdio;

use crate::common::{TestEnv, sample_log, sample_log_path};

/// Test that the binary produces the report for trace input on stdin.
#[test]
fn test_analyze_from_stdin() {
    let env = TestEnv::new();
    let trace = "\
[OMPT] Thread 0 PARALLEL BEGIN at 100.000 ms (requested threads: 2)
[OMPT] Thread 1 TASK START at 100.200 ms (team size: 2)
[OMPT] Thread 1 ENTER implicit_barrier at 104.000 ms
[OMPT] Thread 0 PARALLEL END at 110.000 ms
[OMPT] Thread 0 TASK FINISH at 120.000 ms (team size: 1)";

    let mut child = env
        .command()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn ompt-timeline");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(trace.as_bytes())
        .expect("Failed to write to stdin");

    let output = child.wait_with_output().expect("Failed to read output");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "ompt-timeline should succeed: {stderr}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OMPT TIMELINE ANALYSIS"), "Should have header");
    assert!(stdout.contains("Source: <stdin>"), "Should name stdin");
    assert!(
        stdout.contains("Region 1: 0.00ms -> 10.00ms (duration: 10.00ms)"),
        "Should list the region: {stdout}"
    );
    assert!(stdout.contains("Overall (all threads combined):"));
}

#[test]
fn test_analyze_from_file() {
    let env = TestEnv::new();
    let output = env
        .command()
        .arg(sample_log_path())
        .arg("--events")
        .output()
        .expect("Failed to run ompt-timeline");

    assert!(output.status.success(), "Should succeed with sample log");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Number of parallel regions: 2"));
    assert!(stdout.contains("TIMELINE OF EVENTS AND ANNOTATIONS"));
    assert!(stdout.contains("Skipped 2 unrecognized OMPT lines"));
    for thread in 0..4 {
        assert!(stdout.contains(&format!("Thread {thread}:")), "thread {thread}");
    }
}

#[test]
fn test_missing_file_fails() {
    let env = TestEnv::new();
    let output = env
        .command()
        .arg("/nonexistent/path/to/trace.log")
        .output()
        .expect("Failed to run ompt-timeline");

    assert!(!output.status.success(), "Should fail with non-existent file");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to read trace /nonexistent/path/to/trace.log"),
        "Should show error message: {stderr}"
    );
}

#[test]
fn test_empty_input_fails() {
    let env = TestEnv::new();
    let mut child = env
        .command()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn ompt-timeline");

    // Close stdin without writing anything
    child.stdin.take().unwrap();

    let output = child.wait_with_output().expect("Failed to read output");
    assert!(!output.status.success(), "Should fail with no trace events");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no trace events found in <stdin>"),
        "Should indicate no trace events: {stderr}"
    );
    assert!(stderr.contains("Trace lines should look like"));
}

#[test]
fn test_json_output() {
    let env = TestEnv::new();
    let output = env
        .command()
        .args(["--format", "json"])
        .arg(sample_log_path())
        .output()
        .expect("Failed to run ompt-timeline");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["threads"], serde_json::json!([0, 1, 2, 3]));
    assert_eq!(json["timeline"]["regions"].as_array().unwrap().len(), 2);
    assert_eq!(json["annotations"][0]["label"], "ROI_START");
    assert!(json["stats"]["overall"]["active"].as_f64().unwrap() > 0.0);
    let intervals = json["timeline"]["intervals"]["1"].as_array().unwrap();
    assert!(!intervals.is_empty());
}

#[test]
fn test_chart_written_per_input() {
    let env = TestEnv::new();
    let second = env.write("second-run.log", &sample_log());
    let charts = env.path("charts");

    let output = env
        .command()
        .arg("--chart-dir")
        .arg(&charts)
        .arg(sample_log_path())
        .arg(&second)
        .output()
        .expect("Failed to run ompt-timeline");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    for name in ["sample.svg", "second-run.svg"] {
        let svg = std::fs::read_to_string(charts.join(name)).unwrap();
        assert!(svg.starts_with("<svg "), "{name}");
        assert!(svg.contains("ROI_START"), "{name}");
    }

    // Reports come out in input order
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.find("sample.log").unwrap();
    let second = stdout.find("second-run.log").unwrap();
    assert!(first < second);
}

#[test]
fn test_charts_with_same_stem_kept_apart() {
    let env = TestEnv::new();
    std::fs::create_dir_all(env.path("a")).unwrap();
    std::fs::create_dir_all(env.path("b")).unwrap();
    let trace = |label: &str| {
        format!(
            "[OMPT_annotation] Thread 0 Annotation at 1.000 ms: {label}\n\
             [OMPT] Thread 0 PARALLEL BEGIN at 1.500 ms (requested threads: 2)\n\
             [OMPT] Thread 0 PARALLEL END at 4.000 ms\n"
        )
    };
    let first = env.write("a/trace.log", &trace("FROM_A"));
    let second = env.write("b/trace.log", &trace("FROM_B"));
    let charts = env.path("charts");

    let output = env
        .command()
        .arg("--chart-dir")
        .arg(&charts)
        .arg(&first)
        .arg(&second)
        .output()
        .expect("Failed to run ompt-timeline");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let mut names: Vec<_> = std::fs::read_dir(&charts)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["trace-2.svg", "trace.svg"]);

    let svg = std::fs::read_to_string(charts.join("trace.svg")).unwrap();
    assert!(svg.contains("FROM_A"));
    let svg = std::fs::read_to_string(charts.join("trace-2.svg")).unwrap();
    assert!(svg.contains("FROM_B"));
}

#[test]
fn test_one_bad_input_still_reports_others() {
    let env = TestEnv::new();
    let output = env
        .command()
        .arg(sample_log_path())
        .arg(env.path("missing.log"))
        .output()
        .expect("Failed to run ompt-timeline");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Number of parallel regions: 2"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.log"), "{stderr}");
}

#[test]
fn test_invalid_config_fails() {
    let env = TestEnv::new();
    let config = env.write("bad.toml", "fine-threshold-ms = -5.0\n");
    let output = env
        .command()
        .arg("--config")
        .arg(&config)
        .arg(sample_log_path())
        .output()
        .expect("Failed to run ompt-timeline");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "{stderr}");
    assert!(stderr.contains("fine-threshold-ms"), "{stderr}");
}

#[test]
fn test_strict_work_end_changes_totals() {
    // Thread 1 hits WORK END while idle: strict mode keeps that span
    let env = TestEnv::new();
    let trace = env.write(
        "work-end.log",
        "\
[OMPT] Thread 0 TASK START at 0.000 ms (team size: 2)
[OMPT] Thread 1 WORK END at 4.000 ms (type: loop, count: 1)
[OMPT] Thread 1 EXIT barrier at 9.000 ms
[OMPT] Thread 0 TASK FINISH at 10.000 ms (team size: 2)
",
    );

    let run = |strict: bool| {
        let mut cmd = env.command();
        cmd.args(["--format", "json"]).arg(&trace);
        if strict {
            cmd.arg("--strict-work-end");
        }
        let output = cmd.output().expect("Failed to run ompt-timeline");
        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        json["stats"]["per_thread"]["1"]["idle_sequential"]
            .as_f64()
            .unwrap()
    };

    assert_eq!(run(false), 0.0);
    assert_eq!(run(true), 4.0);
}
