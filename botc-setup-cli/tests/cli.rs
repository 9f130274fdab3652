use std::path::PathBuf;
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "botc-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("assets")
}

#[test]
fn cli_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_botc-setup");
    let output_path = temp_path("report");
    let status = Command::new(exe)
        .arg("--assets")
        .arg(assets_dir().join("data"))
        .arg("--script")
        .arg(assets_dir().join("scripts").join("trouble-brewing.json"))
        .args(["--players", "10", "--seed", "7", "--random-setup", "--report", "json", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["num_players"], 10);
    assert_eq!(report["complete"], true);
    assert_eq!(report["bag"].as_array().map(Vec::len), Some(10));
}

#[test]
fn cli_fails_for_missing_script() {
    let exe = env!("CARGO_BIN_EXE_botc-setup");
    let output = Command::new(exe)
        .arg("--assets")
        .arg(assets_dir().join("data"))
        .arg("--script")
        .arg(temp_path("missing-script"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read script"));
}
