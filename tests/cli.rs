#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_diagram-layout"))
}

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("diagram-layout-cli-{}-{name}", std::process::id()))
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn renders_fixture_and_exits_zero() {
    let out = scratch("dipole.svg");
    let status = bin()
        .arg("--scene")
        .arg(fixture("dipole.json"))
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<circle id=\"plus\""));

    let verify = bin().arg("verify").arg(&out).status().unwrap();
    assert_eq!(verify.code(), Some(0));
    let _ = std::fs::remove_file(out);
}

#[test]
fn json_output_follows_contract() {
    let output = bin()
        .arg("--scene")
        .arg(fixture("crowded_labels.json"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["svg"].as_str().unwrap().starts_with("<svg"));
    assert!(value["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn malformed_json_exits_two() {
    let scene = scratch("broken.json");
    std::fs::write(&scene, "{ \"canvas\": { \"width\": 10, ").unwrap();
    let output = bin()
        .arg("--scene")
        .arg(&scene)
        .arg("--out")
        .arg(scratch("broken.svg"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));
    let _ = std::fs::remove_file(scene);
}

#[test]
fn invalid_geometry_exits_one() {
    let scene = scratch("degenerate.json");
    std::fs::write(
        &scene,
        r#"{ "canvas": { "width": 10, "height": 10 },
             "segments": [ { "id": "s", "start": [1, 1], "end": [1, 1] } ] }"#,
    )
    .unwrap();
    let output = bin()
        .arg("--scene")
        .arg(&scene)
        .arg("--out")
        .arg(scratch("degenerate.svg"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("`s`"));
    let _ = std::fs::remove_file(scene);
}

#[test]
fn verify_subcommand_flags_collisions() {
    let svg = scratch("crossing.svg");
    std::fs::write(
        &svg,
        r##"<svg><circle id="wall" cx="150" cy="100" r="20"/><line id="v" x1="50" y1="100" x2="250" y2="100" marker-end="url(#a)"/></svg>"##,
    )
    .unwrap();
    let output = bin().arg("verify").arg(&svg).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning: circle-crossing v:"));
    let _ = std::fs::remove_file(svg);
}
