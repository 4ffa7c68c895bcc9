use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn stickies_cmd(tmp: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stickies"));
    cmd.env("RUST_LOG", "stickies=warn")
        .arg("--data-dir")
        .arg(notes_dir(tmp))
        .arg("--config")
        .arg(tmp.path().join("stickies.yaml"));
    cmd
}

fn notes_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("notes")
}

fn run_script(tmp: &TempDir, extra: &[&str], script: &str) -> Output {
    let mut child = stickies_cmd(tmp)
        .arg("run")
        .args(extra)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn list_json(tmp: &TempDir) -> serde_json::Value {
    let output = stickies_cmd(tmp).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn test_first_run_creates_default_note() {
    let tmp = TempDir::new().unwrap();

    let output = run_script(&tmp, &[], "");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 note(s) loaded"));

    let dir = notes_dir(&tmp);
    assert!(dir.join("0_state").exists());
    assert_eq!(read(&dir, "0_text"), "");

    let state: serde_json::Value = serde_json::from_str(&read(&dir, "0_state")).unwrap();
    assert_eq!(state["width"], 250.0);
    assert_eq!(state["height"], 180.0);
    assert_eq!(state["fontSize"], 12);
    assert_eq!(state["entryVisible"], true);
    assert_eq!(state["isBold"], false);
    assert_eq!(state["color"], "255,231,110");
}

#[test]
fn test_delete_first_of_three_swaps_last_note_in() {
    let tmp = TempDir::new().unwrap();

    let output = run_script(
        &tmp,
        &["--yes"],
        "text 0 note A\nnew\ntext 1 note B\nnew\ntext 2 note C\ndelete 0\n",
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let dir = notes_dir(&tmp);
    assert_eq!(read(&dir, "0_text"), "note C");
    assert_eq!(read(&dir, "1_text"), "note B");
    assert!(!dir.join("2_state").exists());
    assert!(!dir.join("2_text").exists());

    let listing = list_json(&tmp);
    assert_eq!(listing["notes"].as_array().unwrap().len(), 2);
    assert_eq!(listing["notes"][0]["id"], 0);
    assert_eq!(listing["notes"][1]["id"], 1);
}

#[test]
fn test_delete_needs_yes_when_not_interactive() {
    let tmp = TempDir::new().unwrap();

    let output = run_script(&tmp, &[], "new\ndelete 1\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--yes"));
    assert!(notes_dir(&tmp).join("1_state").exists());
}

#[test]
fn test_bad_lines_do_not_stop_the_session() {
    let tmp = TempDir::new().unwrap();

    let output = run_script(&tmp, &[], "explode\nbold 9\nbold 0\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown command"));
    assert!(stderr.contains("Note not found: 9"));

    let listing = list_json(&tmp);
    assert_eq!(listing["notes"][0]["bold"], true);
}

#[test]
fn test_font_size_never_drops_below_two() {
    let tmp = TempDir::new().unwrap();

    let script = "font 0 -2\n".repeat(8);
    let output = run_script(&tmp, &[], &script);
    assert!(output.status.success());

    let listing = list_json(&tmp);
    assert_eq!(listing["notes"][0]["font_size"], 2);
}

#[test]
fn test_color_is_clamped_and_text_color_derived() {
    let tmp = TempDir::new().unwrap();

    run_script(&tmp, &[], "color 0 300 300 300\n");
    let listing = list_json(&tmp);
    assert_eq!(listing["notes"][0]["color"], "255,255,255");
    assert_eq!(listing["notes"][0]["text_color"], "black");

    run_script(&tmp, &[], "color 0 10 10 10\n");
    let listing = list_json(&tmp);
    assert_eq!(listing["notes"][0]["text_color"], "white");
}

#[test]
fn test_drag_is_clamped_to_screen() {
    let tmp = TempDir::new().unwrap();

    let output = run_script(
        &tmp,
        &["--screen", "800x600"],
        "move 0 -5000 5000\nresize 0 -500 -500\nrelease 0\n",
    );
    assert!(output.status.success());

    let state: serde_json::Value =
        serde_json::from_str(&read(&notes_dir(&tmp), "0_state")).unwrap();
    assert_eq!(state["x"], 0.0);
    assert_eq!(state["y"], 525.0);
    assert_eq!(state["width"], 200.0);
    assert_eq!(state["height"], 75.0);
}

#[test]
fn test_list_stops_at_first_gap() {
    let tmp = TempDir::new().unwrap();
    run_script(&tmp, &[], "new\nnew\nnew\n");

    let dir = notes_dir(&tmp);
    fs::remove_file(dir.join("3_state")).unwrap();
    fs::copy(dir.join("0_state"), dir.join("5_state")).unwrap();

    let listing = list_json(&tmp);
    assert_eq!(listing["notes"].as_array().unwrap().len(), 3);
    assert_eq!(listing["unreachable"], serde_json::json!([5]));

    let output = run_script(&tmp, &[], "");
    assert!(String::from_utf8_lossy(&output.stdout).contains("3 note(s) loaded"));
}

#[test]
fn test_corrupt_state_is_repaired() {
    let tmp = TempDir::new().unwrap();
    let dir = notes_dir(&tmp);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("0_state"), "{{{").unwrap();
    fs::write(dir.join("0_text"), "kept").unwrap();

    let output = run_script(&tmp, &[], "");
    assert!(output.status.success());

    let state: serde_json::Value = serde_json::from_str(&read(&dir, "0_state")).unwrap();
    assert_eq!(state["fontSize"], 12);
    assert_eq!(read(&dir, "0_text"), "kept");
}

#[test]
fn test_config_file_sets_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("stickies.yaml"),
        "default_color: \"20,40,60\"\ndefault_font_size: 18\n",
    )
    .unwrap();

    run_script(&tmp, &[], "");
    let listing = list_json(&tmp);
    assert_eq!(listing["notes"][0]["color"], "20,40,60");
    assert_eq!(listing["notes"][0]["font_size"], 18);
    assert_eq!(listing["notes"][0]["text_color"], "white");
}

#[test]
fn test_hide_and_show_keep_notes() {
    let tmp = TempDir::new().unwrap();

    let output = run_script(&tmp, &[], "text 0 still here\ntoggle\ntoggle\ntoggle\n");
    assert!(output.status.success());
    assert_eq!(read(&notes_dir(&tmp), "0_text"), "still here");
}

#[test]
fn test_list_leaves_records_untouched() {
    let tmp = TempDir::new().unwrap();
    let dir = notes_dir(&tmp);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("0_state"), "{{{").unwrap();
    fs::write(
        dir.join("1_state"),
        r#"{"x":5000,"y":10,"color":"1,2,3","width":300,"height":100,"fontSize":14,"entryVisible":true,"isBold":false}"#,
    )
    .unwrap();

    let output = stickies_cmd(&tmp)
        .args(["list", "--json", "--screen", "800x600"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(listing["malformed"], serde_json::json!([0]));
    assert_eq!(listing["notes"][0]["id"], 1);
    assert_eq!(listing["notes"][0]["position"]["x"], 500.0);
    assert_eq!(read(&dir, "0_state"), "{{{");
    assert!(read(&dir, "1_state").contains("\"x\":5000"));
    assert!(!dir.join("0_text").exists());
    assert!(!dir.join("1_text").exists());
}

#[test]
fn test_list_does_not_create_data_dir() {
    let tmp = TempDir::new().unwrap();

    let output = stickies_cmd(&tmp).arg("list").output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("No notes"));
    assert!(!notes_dir(&tmp).exists());

    let listing = list_json(&tmp);
    assert_eq!(listing["notes"], serde_json::json!([]));
    assert!(!notes_dir(&tmp).exists());
}

#[test]
fn test_unreadable_text_survives_a_session() {
    let tmp = TempDir::new().unwrap();
    run_script(&tmp, &[], "");
    let dir = notes_dir(&tmp);
    let latin1 = b"caf\xe9".to_vec();
    fs::write(dir.join("0_text"), &latin1).unwrap();

    let output = run_script(&tmp, &[], "bold 0\n");
    assert!(output.status.success());
    assert_eq!(fs::read(dir.join("0_text")).unwrap(), latin1);
}
