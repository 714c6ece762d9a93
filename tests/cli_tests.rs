//! CLI argument validation tests
//!
//! These run the real binary but only cover paths that fail before
//! any external engine would be spawned.

use assert_cmd::Command;
use predicates::prelude::*;

fn clipswap() -> Command {
    Command::cargo_bin("clipswap").unwrap()
}

#[test]
fn help_lists_the_three_pipelines() {
    clipswap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("audio-swap"))
        .stdout(predicate::str::contains("tail-replace"))
        .stdout(predicate::str::contains("head-replace"));
}

#[test]
fn missing_video_file_exits_nonzero() {
    clipswap()
        .args([
            "audio-swap",
            "--video",
            "/no/such/video.mp4",
            "--audio-folder",
            "/no/such/folder",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn missing_candidate_folder_exits_nonzero() {
    let video = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    clipswap()
        .args([
            "head-replace",
            "--video",
            video.path().to_str().unwrap(),
            "--folder",
            "/no/such/folder",
            "--target",
            "10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("directory not found"));
}

#[test]
fn non_numeric_target_is_rejected() {
    clipswap()
        .args([
            "head-replace",
            "--video",
            "whatever.mp4",
            "--folder",
            "somewhere",
            "--target",
            "ten",
        ])
        .assert()
        .failure();
}

#[test]
fn zero_start_time_is_rejected() {
    let upsell = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    clipswap()
        .args([
            "tail-replace",
            "--upsell",
            upsell.path().to_str().unwrap(),
            "--folder",
            "/no/such/folder",
            "--start",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn empty_candidate_folder_exits_nonzero() {
    let video = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    let empty = tempfile::tempdir().unwrap();
    clipswap()
        .args([
            "audio-swap",
            "--video",
            video.path().to_str().unwrap(),
            "--audio-folder",
            empty.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no audio files"));
}

#[test]
fn missing_explicit_config_exits_nonzero() {
    clipswap()
        .args([
            "--config",
            "/no/such/clipswap.toml",
            "audio-swap",
            "--video",
            "v.mp4",
            "--audio-folder",
            "a",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
