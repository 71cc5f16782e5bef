use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    Command::cargo_bin("mp3-grabber")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn fetch_rejects_non_http_url() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("mp3-grabber")
        .unwrap()
        .current_dir(dir.path())
        .args(["fetch", "ftp://example.com/video", "--media-dir"])
        .arg(dir.path().join("media"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn config_show_reads_local_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "server:\n  listen_addr: 127.0.0.1:9999\nmedia:\n  bitrate: 256k\n",
    )
    .unwrap();

    Command::cargo_bin("mp3-grabber")
        .unwrap()
        .current_dir(dir.path())
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:9999"))
        .stdout(predicate::str::contains("256k"));
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "media:\n  bitrate: loud\n").unwrap();

    Command::cargo_bin("mp3-grabber")
        .unwrap()
        .current_dir(dir.path())
        .args(["config", "--show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("media.bitrate"));
}
