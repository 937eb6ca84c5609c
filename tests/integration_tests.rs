mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use common::{jpeg_bytes, png_bytes};
use predicates::prelude::*;
use std::fs::File;
use zip::ZipArchive;

fn img_shrink() -> Command {
    Command::cargo_bin("img-shrink").unwrap()
}

#[test]
fn test_cli_help() {
    img_shrink()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compress"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_compress_help() {
    img_shrink()
        .args(["compress", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-dimension"));
}

#[test]
fn test_batch_help() {
    img_shrink()
        .args(["batch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-archive"));
}

#[test]
fn test_compress_missing_args() {
    img_shrink().arg("compress").assert().failure();
}

#[test]
fn test_compress_nonexistent_file() {
    img_shrink()
        .args(["compress", "nonexistent.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent.jpg"));
}

#[test]
fn test_compress_rejects_bad_quality() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("a.jpg");
    input.write_binary(&jpeg_bytes(32, 32, 90)).unwrap();

    img_shrink()
        .arg("compress")
        .arg(input.path())
        .args(["-q", "0"])
        .assert()
        .failure();
}

#[test]
fn test_compress_png_writes_jpeg() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("shot.png");
    input.write_binary(&png_bytes(160, 120)).unwrap();
    let out = temp.child("out");

    img_shrink()
        .arg("compress")
        .arg(input.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to"));

    out.child("shot.jpg").assert(predicate::path::is_file());
}

#[test]
fn test_verbose_compress_reports_settings() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("wide.jpg");
    input.write_binary(&jpeg_bytes(300, 100, 100)).unwrap();
    let out = temp.child("out");

    img_shrink()
        .arg("compress")
        .arg(input.path())
        .arg("-o")
        .arg(out.path())
        .args(["--max-dimension", "150", "-q", "75", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Max dimension 150px, starting quality 75, retries 70,55",
        ))
        .stdout(predicate::str::contains("150x50"));

    out.child("wide.jpg").assert(predicate::path::is_file());
}

#[test]
fn test_batch_nonexistent_input() {
    let temp = TempDir::new().unwrap();
    img_shrink()
        .args(["batch", "definitely-not-here"])
        .arg(temp.child("out").path())
        .assert()
        .failure();
}

#[test]
fn test_batch_writes_archive_and_survives_corrupt_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("in");
    input.create_dir_all().unwrap();
    common::create_test_image_files(input.path());
    let out = temp.child("out");

    img_shrink()
        .arg("batch")
        .arg(input.path())
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 3 images compressed. Some failed."))
        .stderr(predicate::str::contains("broken.jpg"));

    let archive_path = out.child("compressed-images.zip");
    archive_path.assert(predicate::path::is_file());
    let archive = ZipArchive::new(File::open(archive_path.path()).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);
}

#[test]
fn test_batch_without_archive_writes_each_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("in");
    input.child("a.png").write_binary(&png_bytes(80, 60)).unwrap();
    input.child("b.jpg").write_binary(&jpeg_bytes(80, 60, 100)).unwrap();
    let out = temp.child("out");

    img_shrink()
        .arg("batch")
        .arg(input.path())
        .arg(out.path())
        .arg("--no-archive")
        .assert()
        .success()
        .stdout(predicate::str::contains("All images compressed successfully!"));

    out.child("compressed-images.zip").assert(predicate::path::missing());
    out.child("b.jpg").assert(predicate::path::is_file());
}

#[test]
fn test_batch_all_corrupt_fails() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("in");
    input.child("x.jpg").write_binary(b"nope").unwrap();
    input.child("y.png").write_binary(b"still nope").unwrap();

    img_shrink()
        .arg("batch")
        .arg(input.path())
        .arg(temp.child("out").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("All compressions failed. Please try again."));

    temp.child("out").assert(predicate::path::missing());
}

#[test]
fn test_quiet_batch_prints_nothing() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("in");
    input.child("a.jpg").write_binary(&jpeg_bytes(64, 64, 100)).unwrap();

    img_shrink()
        .arg("batch")
        .arg(input.path())
        .arg(temp.child("out").path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    temp.child("out").child("a.jpg").assert(predicate::path::is_file());
}
