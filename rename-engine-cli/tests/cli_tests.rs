use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("rename-engine").unwrap()
}

#[test]
fn preview_lists_candidates_without_touching_disk() {
    let dir = TempDir::new().unwrap();
    dir.child("report.txt").write_str("x").unwrap();
    dir.child("notes.txt").write_str("x").unwrap();

    cmd()
        .args(["preview", dir.path().to_str().unwrap(), "--search", "report", "--replace", "summary", "--name-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("summary.txt"));

    dir.child("report.txt").assert(predicate::path::exists());
    dir.child("summary.txt").assert(predicate::path::missing());
}

#[test]
fn rename_with_yes_commits_the_match() {
    let dir = TempDir::new().unwrap();
    dir.child("a.txt").write_str("x").unwrap();

    cmd()
        .args(["rename", dir.path().to_str().unwrap(), "--search", "a", "--replace", "z", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed 1 item"));

    dir.child("z.txt").assert(predicate::path::exists());
    dir.child("a.txt").assert(predicate::path::missing());
}

#[test]
fn rename_without_yes_prompts_and_aborts_on_no() {
    let dir = TempDir::new().unwrap();
    dir.child("a.txt").write_str("x").unwrap();

    cmd()
        .args(["rename", dir.path().to_str().unwrap(), "--search", "a", "--replace", "z"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted"));

    dir.child("a.txt").assert(predicate::path::exists());
}

#[test]
fn rename_with_no_matches_exits_with_user_error_code() {
    let dir = TempDir::new().unwrap();
    dir.child("a.txt").write_str("x").unwrap();

    cmd()
        .args(["rename", dir.path().to_str().unwrap(), "--search", "nomatch", "--replace", "z", "--yes"])
        .assert()
        .code(1);
}

#[test]
fn exclude_subfolder_items_limits_rename_to_direct_children() {
    let dir = TempDir::new().unwrap();
    dir.child("a.txt").write_str("x").unwrap();
    dir.child("sub/a.txt").write_str("x").unwrap();

    cmd()
        .args([
            "rename",
            dir.path().to_str().unwrap(),
            "--search",
            "a",
            "--replace",
            "z",
            "--recursive",
            "--exclude-subfolder-items",
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed 1 item"));

    dir.child("z.txt").assert(predicate::path::exists());
    dir.child("sub/a.txt").assert(predicate::path::exists());
}
