use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_quorum_flow() {
    let file = common::command_file(&[
        "pos, 7, , , , Mensa",
        "user, , , 1, , alice",
        "user, , , 2, , bob",
        "user, , , 3, , carol",
        "create, 7, 1, , , Good cake",
        "approve, , , 2, 1,",
        "approve, , , 3, 1,",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("posreview"));
    cmd.arg(file.path()).args(["--min-approvals", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,7,1,2,true,Good cake"));
}

#[test]
fn test_self_approval_rejected() {
    let file = common::command_file(&[
        "pos, 7, , , , Mensa",
        "user, , , 1, , alice",
        "create, 7, 1, , , Good cake",
        "approve, , , 1, 1,",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("posreview"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing command"))
        .stderr(predicate::str::contains("self-approval"))
        .stdout(predicate::str::contains("1,7,1,0,false,Good cake"));
}

#[test]
fn test_duplicate_review_rejected() {
    let file = common::command_file(&[
        "pos, 7, , , , Mensa",
        "user, , , 1, , alice",
        "create, 7, 1, , , First impression",
        "create, 7, 1, , , Second opinion",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("posreview"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("duplicate review"))
        .stdout(predicate::str::contains("1,7,1,0,false,First impression"))
        .stdout(predicate::str::contains("Second opinion").not());
}

#[test]
fn test_review_for_unknown_pos_rejected() {
    let file = common::command_file(&[
        "user, , , 1, , alice",
        "create, 9, 1, , , Where am I",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("posreview"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("POS with ID 9 not found"))
        .stdout(predicate::str::contains("Where am I").not());
}

#[test]
fn test_invalid_user_reported_before_missing_review() {
    let file = common::command_file(&["approve, , , 42, ,"]).unwrap();

    let mut cmd = Command::new(cargo_bin!("posreview"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("invalid user"))
        .stderr(predicate::str::contains("not found").not());
}

#[test]
fn test_delete_allows_new_review() {
    let file = common::command_file(&[
        "pos, 7, , , , Mensa",
        "user, , , 1, , alice",
        "create, 7, 1, , , Too sweet",
        "delete, , , , 1",
        "create, 7, 1, , , Actually fine",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("posreview"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2,7,1,0,false,Actually fine"))
        .stdout(predicate::str::contains("Too sweet").not());
}

#[test]
fn test_update_keeps_approvals() {
    let file = common::command_file(&[
        "pos, 7, , , , Mensa",
        "user, , , 1, , alice",
        "user, , , 2, , bob",
        "create, 7, 1, , , Good cake",
        "approve, , , 2, 1,",
        "update, , , , 1, Great cake",
        "update, , , , 9, Ghost review",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("posreview"));
    cmd.arg(file.path()).args(["--min-approvals", "1"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Review with ID 9 not found"))
        .stdout(predicate::str::contains("1,7,1,1,true,Great cake"))
        .stdout(predicate::str::contains("Good cake").not())
        .stdout(predicate::str::contains("Ghost review").not());
}
