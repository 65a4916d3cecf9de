use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{add_person, add_user, setup_test_db};

fn checked_in(name: &str) -> common::TestEnv {
    let env = setup_test_db(name);
    add_person(&env, "Ann", "Lee", "member");
    add_person(&env, "Bea", "Lee", "member");
    env.admin()
        .args(["checkin", "selected", "--ids", "1,2", "--out", &env.out("first.html")])
        .assert()
        .success();
    env
}

#[test]
fn batch_skips_unknown_ids() {
    let env = checked_in("print_batch");
    let out = env.out("batch.html");

    env.admin()
        .args(["print", "batch", "--ids", "2, x,99,1", "--out", &out])
        .assert()
        .success();

    let html = fs::read_to_string(&out).unwrap();
    assert_eq!(html.matches("class=\"nametag\"").count(), 2);
    assert!(html.find(">Bea<").unwrap() < html.find(">Ann<").unwrap());
}

#[test]
fn empty_batch_is_an_error() {
    let env = checked_in("print_empty");

    env.admin()
        .args(["print", "batch", "--ids", "x,99"])
        .assert()
        .failure()
        .stderr(contains("no printable attendances"));
}

#[test]
fn label_settings_shape_the_tag() {
    let env = checked_in("print_settings");
    env.admin().args(["setting", "set", "hide_last_name", "yes"]).assert().success();
    env.admin().args(["setting", "set", "kiosk_print_mode", "Yes"]).assert().success();
    env.admin()
        .args(["setting", "set", "label_first_name_scale", "150"])
        .assert()
        .success();

    env.admin()
        .args(["print", "tag", "1"])
        .assert()
        .success()
        .stdout(contains("font-size: 72px"))
        .stdout(contains("window.print()"))
        .stdout(contains("class=\"last-name\"").not());
}

#[test]
fn greeters_may_print_but_anonymous_may_not() {
    let env = checked_in("print_roles");
    add_user(&env, "greeter", "Greeter", false);

    env.cats(Some("greeter")).args(["print", "tag", "1"]).assert().success();
    env.cats(None)
        .args(["print", "tag", "1"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn printing_is_audited() {
    let env = checked_in("print_audit");
    env.admin().args(["print", "tag", "1"]).assert().success();

    env.admin()
        .args(["report", "audit", "--action", "print_nametag"])
        .assert()
        .success()
        .stdout(contains("Name tag printed."));
}
