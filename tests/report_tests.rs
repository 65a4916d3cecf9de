use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{add_person, add_user, setup_test_db};

fn with_service(name: &str) -> common::TestEnv {
    let env = setup_test_db(name);
    add_person(&env, "Ann", "Lee", "member");
    add_person(&env, "Carl", "Moe", "member");
    env.admin()
        .args(["checkin", "person", "1", "--out", &env.out("tag.html")])
        .assert()
        .success();
    env.admin()
        .args(["checkin", "visitor", "--first", "Bob", "--last", "Ray", "--out", &env.out("v.html")])
        .assert()
        .success();
    env
}

#[test]
fn missing_members_lists_absent_members_only() {
    let env = with_service("report_missing");

    env.admin()
        .args(["report", "missing"])
        .assert()
        .success()
        .stdout(contains("Carl").and(contains("Ann").not()).and(contains("Bob").not()));
}

#[test]
fn missing_members_csv_starts_with_bom() {
    let env = with_service("report_missing_csv");
    let out = env.out("missing.csv");

    env.admin()
        .args(["report", "missing", "--csv", "--file", &out])
        .assert()
        .success()
        .stdout(contains("export completed"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with('\u{feff}'));
    let mut lines = text.trim_start_matches('\u{feff}').lines();
    assert!(lines.next().unwrap().starts_with("First Name,Middle Initial,Last Name"));
    assert!(lines.next().unwrap().starts_with("Carl,,Moe"));
    assert!(lines.next().is_none());
}

#[test]
fn first_time_visitors_report() {
    let env = with_service("report_first_time");

    env.admin()
        .args(["report", "first-time"])
        .assert()
        .success()
        .stdout(contains("Bob").and(contains("Ann").not()));
}

#[test]
fn reports_without_services_are_empty() {
    let env = setup_test_db("report_no_service");

    env.admin()
        .args(["report", "missing"])
        .assert()
        .success()
        .stdout(contains("No services recorded yet."));
}

#[test]
fn reports_need_an_active_staff_account() {
    let env = with_service("report_roles");
    add_user(&env, "greeter", "Greeter", false);
    add_user(&env, "clerk", "Greeter", true);

    env.cats(Some("greeter"))
        .args(["report", "missing"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
    env.cats(Some("clerk")).args(["report", "missing"]).assert().success();

    // The audit log is an admin-site view.
    env.cats(Some("clerk"))
        .args(["report", "audit"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn audit_log_filters_on_action_and_search() {
    let env = with_service("report_audit");

    env.admin()
        .args(["report", "audit", "--action", "checkin", "--search", "Bob"])
        .assert()
        .success()
        .stdout(contains("Visitor registered and checked in.").and(contains("Checked in.").not()));

    env.admin()
        .args(["report", "audit", "--action", "nope"])
        .assert()
        .failure()
        .stderr(contains("unknown audit action"));
}
