use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{add_person, add_user, setup_test_db};

#[test]
fn today_opens_a_service_once() {
    let env = setup_test_db("service_today");

    env.admin()
        .args(["service", "today"])
        .assert()
        .success()
        .stdout(contains("Opened Sabbath Service"));
    env.admin()
        .args(["service", "today"])
        .assert()
        .success()
        .stdout(contains("(id 1) is"));

    env.admin()
        .args(["service", "list"])
        .assert()
        .success()
        .stdout(contains("open"));
}

#[test]
fn services_can_be_opened_for_another_date() {
    let env = setup_test_db("service_other_date");

    env.admin()
        .args(["service", "today", "--date", "2020-01-04"])
        .assert()
        .success()
        .stdout(contains("Sabbath Service 01-04-2020"));
    env.admin()
        .args(["service", "today", "--date", "04/01/2020"])
        .assert()
        .failure()
        .stderr(contains("Invalid date"));
}

#[test]
fn close_and_reopen_are_audited() {
    let env = setup_test_db("service_close");
    env.admin().args(["service", "today"]).assert().success();

    env.admin()
        .args(["service", "close", "1"])
        .assert()
        .success()
        .stdout(contains("closed"));
    env.admin().args(["service", "reopen", "1"]).assert().success();

    env.admin()
        .args(["report", "audit", "--action", "service_close"])
        .assert()
        .success()
        .stdout(contains("Service Close"));
    env.admin()
        .args(["report", "audit", "--action", "service_reopen"])
        .assert()
        .success()
        .stdout(contains("Service Reopen"));
}

#[test]
fn show_lists_attendees_missing_and_first_time() {
    let env = setup_test_db("service_show");
    add_person(&env, "Ann", "Lee", "member");
    add_person(&env, "Carl", "Moe", "member");
    env.admin()
        .args(["checkin", "person", "1", "--out", &env.out("t.html")])
        .assert()
        .success();

    env.admin()
        .args(["service", "show", "1"])
        .assert()
        .success()
        .stdout(
            contains("Attendees (1)")
                .and(contains("Missing members (1)"))
                .and(contains("Carl Moe"))
                .and(contains("First-time visitors (0)")),
        );
}

#[test]
fn missing_member_quick_checkin_and_undo() {
    let env = setup_test_db("service_quick_actions");
    add_person(&env, "Ann", "Lee", "member");
    env.admin().args(["service", "today"]).assert().success();

    env.admin()
        .args(["service", "check-in", "1", "1"])
        .assert()
        .success()
        .stdout(contains("attendance 1"));
    env.admin()
        .args(["service", "check-in", "1", "1"])
        .assert()
        .success()
        .stdout(contains("already checked in"));

    env.admin()
        .args(["service", "undo", "1", "1"])
        .assert()
        .success()
        .stdout(contains("Removed Ann Lee"));
    env.admin()
        .args(["service", "counts", "1"])
        .assert()
        .success()
        .stdout(contains("\"attendee_count\": 0").and(contains("\"missing_member_count\": 1")));

    env.admin()
        .args(["report", "audit", "--action", "undo_checkin"])
        .assert()
        .success()
        .stdout(contains("Undo Check-in"));
}

#[test]
fn closed_service_rejects_quick_actions() {
    let env = setup_test_db("service_closed_actions");
    add_person(&env, "Ann", "Lee", "member");
    env.admin().args(["service", "today"]).assert().success();
    env.admin().args(["service", "close", "1"]).assert().success();

    env.admin()
        .args(["service", "check-in", "1", "1"])
        .assert()
        .failure()
        .stderr(contains("Service is closed"));
}

#[test]
fn attendee_export_writes_csv() {
    let env = setup_test_db("service_export");
    add_person(&env, "Ann", "Lee", "member");
    env.admin()
        .args(["checkin", "person", "1", "--out", &env.out("t.html")])
        .assert()
        .success();
    let out = env.out("attendees.csv");

    env.admin()
        .args(["service", "export", "1", "--kind", "attendees", "--file", &out])
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.trim_start_matches('\u{feff}').lines();
    assert!(lines.next().unwrap().starts_with("First Name,Middle Initial,Last Name,Check-in Time,Family"));
    assert!(lines.next().unwrap().starts_with("Ann,,Lee,"));

    // Latest check-in first.
    add_person(&env, "Zed", "Adams", "member");
    env.admin()
        .args(["checkin", "person", "2", "--out", &env.out("t2.html")])
        .assert()
        .success();
    env.admin()
        .args(["service", "export", "1", "--kind", "attendees", "--file", &out, "--force"])
        .assert()
        .success();
    let text = fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = text.trim_start_matches('\u{feff}').lines().skip(1).collect();
    assert!(rows[0].starts_with("Zed,,Adams,"));
    assert!(rows[1].starts_with("Ann,,Lee,"));

    // Existing file without --force is kept when stdin declines.
    env.admin()
        .args(["service", "export", "1", "--kind", "first-time", "--file", &out])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(contains("not overwritten"));
}

#[test]
fn service_screens_need_admin_site_access() {
    let env = setup_test_db("service_roles");
    add_user(&env, "greeter", "Greeter", true);
    env.admin().args(["service", "today"]).assert().success();

    env.cats(Some("greeter"))
        .args(["service", "show", "1"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
    env.cats(Some("greeter"))
        .args(["service", "close", "1"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}
