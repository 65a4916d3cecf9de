use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{add_user, setup_test_db};

#[test]
fn defaults_are_seeded() {
    let env = setup_test_db("settings_defaults");

    env.admin()
        .args(["setting", "get", "hide_last_name"])
        .assert()
        .success()
        .stdout(contains("No"));
    env.admin()
        .args(["setting", "get", "admin_skin"])
        .assert()
        .success()
        .stdout(contains("default"));
}

#[test]
fn admin_skin_shows_in_admin_headers() {
    let env = setup_test_db("settings_skin");

    env.admin()
        .args(["setting", "set", "admin_skin", "Minty"])
        .assert()
        .success();

    env.admin()
        .args(["service", "list"])
        .assert()
        .success()
        .stdout(contains("[skin: Minty]"));

    env.admin()
        .args(["setting", "set", "admin_skin", "neon"])
        .assert()
        .failure()
        .stderr(contains("admin_skin"));
}

#[test]
fn colors_are_validated() {
    let env = setup_test_db("settings_colors");

    env.admin()
        .args(["setting", "set", "first_name_color", "#1a2B3c"])
        .assert()
        .success();
    env.admin()
        .args(["setting", "set", "first_name_color", "red"])
        .assert()
        .failure()
        .stderr(contains("first_name_color"));
}

#[test]
fn unchanged_values_are_not_audited() {
    let env = setup_test_db("settings_unchanged");

    env.admin()
        .args(["setting", "set", "hide_last_name", "no"])
        .assert()
        .success()
        .stdout(contains("unchanged"));
    env.admin()
        .args(["report", "audit", "--action", "setting_change"])
        .assert()
        .success()
        .stdout(contains("No audit entries."));
}

#[test]
fn import_is_all_or_nothing() {
    let env = setup_test_db("settings_import");
    env.admin()
        .args(["setting", "set", "welcome_heading", "Hi"])
        .assert()
        .success();
    let bad = env.out("bad.yaml");
    fs::write(&bad, "welcome_heading: Hello\nlabel_last_name_scale: 500\n").unwrap();

    env.admin()
        .args(["setting", "import", &bad])
        .assert()
        .failure()
        .stderr(contains("label_last_name_scale"));
    env.admin()
        .args(["kiosk", "theme"])
        .assert()
        .success()
        .stdout(contains("Hello").not());

    let good = env.out("good.yaml");
    fs::write(
        &good,
        "welcome_heading: Hello\nkiosk_print_iframe: true\nkiosk_logo_path: /elsewhere.png\n",
    )
    .unwrap();
    env.admin()
        .args(["setting", "import", &good])
        .assert()
        .success();
    env.admin()
        .args(["kiosk", "theme"])
        .assert()
        .success()
        .stdout(contains("Welcome heading: Hello"));
    env.admin()
        .args(["setting", "get", "kiosk_logo_path"])
        .assert()
        .success()
        .stdout(contains("elsewhere").not());

    let unknown = env.out("unknown.yaml");
    fs::write(&unknown, "mystery_key: 1\n").unwrap();
    env.admin()
        .args(["setting", "import", &unknown])
        .assert()
        .failure()
        .stderr(contains("mystery_key"));
}

#[test]
fn logo_upload_copies_into_media() {
    let env = setup_test_db("settings_logo");
    let logo = env.out("church.png");
    fs::write(&logo, b"\x89PNG").unwrap();

    env.admin().args(["setting", "logo", &logo]).assert().success();
    env.admin().args(["setting", "logo", &logo]).assert().success();

    env.admin()
        .args(["setting", "get", "kiosk_logo_path"])
        .assert()
        .success()
        .stdout(contains("/media/branding/church_1.png"));
    assert!(env.home.join(".cats/media/branding/church.png").exists());

    let text = env.out("notes.txt");
    fs::write(&text, "x").unwrap();
    env.admin()
        .args(["setting", "logo", &text])
        .assert()
        .failure()
        .stderr(contains("kiosk_logo_path"));
}

#[test]
fn only_admins_manage_settings() {
    let env = setup_test_db("settings_roles");
    add_user(&env, "pastor", "Pastor", true);

    env.cats(Some("pastor"))
        .args(["setting", "set", "welcome_heading", "Hi"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}
