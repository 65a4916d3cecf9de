#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// A scratch home directory with its own database.
///
/// HOME points here so config and media never touch the real user's files.
pub struct TestEnv {
    pub home: PathBuf,
    pub db: String,
}

impl TestEnv {
    /// `cats --db <db> [--user <user>] ...` running inside this environment.
    pub fn cats(&self, user: Option<&str>) -> Command {
        let mut cmd = cargo_bin_cmd!("cats");
        cmd.env("HOME", &self.home).args(["--db", &self.db]);
        if let Some(u) = user {
            cmd.args(["--user", u]);
        }
        cmd
    }

    pub fn admin(&self) -> Command {
        self.cats(Some("admin"))
    }

    /// Path for an output file inside the scratch directory.
    pub fn out(&self, name: &str) -> String {
        let p = self.home.join(name);
        fs::remove_file(&p).ok();
        p.to_string_lossy().to_string()
    }
}

fn scratch(name: &str) -> TestEnv {
    let home = env::temp_dir().join(format!("cats_test_{name}"));
    fs::remove_dir_all(&home).ok();
    fs::create_dir_all(&home).expect("create scratch dir");
    let db = home.join("cats.sqlite").to_string_lossy().to_string();
    TestEnv { home, db }
}

/// Fresh database with no accounts.
pub fn setup_bare(name: &str) -> TestEnv {
    let env = scratch(name);
    env.cats(None).args(["--test", "init"]).assert().success();
    env
}

/// Fresh database with an `admin` account (staff, Admin role).
pub fn setup_test_db(name: &str) -> TestEnv {
    let env = scratch(name);
    env.cats(None)
        .args(["--test", "init", "--admin", "admin"])
        .assert()
        .success();
    env
}

/// Adds a person through the CLI as admin.
pub fn add_person(env: &TestEnv, first: &str, last: &str, member_type: &str) {
    env.admin()
        .args(["person", "add", "--first", first, "--last", last, "--type", member_type])
        .assert()
        .success();
}

/// Adds an account with one role group.
pub fn add_user(env: &TestEnv, username: &str, group: &str, staff: bool) {
    let mut cmd = env.admin();
    cmd.args(["user", "add", username, "--group", group]);
    if staff {
        cmd.arg("--staff");
    }
    cmd.assert().success();
}
