use crate::core::settings_store;
use crate::db::users;
use crate::ui::messages::success;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the internal `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Create every domain table with the current schema.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS families (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            name   TEXT NOT NULL,
            notes  TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS people (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name         TEXT NOT NULL,
            middle_initial     TEXT NOT NULL DEFAULT '',
            last_name          TEXT NOT NULL,
            street_address     TEXT NOT NULL DEFAULT '',
            city               TEXT NOT NULL DEFAULT '',
            state_province     TEXT NOT NULL DEFAULT '',
            postal_code        TEXT NOT NULL DEFAULT '',
            country            TEXT NOT NULL DEFAULT 'United States of America',
            phone              TEXT NOT NULL DEFAULT '',
            email              TEXT NOT NULL DEFAULT '',
            notes              TEXT NOT NULL DEFAULT '',
            confidential_notes TEXT NOT NULL DEFAULT '',
            birth_month        INTEGER CHECK(birth_month BETWEEN 1 AND 12),
            birth_day          INTEGER CHECK(birth_day BETWEEN 1 AND 31),
            photo              TEXT,
            member_type        TEXT NOT NULL DEFAULT 'visitor' CHECK(member_type IN ('member','visitor')),
            family_id          INTEGER REFERENCES families(id) ON DELETE SET NULL,
            is_active          INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_people_name  ON people(last_name, first_name);
        CREATE INDEX IF NOT EXISTS idx_people_phone ON people(phone);
        CREATE INDEX IF NOT EXISTS idx_people_email ON people(email);

        CREATE TABLE IF NOT EXISTS tags (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS person_tags (
            person_id  INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
            tag_id     INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (person_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS services (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            date    TEXT NOT NULL,
            label   TEXT NOT NULL DEFAULT 'Sunday Service',
            status  TEXT NOT NULL DEFAULT 'open' CHECK(status IN ('open','closed')),
            notes   TEXT NOT NULL DEFAULT '',
            UNIQUE (date, label)
        );

        CREATE TABLE IF NOT EXISTS attendance (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id      INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
            service_id     INTEGER NOT NULL REFERENCES services(id) ON DELETE CASCADE,
            checked_in_at  TEXT NOT NULL,
            notes          TEXT NOT NULL DEFAULT '',
            CONSTRAINT unique_attendance_per_service UNIQUE (person_id, service_id)
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_service ON attendance(service_id);

        CREATE TABLE IF NOT EXISTS system_settings (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            key          TEXT NOT NULL UNIQUE,
            value        TEXT NOT NULL DEFAULT '',
            description  TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL UNIQUE,
            is_staff      INTEGER NOT NULL DEFAULT 0,
            is_superuser  INTEGER NOT NULL DEFAULT 0,
            is_active     INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS groups (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS user_groups (
            user_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            group_id  INTEGER NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, group_id)
        );

        CREATE TABLE IF NOT EXISTS audit_log (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            action         TEXT NOT NULL,
            actor_id       INTEGER REFERENCES users(id) ON DELETE SET NULL,
            service_id     INTEGER REFERENCES services(id) ON DELETE SET NULL,
            person_id      INTEGER REFERENCES people(id) ON DELETE SET NULL,
            attendance_id  INTEGER REFERENCES attendance(id) ON DELETE SET NULL,
            message        TEXT NOT NULL DEFAULT '',
            metadata       TEXT NOT NULL DEFAULT '{}',
            created_at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_audit_created ON audit_log(created_at);
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        [Local::now().to_rfc3339().as_str(), version, message],
    )?;
    Ok(())
}

/// Services from earlier days start out closed once the status column exists.
fn migrate_close_past_services(conn: &Connection) -> Result<()> {
    let version = "20240301_0008_close_past_services";
    if migration_applied(conn, version)? {
        return Ok(());
    }

    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let closed = conn.execute(
        "UPDATE services SET status = 'closed' WHERE date < ?1",
        [&today],
    )?;

    mark_applied(conn, version, "Closed services dated before the migration")?;
    if closed > 0 {
        success(format!("Migration applied: {version} → closed {closed} past services"));
    }
    Ok(())
}

/// Public entry point: run all pending migrations and seed defaults.
///
/// Invoked by db::initialize::init_db() and `cats db --migrate`.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    let fresh = !table_exists(conn, "people")?;
    create_schema(conn)?;
    if fresh {
        success("Created cats schema.");
    }

    migrate_close_past_services(conn)?;

    settings_store::ensure_default_settings(conn)?;
    settings_store::seed_described_settings(conn)?;
    users::ensure_default_groups(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::DbPool;

    #[test]
    fn migrations_are_idempotent() {
        let pool = DbPool::in_memory().unwrap();
        run_pending_migrations(&pool.conn).unwrap();
        run_pending_migrations(&pool.conn).unwrap();

        let markers: i64 = pool
            .conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(markers, 1);

        let groups: i64 = pool
            .conn
            .query_row("SELECT COUNT(*) FROM groups", [], |r| r.get(0))
            .unwrap();
        assert_eq!(groups, 3);
    }

    #[test]
    fn past_services_are_closed_once() {
        let pool = DbPool::in_memory().unwrap();
        ensure_log_table(&pool.conn).unwrap();
        create_schema(&pool.conn).unwrap();
        pool.conn
            .execute(
                "INSERT INTO services (date, label) VALUES ('2000-01-01', 'Old'), ('2999-01-01', 'Future')",
                [],
            )
            .unwrap();

        run_pending_migrations(&pool.conn).unwrap();

        let status = |label: &str| -> String {
            pool.conn
                .query_row("SELECT status FROM services WHERE label = ?1", [label], |r| r.get(0))
                .unwrap()
        };
        assert_eq!(status("Old"), "closed");
        assert_eq!(status("Future"), "open");

        // Reopening an old service survives later migration runs.
        pool.conn
            .execute("UPDATE services SET status = 'open' WHERE label = 'Old'", [])
            .unwrap();
        run_pending_migrations(&pool.conn).unwrap();
        assert_eq!(status("Old"), "open");
    }
}
