use crate::models::setting::SystemSetting;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn map_setting(row: &Row) -> Result<SystemSetting> {
    Ok(SystemSetting {
        id: row.get(0)?,
        key: row.get(1)?,
        value: row.get(2)?,
        description: row.get(3)?,
    })
}

pub fn get(conn: &Connection, key: &str) -> Result<Option<SystemSetting>> {
    conn.query_row(
        "SELECT id, key, value, description FROM system_settings WHERE key = ?1",
        [key],
        map_setting,
    )
    .optional()
}

/// All settings ordered by key.
pub fn list(conn: &Connection) -> Result<Vec<SystemSetting>> {
    let mut stmt =
        conn.prepare_cached("SELECT id, key, value, description FROM system_settings ORDER BY key")?;
    let rows = stmt.query_map([], map_setting)?;
    rows.collect()
}

/// Insert the key with `value`/`description` unless it already exists.
///
/// Returns true when a row was created.
pub fn get_or_create(conn: &Connection, key: &str, value: &str, description: &str) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO system_settings (key, value, description) VALUES (?1, ?2, ?3)",
        params![key, value, description],
    )?;
    Ok(n == 1)
}

/// Write a value, creating the key when it is not stored yet.
pub fn upsert_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO system_settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn fill_blank_description(conn: &Connection, key: &str, description: &str) -> Result<bool> {
    let n = conn.execute(
        "UPDATE system_settings SET description = ?2 WHERE key = ?1 AND trim(description) = ''",
        params![key, description],
    )?;
    Ok(n == 1)
}

pub fn fill_blank_value(conn: &Connection, key: &str, value: &str) -> Result<bool> {
    let n = conn.execute(
        "UPDATE system_settings SET value = ?2 WHERE key = ?1 AND trim(value) = ''",
        params![key, value],
    )?;
    Ok(n == 1)
}
