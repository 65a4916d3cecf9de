//! Append-only access to `audit_log`.

use crate::db::like_pattern;
use crate::models::audit::{AuditAction, AuditEntry};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Result, Row, params};
use serde_json::Value;

/// References carried by an audit row. All optional.
#[derive(Debug, Clone, Default)]
pub struct AuditRefs {
    pub actor_id: Option<i64>,
    pub service_id: Option<i64>,
    pub person_id: Option<i64>,
    pub attendance_id: Option<i64>,
}

pub fn insert(
    conn: &Connection,
    action: AuditAction,
    refs: &AuditRefs,
    message: &str,
    metadata: &Value,
) -> Result<i64> {
    // UTC so that text ordering matches time ordering across offset changes.
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let mut stmt = conn.prepare_cached(
        "INSERT INTO audit_log (action, actor_id, service_id, person_id, attendance_id,
                                message, metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    stmt.execute(params![
        action.to_db_str(),
        refs.actor_id,
        refs.service_id,
        refs.person_id,
        refs.attendance_id,
        message,
        metadata.to_string(),
        now,
    ])?;
    Ok(conn.last_insert_rowid())
}

fn map_entry(row: &Row) -> Result<AuditEntry> {
    let raw_meta: String = row.get(10)?;
    let metadata: Value = serde_json::from_str(&raw_meta).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let first: Option<String> = row.get(6)?;
    let middle: Option<String> = row.get(7)?;
    let last: Option<String> = row.get(8)?;
    let person_name = match (first, last) {
        (Some(f), Some(l)) => Some(crate::models::person::full_name(
            &f,
            middle.as_deref().unwrap_or(""),
            &l,
        )),
        _ => None,
    };

    Ok(AuditEntry {
        id: row.get(0)?,
        action: row.get(1)?,
        actor: row.get(2)?,
        service_id: row.get(3)?,
        service_label: row.get(4)?,
        person_id: row.get(5)?,
        person_name,
        attendance_id: row.get(9)?,
        message: row.get(11)?,
        metadata,
        created_at: row.get(12)?,
    })
}

/// Filters for the audit report.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

/// Audit rows newest first.
///
/// `search` matches the message, actor username, person names and
/// service label.
pub fn list(conn: &Connection, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
    let action = filter.action.map(|a| a.to_db_str().to_string());
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);
    let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);

    let mut stmt = conn.prepare_cached(
        "SELECT l.id, l.action, u.username, l.service_id, s.label, l.person_id,
                p.first_name, p.middle_initial, p.last_name, l.attendance_id,
                l.metadata, l.message, l.created_at
         FROM audit_log l
         LEFT JOIN users u ON u.id = l.actor_id
         LEFT JOIN services s ON s.id = l.service_id
         LEFT JOIN people p ON p.id = l.person_id
         WHERE (?1 IS NULL OR l.action = ?1)
           AND (?2 IS NULL
                OR l.message LIKE ?2 ESCAPE '\\'
                OR u.username LIKE ?2 ESCAPE '\\'
                OR p.first_name LIKE ?2 ESCAPE '\\'
                OR p.last_name LIKE ?2 ESCAPE '\\'
                OR s.label LIKE ?2 ESCAPE '\\')
         ORDER BY l.created_at DESC, l.id DESC
         LIMIT ?3",
    )?;
    let rows = stmt.query_map(params![action, search, limit], map_entry)?;
    rows.collect()
}
