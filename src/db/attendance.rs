use crate::db::people::{PERSON_COLUMNS, map_person_at};
use crate::db::services::{SERVICE_COLUMNS, map_service_at};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{Attendance, AttendanceDetail};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const PERSON_OFFSET: usize = 5;
const SERVICE_OFFSET: usize = 24;
const FAMILY_OFFSET: usize = 29;

fn map_attendance(row: &Row) -> Result<Attendance> {
    let raw: String = row.get(3)?;
    let checked_in_at = DateTime::parse_from_rfc3339(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Attendance {
        id: row.get(0)?,
        person_id: row.get(1)?,
        service_id: row.get(2)?,
        checked_in_at,
        notes: row.get(4)?,
    })
}

fn map_detail(row: &Row) -> Result<AttendanceDetail> {
    Ok(AttendanceDetail {
        attendance: map_attendance(row)?,
        person: map_person_at(row, PERSON_OFFSET)?,
        service: map_service_at(row, SERVICE_OFFSET)?,
        family_name: row.get(FAMILY_OFFSET)?,
    })
}

fn detail_select() -> String {
    format!(
        "SELECT a.id, a.person_id, a.service_id, a.checked_in_at, a.notes,
                {PERSON_COLUMNS}, {SERVICE_COLUMNS}, f.name
         FROM attendance a
         JOIN people p ON p.id = a.person_id
         JOIN services s ON s.id = a.service_id
         LEFT JOIN families f ON f.id = p.family_id"
    )
}

/// Return the attendance for (person, service), inserting it when missing.
///
/// The second value is true when a row was inserted. The UNIQUE
/// constraint on (person_id, service_id) keeps this idempotent.
pub fn get_or_create(conn: &Connection, person_id: i64, service_id: i64) -> Result<(Attendance, bool)> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO attendance (person_id, service_id, checked_in_at)
         VALUES (?1, ?2, ?3)",
        params![person_id, service_id, now],
    )?;

    let att = conn.query_row(
        "SELECT id, person_id, service_id, checked_in_at, notes
         FROM attendance WHERE person_id = ?1 AND service_id = ?2",
        [person_id, service_id],
        map_attendance,
    )?;
    Ok((att, inserted == 1))
}

pub fn get_detail(conn: &Connection, id: i64) -> Result<Option<AttendanceDetail>> {
    let sql = format!("{} WHERE a.id = ?1", detail_select());
    conn.query_row(&sql, [id], map_detail).optional()
}

pub fn require_detail(conn: &Connection, id: i64) -> AppResult<AttendanceDetail> {
    get_detail(conn, id)?.ok_or_else(|| AppError::not_found("Attendance", id))
}

/// Attendances of a service, latest check-in first, then by name.
pub fn for_service(conn: &Connection, service_id: i64) -> Result<Vec<AttendanceDetail>> {
    let sql = format!(
        "{} WHERE a.service_id = ?1 ORDER BY a.checked_in_at DESC, p.last_name, p.first_name",
        detail_select()
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([service_id], map_detail)?;
    rows.collect()
}

/// Attendances of a service ordered by name, then latest check-in.
pub fn for_service_by_name(conn: &Connection, service_id: i64) -> Result<Vec<AttendanceDetail>> {
    let sql = format!(
        "{} WHERE a.service_id = ?1 ORDER BY p.last_name, p.first_name, a.checked_in_at DESC",
        detail_select()
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([service_id], map_detail)?;
    rows.collect()
}

/// A person's attendance history, most recent service first.
pub fn for_person(conn: &Connection, person_id: i64) -> Result<Vec<AttendanceDetail>> {
    let sql = format!(
        "{} WHERE a.person_id = ?1 ORDER BY s.date DESC, a.checked_in_at DESC",
        detail_select()
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([person_id], map_detail)?;
    rows.collect()
}

pub fn delete_attendance(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM attendance WHERE id = ?1", [id])
}
