use crate::errors::{AppError, AppResult};
use crate::models::service::{Service, ServiceStatus};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub(crate) const SERVICE_COLUMNS: &str = "s.id, s.date, s.label, s.status, s.notes";

pub(crate) fn map_service_at(row: &Row, offset: usize) -> Result<Service> {
    let date_str: String = row.get(offset + 1)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            offset + 1,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(date_str.clone())),
        )
    })?;

    let status_str: String = row.get(offset + 3)?;
    let status = ServiceStatus::from_db_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            offset + 3,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidInput(format!("Invalid status: {status_str}"))),
        )
    })?;

    Ok(Service {
        id: row.get(offset)?,
        date,
        label: row.get(offset + 2)?,
        status,
        notes: row.get(offset + 4)?,
    })
}

pub fn map_service(row: &Row) -> Result<Service> {
    map_service_at(row, 0)
}

pub fn get_service(conn: &Connection, id: i64) -> Result<Option<Service>> {
    let sql = format!("SELECT {SERVICE_COLUMNS} FROM services s WHERE s.id = ?1");
    conn.query_row(&sql, [id], map_service).optional()
}

pub fn require_service(conn: &Connection, id: i64) -> AppResult<Service> {
    get_service(conn, id)?.ok_or_else(|| AppError::not_found("Service", id))
}

pub fn find_service(conn: &Connection, date: NaiveDate, label: &str) -> Result<Option<Service>> {
    let sql = format!("SELECT {SERVICE_COLUMNS} FROM services s WHERE s.date = ?1 AND s.label = ?2");
    conn.query_row(&sql, params![date.format("%Y-%m-%d").to_string(), label], map_service)
        .optional()
}

/// Return the service for (date, label), creating it when missing.
///
/// The second value is true when a row was inserted.
pub fn get_or_create(conn: &Connection, date: NaiveDate, label: &str) -> Result<(Service, bool)> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO services (date, label) VALUES (?1, ?2)",
        params![date_str, label],
    )?;

    let sql = format!("SELECT {SERVICE_COLUMNS} FROM services s WHERE s.date = ?1 AND s.label = ?2");
    let service = conn.query_row(&sql, params![date_str, label], map_service)?;
    Ok((service, inserted == 1))
}

/// The most recent service: latest date, then label.
pub fn latest_service(conn: &Connection) -> Result<Option<Service>> {
    let sql = format!("SELECT {SERVICE_COLUMNS} FROM services s ORDER BY s.date DESC, s.label ASC LIMIT 1");
    conn.query_row(&sql, [], map_service).optional()
}

/// Services with their attendance counts, newest first.
pub fn list_services(conn: &Connection, limit: Option<usize>) -> Result<Vec<(Service, i64)>> {
    let sql = format!(
        "SELECT {SERVICE_COLUMNS}, (SELECT COUNT(*) FROM attendance a WHERE a.service_id = s.id)
         FROM services s ORDER BY s.date DESC, s.label ASC LIMIT ?1"
    );
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([limit], |r| Ok((map_service(r)?, r.get::<_, i64>(5)?)))?;
    rows.collect()
}

pub fn set_status(conn: &Connection, id: i64, status: ServiceStatus) -> Result<()> {
    conn.execute(
        "UPDATE services SET status = ?2 WHERE id = ?1",
        params![id, status.to_db_str()],
    )?;
    Ok(())
}
