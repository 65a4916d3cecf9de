//! Looking up, creating and closing services.

use crate::config::Config;
use crate::core::audit::AuditEvent;
use crate::core::permissions::{can_access_admin_site, require};
use crate::db::services;
use crate::errors::AppResult;
use crate::models::audit::AuditAction;
use crate::models::service::{Service, ServiceStatus};
use crate::models::user::User;
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

/// "<prefix> MM-DD-YYYY", e.g. "Sabbath Service 03-01-2025".
pub fn service_label(cfg: &Config, date: NaiveDate) -> String {
    format!("{} {}", cfg.service_label_prefix, date.format("%m-%d-%Y"))
}

/// The service for `today`, created on first use.
pub fn get_or_create_today(conn: &Connection, cfg: &Config, today: NaiveDate) -> AppResult<(Service, bool)> {
    let label = service_label(cfg, today);
    Ok(services::get_or_create(conn, today, &label)?)
}

/// On the configured service weekday, open today's service ahead of the
/// first check-in. Returns the service when one was created.
pub fn ensure_weekly_service(conn: &Connection, cfg: &Config, today: NaiveDate) -> AppResult<Option<Service>> {
    if today.weekday() != cfg.weekday()? {
        return Ok(None);
    }
    let (service, created) = get_or_create_today(conn, cfg, today)?;
    Ok(created.then_some(service))
}

/// The service reports refer to: the given id, else the most recent one.
pub fn reference_service(conn: &Connection, id: Option<i64>) -> AppResult<Option<Service>> {
    match id {
        Some(id) => Ok(Some(services::require_service(conn, id)?)),
        None => Ok(services::latest_service(conn)?),
    }
}

fn set_status(
    conn: &Connection,
    actor: Option<&User>,
    id: i64,
    status: ServiceStatus,
) -> AppResult<Service> {
    require(can_access_admin_site(actor), "managing services requires admin site access")?;
    let mut service = services::require_service(conn, id)?;

    let (action, message) = match status {
        ServiceStatus::Closed => (AuditAction::ServiceClose, "Service closed from Manage Church Service."),
        ServiceStatus::Open => (AuditAction::ServiceReopen, "Service reopened from Manage Church Service."),
    };

    services::set_status(conn, id, status)?;
    service.status = status;
    AuditEvent::new(action, actor)
        .service(service.id)
        .message(message)
        .record(conn)?;

    Ok(service)
}

pub fn close_service(conn: &Connection, actor: Option<&User>, id: i64) -> AppResult<Service> {
    set_status(conn, actor, id, ServiceStatus::Closed)
}

pub fn reopen_service(conn: &Connection, actor: Option<&User>, id: i64) -> AppResult<Service> {
    set_status(conn, actor, id, ServiceStatus::Open)
}
