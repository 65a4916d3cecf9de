//! Staff reports over a reference service, and the audit trail.

use crate::core::permissions::{can_access_admin_site, can_view_reports, require};
use crate::core::service::reference_service;
use crate::db::audit::{self, AuditFilter};
use crate::db::people;
use crate::errors::AppResult;
use crate::models::audit::AuditEntry;
use crate::models::person::Person;
use crate::models::service::Service;
use crate::models::user::User;
use rusqlite::Connection;

/// People listed for one service. `service` is `None` when no service exists yet.
#[derive(Debug, Clone)]
pub struct PeopleReport {
    pub service: Option<Service>,
    pub people: Vec<Person>,
}

impl PeopleReport {
    /// "<prefix>_<date>.csv", or "<prefix>.csv" without a service.
    pub fn file_name(&self, prefix: &str) -> String {
        match &self.service {
            Some(s) => format!("{prefix}_{}.csv", s.date.format("%Y-%m-%d")),
            None => format!("{prefix}.csv"),
        }
    }
}

/// Active members with no attendance for the service (latest by default).
pub fn missing_members(conn: &Connection, actor: Option<&User>, service_id: Option<i64>) -> AppResult<PeopleReport> {
    require(can_view_reports(actor), "reports require an active staff account")?;
    let service = reference_service(conn, service_id)?;
    let people = match &service {
        Some(s) => people::missing_members(conn, s.id)?,
        None => Vec::new(),
    };
    Ok(PeopleReport { service, people })
}

/// Visitors at the service who never attended an earlier one.
pub fn first_time_visitors(
    conn: &Connection,
    actor: Option<&User>,
    service_id: Option<i64>,
) -> AppResult<PeopleReport> {
    require(can_view_reports(actor), "reports require an active staff account")?;
    let service = reference_service(conn, service_id)?;
    let people = match &service {
        Some(s) => people::first_time_visitors(conn, s)?,
        None => Vec::new(),
    };
    Ok(PeopleReport { service, people })
}

/// Audit rows, newest first.
pub fn audit_trail(conn: &Connection, actor: Option<&User>, filter: &AuditFilter) -> AppResult<Vec<AuditEntry>> {
    require(can_access_admin_site(actor), "the audit log requires admin site access")?;
    Ok(audit::list(conn, filter)?)
}
