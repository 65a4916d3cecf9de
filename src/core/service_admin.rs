//! The "Manage Church Service" screen: attendees, missing members,
//! first-time visitors, quick actions and live counts.

use crate::core::audit::AuditEvent;
use crate::core::checkin::{CheckInSource, check_in_to_service};
use crate::core::permissions::{can_access_admin_site, require};
use crate::core::settings_store::{get_setting, is_truthy};
use crate::db::{attendance, people, services};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{Attendance, AttendanceDetail};
use crate::models::audit::AuditAction;
use crate::models::person::Person;
use crate::models::service::Service;
use crate::models::user::User;
use crate::utils::date::format_checkin;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

fn require_admin(actor: Option<&User>) -> AppResult<()> {
    require(can_access_admin_site(actor), "managing services requires admin site access")
}

#[derive(Debug, Clone)]
pub struct ServiceOverview {
    pub service: Service,
    /// Latest check-in first.
    pub attendees: Vec<AttendanceDetail>,
    pub missing_members: Vec<Person>,
    pub first_time_visitors: Vec<Person>,
    pub auto_print: bool,
    pub iframe_print: bool,
}

pub fn service_overview(conn: &Connection, actor: Option<&User>, id: i64) -> AppResult<ServiceOverview> {
    require_admin(actor)?;
    let service = services::require_service(conn, id)?;

    Ok(ServiceOverview {
        attendees: attendance::for_service(conn, id)?,
        missing_members: people::missing_members(conn, id)?,
        first_time_visitors: people::first_time_visitors(conn, &service)?,
        auto_print: is_truthy(&get_setting(conn, "kiosk_print_mode", "No")?),
        iframe_print: is_truthy(&get_setting(conn, "kiosk_print_iframe", "No")?),
        service,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedPerson {
    pub person_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveAttendee {
    pub attendance_id: i64,
    pub person_id: i64,
    pub name: String,
    pub checked_in_at: String,
}

/// Polled by the service screen to refresh its counters.
#[derive(Debug, Clone, Serialize)]
pub struct LiveCounts {
    pub service_id: i64,
    pub service_label: String,
    pub service_status: String,
    pub attendee_count: usize,
    pub first_time_visitor_count: usize,
    pub first_time_visitors: Vec<NamedPerson>,
    pub missing_member_count: usize,
    pub attendees: Vec<LiveAttendee>,
}

pub fn live_counts(conn: &Connection, actor: Option<&User>, id: i64) -> AppResult<LiveCounts> {
    require_admin(actor)?;
    let service = services::require_service(conn, id)?;
    let attendees = attendance::for_service_by_name(conn, id)?;
    let first_time = people::first_time_visitors(conn, &service)?;
    let missing = people::missing_members(conn, id)?;

    Ok(LiveCounts {
        service_id: service.id,
        service_label: service.label.clone(),
        service_status: service.status.to_db_str().to_string(),
        attendee_count: attendees.len(),
        first_time_visitor_count: first_time.len(),
        first_time_visitors: first_time
            .iter()
            .map(|p| NamedPerson {
                person_id: p.id,
                name: p.display_name(),
            })
            .collect(),
        missing_member_count: missing.len(),
        attendees: attendees
            .iter()
            .map(|d| LiveAttendee {
                attendance_id: d.attendance.id,
                person_id: d.person.id,
                name: d.person.display_name(),
                checked_in_at: format_checkin(&d.attendance.checked_in_at),
            })
            .collect(),
    })
}

/// Quick action: check in a member listed as missing.
pub fn check_in_missing(
    conn: &Connection,
    actor: Option<&User>,
    service_id: i64,
    person_id: i64,
) -> AppResult<(Attendance, bool)> {
    require_admin(actor)?;
    let service = services::require_service(conn, service_id)?;
    check_in_to_service(
        conn,
        actor,
        &service,
        person_id,
        CheckInSource::AdminServiceMissing,
        "Checked in from missing-members quick action.",
    )
}

/// Remove an attendance from the service. The audit row is written first so
/// it can still reference the attendance being deleted.
pub fn undo_checkin(
    conn: &Connection,
    actor: Option<&User>,
    service_id: i64,
    attendance_id: i64,
) -> AppResult<AttendanceDetail> {
    require_admin(actor)?;
    let service = services::require_service(conn, service_id)?;
    if service.is_closed() {
        return Err(AppError::ServiceClosed(service.title()));
    }

    let detail = attendance::get_detail(conn, attendance_id)?
        .filter(|d| d.service.id == service.id)
        .ok_or_else(|| AppError::not_found("Attendance", format!("{attendance_id} in service {service_id}")))?;

    let tx = conn.unchecked_transaction()?;
    AuditEvent::new(AuditAction::UndoCheckIn, actor)
        .service(service.id)
        .person(detail.person.id)
        .attendance(detail.attendance.id)
        .message("Attendance removed from Manage Church Service.")
        .metadata(json!({"source": "admin_service_attendees"}))
        .record(&tx)?;
    attendance::delete_attendance(&tx, attendance_id)?;
    tx.commit()?;

    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::audit::{AuditFilter, list};
    use crate::db::initialize::init_db;
    use crate::db::pool::DbPool;
    use crate::models::person::{MemberType, NewPerson};
    use crate::models::service::ServiceStatus;
    use crate::models::user::ROLE_ADMIN;
    use chrono::NaiveDate;

    struct Fixture {
        pool: DbPool,
        admin: User,
        service: Service,
        member: i64,
        visitor: i64,
    }

    fn setup() -> Fixture {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        let uid = crate::db::users::insert_user(&pool.conn, "admin", true, false, true).unwrap();
        let admin = User {
            id: uid,
            username: "admin".into(),
            is_staff: true,
            is_superuser: false,
            is_active: true,
            groups: vec![ROLE_ADMIN.into()],
        };

        let mut m = NewPerson::new("Maria", "Diaz");
        m.member_type = MemberType::Member;
        m.middle_initial = "J".into();
        let member = people::insert_person(&pool.conn, &m).unwrap();
        let visitor = people::insert_person(&pool.conn, &NewPerson::new("Vic", "Allen")).unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let (service, _) = services::get_or_create(&pool.conn, day, "Sabbath Service 03-01-2025").unwrap();
        Fixture {
            pool,
            admin,
            service,
            member,
            visitor,
        }
    }

    #[test]
    fn missing_member_quick_check_in() {
        let f = setup();
        let overview = service_overview(&f.pool.conn, Some(&f.admin), f.service.id).unwrap();
        assert_eq!(overview.missing_members.len(), 1);

        let (_, created) = check_in_missing(&f.pool.conn, Some(&f.admin), f.service.id, f.member).unwrap();
        assert!(created);
        let (_, again) = check_in_missing(&f.pool.conn, Some(&f.admin), f.service.id, f.member).unwrap();
        assert!(!again);

        let rows = list(&f.pool.conn, &AuditFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message, "Checked in from missing-members quick action.");
        assert_eq!(rows[0].metadata["source"], "admin_service_missing");

        let overview = service_overview(&f.pool.conn, Some(&f.admin), f.service.id).unwrap();
        assert!(overview.missing_members.is_empty());
    }

    #[test]
    fn live_counts_report_first_timers() {
        let f = setup();
        check_in_missing(&f.pool.conn, Some(&f.admin), f.service.id, f.visitor).unwrap();
        check_in_missing(&f.pool.conn, Some(&f.admin), f.service.id, f.member).unwrap();

        let counts = live_counts(&f.pool.conn, Some(&f.admin), f.service.id).unwrap();
        assert_eq!(counts.attendee_count, 2);
        assert_eq!(counts.first_time_visitor_count, 1);
        assert_eq!(counts.first_time_visitors[0].name, "Vic Allen");
        assert_eq!(counts.missing_member_count, 0);
        assert_eq!(counts.service_status, "open");
        // Ordered by last name.
        assert_eq!(counts.attendees[0].name, "Vic Allen");
        assert_eq!(counts.attendees[1].name, "Maria J. Diaz");

        let value = serde_json::to_value(&counts).unwrap();
        assert!(value["attendees"][0]["checked_in_at"].as_str().unwrap().contains(", "));
    }

    #[test]
    fn undo_writes_audit_before_delete() {
        let f = setup();
        let (att, _) = check_in_missing(&f.pool.conn, Some(&f.admin), f.service.id, f.member).unwrap();
        undo_checkin(&f.pool.conn, Some(&f.admin), f.service.id, att.id).unwrap();

        assert!(attendance::get_detail(&f.pool.conn, att.id).unwrap().is_none());
        let undo = list(
            &f.pool.conn,
            &AuditFilter {
                action: Some(AuditAction::UndoCheckIn),
                ..AuditFilter::default()
            },
        )
        .unwrap();
        assert_eq!(undo.len(), 1);
        assert_eq!(undo[0].person_id, Some(f.member));
        // The attendance is gone, so the reference is cleared.
        assert_eq!(undo[0].attendance_id, None);
    }

    #[test]
    fn closed_service_refuses_quick_actions() {
        let f = setup();
        let (att, _) = check_in_missing(&f.pool.conn, Some(&f.admin), f.service.id, f.visitor).unwrap();
        services::set_status(&f.pool.conn, f.service.id, ServiceStatus::Closed).unwrap();

        assert!(matches!(
            check_in_missing(&f.pool.conn, Some(&f.admin), f.service.id, f.member),
            Err(AppError::ServiceClosed(_))
        ));
        assert!(matches!(
            undo_checkin(&f.pool.conn, Some(&f.admin), f.service.id, att.id),
            Err(AppError::ServiceClosed(_))
        ));
    }

    #[test]
    fn undo_requires_matching_service() {
        let f = setup();
        let (att, _) = check_in_missing(&f.pool.conn, Some(&f.admin), f.service.id, f.member).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        let (other, _) = services::get_or_create(&f.pool.conn, other_day, "Other").unwrap();
        assert!(matches!(
            undo_checkin(&f.pool.conn, Some(&f.admin), other.id, att.id),
            Err(AppError::NotFound { .. })
        ));
    }
}
