//! Kiosk and staff check-in flows.

use crate::config::Config;
use crate::core::audit::AuditEvent;
use crate::core::permissions::{can_access_kiosk, can_print_labels, require};
use crate::core::service::{ensure_weekly_service, get_or_create_today, service_label};
use crate::db::{attendance, families, people, services};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::Attendance;
use crate::models::audit::AuditAction;
use crate::models::family::Family;
use crate::models::person::{MemberType, NewPerson, Person};
use crate::models::service::Service;
use crate::models::user::User;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashSet;

/// Where a check-in came from; stored in the audit metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInSource {
    Checkin,
    Kiosk,
    PrintSelected,
    AdminServiceMissing,
}

impl CheckInSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInSource::Checkin => "checkin",
            CheckInSource::Kiosk => "kiosk",
            CheckInSource::PrintSelected => "print_selected",
            CheckInSource::AdminServiceMissing => "admin_service_missing",
        }
    }
}

/// Kiosk screens or staff-operated check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Kiosk,
    Staff,
}

impl Mode {
    pub fn source(&self) -> CheckInSource {
        match self {
            Mode::Kiosk => CheckInSource::Kiosk,
            Mode::Staff => CheckInSource::Checkin,
        }
    }
}

/// One search hit: a family with all its members, or a lone person.
#[derive(Debug, Clone)]
pub struct MatchGroup {
    pub family: Option<Family>,
    pub members: Vec<Person>,
    pub primary: Person,
}

/// Name search grouped by family.
///
/// The first match of a family yields the whole family with that match as
/// primary; later matches from the same family are skipped.
pub fn search_groups(conn: &Connection, query: &str) -> AppResult<Vec<MatchGroup>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen: HashSet<i64> = HashSet::new();
    let mut groups = Vec::new();

    for person in people::search_by_name(conn, query)? {
        match person.family_id {
            Some(fid) => {
                if !seen.insert(fid) {
                    continue;
                }
                groups.push(MatchGroup {
                    family: families::get_family(conn, fid)?,
                    members: people::people_in_family(conn, fid)?,
                    primary: person,
                });
            }
            None => groups.push(MatchGroup {
                family: None,
                members: vec![person.clone()],
                primary: person,
            }),
        }
    }

    Ok(groups)
}

/// Permission and service checks run when a check-in session starts.
///
/// Kiosk mode needs kiosk access and refuses while today's service is
/// closed. On the service weekday today's service is opened ahead of time.
pub fn start_session(
    conn: &Connection,
    cfg: &Config,
    actor: Option<&User>,
    mode: Mode,
    today: NaiveDate,
) -> AppResult<Option<Service>> {
    match mode {
        Mode::Kiosk => require(can_access_kiosk(actor), "the kiosk requires the Greeter or Admin role")?,
        Mode::Staff => require(can_print_labels(actor), "check-in requires permission to print labels")?,
    }

    if mode == Mode::Kiosk {
        let label = service_label(cfg, today);
        if let Some(existing) = services::find_service(conn, today, &label)? {
            if existing.is_closed() {
                return Err(AppError::ServiceClosed(existing.title()));
            }
        }
    }

    ensure_weekly_service(conn, cfg, today)
}

/// Check a person into `service`, creating the attendance when missing.
///
/// Closed services are refused. The audit event is only written for a new row.
pub fn check_in_to_service(
    conn: &Connection,
    actor: Option<&User>,
    service: &Service,
    person_id: i64,
    source: CheckInSource,
    message: &str,
) -> AppResult<(Attendance, bool)> {
    if service.is_closed() {
        return Err(AppError::ServiceClosed(service.title()));
    }
    let person = people::require_person(conn, person_id)?;
    let (att, created) = attendance::get_or_create(conn, person.id, service.id)?;

    if created {
        AuditEvent::new(AuditAction::CheckIn, actor)
            .service(service.id)
            .person(person.id)
            .attendance(att.id)
            .message(message)
            .metadata(json!({"source": source.as_str()}))
            .record(conn)?;
    }
    Ok((att, created))
}

/// Check a person into today's service.
pub fn check_in_person(
    conn: &Connection,
    cfg: &Config,
    actor: Option<&User>,
    person_id: i64,
    today: NaiveDate,
    source: CheckInSource,
) -> AppResult<Attendance> {
    let (service, _) = get_or_create_today(conn, cfg, today)?;
    let (att, _) = check_in_to_service(conn, actor, &service, person_id, source, "Checked in.")?;
    Ok(att)
}

/// Visitor registration fields as typed at the kiosk.
#[derive(Debug, Clone, Default)]
pub struct VisitorForm {
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub street_address: String,
    pub phone: String,
    pub email: String,
    pub birth_month: String,
    pub birth_day: String,
}

fn parse_birth(raw: &str, max: u32) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|v| (1..=max).contains(v))
}

impl VisitorForm {
    pub fn to_new_person(&self) -> AppResult<NewPerson> {
        let mut p = NewPerson::new(&self.first_name, &self.last_name);
        if p.first_name.is_empty() || p.last_name.is_empty() {
            return Err(AppError::InvalidInput("first and last name are required".into()));
        }
        let middle = self.middle_initial.trim();
        if middle.chars().count() > 1 {
            return Err(AppError::InvalidInput("middle initial must be a single letter".into()));
        }
        p.middle_initial = middle.to_string();
        p.street_address = self.street_address.trim().to_string();
        p.phone = self.phone.trim().to_string();
        p.email = self.email.trim().to_string();
        p.birth_month = parse_birth(&self.birth_month, 12);
        p.birth_day = parse_birth(&self.birth_day, 31);
        p.member_type = MemberType::Visitor;
        Ok(p)
    }
}

/// Register a new visitor and check them into today's service.
pub fn check_in_visitor(
    conn: &Connection,
    cfg: &Config,
    actor: Option<&User>,
    form: &VisitorForm,
    today: NaiveDate,
    source: CheckInSource,
) -> AppResult<Attendance> {
    let new_person = form.to_new_person()?;
    let (service, _) = get_or_create_today(conn, cfg, today)?;
    if service.is_closed() {
        return Err(AppError::ServiceClosed(service.title()));
    }

    let tx = conn.unchecked_transaction()?;
    let person_id = people::insert_person(&tx, &new_person)?;
    let (att, _) = check_in_to_service(&tx, actor, &service, person_id, source, "Visitor registered and checked in.")?;
    tx.commit()?;
    Ok(att)
}

/// Check in the selected people (the primary person when none is selected).
///
/// Returns the attendance ids in input order.
pub fn check_in_selected(
    conn: &Connection,
    cfg: &Config,
    actor: Option<&User>,
    person_ids: &[i64],
    primary: Option<i64>,
    today: NaiveDate,
) -> AppResult<Vec<i64>> {
    let ids: Vec<i64> = if person_ids.is_empty() {
        primary.into_iter().collect()
    } else {
        person_ids.to_vec()
    };
    if ids.is_empty() {
        return Err(AppError::InvalidInput("no people selected".into()));
    }

    let (service, _) = get_or_create_today(conn, cfg, today)?;
    let tx = conn.unchecked_transaction()?;
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let (att, _) = check_in_to_service(&tx, actor, &service, id, CheckInSource::PrintSelected, "Checked in.")?;
        out.push(att.id);
    }
    tx.commit()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::audit::{AuditFilter, list};
    use crate::db::initialize::init_db;
    use crate::db::pool::DbPool;
    use crate::models::user::ROLE_GREETER;

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn greeter(conn: &Connection) -> User {
        let id = crate::db::users::insert_user(conn, "greeter", false, false, true).unwrap();
        User {
            id,
            username: "greeter".into(),
            is_staff: false,
            is_superuser: false,
            is_active: true,
            groups: vec![ROLE_GREETER.into()],
        }
    }

    fn person(conn: &Connection, first: &str, last: &str, family: Option<i64>) -> i64 {
        let mut p = NewPerson::new(first, last);
        p.family_id = family;
        people::insert_person(conn, &p).unwrap()
    }

    fn setup() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        pool
    }

    #[test]
    fn search_groups_by_family() {
        let pool = setup();
        let smith = families::insert_family(&pool.conn, "Smith Family", "").unwrap();
        person(&pool.conn, "Anna", "Smith", Some(smith));
        person(&pool.conn, "Bob", "Smith", Some(smith));
        person(&pool.conn, "Cara", "Smithers", None);

        let groups = search_groups(&pool.conn, "smith").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].primary.first_name, "Anna");
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[0].family.as_ref().unwrap().name, "Smith");
        assert_eq!(groups[1].members.len(), 1);
        assert!(groups[1].family.is_none());

        assert!(search_groups(&pool.conn, "  ").unwrap().is_empty());
    }

    #[test]
    fn check_in_is_idempotent_and_audited_once() {
        let pool = setup();
        let cfg = Config::default();
        let who = greeter(&pool.conn);
        let pid = person(&pool.conn, "Anna", "Smith", None);

        let a = check_in_person(&pool.conn, &cfg, Some(&who), pid, saturday(), CheckInSource::Kiosk).unwrap();
        let b = check_in_person(&pool.conn, &cfg, Some(&who), pid, saturday(), CheckInSource::Kiosk).unwrap();
        assert_eq!(a.id, b.id);

        let rows = list(&pool.conn, &AuditFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metadata["source"], "kiosk");
        assert_eq!(rows[0].attendance_id, Some(a.id));
    }

    #[test]
    fn check_in_times_are_stored_in_utc() {
        let pool = setup();
        let cfg = Config::default();
        let who = greeter(&pool.conn);
        let pid = person(&pool.conn, "Anna", "Smith", None);

        let att = check_in_person(&pool.conn, &cfg, Some(&who), pid, saturday(), CheckInSource::Kiosk).unwrap();
        assert_eq!(att.checked_in_at.offset().local_minus_utc(), 0);

        let (stored, logged): (String, String) = pool
            .conn
            .query_row(
                "SELECT a.checked_in_at, l.created_at FROM attendance a, audit_log l WHERE a.id = ?1",
                [att.id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert!(stored.ends_with('Z'), "{stored}");
        assert!(logged.ends_with('Z'), "{logged}");
    }

    #[test]
    fn closed_service_refuses_check_in() {
        let pool = setup();
        let cfg = Config::default();
        let pid = person(&pool.conn, "Anna", "Smith", None);
        let (svc, _) = get_or_create_today(&pool.conn, &cfg, saturday()).unwrap();
        services::set_status(&pool.conn, svc.id, crate::models::service::ServiceStatus::Closed).unwrap();

        let err = check_in_person(&pool.conn, &cfg, None, pid, saturday(), CheckInSource::Checkin).unwrap_err();
        assert!(matches!(err, AppError::ServiceClosed(_)));

        let who = greeter(&pool.conn);
        let gate = start_session(&pool.conn, &cfg, Some(&who), Mode::Kiosk, saturday());
        assert!(matches!(gate, Err(AppError::ServiceClosed(_))));
    }

    #[test]
    fn kiosk_needs_kiosk_role() {
        let pool = setup();
        let cfg = Config::default();
        assert!(matches!(
            start_session(&pool.conn, &cfg, None, Mode::Kiosk, saturday()),
            Err(AppError::PermissionDenied(_))
        ));
        let who = greeter(&pool.conn);
        let created = start_session(&pool.conn, &cfg, Some(&who), Mode::Kiosk, saturday()).unwrap();
        assert!(created.is_some());
    }

    #[test]
    fn visitor_birth_fields_are_lenient() {
        let pool = setup();
        let cfg = Config::default();
        let form = VisitorForm {
            first_name: " Dana ".into(),
            last_name: "Lee".into(),
            birth_month: "May".into(),
            birth_day: "14".into(),
            ..VisitorForm::default()
        };
        let att = check_in_visitor(&pool.conn, &cfg, None, &form, saturday(), CheckInSource::Kiosk).unwrap();
        let p = people::require_person(&pool.conn, att.person_id).unwrap();
        assert_eq!(p.first_name, "Dana");
        assert_eq!(p.birth_month, None);
        assert_eq!(p.birth_day, Some(14));
        assert_eq!(p.member_type, MemberType::Visitor);

        let bad = VisitorForm {
            first_name: "X".into(),
            ..VisitorForm::default()
        };
        assert!(check_in_visitor(&pool.conn, &cfg, None, &bad, saturday(), CheckInSource::Kiosk).is_err());
    }

    #[test]
    fn selected_falls_back_to_primary_and_keeps_order() {
        let pool = setup();
        let cfg = Config::default();
        let a = person(&pool.conn, "Anna", "Smith", None);
        let b = person(&pool.conn, "Bob", "Jones", None);

        let ids = check_in_selected(&pool.conn, &cfg, None, &[b, a, b], None, saturday()).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], ids[2]);

        let only = check_in_selected(&pool.conn, &cfg, None, &[], Some(a), saturday()).unwrap();
        assert_eq!(only, vec![ids[1]]);

        assert!(check_in_selected(&pool.conn, &cfg, None, &[], None, saturday()).is_err());
    }
}
