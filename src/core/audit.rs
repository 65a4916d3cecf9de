//! Recording audit events.

use crate::db::audit::{self, AuditRefs};
use crate::errors::AppResult;
use crate::models::audit::AuditAction;
use crate::models::user::User;
use rusqlite::Connection;
use serde_json::{Map, Value};

/// Builder for one audit row.
///
/// ```ignore
/// AuditEvent::new(AuditAction::CheckIn, actor)
///     .service(service.id)
///     .person(person.id)
///     .message("Checked in.")
///     .record(conn)?;
/// ```
#[derive(Debug, Clone)]
pub struct AuditEvent {
    action: AuditAction,
    refs: AuditRefs,
    message: String,
    metadata: Value,
}

impl AuditEvent {
    /// Only active (authenticated) users are recorded as the actor.
    pub fn new(action: AuditAction, actor: Option<&User>) -> Self {
        let actor_id = actor.filter(|u| u.is_active).map(|u| u.id);
        Self {
            action,
            refs: AuditRefs {
                actor_id,
                ..AuditRefs::default()
            },
            message: String::new(),
            metadata: Value::Object(Map::new()),
        }
    }

    pub fn service(mut self, id: i64) -> Self {
        self.refs.service_id = Some(id);
        self
    }

    pub fn person(mut self, id: i64) -> Self {
        self.refs.person_id = Some(id);
        self
    }

    pub fn attendance(mut self, id: i64) -> Self {
        self.refs.attendance_id = Some(id);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn record(self, conn: &Connection) -> AppResult<i64> {
        Ok(audit::insert(
            conn,
            self.action,
            &self.refs,
            &self.message,
            &self.metadata,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::audit::{AuditFilter, list};
    use crate::db::initialize::init_db;
    use crate::db::pool::DbPool;
    use serde_json::json;

    #[test]
    fn anonymous_and_inactive_actors_are_not_recorded() {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        let uid = crate::db::users::insert_user(&pool.conn, "ghost", true, false, false).unwrap();
        let ghost = crate::db::users::find_by_username(&pool.conn, "ghost").unwrap().unwrap();
        assert_eq!(ghost.id, uid);

        AuditEvent::new(AuditAction::SettingChange, Some(&ghost))
            .message("x")
            .metadata(json!({"key": "label_font"}))
            .record(&pool.conn)
            .unwrap();

        let rows = list(&pool.conn, &AuditFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].actor, None);
        assert_eq!(rows[0].metadata["key"], "label_font");
    }

    #[test]
    fn corrupt_metadata_is_an_error() {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        let id = AuditEvent::new(AuditAction::SettingChange, None)
            .message("x")
            .record(&pool.conn)
            .unwrap();
        pool.conn
            .execute("UPDATE audit_log SET metadata = '{oops' WHERE id = ?1", [id])
            .unwrap();

        let err = list(&pool.conn, &AuditFilter::default()).unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(10, _, _)));
    }
}
