use crate::models::person::Person;
use crate::models::service::Service;
use chrono::{DateTime, FixedOffset};

#[derive(Debug, Clone)]
pub struct Attendance {
    pub id: i64,
    pub person_id: i64,
    pub service_id: i64,
    pub checked_in_at: DateTime<FixedOffset>,
    pub notes: String,
}

/// An attendance row joined with its person and service, as printed on tags.
#[derive(Debug, Clone)]
pub struct AttendanceDetail {
    pub attendance: Attendance,
    pub person: Person,
    pub service: Service,
    pub family_name: Option<String>,
}
