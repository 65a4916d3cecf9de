use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Open,
    Closed,
}

impl ServiceStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ServiceStatus::Open => "open",
            ServiceStatus::Closed => "closed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(ServiceStatus::Open),
            "closed" => Some(ServiceStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: i64,
    pub date: NaiveDate,
    pub label: String,
    pub status: ServiceStatus,
    pub notes: String,
}

impl Service {
    pub fn is_closed(&self) -> bool {
        self.status == ServiceStatus::Closed
    }

    /// "Label (YYYY-MM-DD)"
    pub fn title(&self) -> String {
        format!("{} ({})", self.label, self.date)
    }
}
