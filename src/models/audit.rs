use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuditAction {
    CheckIn,
    UndoCheckIn,
    PrintNametag,
    ServiceClose,
    ServiceReopen,
    SettingChange,
}

impl AuditAction {
    pub const ALL: [AuditAction; 6] = [
        AuditAction::CheckIn,
        AuditAction::UndoCheckIn,
        AuditAction::PrintNametag,
        AuditAction::ServiceClose,
        AuditAction::ServiceReopen,
        AuditAction::SettingChange,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AuditAction::CheckIn => "checkin",
            AuditAction::UndoCheckIn => "undo_checkin",
            AuditAction::PrintNametag => "print_nametag",
            AuditAction::ServiceClose => "service_close",
            AuditAction::ServiceReopen => "service_reopen",
            AuditAction::SettingChange => "setting_change",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.to_db_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuditAction::CheckIn => "Check-in",
            AuditAction::UndoCheckIn => "Undo Check-in",
            AuditAction::PrintNametag => "Print Nametag",
            AuditAction::ServiceClose => "Service Close",
            AuditAction::ServiceReopen => "Service Reopen",
            AuditAction::SettingChange => "Setting Change",
        }
    }
}

/// A stored audit row with its references resolved to display text.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub action: String,
    pub actor: Option<String>,
    pub service_id: Option<i64>,
    pub service_label: Option<String>,
    pub person_id: Option<i64>,
    pub person_name: Option<String>,
    pub attendance_id: Option<i64>,
    pub message: String,
    pub metadata: Value,
    pub created_at: String,
}
