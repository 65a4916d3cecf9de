use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SystemSetting {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub description: String,
}
