use serde::Serialize;

pub const ROLE_GREETER: &str = "Greeter";
pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_PASTOR: &str = "Pastor";

pub const DEFAULT_GROUPS: [&str; 3] = [ROLE_GREETER, ROLE_ADMIN, ROLE_PASTOR];

/// An account acting on the system. The `--user` flag identifies it; an
/// unknown or missing user is treated as anonymous.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub groups: Vec<String>,
}

impl User {
    pub fn in_any_group(&self, names: &[&str]) -> bool {
        self.groups.iter().any(|g| names.contains(&g.as_str()))
    }
}
