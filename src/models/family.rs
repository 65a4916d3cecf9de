use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize)]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub notes: String,
}

fn family_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+family\s*$").expect("valid family suffix regex"))
}

/// Trim the name and drop a trailing "family" word ("Smith Family" → "Smith").
pub fn normalize_family_name(name: &str) -> String {
    family_suffix().replace(name.trim(), "").into_owned()
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
