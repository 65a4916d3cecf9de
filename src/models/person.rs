use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Member,
    Visitor,
}

impl MemberType {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MemberType::Member => "member",
            MemberType::Visitor => "visitor",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "member" => Some(MemberType::Member),
            "visitor" => Some(MemberType::Visitor),
            _ => None,
        }
    }

    /// Helper: parse CLI input (case-insensitive, `m`/`v` accepted)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "m" | "member" => Some(MemberType::Member),
            "v" | "visitor" => Some(MemberType::Visitor),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MemberType::Member => "Member",
            MemberType::Visitor => "Visitor",
        }
    }
}

pub const DEFAULT_COUNTRY: &str = "United States of America";

#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub street_address: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
    pub confidential_notes: String,
    pub birth_month: Option<u32>,
    pub birth_day: Option<u32>,
    pub photo: Option<String>,
    pub member_type: MemberType,
    pub family_id: Option<i64>,
    pub is_active: bool,
}

impl Person {
    /// "First M. Last"
    pub fn display_name(&self) -> String {
        full_name(&self.first_name, &self.middle_initial, &self.last_name)
    }

    /// "First Last", as used by the quick search results.
    pub fn short_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub fn full_name(first: &str, middle: &str, last: &str) -> String {
    if middle.is_empty() {
        format!("{first} {last}")
    } else {
        format!("{first} {middle}. {last}")
    }
}

/// Field values for a new person record.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub street_address: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
    pub birth_month: Option<u32>,
    pub birth_day: Option<u32>,
    pub member_type: MemberType,
    pub family_id: Option<i64>,
    pub is_active: bool,
}

impl NewPerson {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            middle_initial: String::new(),
            last_name: last_name.trim().to_string(),
            street_address: String::new(),
            city: String::new(),
            state_province: String::new(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            phone: String::new(),
            email: String::new(),
            notes: String::new(),
            birth_month: None,
            birth_day: None,
            member_type: MemberType::Visitor,
            family_id: None,
            is_active: true,
        }
    }
}

/// Partial update of a person; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PersonChanges {
    pub first_name: Option<String>,
    pub middle_initial: Option<String>,
    pub last_name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub confidential_notes: Option<String>,
    pub birth_month: Option<Option<u32>>,
    pub birth_day: Option<Option<u32>>,
    pub photo: Option<Option<String>>,
    pub member_type: Option<MemberType>,
    pub family_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

impl PersonChanges {
    pub fn touches_confidential(&self) -> bool {
        self.confidential_notes.is_some()
    }

    pub fn apply(&self, p: &mut Person) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field { p.$field = v.clone(); })*
            };
        }
        set!(
            first_name,
            middle_initial,
            last_name,
            street_address,
            city,
            state_province,
            postal_code,
            country,
            phone,
            email,
            notes,
            confidential_notes,
            birth_month,
            birth_day,
            photo,
            member_type,
            family_id,
            is_active
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_includes_middle_initial() {
        assert_eq!(full_name("Ann", "B", "Cole"), "Ann B. Cole");
        assert_eq!(full_name("Ann", "", "Cole"), "Ann Cole");
    }

    #[test]
    fn member_type_codes() {
        assert_eq!(MemberType::from_code("M"), Some(MemberType::Member));
        assert_eq!(MemberType::from_code(" visitor "), Some(MemberType::Visitor));
        assert_eq!(MemberType::from_code("guest"), None);
    }
}
