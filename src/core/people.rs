//! Staff-facing people, family and tag management.

use crate::core::checkin::search_groups;
use crate::core::permissions::{
    can_access_admin_site, can_view_confidential_notes, is_active_staff, require,
};
use crate::db::log::oplog;
use crate::db::{attendance, families, people};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceDetail;
use crate::models::family::{Family, Tag};
use crate::models::person::{NewPerson, Person, PersonChanges};
use crate::models::user::User;
use rusqlite::Connection;
use serde::Serialize;

/// Quick searches ignore queries shorter than this.
pub const QUICK_SEARCH_MIN_CHARS: usize = 3;
pub const QUICK_SEARCH_LIMIT: usize = 12;

fn require_staff(actor: Option<&User>) -> AppResult<()> {
    require(is_active_staff(actor), "staff views require an active staff account")
}

fn require_admin(actor: Option<&User>) -> AppResult<()> {
    require(can_access_admin_site(actor), "this action requires admin site access")
}

/// Blank out what the actor may not see.
fn redact(mut person: Person, actor: Option<&User>) -> Person {
    if !can_view_confidential_notes(actor) {
        person.confidential_notes.clear();
    }
    person
}

pub fn list_people(conn: &Connection, actor: Option<&User>, query: Option<&str>) -> AppResult<Vec<Person>> {
    require_staff(actor)?;
    Ok(people::list_people(conn, query)?
        .into_iter()
        .map(|p| redact(p, actor))
        .collect())
}

#[derive(Debug, Clone)]
pub struct PersonDetail {
    pub person: Person,
    pub family: Option<Family>,
    pub tags: Vec<Tag>,
    pub history: Vec<AttendanceDetail>,
    pub duplicates: Vec<Person>,
    pub show_confidential: bool,
}

pub fn person_detail(conn: &Connection, actor: Option<&User>, id: i64) -> AppResult<PersonDetail> {
    require_staff(actor)?;
    let person = people::require_person(conn, id)?;
    let family = match person.family_id {
        Some(fid) => families::get_family(conn, fid)?,
        None => None,
    };

    Ok(PersonDetail {
        tags: people::tags_for_person(conn, id)?,
        history: attendance::for_person(conn, id)?,
        duplicates: people::possible_duplicates(conn, &person)?
            .into_iter()
            .map(|p| redact(p, actor))
            .collect(),
        show_confidential: can_view_confidential_notes(actor),
        person: redact(person, actor),
        family,
    })
}

fn validate(person: &Person) -> AppResult<()> {
    if person.first_name.trim().is_empty() || person.last_name.trim().is_empty() {
        return Err(AppError::InvalidInput("first and last name are required".into()));
    }
    if person.middle_initial.chars().count() > 1 {
        return Err(AppError::InvalidInput("middle initial must be a single letter".into()));
    }
    if let Some(m) = person.birth_month {
        if !(1..=12).contains(&m) {
            return Err(AppError::InvalidInput(format!("birth month {m} is not between 1 and 12")));
        }
    }
    if let Some(d) = person.birth_day {
        if !(1..=31).contains(&d) {
            return Err(AppError::InvalidInput(format!("birth day {d} is not between 1 and 31")));
        }
    }
    Ok(())
}

/// Apply changes to a person. Touching confidential notes needs the Pastor role.
pub fn update_person(
    conn: &Connection,
    actor: Option<&User>,
    id: i64,
    changes: &PersonChanges,
) -> AppResult<Person> {
    require_staff(actor)?;
    if changes.touches_confidential() {
        require(
            can_view_confidential_notes(actor),
            "confidential notes can only be edited by the Pastor role",
        )?;
    }

    let mut person = people::require_person(conn, id)?;
    changes.apply(&mut person);
    validate(&person)?;
    if let Some(fid) = person.family_id {
        families::require_family(conn, fid)?;
    }

    people::update_person(conn, &person)?;
    oplog(conn, "edit", &format!("person {id}"), &format!("Updated {}", person.display_name()))?;
    Ok(redact(person, actor))
}

pub fn create_person(conn: &Connection, actor: Option<&User>, new_person: &NewPerson) -> AppResult<i64> {
    require_admin(actor)?;
    if new_person.first_name.is_empty() || new_person.last_name.is_empty() {
        return Err(AppError::InvalidInput("first and last name are required".into()));
    }
    if let Some(fid) = new_person.family_id {
        families::require_family(conn, fid)?;
    }
    let id = people::insert_person(conn, new_person)?;
    oplog(
        conn,
        "add",
        &format!("person {id}"),
        &format!("Added {} {}", new_person.first_name, new_person.last_name),
    )?;
    Ok(id)
}

/// Delete a person together with their attendance rows.
pub fn delete_person(conn: &Connection, actor: Option<&User>, id: i64) -> AppResult<Person> {
    require_admin(actor)?;
    let person = people::require_person(conn, id)?;
    people::delete_person(conn, id)?;
    oplog(conn, "del", &format!("person {id}"), &format!("Deleted {}", person.display_name()))?;
    Ok(person)
}

// ---------------------------
// Quick search
// ---------------------------

#[derive(Debug, Clone, Serialize)]
pub struct QuickResult {
    pub id: i64,
    pub name: String,
    pub family: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickMember {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickGroup {
    pub family_name: String,
    pub primary_id: i64,
    pub members: Vec<QuickMember>,
}

fn long_enough(query: &str) -> Option<&str> {
    let q = query.trim();
    (q.chars().count() >= QUICK_SEARCH_MIN_CHARS).then_some(q)
}

pub fn quick_search(conn: &Connection, actor: Option<&User>, query: &str) -> AppResult<Vec<QuickResult>> {
    require_staff(actor)?;
    let Some(q) = long_enough(query) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for p in people::search_by_name(conn, q)?.into_iter().take(QUICK_SEARCH_LIMIT) {
        let family = match p.family_id {
            Some(fid) => families::get_family(conn, fid)?.map(|f| f.name).unwrap_or_default(),
            None => String::new(),
        };
        out.push(QuickResult {
            id: p.id,
            name: p.short_name(),
            family,
        });
    }
    Ok(out)
}

pub fn quick_search_groups(conn: &Connection, actor: Option<&User>, query: &str) -> AppResult<Vec<QuickGroup>> {
    require_staff(actor)?;
    let Some(q) = long_enough(query) else {
        return Ok(Vec::new());
    };

    Ok(search_groups(conn, q)?
        .into_iter()
        .take(QUICK_SEARCH_LIMIT)
        .map(|g| QuickGroup {
            family_name: g.family.map(|f| f.name).unwrap_or_default(),
            primary_id: g.primary.id,
            members: g
                .members
                .iter()
                .map(|m| QuickMember {
                    id: m.id,
                    name: m.short_name(),
                })
                .collect(),
        })
        .collect())
}

// ---------------------------
// Families
// ---------------------------

pub fn create_family(conn: &Connection, actor: Option<&User>, name: &str, notes: &str) -> AppResult<Family> {
    require_admin(actor)?;
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("family name cannot be empty".into()));
    }
    let id = families::insert_family(conn, name, notes)?;
    let family = families::require_family(conn, id)?;
    oplog(conn, "add", &format!("family {id}"), &format!("Added family {}", family.name))?;
    Ok(family)
}

pub fn list_families(conn: &Connection, actor: Option<&User>, search: Option<&str>) -> AppResult<Vec<(Family, i64)>> {
    require_staff(actor)?;
    Ok(families::list_families(conn, search)?)
}

pub fn family_members(conn: &Connection, actor: Option<&User>, id: i64) -> AppResult<(Family, Vec<Person>)> {
    require_staff(actor)?;
    let family = families::require_family(conn, id)?;
    let members = people::people_in_family(conn, id)?
        .into_iter()
        .map(|p| redact(p, actor))
        .collect();
    Ok((family, members))
}

pub fn edit_family(
    conn: &Connection,
    actor: Option<&User>,
    id: i64,
    name: Option<&str>,
    notes: Option<&str>,
) -> AppResult<Family> {
    require_admin(actor)?;
    let mut family = families::require_family(conn, id)?;
    if let Some(n) = name {
        if n.trim().is_empty() {
            return Err(AppError::InvalidInput("family name cannot be empty".into()));
        }
        family.name = n.to_string();
    }
    if let Some(n) = notes {
        family.notes = n.to_string();
    }
    families::update_family(conn, &family)?;
    let family = families::require_family(conn, id)?;
    oplog(conn, "edit", &format!("family {id}"), &format!("Updated family {}", family.name))?;
    Ok(family)
}

/// Delete a family; members stay, without a family.
pub fn delete_family(conn: &Connection, actor: Option<&User>, id: i64) -> AppResult<Family> {
    require_admin(actor)?;
    let family = families::require_family(conn, id)?;
    families::delete_family(conn, id)?;
    oplog(conn, "del", &format!("family {id}"), &format!("Deleted family {}", family.name))?;
    Ok(family)
}

// ---------------------------
// Tags
// ---------------------------

pub fn create_tag(conn: &Connection, actor: Option<&User>, name: &str) -> AppResult<Tag> {
    require_admin(actor)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("tag name cannot be empty".into()));
    }
    if people::find_tag(conn, name)?.is_some() {
        return Err(AppError::InvalidInput(format!("tag '{name}' already exists")));
    }
    let id = people::insert_tag(conn, name)?;
    Ok(Tag {
        id,
        name: name.to_string(),
    })
}

pub fn list_tags(conn: &Connection, actor: Option<&User>) -> AppResult<Vec<(Tag, i64)>> {
    require_staff(actor)?;
    Ok(people::list_tags(conn)?)
}

pub fn delete_tag(conn: &Connection, actor: Option<&User>, name: &str) -> AppResult<()> {
    require_admin(actor)?;
    if people::delete_tag(conn, name.trim())? == 0 {
        return Err(AppError::not_found("Tag", name.trim()));
    }
    Ok(())
}

fn require_tag(conn: &Connection, name: &str) -> AppResult<Tag> {
    people::find_tag(conn, name.trim())?.ok_or_else(|| AppError::not_found("Tag", name.trim()))
}

/// Returns false when the person already had the tag.
pub fn tag_person(conn: &Connection, actor: Option<&User>, person_id: i64, tag: &str) -> AppResult<bool> {
    require_staff(actor)?;
    let person = people::require_person(conn, person_id)?;
    let tag = require_tag(conn, tag)?;
    Ok(people::attach_tag(conn, person.id, tag.id)?)
}

/// Returns false when the person did not have the tag.
pub fn untag_person(conn: &Connection, actor: Option<&User>, person_id: i64, tag: &str) -> AppResult<bool> {
    require_staff(actor)?;
    let person = people::require_person(conn, person_id)?;
    let tag = require_tag(conn, tag)?;
    Ok(people::detach_tag(conn, person.id, tag.id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::pool::DbPool;
    use crate::models::user::{ROLE_ADMIN, ROLE_PASTOR};

    fn staff(groups: &[&str]) -> User {
        User {
            id: 1,
            username: "staff".into(),
            is_staff: true,
            is_superuser: false,
            is_active: true,
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn setup() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        crate::db::users::insert_user(&pool.conn, "staff", true, false, true).unwrap();
        pool
    }

    fn add(conn: &Connection, first: &str, last: &str, family: Option<i64>) -> i64 {
        let mut p = NewPerson::new(first, last);
        p.family_id = family;
        people::insert_person(conn, &p).unwrap()
    }

    #[test]
    fn quick_search_needs_three_characters_and_caps_results() {
        let pool = setup();
        let who = staff(&[]);
        for i in 0..15 {
            add(&pool.conn, &format!("Person{i:02}"), "Miller", None);
        }
        assert!(quick_search(&pool.conn, Some(&who), "Mi").unwrap().is_empty());
        let hits = quick_search(&pool.conn, Some(&who), "mil").unwrap();
        assert_eq!(hits.len(), 12);
        assert_eq!(hits[0].name, "Person00 Miller");
        assert_eq!(hits[0].family, "");
        assert!(quick_search(&pool.conn, None, "mil").is_err());
    }

    #[test]
    fn quick_groups_merge_families() {
        let pool = setup();
        let who = staff(&[]);
        let fam = families::insert_family(&pool.conn, "Ortiz", "").unwrap();
        add(&pool.conn, "Luz", "Ortiz", Some(fam));
        add(&pool.conn, "Mateo", "Ortiz", Some(fam));

        let groups = quick_search_groups(&pool.conn, Some(&who), "ortiz").unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].family_name, "Ortiz");
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn confidential_notes_need_pastor() {
        let pool = setup();
        let id = add(&pool.conn, "Ann", "Cole", None);
        let changes = PersonChanges {
            confidential_notes: Some("pray for".into()),
            ..PersonChanges::default()
        };

        let admin = staff(&[ROLE_ADMIN]);
        assert!(matches!(
            update_person(&pool.conn, Some(&admin), id, &changes),
            Err(AppError::PermissionDenied(_))
        ));

        let pastor = staff(&[ROLE_PASTOR]);
        let updated = update_person(&pool.conn, Some(&pastor), id, &changes).unwrap();
        assert_eq!(updated.confidential_notes, "pray for");

        let seen_by_admin = person_detail(&pool.conn, Some(&admin), id).unwrap();
        assert_eq!(seen_by_admin.person.confidential_notes, "");
        assert!(!seen_by_admin.show_confidential);
    }

    #[test]
    fn update_validates_fields() {
        let pool = setup();
        let who = staff(&[]);
        let id = add(&pool.conn, "Ann", "Cole", None);
        let bad_month = PersonChanges {
            birth_month: Some(Some(13)),
            ..PersonChanges::default()
        };
        assert!(update_person(&pool.conn, Some(&who), id, &bad_month).is_err());
        let bad_initial = PersonChanges {
            middle_initial: Some("AB".into()),
            ..PersonChanges::default()
        };
        assert!(update_person(&pool.conn, Some(&who), id, &bad_initial).is_err());
    }

    #[test]
    fn detail_lists_duplicates() {
        let pool = setup();
        let who = staff(&[]);
        let id = add(&pool.conn, "Ann", "Cole", None);
        add(&pool.conn, "Zed", "COLE", None);
        add(&pool.conn, "Bea", "cole", None);
        let detail = person_detail(&pool.conn, Some(&who), id).unwrap();
        let names: Vec<&str> = detail.duplicates.iter().map(|p| p.first_name.as_str()).collect();
        assert_eq!(names, vec!["Bea", "Zed"]);
    }

    #[test]
    fn tags_attach_once() {
        let pool = setup();
        let admin = staff(&[ROLE_ADMIN]);
        let id = add(&pool.conn, "Ann", "Cole", None);
        create_tag(&pool.conn, Some(&admin), "Choir").unwrap();
        assert!(create_tag(&pool.conn, Some(&admin), "Choir").is_err());
        assert!(tag_person(&pool.conn, Some(&admin), id, "Choir").unwrap());
        assert!(!tag_person(&pool.conn, Some(&admin), id, "Choir").unwrap());
        assert_eq!(list_tags(&pool.conn, Some(&admin)).unwrap()[0].1, 1);
        assert!(untag_person(&pool.conn, Some(&admin), id, "Choir").unwrap());
        delete_tag(&pool.conn, Some(&admin), "Choir").unwrap();
        assert!(delete_tag(&pool.conn, Some(&admin), "Choir").is_err());
    }

    #[test]
    fn deleting_family_keeps_members() {
        let pool = setup();
        let admin = staff(&[ROLE_ADMIN]);
        let fam = create_family(&pool.conn, Some(&admin), "Ortiz family", "").unwrap();
        assert_eq!(fam.name, "Ortiz");
        let pid = add(&pool.conn, "Luz", "Ortiz", Some(fam.id));
        delete_family(&pool.conn, Some(&admin), fam.id).unwrap();
        let p = people::require_person(&pool.conn, pid).unwrap();
        assert_eq!(p.family_id, None);
    }
}
