//! Repository functions for `people`, `tags` and `person_tags`.

use crate::db::like_pattern;
use crate::errors::{AppError, AppResult};
use crate::models::family::Tag;
use crate::models::person::{MemberType, NewPerson, Person};
use crate::models::service::Service;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub(crate) const PERSON_COLUMNS: &str = "p.id, p.first_name, p.middle_initial, p.last_name, \
     p.street_address, p.city, p.state_province, p.postal_code, p.country, p.phone, p.email, \
     p.notes, p.confidential_notes, p.birth_month, p.birth_day, p.photo, p.member_type, \
     p.family_id, p.is_active";

/// Map a row selected with PERSON_COLUMNS, starting at column `offset`.
pub(crate) fn map_person_at(row: &Row, offset: usize) -> Result<Person> {
    let kind: String = row.get(offset + 16)?;
    let member_type = MemberType::from_db_str(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            offset + 16,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidInput(format!("Invalid member type: {kind}"))),
        )
    })?;

    Ok(Person {
        id: row.get(offset)?,
        first_name: row.get(offset + 1)?,
        middle_initial: row.get(offset + 2)?,
        last_name: row.get(offset + 3)?,
        street_address: row.get(offset + 4)?,
        city: row.get(offset + 5)?,
        state_province: row.get(offset + 6)?,
        postal_code: row.get(offset + 7)?,
        country: row.get(offset + 8)?,
        phone: row.get(offset + 9)?,
        email: row.get(offset + 10)?,
        notes: row.get(offset + 11)?,
        confidential_notes: row.get(offset + 12)?,
        birth_month: row.get(offset + 13)?,
        birth_day: row.get(offset + 14)?,
        photo: row.get(offset + 15)?,
        member_type,
        family_id: row.get(offset + 17)?,
        is_active: row.get(offset + 18)?,
    })
}

pub fn map_person(row: &Row) -> Result<Person> {
    map_person_at(row, 0)
}

fn collect(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Person>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, map_person)?;
    rows.collect()
}

pub fn insert_person(conn: &Connection, p: &NewPerson) -> Result<i64> {
    conn.execute(
        "INSERT INTO people (first_name, middle_initial, last_name, street_address, city,
                             state_province, postal_code, country, phone, email, notes,
                             birth_month, birth_day, member_type, family_id, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            p.first_name,
            p.middle_initial,
            p.last_name,
            p.street_address,
            p.city,
            p.state_province,
            p.postal_code,
            p.country,
            p.phone,
            p.email,
            p.notes,
            p.birth_month,
            p.birth_day,
            p.member_type.to_db_str(),
            p.family_id,
            p.is_active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_person(conn: &Connection, p: &Person) -> Result<()> {
    conn.execute(
        "UPDATE people SET first_name = ?2, middle_initial = ?3, last_name = ?4,
                street_address = ?5, city = ?6, state_province = ?7, postal_code = ?8,
                country = ?9, phone = ?10, email = ?11, notes = ?12, confidential_notes = ?13,
                birth_month = ?14, birth_day = ?15, photo = ?16, member_type = ?17,
                family_id = ?18, is_active = ?19
         WHERE id = ?1",
        params![
            p.id,
            p.first_name,
            p.middle_initial,
            p.last_name,
            p.street_address,
            p.city,
            p.state_province,
            p.postal_code,
            p.country,
            p.phone,
            p.email,
            p.notes,
            p.confidential_notes,
            p.birth_month,
            p.birth_day,
            p.photo,
            p.member_type.to_db_str(),
            p.family_id,
            p.is_active,
        ],
    )?;
    Ok(())
}

pub fn get_person(conn: &Connection, id: i64) -> Result<Option<Person>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM people p WHERE p.id = ?1");
    conn.query_row(&sql, [id], map_person).optional()
}

pub fn require_person(conn: &Connection, id: i64) -> AppResult<Person> {
    get_person(conn, id)?.ok_or_else(|| AppError::not_found("Person", id))
}

/// Delete a person; attendance rows and tag links go with it.
pub fn delete_person(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM people WHERE id = ?1", [id])
}

/// People whose first or last name contains `query`, ordered by name.
pub fn search_by_name(conn: &Connection, query: &str) -> Result<Vec<Person>> {
    let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM people p
         WHERE p.first_name LIKE ?1 ESCAPE '\\' OR p.last_name LIKE ?1 ESCAPE '\\'
         ORDER BY p.last_name, p.first_name"
    );
    collect(conn, &sql, [like_pattern(query)])
}

/// Staff listing: everyone, optionally filtered on name, phone or email.
pub fn list_people(conn: &Connection, query: Option<&str>) -> Result<Vec<Person>> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        None => {
            let sql = format!("SELECT {PERSON_COLUMNS} FROM people p ORDER BY p.last_name, p.first_name");
            collect(conn, &sql, [])
        }
        Some(q) => {
            let sql = format!(
                "SELECT {PERSON_COLUMNS} FROM people p
                 WHERE p.first_name LIKE ?1 ESCAPE '\\' OR p.last_name LIKE ?1 ESCAPE '\\'
                    OR p.phone LIKE ?1 ESCAPE '\\' OR p.email LIKE ?1 ESCAPE '\\'
                 ORDER BY p.last_name, p.first_name"
            );
            collect(conn, &sql, [like_pattern(q)])
        }
    }
}

pub fn people_in_family(conn: &Connection, family_id: i64) -> Result<Vec<Person>> {
    let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM people p WHERE p.family_id = ?1 ORDER BY p.last_name, p.first_name"
    );
    collect(conn, &sql, [family_id])
}

/// Other people sharing the last name (case-insensitive).
pub fn possible_duplicates(conn: &Connection, person: &Person) -> Result<Vec<Person>> {
    let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM people p
         WHERE lower(p.last_name) = lower(?1) AND p.id <> ?2
         ORDER BY p.first_name, p.last_name"
    );
    collect(conn, &sql, params![person.last_name, person.id])
}

/// Active members with no attendance row for the service.
pub fn missing_members(conn: &Connection, service_id: i64) -> Result<Vec<Person>> {
    let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM people p
         WHERE p.member_type = 'member' AND p.is_active = 1
           AND p.id NOT IN (SELECT a.person_id FROM attendance a WHERE a.service_id = ?1)
         ORDER BY p.last_name, p.first_name"
    );
    collect(conn, &sql, [service_id])
}

/// Visitors attending the service who attended nothing dated earlier.
pub fn first_time_visitors(conn: &Connection, service: &Service) -> Result<Vec<Person>> {
    let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM people p
         WHERE p.member_type = 'visitor'
           AND p.id IN (SELECT a.person_id FROM attendance a WHERE a.service_id = ?1)
           AND p.id NOT IN (
               SELECT a.person_id FROM attendance a
               JOIN services s ON s.id = a.service_id
               WHERE s.date < ?2
           )
         ORDER BY p.last_name, p.first_name"
    );
    collect(
        conn,
        &sql,
        params![service.id, service.date.format("%Y-%m-%d").to_string()],
    )
}

// ---------------------------
// Tags
// ---------------------------

pub fn insert_tag(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO tags (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

pub fn find_tag(conn: &Connection, name: &str) -> Result<Option<Tag>> {
    conn.query_row("SELECT id, name FROM tags WHERE name = ?1", [name], |r| {
        Ok(Tag {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })
    .optional()
}

pub fn list_tags(conn: &Connection) -> Result<Vec<(Tag, i64)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.id, t.name, COUNT(pt.person_id)
         FROM tags t LEFT JOIN person_tags pt ON pt.tag_id = t.id
         GROUP BY t.id ORDER BY t.name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            Tag {
                id: r.get(0)?,
                name: r.get(1)?,
            },
            r.get::<_, i64>(2)?,
        ))
    })?;
    rows.collect()
}

pub fn delete_tag(conn: &Connection, name: &str) -> Result<usize> {
    conn.execute("DELETE FROM tags WHERE name = ?1", [name])
}

pub fn tags_for_person(conn: &Connection, person_id: i64) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.id, t.name FROM tags t
         JOIN person_tags pt ON pt.tag_id = t.id
         WHERE pt.person_id = ?1 ORDER BY t.name",
    )?;
    let rows = stmt.query_map([person_id], |r| {
        Ok(Tag {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })?;
    rows.collect()
}

pub fn attach_tag(conn: &Connection, person_id: i64, tag_id: i64) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO person_tags (person_id, tag_id) VALUES (?1, ?2)",
        [person_id, tag_id],
    )?;
    Ok(n == 1)
}

pub fn detach_tag(conn: &Connection, person_id: i64, tag_id: i64) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM person_tags WHERE person_id = ?1 AND tag_id = ?2",
        [person_id, tag_id],
    )?;
    Ok(n == 1)
}
