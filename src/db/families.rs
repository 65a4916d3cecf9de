use crate::errors::{AppError, AppResult};
use crate::models::family::{Family, normalize_family_name};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn map_family(row: &Row) -> Result<Family> {
    Ok(Family {
        id: row.get(0)?,
        name: row.get(1)?,
        notes: row.get(2)?,
    })
}

/// Insert a family; the name is normalised first.
pub fn insert_family(conn: &Connection, name: &str, notes: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO families (name, notes) VALUES (?1, ?2)",
        params![normalize_family_name(name), notes],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_family(conn: &Connection, family: &Family) -> Result<()> {
    conn.execute(
        "UPDATE families SET name = ?2, notes = ?3 WHERE id = ?1",
        params![family.id, normalize_family_name(&family.name), family.notes],
    )?;
    Ok(())
}

pub fn get_family(conn: &Connection, id: i64) -> Result<Option<Family>> {
    conn.query_row(
        "SELECT id, name, notes FROM families WHERE id = ?1",
        [id],
        map_family,
    )
    .optional()
}

pub fn require_family(conn: &Connection, id: i64) -> AppResult<Family> {
    get_family(conn, id)?.ok_or_else(|| AppError::not_found("Family", id))
}

/// Families ordered by name with their member counts.
pub fn list_families(conn: &Connection, search: Option<&str>) -> Result<Vec<(Family, i64)>> {
    let pattern = crate::db::like_pattern(search.unwrap_or(""));
    let mut stmt = conn.prepare_cached(
        "SELECT f.id, f.name, f.notes, COUNT(p.id)
         FROM families f LEFT JOIN people p ON p.family_id = f.id
         WHERE f.name LIKE ?1 ESCAPE '\\'
         GROUP BY f.id ORDER BY f.name",
    )?;
    let rows = stmt.query_map([pattern], |r| Ok((map_family(r)?, r.get::<_, i64>(3)?)))?;
    rows.collect()
}

/// Delete a family; members keep their records with no family.
pub fn delete_family(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM families WHERE id = ?1", [id])
}
