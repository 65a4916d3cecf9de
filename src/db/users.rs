use crate::errors::{AppError, AppResult};
use crate::models::user::{DEFAULT_GROUPS, User};
use rusqlite::{Connection, OptionalExtension, Result, params};

/// Seed the role groups (get-or-create).
pub fn ensure_default_groups(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare_cached("INSERT OR IGNORE INTO groups (name) VALUES (?1)")?;
    for name in DEFAULT_GROUPS {
        stmt.execute([name])?;
    }
    Ok(())
}

fn groups_of(conn: &Connection, user_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT g.name FROM groups g
         JOIN user_groups ug ON ug.group_id = g.id
         WHERE ug.user_id = ?1 ORDER BY g.name",
    )?;
    let rows = stmt.query_map([user_id], |r| r.get::<_, String>(0))?;
    rows.collect()
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let row = conn
        .query_row(
            "SELECT id, username, is_staff, is_superuser, is_active FROM users WHERE username = ?1",
            [username],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, bool>(2)?,
                    r.get::<_, bool>(3)?,
                    r.get::<_, bool>(4)?,
                ))
            },
        )
        .optional()?;

    match row {
        None => Ok(None),
        Some((id, username, is_staff, is_superuser, is_active)) => Ok(Some(User {
            id,
            groups: groups_of(conn, id)?,
            username,
            is_staff,
            is_superuser,
            is_active,
        })),
    }
}

pub fn require_user(conn: &Connection, username: &str) -> AppResult<User> {
    find_by_username(conn, username)?.ok_or_else(|| AppError::not_found("User", username))
}

pub fn insert_user(
    conn: &Connection,
    username: &str,
    is_staff: bool,
    is_superuser: bool,
    is_active: bool,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, is_staff, is_superuser, is_active) VALUES (?1, ?2, ?3, ?4)",
        params![username, is_staff, is_superuser, is_active],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_flags(
    conn: &Connection,
    user_id: i64,
    is_staff: bool,
    is_superuser: bool,
    is_active: bool,
) -> Result<()> {
    conn.execute(
        "UPDATE users SET is_staff = ?2, is_superuser = ?3, is_active = ?4 WHERE id = ?1",
        params![user_id, is_staff, is_superuser, is_active],
    )?;
    Ok(())
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let names: Vec<String> = {
        let mut stmt = conn.prepare_cached("SELECT username FROM users ORDER BY username")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        rows.collect::<Result<_>>()?
    };

    let mut out = Vec::with_capacity(names.len());
    for name in names {
        if let Some(u) = find_by_username(conn, &name)? {
            out.push(u);
        }
    }
    Ok(out)
}

fn group_id(conn: &Connection, group: &str) -> AppResult<i64> {
    conn.query_row("SELECT id FROM groups WHERE name = ?1", [group], |r| r.get(0))
        .optional()?
        .ok_or_else(|| AppError::not_found("Group", group))
}

pub fn add_to_group(conn: &Connection, user_id: i64, group: &str) -> AppResult<bool> {
    let gid = group_id(conn, group)?;
    let n = conn.execute(
        "INSERT OR IGNORE INTO user_groups (user_id, group_id) VALUES (?1, ?2)",
        [user_id, gid],
    )?;
    Ok(n == 1)
}

pub fn remove_from_group(conn: &Connection, user_id: i64, group: &str) -> AppResult<bool> {
    let gid = group_id(conn, group)?;
    let n = conn.execute(
        "DELETE FROM user_groups WHERE user_id = ?1 AND group_id = ?2",
        [user_id, gid],
    )?;
    Ok(n == 1)
}
