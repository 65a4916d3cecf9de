//! Accounts and role groups.

use crate::core::permissions::{can_manage_configuration, require};
use crate::db::log::oplog;
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::user::{DEFAULT_GROUPS, User};
use rusqlite::Connection;

fn require_manager(conn: &Connection, actor: Option<&User>) -> AppResult<()> {
    require(can_manage_configuration(actor), "user management requires the Admin role")?;
    // Make sure the acting account still exists.
    if let Some(u) = actor {
        users::require_user(conn, &u.username)?;
    }
    Ok(())
}

fn check_group(group: &str) -> AppResult<&'static str> {
    DEFAULT_GROUPS
        .iter()
        .copied()
        .find(|g| g.eq_ignore_ascii_case(group.trim()))
        .ok_or_else(|| AppError::not_found("Group", group))
}

/// Look up the acting account. Unknown names resolve to `None` (anonymous).
pub fn resolve_actor(conn: &Connection, username: Option<&str>) -> AppResult<Option<User>> {
    match username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(name) => Ok(users::find_by_username(conn, name)?),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub groups: Vec<String>,
}

/// Create an account. The very first account needs no acting user.
pub fn add_user(conn: &Connection, actor: Option<&User>, new_user: &NewUser) -> AppResult<User> {
    let bootstrap = users::count_users(conn)? == 0;
    if !bootstrap {
        require_manager(conn, actor)?;
    }

    let username = new_user.username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput("username cannot be empty".into()));
    }
    if users::find_by_username(conn, username)?.is_some() {
        return Err(AppError::InvalidInput(format!("user '{username}' already exists")));
    }
    let groups = new_user
        .groups
        .iter()
        .map(|g| check_group(g))
        .collect::<AppResult<Vec<_>>>()?;

    let tx = conn.unchecked_transaction()?;
    let id = users::insert_user(&tx, username, new_user.is_staff, new_user.is_superuser, true)?;
    for g in &groups {
        users::add_to_group(&tx, id, g)?;
    }
    oplog(
        &tx,
        "user_add",
        username,
        &format!("Added user {username} ({})", if groups.is_empty() { "no groups".to_string() } else { groups.join(", ") }),
    )?;
    tx.commit()?;

    users::require_user(conn, username)
}

pub fn list_users(conn: &Connection, actor: Option<&User>) -> AppResult<Vec<User>> {
    require_manager(conn, actor)?;
    Ok(users::list_users(conn)?)
}

/// Flags left as `None` keep their current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFlags {
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

pub fn set_flags(conn: &Connection, actor: Option<&User>, username: &str, flags: UserFlags) -> AppResult<User> {
    require_manager(conn, actor)?;
    let user = users::require_user(conn, username)?;
    let staff = flags.is_staff.unwrap_or(user.is_staff);
    let superuser = flags.is_superuser.unwrap_or(user.is_superuser);
    let active = flags.is_active.unwrap_or(user.is_active);

    users::set_flags(conn, user.id, staff, superuser, active)?;
    oplog(
        conn,
        "user_edit",
        username,
        &format!("staff={staff} superuser={superuser} active={active}"),
    )?;
    users::require_user(conn, username)
}

/// Returns false when the user already had the role.
pub fn grant(conn: &Connection, actor: Option<&User>, username: &str, group: &str) -> AppResult<bool> {
    require_manager(conn, actor)?;
    let group = check_group(group)?;
    let user = users::require_user(conn, username)?;
    let added = users::add_to_group(conn, user.id, group)?;
    if added {
        oplog(conn, "grant", username, &format!("Granted {group}"))?;
    }
    Ok(added)
}

/// Returns false when the user did not have the role.
pub fn revoke(conn: &Connection, actor: Option<&User>, username: &str, group: &str) -> AppResult<bool> {
    require_manager(conn, actor)?;
    let group = check_group(group)?;
    let user = users::require_user(conn, username)?;
    let removed = users::remove_from_group(conn, user.id, group)?;
    if removed {
        oplog(conn, "revoke", username, &format!("Revoked {group}"))?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::pool::DbPool;
    use crate::models::user::{ROLE_ADMIN, ROLE_GREETER};

    fn setup() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        pool
    }

    #[test]
    fn first_user_bootstraps_without_actor() {
        let pool = setup();
        let admin = add_user(
            &pool.conn,
            None,
            &NewUser {
                username: "admin".into(),
                is_staff: true,
                groups: vec!["admin".into()],
                ..NewUser::default()
            },
        )
        .unwrap();
        assert_eq!(admin.groups, vec![ROLE_ADMIN.to_string()]);

        let second = NewUser {
            username: "greeter".into(),
            groups: vec![ROLE_GREETER.into()],
            ..NewUser::default()
        };
        assert!(matches!(
            add_user(&pool.conn, None, &second),
            Err(AppError::PermissionDenied(_))
        ));
        let greeter = add_user(&pool.conn, Some(&admin), &second).unwrap();
        assert!(greeter.in_any_group(&[ROLE_GREETER]));
    }

    #[test]
    fn grant_and_revoke_roles() {
        let pool = setup();
        let admin = add_user(
            &pool.conn,
            None,
            &NewUser {
                username: "admin".into(),
                is_superuser: true,
                ..NewUser::default()
            },
        )
        .unwrap();
        add_user(
            &pool.conn,
            Some(&admin),
            &NewUser {
                username: "pat".into(),
                ..NewUser::default()
            },
        )
        .unwrap();

        assert!(grant(&pool.conn, Some(&admin), "pat", "Pastor").unwrap());
        assert!(!grant(&pool.conn, Some(&admin), "pat", "pastor").unwrap());
        assert!(grant(&pool.conn, Some(&admin), "pat", "Deacon").is_err());
        assert!(revoke(&pool.conn, Some(&admin), "pat", "Pastor").unwrap());

        let pat = set_flags(
            &pool.conn,
            Some(&admin),
            "pat",
            UserFlags {
                is_active: Some(false),
                ..UserFlags::default()
            },
        )
        .unwrap();
        assert!(!pat.is_active);
    }

    #[test]
    fn unknown_actor_is_anonymous() {
        let pool = setup();
        assert!(resolve_actor(&pool.conn, Some("nobody")).unwrap().is_none());
        assert!(resolve_actor(&pool.conn, None).unwrap().is_none());
    }
}
