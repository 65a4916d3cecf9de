use crate::cli::commands::Session;
use crate::cli::parser::{Commands, UserAction};
use crate::config::Config;
use crate::core::users::{self, NewUser, UserFlags};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::formatting::yes_no;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::User { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();

    match action {
        UserAction::Add {
            username,
            staff,
            superuser,
            groups,
        } => {
            let created = users::add_user(
                conn,
                actor,
                &NewUser {
                    username: username.clone(),
                    is_staff: *staff,
                    is_superuser: *superuser,
                    groups: groups.clone(),
                },
            )?;
            success(format!("User '{}' created (id {}).", created.username, created.id));
        }
        UserAction::List => {
            session.admin_header("Users");
            let mut table = Table::new(vec![
                Column::new("ID", 4),
                Column::new("Username", 18),
                Column::new("Staff", 5),
                Column::new("Super", 5),
                Column::new("Active", 6),
                Column::new("Groups", 30),
            ]);
            for u in users::list_users(conn, actor)? {
                table.add_row(vec![
                    u.id.to_string(),
                    u.username.clone(),
                    yes_no(u.is_staff).into(),
                    yes_no(u.is_superuser).into(),
                    yes_no(u.is_active).into(),
                    u.groups.join(", "),
                ]);
            }
            print!("{}", table.render());
        }
        UserAction::Grant { username, group } => {
            if users::grant(conn, actor, username, group)? {
                success(format!("Granted {group} to {username}."));
            } else {
                info(format!("{username} already has {group}."));
            }
        }
        UserAction::Revoke { username, group } => {
            if users::revoke(conn, actor, username, group)? {
                success(format!("Revoked {group} from {username}."));
            } else {
                info(format!("{username} did not have {group}."));
            }
        }
        UserAction::Set {
            username,
            staff,
            superuser,
            active,
        } => {
            let u = users::set_flags(
                conn,
                actor,
                username,
                UserFlags {
                    is_staff: *staff,
                    is_superuser: *superuser,
                    is_active: *active,
                },
            )?;
            success(format!(
                "{}: staff={} superuser={} active={}",
                u.username,
                yes_no(u.is_staff),
                yes_no(u.is_superuser),
                yes_no(u.is_active)
            ));
        }
    }
    Ok(())
}
