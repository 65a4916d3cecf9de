pub mod backup;
pub mod checkin;
pub mod config;
pub mod db;
pub mod family;
pub mod init;
pub mod kiosk;
pub mod log;
pub mod person;
pub mod print;
pub mod report;
pub mod service;
pub mod setting;
pub mod tag;
pub mod user;

use crate::config::Config;
use crate::core::theme::{admin_skin, skin_label};
use crate::core::users::resolve_actor;
use crate::db::initialize::open_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::user::User;
use crate::ui::messages::{header, warning};
use std::fs;
use std::path::Path;

/// An open database plus the acting user.
pub struct Session {
    pub pool: DbPool,
    pub actor: Option<User>,
}

impl Session {
    pub fn open(cfg: &Config, username: Option<&str>) -> AppResult<Self> {
        let pool = open_db(&cfg.database)?;
        let actor = resolve_actor(&pool.conn, username)?;
        if actor.is_none() {
            if let Some(name) = username {
                warning(format!("Unknown user '{name}', continuing as anonymous."));
            }
        }
        Ok(Self { pool, actor })
    }

    pub fn actor(&self) -> Option<&User> {
        self.actor.as_ref()
    }

    /// Header for admin-area commands, carrying the configured admin skin.
    pub fn admin_header(&self, title: &str) {
        let skin = admin_skin(&self.pool.conn);
        header(format!("{title} [skin: {}]", skin_label(skin)));
    }
}

/// Write HTML to `out`, or to stdout when no file is given.
pub(crate) fn emit_html(html: &str, out: Option<&str>) -> AppResult<()> {
    match out {
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, html)?;
            crate::ui::messages::success(format!("Name tags written to {}", path.display()));
        }
        None => print!("{html}"),
    }
    Ok(())
}
