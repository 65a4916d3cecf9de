use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::users::{NewUser, add_user};
use crate::db::initialize::open_db;
use crate::db::log::oplog;
use crate::errors::AppResult;
use crate::models::user::ROLE_ADMIN;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite database with all pending migrations
///  - optionally the first Admin account
pub fn handle(cli: &Cli) -> AppResult<()> {
    let Commands::Init { admin } = &cli.command else {
        return Ok(());
    };

    let db_path = Config::init_all(cli.db.as_deref(), cli.test)?;
    let db_path = db_path.to_string_lossy().to_string();

    println!("⚙️  Initializing cats…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", db_path);

    let pool = open_db(&db_path)?;
    success(format!("Database initialized at {}", db_path));

    if let Err(e) = oplog(&pool.conn, "init", "Database initialized", &format!("Database initialized at {db_path}")) {
        warning(format!("Failed to write internal log: {e}"));
    }

    if let Some(username) = admin {
        let user = add_user(
            &pool.conn,
            None,
            &NewUser {
                username: username.clone(),
                is_staff: true,
                is_superuser: false,
                groups: vec![ROLE_ADMIN.to_string()],
            },
        )?;
        success(format!("Admin account '{}' created.", user.username));
    }

    println!("🎉 cats initialization completed!");
    Ok(())
}
