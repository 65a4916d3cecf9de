use crate::cli::commands::Session;
use crate::cli::parser::{Commands, FamilyAction};
use crate::config::Config;
use crate::core::people;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::colorize_optional;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Family { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();

    match action {
        FamilyAction::Add { name, notes } => {
            let family = people::create_family(conn, actor, name, notes)?;
            success(format!("Family '{}' created (id {}).", family.name, family.id));
        }
        FamilyAction::List { search } => {
            let rows = people::list_families(conn, actor, search.as_deref())?;
            if rows.is_empty() {
                info("No families found.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("Family", 28),
                Column::new("Members", 7),
                Column::new("Notes", 30),
            ]);
            for (f, count) in rows {
                table.add_row(vec![f.id.to_string(), f.name, count.to_string(), f.notes]);
            }
            print!("{}", table.render());
        }
        FamilyAction::Show { id } => {
            let (family, members) = people::family_members(conn, actor, *id)?;
            println!("👪 {} (id {})", family.name, family.id);
            println!("   Notes: {}", colorize_optional(&family.notes));
            for p in members {
                println!("   - [{}] {} ({})", p.id, p.display_name(), p.member_type.label());
            }
        }
        FamilyAction::Edit { id, name, notes } => {
            let family = people::edit_family(conn, actor, *id, name.as_deref(), notes.as_deref())?;
            success(format!("Family {} updated: {}", family.id, family.name));
        }
        FamilyAction::Del { id } => {
            let family = people::delete_family(conn, actor, *id)?;
            success(format!("Family '{}' deleted; members kept.", family.name));
        }
    }
    Ok(())
}
