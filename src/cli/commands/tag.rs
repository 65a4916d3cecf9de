use crate::cli::commands::Session;
use crate::cli::parser::{Commands, TagAction};
use crate::config::Config;
use crate::core::people;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Tag { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();

    match action {
        TagAction::Add { name } => {
            let tag = people::create_tag(conn, actor, name)?;
            success(format!("Tag '{}' created.", tag.name));
        }
        TagAction::List => {
            let mut table = Table::new(vec![Column::new("Tag", 24), Column::new("People", 6)]);
            for (tag, count) in people::list_tags(conn, actor)? {
                table.add_row(vec![tag.name, count.to_string()]);
            }
            if table.is_empty() {
                info("No tags defined.");
            } else {
                print!("{}", table.render());
            }
        }
        TagAction::Del { name } => {
            people::delete_tag(conn, actor, name)?;
            success(format!("Tag '{name}' deleted."));
        }
        TagAction::Attach { person_id, tag } => {
            if people::tag_person(conn, actor, *person_id, tag)? {
                success(format!("Tagged person {person_id} with '{tag}'."));
            } else {
                info(format!("Person {person_id} already tagged '{tag}'."));
            }
        }
        TagAction::Detach { person_id, tag } => {
            if people::untag_person(conn, actor, *person_id, tag)? {
                success(format!("Removed '{tag}' from person {person_id}."));
            } else {
                info(format!("Person {person_id} was not tagged '{tag}'."));
            }
        }
    }
    Ok(())
}
