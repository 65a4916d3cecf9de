use crate::cli::commands::Session;
use crate::cli::parser::{Commands, PersonAction, PersonFields};
use crate::config::Config;
use crate::core::people::{self, PersonDetail};
use crate::errors::{AppError, AppResult};
use crate::export::json::to_pretty;
use crate::models::person::{MemberType, NewPerson, PersonChanges};
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{colorize_member_type, colorize_optional};
use crate::utils::date::format_checkin;
use crate::utils::table::{Column, Table};

fn parse_member_type(raw: &str) -> AppResult<MemberType> {
    MemberType::from_code(raw)
        .ok_or_else(|| AppError::InvalidInput(format!("unknown member type '{raw}' (use member or visitor)")))
}

/// 0 clears an optional number.
fn clearable(v: u32) -> Option<u32> {
    (v != 0).then_some(v)
}

fn to_changes(f: &PersonFields) -> AppResult<PersonChanges> {
    Ok(PersonChanges {
        first_name: f.first.clone(),
        middle_initial: f.middle.clone(),
        last_name: f.last.clone(),
        street_address: f.street.clone(),
        city: f.city.clone(),
        state_province: f.state.clone(),
        postal_code: f.postal.clone(),
        country: f.country.clone(),
        phone: f.phone.clone(),
        email: f.email.clone(),
        notes: f.notes.clone(),
        confidential_notes: f.confidential_notes.clone(),
        birth_month: f.birth_month.map(clearable),
        birth_day: f.birth_day.map(clearable),
        photo: f
            .photo
            .as_ref()
            .map(|p| Some(p.trim().to_string()).filter(|p| !p.is_empty())),
        member_type: f.member_type.as_deref().map(parse_member_type).transpose()?,
        family_id: f.family.map(|id| (id != 0).then_some(id)),
        is_active: f.active,
    })
}

fn to_new_person(f: &PersonFields) -> AppResult<NewPerson> {
    let (Some(first), Some(last)) = (&f.first, &f.last) else {
        return Err(AppError::InvalidInput("--first and --last are required".into()));
    };
    let mut p = NewPerson::new(first, last);
    if let Some(v) = &f.middle {
        p.middle_initial = v.trim().to_string();
    }
    if let Some(v) = &f.street {
        p.street_address = v.trim().to_string();
    }
    if let Some(v) = &f.city {
        p.city = v.trim().to_string();
    }
    if let Some(v) = &f.state {
        p.state_province = v.trim().to_string();
    }
    if let Some(v) = &f.postal {
        p.postal_code = v.trim().to_string();
    }
    if let Some(v) = &f.country {
        p.country = v.trim().to_string();
    }
    if let Some(v) = &f.phone {
        p.phone = v.trim().to_string();
    }
    if let Some(v) = &f.email {
        p.email = v.trim().to_string();
    }
    if let Some(v) = &f.notes {
        p.notes = v.clone();
    }
    p.birth_month = f.birth_month.and_then(clearable);
    p.birth_day = f.birth_day.and_then(clearable);
    if let Some(t) = &f.member_type {
        p.member_type = parse_member_type(t)?;
    }
    p.family_id = f.family.and_then(|id| (id != 0).then_some(id));
    if let Some(active) = f.active {
        p.is_active = active;
    }
    Ok(p)
}

fn print_detail(d: &PersonDetail) {
    let p = &d.person;
    println!("👤 {} (id {})", p.display_name(), p.id);
    println!("   Type:     {}", colorize_member_type(p.member_type.label(), p.member_type == MemberType::Member));
    println!(
        "   Family:   {}",
        colorize_optional(d.family.as_ref().map(|f| f.name.as_str()).unwrap_or(""))
    );
    println!("   Active:   {}", if p.is_active { "yes" } else { "no" });
    println!("   Phone:    {}", colorize_optional(&p.phone));
    println!("   Email:    {}", colorize_optional(&p.email));
    let address = [&p.street_address, &p.city, &p.state_province, &p.postal_code]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    println!("   Address:  {}", colorize_optional(&address));
    println!("   Country:  {}", p.country);
    let birthday = match (p.birth_month, p.birth_day) {
        (Some(m), Some(day)) => format!("{m:02}/{day:02}"),
        (Some(m), None) => format!("{m:02}/--"),
        _ => String::new(),
    };
    println!("   Birthday: {}", colorize_optional(&birthday));
    println!("   Photo:    {}", colorize_optional(p.photo.as_deref().unwrap_or("")));
    println!("   Notes:    {}", colorize_optional(&p.notes));
    if d.show_confidential {
        println!("   Confidential: {}", colorize_optional(&p.confidential_notes));
    }
    let tags: Vec<&str> = d.tags.iter().map(|t| t.name.as_str()).collect();
    println!("   Tags:     {}", colorize_optional(&tags.join(", ")));

    println!();
    if d.history.is_empty() {
        info("No attendance recorded.");
    } else {
        println!("   Attendance history:");
        for a in &d.history {
            println!(
                "   - {} at {}",
                a.service.title(),
                format_checkin(&a.attendance.checked_in_at)
            );
        }
    }

    if !d.duplicates.is_empty() {
        warning("Possible duplicates:");
        for dup in &d.duplicates {
            println!("   - [{}] {} {} {}", dup.id, dup.display_name(), dup.phone, dup.email);
        }
    }
}

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Person { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();

    match action {
        PersonAction::Add { fields } => {
            let new_person = to_new_person(fields)?;
            let id = people::create_person(conn, actor, &new_person)?;
            if fields.photo.is_some() || fields.confidential_notes.is_some() {
                let extra = PersonChanges {
                    photo: to_changes(fields)?.photo,
                    confidential_notes: fields.confidential_notes.clone(),
                    ..PersonChanges::default()
                };
                people::update_person(conn, actor, id, &extra)?;
            }
            success(format!("Person {id} created: {} {}", new_person.first_name, new_person.last_name));
        }
        PersonAction::List { query } => {
            let rows = people::list_people(conn, actor, query.as_deref())?;
            if rows.is_empty() {
                info("No people found.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("Name", 26),
                Column::new("Type", 8),
                Column::new("Phone", 14),
                Column::new("Email", 26),
                Column::new("Active", 6),
            ]);
            for p in rows {
                table.add_row(vec![
                    p.id.to_string(),
                    p.display_name(),
                    p.member_type.label().to_string(),
                    p.phone.clone(),
                    p.email.clone(),
                    if p.is_active { "yes" } else { "no" }.to_string(),
                ]);
            }
            print!("{}", table.render());
        }
        PersonAction::Show { id } => {
            let detail = people::person_detail(conn, actor, *id)?;
            print_detail(&detail);
        }
        PersonAction::Edit { id, fields } => {
            let changes = to_changes(fields)?;
            let person = people::update_person(conn, actor, *id, &changes)?;
            success(format!("Person {} updated: {}", person.id, person.display_name()));
        }
        PersonAction::Del { id } => {
            let person = people::delete_person(conn, actor, *id)?;
            success(format!("Deleted {} and their attendance.", person.display_name()));
        }
        PersonAction::Search { query, groups } => {
            let json = if *groups {
                to_pretty(&people::quick_search_groups(conn, actor, query)?)?
            } else {
                to_pretty(&people::quick_search(conn, actor, query)?)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_clears_family_and_birth_fields() {
        let fields = PersonFields {
            family: Some(0),
            birth_month: Some(0),
            photo: Some("  ".into()),
            ..PersonFields::default()
        };
        let c = to_changes(&fields).unwrap();
        assert_eq!(c.family_id, Some(None));
        assert_eq!(c.birth_month, Some(None));
        assert_eq!(c.photo, Some(None));
        assert_eq!(c.birth_day, None);
    }

    #[test]
    fn new_person_needs_both_names() {
        let fields = PersonFields {
            first: Some("Ann".into()),
            ..PersonFields::default()
        };
        assert!(matches!(to_new_person(&fields), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn member_type_accepts_codes() {
        assert_eq!(parse_member_type("m").unwrap(), MemberType::Member);
        assert!(parse_member_type("guest").is_err());
    }
}
