use crate::cli::commands::Session;
use crate::cli::parser::{Commands, ServiceAction};
use crate::config::Config;
use crate::core::permissions::{can_access_admin_site, require};
use crate::core::service::{close_service, get_or_create_today, reopen_service};
use crate::core::service_admin::{self, ServiceOverview};
use crate::db::services;
use crate::errors::AppResult;
use crate::export::csv::{attendees_to_file, people_to_file};
use crate::export::fs_utils::ensure_writable;
use crate::export::json::to_pretty;
use crate::export::{ServiceExport, notify_export_success};
use crate::models::service::Service;
use crate::ui::messages::{info, success};
use crate::utils::colors::{RESET, color_for_status};
use crate::utils::date::{format_checkin, parse_date, today};
use crate::utils::table::{Column, Table};
use std::path::PathBuf;

fn status_text(s: &Service) -> String {
    format!("{}{}{}", color_for_status(s.is_closed()), s.status.to_db_str(), RESET)
}

fn print_overview(o: &ServiceOverview) {
    println!("📅 {} ({})", o.service.title(), status_text(&o.service));
    if !o.service.notes.is_empty() {
        println!("   {}", o.service.notes);
    }
    println!();

    println!("Attendees ({}):", o.attendees.len());
    for d in &o.attendees {
        println!(
            "  [{}] {} at {}",
            d.attendance.id,
            d.person.display_name(),
            format_checkin(&d.attendance.checked_in_at)
        );
    }
    println!();

    println!("Missing members ({}):", o.missing_members.len());
    for p in &o.missing_members {
        println!("  [{}] {}", p.id, p.display_name());
    }
    println!();

    println!("First-time visitors ({}):", o.first_time_visitors.len());
    for p in &o.first_time_visitors {
        println!("  [{}] {}", p.id, p.display_name());
    }
}

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Service { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();

    match action {
        ServiceAction::List { limit } => {
            require(can_access_admin_site(actor), "listing services requires admin site access")?;
            session.admin_header("Church services");
            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("Date", 10),
                Column::new("Label", 28),
                Column::new("Status", 6),
                Column::new("Attendance", 10),
            ]);
            for (s, count) in services::list_services(conn, *limit)? {
                table.add_row(vec![
                    s.id.to_string(),
                    s.date.format("%Y-%m-%d").to_string(),
                    s.label.clone(),
                    s.status.to_db_str().to_string(),
                    count.to_string(),
                ]);
            }
            if table.is_empty() {
                info("No services yet.");
            } else {
                print!("{}", table.render());
            }
        }
        ServiceAction::Show { id } => {
            let overview = service_admin::service_overview(conn, actor, *id)?;
            session.admin_header("Manage church service");
            print_overview(&overview);
        }
        ServiceAction::Today { date } => {
            require(can_access_admin_site(actor), "opening services requires admin site access")?;
            let date = match date {
                Some(raw) => parse_date(raw)?,
                None => today(),
            };
            let (service, created) = get_or_create_today(conn, cfg, date)?;
            if created {
                success(format!("Opened {} (id {}).", service.title(), service.id));
            } else {
                info(format!("{} (id {}) is {}.", service.title(), service.id, status_text(&service)));
            }
        }
        ServiceAction::Close { id } => {
            let s = close_service(conn, actor, *id)?;
            success(format!("{} is now {}.", s.title(), status_text(&s)));
        }
        ServiceAction::Reopen { id } => {
            let s = reopen_service(conn, actor, *id)?;
            success(format!("{} is now {}.", s.title(), status_text(&s)));
        }
        ServiceAction::CheckIn { id, person_id } => {
            let (att, created) = service_admin::check_in_missing(conn, actor, *id, *person_id)?;
            if created {
                success(format!("Checked in person {person_id} (attendance {}).", att.id));
            } else {
                info(format!("Person {person_id} was already checked in."));
            }
        }
        ServiceAction::Undo { id, attendance_id } => {
            let d = service_admin::undo_checkin(conn, actor, *id, *attendance_id)?;
            success(format!("Removed {} from {}.", d.person.display_name(), d.service.title()));
        }
        ServiceAction::Counts { id } => {
            let counts = service_admin::live_counts(conn, actor, *id)?;
            println!("{}", to_pretty(&counts)?);
        }
        ServiceAction::Export { id, kind, file, force } => {
            let overview = service_admin::service_overview(conn, actor, *id)?;
            let path = match file {
                Some(f) => PathBuf::from(f),
                None => PathBuf::from(format!(
                    "{}_{}.csv",
                    kind.file_prefix(),
                    overview.service.date.format("%Y-%m-%d")
                )),
            };
            ensure_writable(&path, *force)?;
            match kind {
                ServiceExport::Attendees => attendees_to_file(&path, &overview.attendees)?,
                ServiceExport::FirstTime => people_to_file(&path, &overview.first_time_visitors)?,
            }
            notify_export_success(kind.label(), &path);
        }
    }
    Ok(())
}
