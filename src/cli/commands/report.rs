use crate::cli::commands::Session;
use crate::cli::parser::{Commands, ReportAction};
use crate::config::Config;
use crate::core::reports::{self, PeopleReport};
use crate::db::audit::AuditFilter;
use crate::errors::{AppError, AppResult};
use crate::export::csv::people_to_file;
use crate::export::fs_utils::ensure_writable;
use crate::export::notify_export_success;
use crate::models::audit::AuditAction;
use crate::ui::messages::{header, info};
use crate::utils::date::format_short;
use crate::utils::table::{Column, Table};
use std::path::PathBuf;

fn show_people(title: &str, report: &PeopleReport) {
    match &report.service {
        Some(s) => header(format!("{title}: {}", s.title())),
        None => {
            info("No services recorded yet.");
            return;
        }
    }
    if report.people.is_empty() {
        info("Nobody to list.");
        return;
    }
    let mut table = Table::new(vec![
        Column::new("ID", 5),
        Column::new("Name", 26),
        Column::new("Phone", 14),
        Column::new("Email", 28),
    ]);
    for p in &report.people {
        table.add_row(vec![p.id.to_string(), p.display_name(), p.phone.clone(), p.email.clone()]);
    }
    print!("{}", table.render());
}

fn export_people(
    label: &str,
    prefix: &str,
    report: &PeopleReport,
    file: Option<&str>,
    force: bool,
) -> AppResult<()> {
    let path = file
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(report.file_name(prefix)));
    ensure_writable(&path, force)?;
    people_to_file(&path, &report.people)?;
    notify_export_success(label, &path);
    Ok(())
}

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Report { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();

    match action {
        ReportAction::Missing { service, csv, file, force } => {
            let report = reports::missing_members(conn, actor, *service)?;
            if *csv {
                export_people("Missing members", "missing_members", &report, file.as_deref(), *force)?;
            } else {
                show_people("Missing members", &report);
            }
        }
        ReportAction::FirstTime { service, csv, file, force } => {
            let report = reports::first_time_visitors(conn, actor, *service)?;
            if *csv {
                export_people("First-time visitors", "first_time_visitors", &report, file.as_deref(), *force)?;
            } else {
                show_people("First-time visitors", &report);
            }
        }
        ReportAction::Audit { action, search, limit } => {
            let action = match action {
                Some(raw) => Some(
                    AuditAction::from_db_str(raw.trim())
                        .ok_or_else(|| AppError::InvalidInput(format!("unknown audit action '{raw}'")))?,
                ),
                None => None,
            };
            let filter = AuditFilter {
                action,
                search: search.clone(),
                limit: *limit,
            };
            let rows = reports::audit_trail(conn, actor, &filter)?;
            session.admin_header("Audit log");
            if rows.is_empty() {
                info("No audit entries.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::new("When", 16),
                Column::new("Action", 16),
                Column::new("Actor", 12),
                Column::new("Person", 20),
                Column::new("Message", 36),
            ]);
            for e in rows {
                let when = chrono::DateTime::parse_from_rfc3339(&e.created_at)
                    .map(|dt| format_short(&dt))
                    .unwrap_or_else(|_| e.created_at.clone());
                table.add_row(vec![
                    when,
                    AuditAction::from_db_str(&e.action)
                        .map(|a| a.label().to_string())
                        .unwrap_or_else(|| e.action.clone()),
                    e.actor.clone().unwrap_or_else(|| "system".into()),
                    e.person_name.clone().unwrap_or_default(),
                    e.message.clone(),
                ]);
            }
            print!("{}", table.render());
        }
    }
    Ok(())
}
