use crate::cli::commands::{Session, emit_html};
use crate::cli::parser::{CheckinAction, Commands};
use crate::config::Config;
use crate::core::checkin::{self, Mode, VisitorForm};
use crate::core::labels::{parse_ids, print_batch, print_tag};
use crate::errors::AppResult;
use crate::ui::messages::{info, info_stderr, success, success_stderr};
use crate::utils::date::today;

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Checkin { kiosk, action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();
    let mode = if *kiosk { Mode::Kiosk } else { Mode::Staff };
    let today = today();

    // Name tag HTML without --out goes to stdout, so status lines move to stderr.
    let html_on_stdout = match action {
        CheckinAction::Find { .. } => false,
        CheckinAction::Person { out, .. }
        | CheckinAction::Visitor { out, .. }
        | CheckinAction::Selected { out, .. } => out.is_none(),
    };
    let status = |msg: String| {
        if html_on_stdout {
            success_stderr(msg)
        } else {
            success(msg)
        }
    };

    if let Some(opened) = checkin::start_session(conn, cfg, actor, mode, today)? {
        let msg = format!("Opened {}", opened.title());
        if html_on_stdout {
            info_stderr(msg)
        } else {
            info(msg)
        }
    }

    match action {
        CheckinAction::Find { query } => {
            let groups = checkin::search_groups(conn, query)?;
            if groups.is_empty() {
                info(format!("No one found for '{query}'. Register them as a visitor."));
                return Ok(());
            }
            for g in groups {
                let title = g
                    .family
                    .as_ref()
                    .map(|f| format!("{} Family", f.name))
                    .unwrap_or_else(|| g.primary.display_name());
                println!("👪 {title}");
                for m in &g.members {
                    let marker = if m.id == g.primary.id { "*" } else { " " };
                    println!("  {marker} [{}] {}", m.id, m.display_name());
                }
            }
        }
        CheckinAction::Person { id, out } => {
            let att = checkin::check_in_person(conn, cfg, actor, *id, today, mode.source())?;
            let job = print_tag(conn, actor, att.id)?;
            status(format!("Checked in person {id} (attendance {}).", att.id));
            emit_html(&job.html, out.as_deref())?;
        }
        CheckinAction::Visitor {
            first,
            middle,
            last,
            street,
            phone,
            email,
            birth_month,
            birth_day,
            out,
        } => {
            let form = VisitorForm {
                first_name: first.clone(),
                middle_initial: middle.clone(),
                last_name: last.clone(),
                street_address: street.clone(),
                phone: phone.clone(),
                email: email.clone(),
                birth_month: birth_month.clone(),
                birth_day: birth_day.clone(),
            };
            let att = checkin::check_in_visitor(conn, cfg, actor, &form, today, mode.source())?;
            let job = print_tag(conn, actor, att.id)?;
            status(format!(
                "Welcome {} {}! Registered as person {} (attendance {}).",
                first.trim(),
                last.trim(),
                att.person_id,
                att.id
            ));
            emit_html(&job.html, out.as_deref())?;
        }
        CheckinAction::Selected { ids, primary, out } => {
            let person_ids = parse_ids(ids);
            let attendance_ids = checkin::check_in_selected(conn, cfg, actor, &person_ids, *primary, today)?;
            let job = print_batch(conn, actor, &attendance_ids)?;
            status(format!("Checked in {} people.", attendance_ids.len()));
            emit_html(&job.html, out.as_deref())?;
        }
    }
    Ok(())
}
