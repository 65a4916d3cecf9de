//! Printable name tags.
//!
//! Tags are rendered as a self-contained HTML document; styling comes from
//! the label settings.

use crate::core::audit::AuditEvent;
use crate::core::fonts::{FontSource, ResolvedFont, resolve_font};
use crate::core::permissions::{can_print_labels, require};
use crate::core::settings_store::{get_setting, is_truthy};
use crate::db::attendance;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceDetail;
use crate::models::audit::AuditAction;
use crate::models::user::User;
use rusqlite::Connection;
use serde_json::json;

const FIRST_NAME_BASE_PX: u32 = 48;
const LAST_NAME_BASE_PX: u32 = 32;

/// Percent scale in 50..=200; anything else means 100.
pub fn parse_scale(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(v) if (50..=200).contains(&v) => v,
        _ => 100,
    }
}

#[derive(Debug, Clone)]
pub struct LabelStyle {
    pub first_name_color: String,
    pub last_name_color: String,
    pub hide_last_name: bool,
    pub font: ResolvedFont,
    pub first_name_scale: u32,
    pub last_name_scale: u32,
    pub auto_print: bool,
    pub iframe_print: bool,
}

impl LabelStyle {
    pub fn load(conn: &Connection) -> AppResult<Self> {
        let google = is_truthy(&get_setting(conn, "enable_google_fonts", "No")?);
        let source = FontSource::parse(&get_setting(conn, "label_font_source", "system")?)
            .unwrap_or(FontSource::System);
        let font_name = get_setting(conn, "label_font", "Arial")?;

        Ok(Self {
            first_name_color: get_setting(conn, "first_name_color", "#000000")?,
            last_name_color: get_setting(conn, "last_name_color", "#000000")?,
            hide_last_name: is_truthy(&get_setting(conn, "hide_last_name", "No")?),
            font: resolve_font(&font_name, source, google),
            first_name_scale: parse_scale(&get_setting(conn, "label_first_name_scale", "100")?),
            last_name_scale: parse_scale(&get_setting(conn, "label_last_name_scale", "100")?),
            auto_print: is_truthy(&get_setting(conn, "kiosk_print_mode", "No")?),
            iframe_print: is_truthy(&get_setting(conn, "kiosk_print_iframe", "No")?),
        })
    }

    fn first_px(&self) -> u32 {
        FIRST_NAME_BASE_PX * self.first_name_scale / 100
    }

    fn last_px(&self) -> u32 {
        LAST_NAME_BASE_PX * self.last_name_scale / 100
    }
}

/// A rendered print document.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub html: String,
    pub labels: usize,
    /// The caller should preview in-page instead of opening a new window.
    pub iframe_print: bool,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_label(style: &LabelStyle, detail: &AttendanceDetail) -> String {
    let mut html = format!(
        "  <div class=\"nametag\">\n    <div class=\"first-name\">{}</div>\n",
        escape_html(&detail.person.first_name)
    );
    if !style.hide_last_name {
        html.push_str(&format!(
            "    <div class=\"last-name\">{}</div>\n",
            escape_html(&detail.person.last_name)
        ));
    }
    html.push_str(&format!(
        "    <div class=\"service\">{}</div>\n  </div>\n",
        escape_html(&detail.service.label)
    ));
    html
}

/// Full HTML document holding one tag per attendance, in order.
pub fn render_document(style: &LabelStyle, details: &[AttendanceDetail]) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Name Tags</title>\n");
    if let Some(href) = &style.font.stylesheet {
        html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", escape_html(href)));
    }
    html.push_str(&format!(
        "<style>\n\
         body {{ margin: 0; font-family: {font}; }}\n\
         .nametag {{ page-break-after: always; text-align: center; padding: 12px; }}\n\
         .first-name {{ color: {first_color}; font-size: {first_px}px; font-weight: 700; }}\n\
         .last-name {{ color: {last_color}; font-size: {last_px}px; }}\n\
         .service {{ font-size: 12px; color: #555555; }}\n\
         </style>\n",
        font = style.font.css_stack,
        first_color = style.first_name_color,
        first_px = style.first_px(),
        last_color = style.last_name_color,
        last_px = style.last_px(),
    ));
    html.push_str("</head>\n<body>\n");
    for detail in details {
        html.push_str(&render_label(style, detail));
    }
    if style.auto_print {
        html.push_str("<script>window.addEventListener('load', function () { window.print(); });</script>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// "12,x,7" → [12, 7]; non-numeric entries are ignored.
pub fn parse_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|v| v.parse().ok())
        .collect()
}

fn print_details(conn: &Connection, actor: Option<&User>, details: Vec<AttendanceDetail>) -> AppResult<PrintJob> {
    let style = LabelStyle::load(conn)?;
    let html = render_document(&style, &details);

    for d in &details {
        AuditEvent::new(AuditAction::PrintNametag, actor)
            .service(d.service.id)
            .person(d.person.id)
            .attendance(d.attendance.id)
            .message("Name tag printed.")
            .metadata(json!({"labels": details.len()}))
            .record(conn)?;
    }

    Ok(PrintJob {
        html,
        labels: details.len(),
        iframe_print: style.iframe_print,
    })
}

/// The tag for a single attendance.
pub fn print_tag(conn: &Connection, actor: Option<&User>, attendance_id: i64) -> AppResult<PrintJob> {
    require(can_print_labels(actor), "printing labels requires kiosk or staff access")?;
    let detail = attendance::require_detail(conn, attendance_id)?;
    print_details(conn, actor, vec![detail])
}

/// Tags for several attendances in the requested order; unknown ids are skipped.
pub fn print_batch(conn: &Connection, actor: Option<&User>, ids: &[i64]) -> AppResult<PrintJob> {
    require(can_print_labels(actor), "printing labels requires kiosk or staff access")?;

    let mut details = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(d) = attendance::get_detail(conn, *id)? {
            details.push(d);
        }
    }
    if details.is_empty() {
        return Err(AppError::InvalidInput("no printable attendances in the batch".into()));
    }
    print_details(conn, actor, details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::checkin::{CheckInSource, check_in_person};
    use crate::db::audit::{AuditFilter, list};
    use crate::db::initialize::init_db;
    use crate::db::pool::DbPool;
    use crate::db::{people, settings};
    use crate::models::person::NewPerson;
    use crate::models::user::ROLE_GREETER;
    use chrono::NaiveDate;

    fn setup() -> (DbPool, User, Vec<i64>) {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        let uid = crate::db::users::insert_user(&pool.conn, "greeter", false, false, true).unwrap();
        let user = User {
            id: uid,
            username: "greeter".into(),
            is_staff: false,
            is_superuser: false,
            is_active: true,
            groups: vec![ROLE_GREETER.into()],
        };
        let cfg = Config::default();
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut ids = Vec::new();
        for (first, last) in [("Anna", "O'Neil"), ("Bob", "Jones")] {
            let pid = people::insert_person(&pool.conn, &NewPerson::new(first, last)).unwrap();
            ids.push(check_in_person(&pool.conn, &cfg, None, pid, day, CheckInSource::Checkin).unwrap().id);
        }
        (pool, user, ids)
    }

    #[test]
    fn scale_falls_back_to_100() {
        assert_eq!(parse_scale("150"), 150);
        assert_eq!(parse_scale("49"), 100);
        assert_eq!(parse_scale("abc"), 100);
        assert_eq!(parse_scale(""), 100);
    }

    #[test]
    fn ids_skip_garbage() {
        assert_eq!(parse_ids("3, x,1,,-2,7"), vec![3, 1, 7]);
    }

    #[test]
    fn batch_keeps_order_and_drops_unknown() {
        let (pool, user, ids) = setup();
        let job = print_batch(&pool.conn, Some(&user), &[ids[1], 999, ids[0]]).unwrap();
        assert_eq!(job.labels, 2);
        let bob = job.html.find("Bob").unwrap();
        let anna = job.html.find("Anna").unwrap();
        assert!(bob < anna);
        assert!(job.html.contains("O&#39;Neil"));

        let printed = list(
            &pool.conn,
            &AuditFilter {
                action: Some(AuditAction::PrintNametag),
                ..AuditFilter::default()
            },
        )
        .unwrap();
        assert_eq!(printed.len(), 2);
        assert!(print_batch(&pool.conn, Some(&user), &[999]).is_err());
    }

    #[test]
    fn style_settings_shape_the_document() {
        let (pool, user, ids) = setup();
        settings::upsert_value(&pool.conn, "hide_last_name", "Yes").unwrap();
        settings::upsert_value(&pool.conn, "label_first_name_scale", "150").unwrap();
        settings::upsert_value(&pool.conn, "kiosk_print_mode", "Yes").unwrap();
        settings::upsert_value(&pool.conn, "label_font", "Lato").unwrap();
        settings::upsert_value(&pool.conn, "label_font_source", "google").unwrap();
        settings::upsert_value(&pool.conn, "enable_google_fonts", "Yes").unwrap();

        let job = print_tag(&pool.conn, Some(&user), ids[1]).unwrap();
        assert!(!job.html.contains("Jones"));
        assert!(job.html.contains("font-size: 72px"));
        assert!(job.html.contains("window.print()"));
        assert!(job.html.contains("family=Lato"));
    }

    #[test]
    fn anonymous_cannot_print() {
        let (pool, _, ids) = setup();
        assert!(matches!(
            print_tag(&pool.conn, None, ids[0]),
            Err(AppError::PermissionDenied(_))
        ));
    }
}
