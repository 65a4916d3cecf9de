use crate::cli::commands::Session;
use crate::cli::parser::{Commands, KioskAction};
use crate::config::Config;
use crate::core::permissions::can_access_kiosk;
use crate::core::service::service_label;
use crate::core::theme::KioskTheme;
use crate::db::services;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{colorize_optional, color_for_status, RESET};
use crate::utils::date::today;
use crate::utils::formatting::yes_no;

fn px(v: Option<u32>) -> String {
    v.map(|v| format!("{v}px")).unwrap_or_else(|| "auto".into())
}

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Kiosk { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;

    match action {
        KioskAction::Status => {
            let today = today();
            let label = service_label(cfg, today);
            let existing = services::find_service(conn, today, &label)?;
            match &existing {
                Some(s) => println!(
                    "📅 {} {}{}{}",
                    s.title(),
                    color_for_status(s.is_closed()),
                    s.status.to_db_str(),
                    RESET
                ),
                None => info(format!("{label} on {today} has not been opened yet.")),
            }

            let closed = existing.as_ref().is_some_and(|s| s.is_closed());
            if !can_access_kiosk(session.actor()) {
                warning("The kiosk requires the Greeter or Admin role.");
            } else if closed {
                warning("Today's service is closed; the kiosk will not check anyone in.");
            } else {
                success("Kiosk ready for check-in.");
            }
        }
        KioskAction::Theme => {
            let t = KioskTheme::load(conn)?;
            println!("Welcome heading: {}", t.welcome_heading);
            println!("Heading font:    {} ({})", t.heading_font.family, t.heading_font.css_stack);
            if let Some(href) = &t.heading_font.stylesheet {
                println!("Stylesheet:      {href}");
            }
            println!("Background:      {} / {} (dark)", t.background_light, t.background_dark);
            println!("Logo:            {}", colorize_optional(&t.logo_path));
            println!("Logo size:       {} x {}", px(t.logo_width_px), px(t.logo_height_px));
            println!("Auto print:      {}", yes_no(t.auto_print));
            println!("Iframe print:    {}", yes_no(t.iframe_print));
        }
    }
    Ok(())
}
