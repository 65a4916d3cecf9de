use crate::cli::commands::{Session, emit_html};
use crate::cli::parser::{Commands, PrintAction};
use crate::config::Config;
use crate::core::labels::{parse_ids, print_batch, print_tag};
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Print { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();

    let (job, out) = match action {
        PrintAction::Tag { attendance_id, out } => (print_tag(conn, actor, *attendance_id)?, out),
        PrintAction::Batch { ids, out } => (print_batch(conn, actor, &parse_ids(ids))?, out),
    };
    if job.iframe_print && out.is_some() {
        info("Iframe printing is enabled; open the file from the kiosk page to print silently.");
    }
    emit_html(&job.html, out.as_deref())?;
    Ok(())
}
