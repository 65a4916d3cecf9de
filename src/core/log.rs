use crate::db::log::load_log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::formatting::truncate;
use ansi_term::Colour;
use unicode_width::UnicodeWidthStr;

const OP_TARGET_MAX: usize = 60;

/// Colour for an operation in the internal log.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "add" | "user_add" | "grant" => Colour::Green,
        "del" | "revoke" => Colour::Red,
        "edit" | "user_edit" => Colour::Yellow,
        "migration_applied" => Colour::Purple,
        "backup" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let entries: Vec<(i64, String, String, String, String)> = load_log(&pool.conn)?
            .into_iter()
            .map(|(id, raw_date, op, target, message)| {
                let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or(raw_date);
                let op_target = if target.is_empty() {
                    op.clone()
                } else {
                    truncate(&format!("{op} ({target})"), OP_TARGET_MAX)
                };
                (id, date, op, op_target, message)
            })
            .collect();

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let op_w = entries
            .iter()
            .map(|(_, _, _, t, _)| UnicodeWidthStr::width(t.as_str()))
            .max()
            .unwrap_or(10);
        let id_w = entries.iter().map(|(id, ..)| id.to_string().len()).max().unwrap_or(1);
        let date_w = entries.iter().map(|(_, d, ..)| d.len()).max().unwrap_or(10);

        println!("📜 Internal log:\n");

        for (id, date, op, op_target, message) in entries {
            let color = color_for_operation(&op);
            // Only the operation word is coloured; the target keeps the default colour.
            let rest = op_target.strip_prefix(op.as_str()).unwrap_or("");
            let padding = " ".repeat(op_w.saturating_sub(UnicodeWidthStr::width(op_target.as_str())));
            println!(
                "{:>id_w$}: {:<date_w$} | {}{}{} => {}",
                id,
                date,
                color.paint(op.as_str()),
                rest,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
