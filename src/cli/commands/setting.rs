use crate::cli::commands::Session;
use crate::cli::parser::{Commands, SettingAction};
use crate::config::Config;
use crate::core::fonts::{GOOGLE_FONTS, SYSTEM_FONTS};
use crate::core::permissions::{can_manage_configuration, require};
use crate::core::settings_store::{self, SettingChange, friendly_label};
use crate::core::theme::{ADMIN_SKINS, admin_skin, skin_label};
use crate::db::settings;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use crate::utils::colors::colorize_optional;
use crate::utils::formatting::{bold, pad_right};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn report_change(change: Option<SettingChange>, key: &str) {
    match change {
        Some(c) => success(format!(
            "{}: '{}' → '{}'",
            friendly_label(&c.key),
            c.old_value,
            c.new_value
        )),
        None => info(format!("{} unchanged.", friendly_label(key))),
    }
}

/// YAML scalars as the text a form field would carry.
fn scalar_text(key: &str, value: &Value) -> AppResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(if *b { "Yes" } else { "No" }.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        _ => Err(AppError::InvalidSetting {
            key: key.to_string(),
            reason: "expected a single value".into(),
        }),
    }
}

fn load_import(path: &Path) -> AppResult<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)?;
    let raw: BTreeMap<String, Value> = serde_yaml::from_str(&content)?;
    raw.iter()
        .map(|(k, v)| Ok((k.clone(), scalar_text(k, v)?)))
        .collect()
}

pub fn handle(cmd: &Commands, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let Commands::Setting { action } = cmd else {
        return Ok(());
    };
    let session = Session::open(cfg, user)?;
    let conn = &session.pool.conn;
    let actor = session.actor();

    match action {
        SettingAction::List => {
            require(can_manage_configuration(actor), "system settings require the Admin role")?;
            session.admin_header("System settings");
            for (section, rows) in settings_store::sections(conn)? {
                println!("{}", bold(section));
                for s in rows {
                    println!("  {} {}", pad_right(&friendly_label(&s.key), 34), colorize_optional(&s.value));
                    if !s.description.is_empty() {
                        println!("  {} {}", pad_right("", 34), s.description);
                    }
                }
                println!();
            }
        }
        SettingAction::Get { key } => {
            require(can_manage_configuration(actor), "system settings require the Admin role")?;
            let row = settings::get(conn, key)?.ok_or_else(|| AppError::not_found("setting", key))?;
            println!("{}", row.value);
        }
        SettingAction::Set { key, value } => {
            let change = settings_store::update_setting(conn, actor, key, value)?;
            report_change(change, key);
        }
        SettingAction::Import { file } => {
            let values = load_import(Path::new(file))?;
            if values.contains_key("kiosk_logo_path") {
                info("kiosk_logo_path is kept; use `cats setting logo <FILE>` to change it.");
            }
            let changes = settings_store::bulk_update(conn, actor, &values)?;
            if changes.is_empty() {
                info("No settings changed.");
            }
            for c in changes {
                let key = c.key.clone();
                report_change(Some(c), &key);
            }
        }
        SettingAction::Logo { file } => {
            let change = settings_store::upload_logo(conn, cfg, actor, Path::new(file))?;
            report_change(change, "kiosk_logo_path");
        }
        SettingAction::Fonts => {
            println!("{}", bold("System fonts"));
            for f in SYSTEM_FONTS {
                println!("  {f}");
            }
            println!("{}", bold("Google fonts"));
            for f in GOOGLE_FONTS {
                println!("  {f}");
            }
        }
        SettingAction::Skins => {
            let current = admin_skin(conn);
            for s in ADMIN_SKINS {
                let marker = if s == current { "*" } else { " " };
                println!("{marker} {:<10} {}", s, skin_label(s));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_scalars_become_form_text() {
        let raw: BTreeMap<String, Value> =
            serde_yaml::from_str("hide_last_name: true\nlabel_first_name_scale: 120\nkiosk_logo_width_px:\n").unwrap();
        let text: BTreeMap<String, String> = raw
            .iter()
            .map(|(k, v)| (k.clone(), scalar_text(k, v).unwrap()))
            .collect();
        assert_eq!(text["hide_last_name"], "Yes");
        assert_eq!(text["label_first_name_scale"], "120");
        assert_eq!(text["kiosk_logo_width_px"], "");
    }

    #[test]
    fn nested_values_are_rejected() {
        let v: Value = serde_yaml::from_str("[1, 2]").unwrap();
        assert!(matches!(scalar_text("admin_skin", &v), Err(AppError::InvalidSetting { .. })));
    }
}
