//! Key/value system settings: defaults, typed validation, audited writes.

use crate::config::Config;
use crate::core::audit::AuditEvent;
use crate::core::fonts::{self, FontSource};
use crate::core::permissions::{can_manage_configuration, require};
use crate::core::theme::ADMIN_SKINS;
use crate::db::settings;
use crate::errors::{AppError, AppResult};
use crate::models::audit::AuditAction;
use crate::models::setting::SystemSetting;
use crate::models::user::User;
use regex::Regex;
use rusqlite::Connection;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Values every installation starts with.
pub const DEFAULT_SETTINGS: [(&str, &str); 6] = [
    ("first_name_color", "#000000"),
    ("last_name_color", "#000000"),
    ("hide_last_name", "No"),
    ("label_font", "Arial"),
    ("kiosk_print_mode", "No"),
    ("kiosk_print_iframe", "No"),
];

/// Settings seeded together with a description: (key, value, description).
pub const DESCRIBED_SETTINGS: [(&str, &str, &str); 5] = [
    (
        "kiosk_logo_path",
        "/static/img/EC-SDA-Church_Stacked_Final.png",
        "Logo image shown on kiosk screens.",
    ),
    ("kiosk_logo_width_px", "200", "Logo width in pixels for kiosk screens."),
    (
        "kiosk_logo_height_px",
        "",
        "Logo height in pixels for kiosk screens. Leave blank for auto height.",
    ),
    (
        "label_first_name_scale",
        "100",
        "Scale first-name text size on labels as a percentage (100 = default).",
    ),
    (
        "label_last_name_scale",
        "100",
        "Scale last-name text size on labels as a percentage (100 = default).",
    ),
];

const ADMIN_SKIN_DESCRIPTION: &str = "Bootswatch skin used in the admin area.";

/// Get-or-create every entry of DEFAULT_SETTINGS.
pub fn ensure_default_settings(conn: &Connection) -> rusqlite::Result<()> {
    for (key, value) in DEFAULT_SETTINGS {
        settings::get_or_create(conn, key, value, "")?;
    }
    Ok(())
}

/// Seed described settings; existing rows only get a blank description filled.
/// `admin_skin` also gets a blank value reset to "default".
pub fn seed_described_settings(conn: &Connection) -> rusqlite::Result<()> {
    for (key, value, description) in DESCRIBED_SETTINGS {
        if !settings::get_or_create(conn, key, value, description)? {
            settings::fill_blank_description(conn, key, description)?;
        }
    }

    if !settings::get_or_create(conn, "admin_skin", "default", ADMIN_SKIN_DESCRIPTION)? {
        settings::fill_blank_value(conn, "admin_skin", "default")?;
        settings::fill_blank_description(conn, "admin_skin", ADMIN_SKIN_DESCRIPTION)?;
    }
    Ok(())
}

pub fn default_for(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Stored value, else the built-in default for the key, else `default`.
pub fn get_setting(conn: &Connection, key: &str, default: &str) -> rusqlite::Result<String> {
    if let Some(s) = settings::get(conn, key)? {
        return Ok(s.value);
    }
    Ok(default_for(key).unwrap_or(default).to_string())
}

/// "yes", "true" and "1" (any case) switch a toggle on.
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "yes" | "true" | "1")
}

// ---------------------------
// Typed settings
// ---------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Color,
    YesNo,
    FontSource,
    Font,
    AdminSkin,
    LogoUpload,
    PixelInt,
    PercentInt,
    Text,
}

pub fn kind_for(key: &str) -> SettingKind {
    match key {
        "first_name_color" | "last_name_color" | "kiosk_background_color" | "kiosk_background_color_darkmode" => {
            SettingKind::Color
        }
        "hide_last_name" | "kiosk_print_mode" | "kiosk_print_iframe" | "enable_google_fonts" => SettingKind::YesNo,
        "welcome_heading_font_source" | "label_font_source" => SettingKind::FontSource,
        "label_font" | "welcome_heading_font" => SettingKind::Font,
        "admin_skin" => SettingKind::AdminSkin,
        "kiosk_logo_path" => SettingKind::LogoUpload,
        "kiosk_logo_width_px" | "kiosk_logo_height_px" => SettingKind::PixelInt,
        "label_first_name_scale" | "label_last_name_scale" => SettingKind::PercentInt,
        _ => SettingKind::Text,
    }
}

fn hex_color() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color regex"))
}

fn invalid(key: &str, reason: impl Into<String>) -> AppError {
    AppError::InvalidSetting {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Validate and normalise a raw value for `key`.
pub fn clean_value(key: &str, raw: &str) -> AppResult<String> {
    let value = raw.trim();
    match kind_for(key) {
        SettingKind::Color => {
            if hex_color().is_match(value) {
                Ok(value.to_string())
            } else {
                Err(invalid(key, "Enter a valid hex color in the format #RRGGBB."))
            }
        }
        SettingKind::YesNo => match value.to_lowercase().as_str() {
            "yes" => Ok("Yes".into()),
            "no" => Ok("No".into()),
            _ => Err(invalid(key, "Choose Yes or No.")),
        },
        SettingKind::FontSource => FontSource::parse(value)
            .map(|s| s.as_str().to_string())
            .ok_or_else(|| invalid(key, "Choose system or google.")),
        SettingKind::Font => fonts::all_fonts()
            .find(|f| f.eq_ignore_ascii_case(value))
            .map(str::to_string)
            .ok_or_else(|| invalid(key, format!("Unknown font '{value}'."))),
        SettingKind::AdminSkin => {
            let wanted = value.to_lowercase();
            if ADMIN_SKINS.contains(&wanted.as_str()) {
                Ok(wanted)
            } else {
                Err(invalid(key, format!("Unknown admin skin '{value}'.")))
            }
        }
        SettingKind::LogoUpload => Err(invalid(key, "Upload a logo image with `cats setting logo <FILE>`.")),
        SettingKind::PixelInt => {
            if value.is_empty() {
                return Ok(String::new());
            }
            match value.parse::<u32>() {
                Ok(0) => Ok(String::new()),
                Ok(n) => Ok(n.to_string()),
                Err(_) => Err(invalid(key, "Pixel value, e.g. \"200\". Leave blank (or 0) for auto.")),
            }
        }
        SettingKind::PercentInt => {
            if value.is_empty() {
                return Ok(String::new());
            }
            match value.parse::<u32>() {
                Ok(n) if (50..=200).contains(&n) => Ok(n.to_string()),
                _ => Err(invalid(key, "Percent scale from 50 to 200. \"100\" keeps default size.")),
            }
        }
        SettingKind::Text => Ok(raw.to_string()),
    }
}

/// Outcome of one setting write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: String,
    pub old_value: String,
    pub new_value: String,
}

fn write_value(
    conn: &Connection,
    actor: Option<&User>,
    key: &str,
    new_value: String,
) -> AppResult<Option<SettingChange>> {
    let existing = settings::get(conn, key)?;
    let old_value = existing.as_ref().map(|s| s.value.clone()).unwrap_or_default();

    if existing.is_some() && old_value == new_value {
        return Ok(None);
    }

    settings::upsert_value(conn, key, &new_value)?;
    AuditEvent::new(AuditAction::SettingChange, actor)
        .message(format!("Setting \"{key}\" updated."))
        .metadata(json!({"key": key, "old_value": old_value, "new_value": new_value}))
        .record(conn)?;

    Ok(Some(SettingChange {
        key: key.to_string(),
        old_value,
        new_value,
    }))
}

/// Validate and store one setting. Returns `None` when nothing changed.
pub fn update_setting(
    conn: &Connection,
    actor: Option<&User>,
    key: &str,
    raw: &str,
) -> AppResult<Option<SettingChange>> {
    require(can_manage_configuration(actor), "managing system settings requires the Admin role")?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::InvalidInput("setting key cannot be empty".into()));
    }
    let value = clean_value(key, raw)?;
    write_value(conn, actor, key, value)
}

/// Apply many existing settings at once; nothing is written unless every
/// key exists and every value is valid. `kiosk_logo_path` keeps its stored
/// value, logos only change through `upload_logo`.
pub fn bulk_update(
    conn: &Connection,
    actor: Option<&User>,
    values: &BTreeMap<String, String>,
) -> AppResult<Vec<SettingChange>> {
    require(can_manage_configuration(actor), "managing system settings requires the Admin role")?;

    let mut cleaned = Vec::with_capacity(values.len());
    for (key, raw) in values {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::InvalidInput("setting key cannot be empty".into()));
        }
        if kind_for(key) == SettingKind::LogoUpload {
            continue;
        }
        if settings::get(conn, key)?.is_none() {
            return Err(invalid(key, "Unknown setting. Create it with `cats setting set` first."));
        }
        cleaned.push((key, clean_value(key, raw)?));
    }

    let tx = conn.unchecked_transaction()?;
    let mut changes = Vec::new();
    for (key, value) in cleaned {
        if let Some(change) = write_value(&tx, actor, key, value)? {
            changes.push(change);
        }
    }
    tx.commit()?;
    Ok(changes)
}

/// Pick a file name under `dir` that does not exist yet.
fn available_name(dir: &Path, file_name: &str) -> String {
    if !dir.join(file_name).exists() {
        return file_name.to_string();
    }
    let path = Path::new(file_name);
    let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|n| format!("{stem}_{n}{ext}"))
        .find(|candidate| !dir.join(candidate).exists())
        .unwrap_or_else(|| file_name.to_string())
}

const LOGO_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "svg", "webp"];

/// Copy a logo image into `<media_dir>/branding/` and point `kiosk_logo_path` at it.
pub fn upload_logo(
    conn: &Connection,
    cfg: &Config,
    actor: Option<&User>,
    source: &Path,
) -> AppResult<Option<SettingChange>> {
    require(can_manage_configuration(actor), "managing system settings requires the Admin role")?;

    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !LOGO_EXTENSIONS.contains(&ext.as_str()) {
        return Err(invalid("kiosk_logo_path", "Upload logo image (PNG/JPG/SVG/WebP)."));
    }
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| invalid("kiosk_logo_path", "missing file name"))?;

    let branding: PathBuf = Path::new(&cfg.media_dir).join("branding");
    fs::create_dir_all(&branding)?;
    let stored = available_name(&branding, &file_name);
    fs::copy(source, branding.join(&stored))?;

    let url = format!("{}/branding/{}", cfg.media_url.trim_end_matches('/'), stored);
    write_value(conn, actor, "kiosk_logo_path", url)
}

// ---------------------------
// Presentation
// ---------------------------

pub const SECTION_ORDER: [&str; 5] = [
    "Kiosk Preferences",
    "Admin Appearance",
    "Label & Printing",
    "Font Platform",
    "Other",
];

pub fn section_for(key: &str) -> &'static str {
    match key {
        "welcome_heading"
        | "welcome_heading_font"
        | "welcome_heading_font_source"
        | "kiosk_background_color"
        | "kiosk_background_color_darkmode"
        | "kiosk_logo_path"
        | "kiosk_logo_width_px"
        | "kiosk_logo_height_px" => "Kiosk Preferences",
        "first_name_color"
        | "last_name_color"
        | "hide_last_name"
        | "label_font"
        | "label_font_source"
        | "label_first_name_scale"
        | "label_last_name_scale"
        | "kiosk_print_mode"
        | "kiosk_print_iframe" => "Label & Printing",
        "admin_skin" => "Admin Appearance",
        "enable_google_fonts" => "Font Platform",
        _ => "Other",
    }
}

pub fn friendly_label(key: &str) -> String {
    let known = match key {
        "enable_google_fonts" => "Enable Google Fonts",
        "first_name_color" => "First Name Color",
        "hide_last_name" => "Hide Last Name",
        "kiosk_background_color" => "Kiosk Background Color (Light)",
        "kiosk_background_color_darkmode" => "Kiosk Background Color (Dark)",
        "kiosk_logo_path" => "Kiosk Logo Image",
        "kiosk_logo_width_px" => "Kiosk Logo Width (px)",
        "kiosk_logo_height_px" => "Kiosk Logo Height (px)",
        "kiosk_print_mode" => "Auto Print Mode",
        "kiosk_print_iframe" => "In-Page Print Preview Mode",
        "admin_skin" => "Admin Skin",
        "label_font" => "Label Font",
        "label_font_source" => "Label Font Source",
        "label_first_name_scale" => "Label First Name Size (%)",
        "label_last_name_scale" => "Label Last Name Size (%)",
        "last_name_color" => "Last Name Color",
        "welcome_heading" => "Welcome Heading Text",
        "welcome_heading_font" => "Welcome Heading Font",
        "welcome_heading_font_source" => "Welcome Heading Font Source",
        _ => return crate::utils::formatting::title_case(&key.replace('_', " ")),
    };
    known.to_string()
}

/// Stored settings grouped by section, in section order; empty sections are skipped.
pub fn sections(conn: &Connection) -> AppResult<Vec<(&'static str, Vec<SystemSetting>)>> {
    let mut by_section: BTreeMap<&'static str, Vec<SystemSetting>> = BTreeMap::new();
    for s in settings::list(conn)? {
        by_section.entry(section_for(&s.key)).or_default().push(s);
    }

    Ok(SECTION_ORDER
        .iter()
        .filter_map(|name| by_section.remove(name).map(|rows| (*name, rows)))
        .collect())
}
