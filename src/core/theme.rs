//! Admin skin selection and kiosk appearance.

use crate::core::fonts::{FontSource, ResolvedFont, resolve_font};
use crate::core::settings_store::{get_setting, is_truthy};
use rusqlite::Connection;

pub const DEFAULT_SKIN: &str = "default";

pub const ADMIN_SKINS: [&str; 22] = [
    "default",
    "cerulean",
    "cosmo",
    "cyborg",
    "darkly",
    "flatly",
    "journal",
    "litera",
    "lumen",
    "lux",
    "materia",
    "minty",
    "pulse",
    "sandstone",
    "simplex",
    "sketchy",
    "slate",
    "solar",
    "spacelab",
    "superhero",
    "united",
    "yeti",
];

/// Normalise a stored skin name; anything unknown becomes "default".
pub fn resolve_admin_skin(raw: &str) -> &'static str {
    let wanted = raw.trim().to_lowercase();
    ADMIN_SKINS
        .iter()
        .copied()
        .find(|s| *s == wanted)
        .unwrap_or(DEFAULT_SKIN)
}

/// "cerulean" → "Cerulean", "dark_mode" → "Dark Mode"
pub fn skin_label(name: &str) -> String {
    crate::utils::formatting::title_case(&name.replace('_', " "))
}

/// The skin for the admin area, read from the `admin_skin` setting.
///
/// A database that cannot be read yields the default skin.
pub fn admin_skin(conn: &Connection) -> &'static str {
    match get_setting(conn, "admin_skin", DEFAULT_SKIN) {
        Ok(raw) => resolve_admin_skin(&raw),
        Err(_) => DEFAULT_SKIN,
    }
}

/// Everything the kiosk screen needs to draw itself.
#[derive(Debug, Clone)]
pub struct KioskTheme {
    pub welcome_heading: String,
    pub heading_font: ResolvedFont,
    pub background_light: String,
    pub background_dark: String,
    pub logo_path: String,
    pub logo_width_px: Option<u32>,
    pub logo_height_px: Option<u32>,
    pub auto_print: bool,
    pub iframe_print: bool,
}

/// Positive pixel value or `None` for "auto".
pub fn parse_px(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

impl KioskTheme {
    pub fn load(conn: &Connection) -> rusqlite::Result<Self> {
        let google = is_truthy(&get_setting(conn, "enable_google_fonts", "No")?);
        let font = get_setting(conn, "welcome_heading_font", "Arial")?;
        let source = FontSource::parse(&get_setting(conn, "welcome_heading_font_source", "system")?)
            .unwrap_or(FontSource::System);

        Ok(Self {
            welcome_heading: non_blank(get_setting(conn, "welcome_heading", "Welcome")?, "Welcome"),
            heading_font: resolve_font(&font, source, google),
            background_light: non_blank(get_setting(conn, "kiosk_background_color", "#ffffff")?, "#ffffff"),
            background_dark: non_blank(
                get_setting(conn, "kiosk_background_color_darkmode", "#1f1f1f")?,
                "#1f1f1f",
            ),
            logo_path: get_setting(conn, "kiosk_logo_path", "")?,
            logo_width_px: parse_px(&get_setting(conn, "kiosk_logo_width_px", "")?),
            logo_height_px: parse_px(&get_setting(conn, "kiosk_logo_height_px", "")?),
            auto_print: is_truthy(&get_setting(conn, "kiosk_print_mode", "No")?),
            iframe_print: is_truthy(&get_setting(conn, "kiosk_print_iframe", "No")?),
        })
    }
}

fn non_blank(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
