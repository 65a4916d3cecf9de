//! Font catalogue for labels and kiosk headings.

pub const SYSTEM_FONTS: [&str; 6] = [
    "Arial",
    "Helvetica",
    "Georgia",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
];

pub const GOOGLE_FONTS: [&str; 13] = [
    "Roboto",
    "Open Sans",
    "Lato",
    "Montserrat",
    "Merriweather",
    "Source Sans 3",
    "Nunito",
    "PT Sans",
    "Playfair Display",
    "Oswald",
    "Noto Sans",
    "Noto Serif",
    "Noto Sans Mono",
];

pub const DEFAULT_FONT: &str = "Arial";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSource {
    System,
    Google,
}

impl FontSource {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "system" => Some(FontSource::System),
            "google" => Some(FontSource::Google),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontSource::System => "system",
            FontSource::Google => "google",
        }
    }
}

pub fn all_fonts() -> impl Iterator<Item = &'static str> {
    SYSTEM_FONTS.iter().chain(GOOGLE_FONTS.iter()).copied()
}

pub fn is_known_font(name: &str) -> bool {
    all_fonts().any(|f| f == name)
}

pub fn is_google_font(name: &str) -> bool {
    GOOGLE_FONTS.contains(&name)
}

/// Stylesheet URL for a Google font, `None` for anything else.
pub fn google_font_href(name: &str) -> Option<String> {
    if !is_google_font(name) {
        return None;
    }
    Some(format!(
        "https://fonts.googleapis.com/css2?family={}:wght@400;700&display=swap",
        name.replace(' ', "+")
    ))
}

/// A font ready to drop into a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    pub family: String,
    pub css_stack: String,
    pub stylesheet: Option<String>,
}

fn fallback_for(name: &str) -> &'static str {
    match name {
        "Georgia" | "Times New Roman" | "Merriweather" | "Noto Serif" | "Playfair Display" => "serif",
        "Noto Sans Mono" => "monospace",
        _ => "sans-serif",
    }
}

/// Resolve a configured font into a CSS stack and optional stylesheet link.
///
/// Unknown names fall back to the default font. A Google stylesheet is only
/// linked when the source is google, Google fonts are enabled, and the font
/// is one of the Google fonts; otherwise the browser's system fallback is used.
pub fn resolve_font(name: &str, source: FontSource, google_enabled: bool) -> ResolvedFont {
    let family = if is_known_font(name.trim()) {
        name.trim()
    } else {
        DEFAULT_FONT
    };

    let stylesheet = if source == FontSource::Google && google_enabled {
        google_font_href(family)
    } else {
        None
    };

    ResolvedFont {
        family: family.to_string(),
        css_stack: format!("\"{}\", {}", family, fallback_for(family)),
        stylesheet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_href_uses_plus_for_spaces() {
        assert_eq!(
            google_font_href("Source Sans 3").as_deref(),
            Some("https://fonts.googleapis.com/css2?family=Source+Sans+3:wght@400;700&display=swap")
        );
        assert_eq!(google_font_href("Arial"), None);
    }

    #[test]
    fn stylesheet_needs_google_source_and_toggle() {
        assert!(resolve_font("Lato", FontSource::Google, true).stylesheet.is_some());
        assert!(resolve_font("Lato", FontSource::Google, false).stylesheet.is_none());
        assert!(resolve_font("Lato", FontSource::System, true).stylesheet.is_none());
    }

    #[test]
    fn unknown_font_falls_back_to_arial() {
        let f = resolve_font("Comic Sans", FontSource::System, false);
        assert_eq!(f.family, "Arial");
        assert_eq!(f.css_stack, "\"Arial\", sans-serif");
    }
}
