//! ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

/// Open services in green, closed ones in red.
pub fn color_for_status(closed: bool) -> &'static str {
    if closed { RED } else { GREEN }
}

/// Blank values render as a grey "--".
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() {
        format!("{GREY}--{RESET}")
    } else {
        value.to_string()
    }
}

/// Members in cyan, visitors in magenta.
pub fn colorize_member_type(label: &str, is_member: bool) -> String {
    let color = if is_member { CYAN } else { MAGENTA };
    format!("{color}{label}{RESET}")
}
