//! Console messages with a colored icon prefix.
//!
//! Warnings and errors go to stderr so that HTML or JSON printed on stdout
//! can be piped cleanly. Commands that print a document on stdout use the
//! `_stderr` variants for their status lines.

use std::fmt;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

const HEADER_RULE: usize = 22;

pub fn info<T: fmt::Display>(msg: T) {
    println!("{FG_BLUE}{BOLD}{ICON_INFO} {RESET}{msg}");
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{FG_GREEN}{BOLD}{ICON_OK} {RESET}{msg}");
}

/// `info` on stderr, for commands whose stdout carries a document.
pub fn info_stderr<T: fmt::Display>(msg: T) {
    eprintln!("{FG_BLUE}{BOLD}{ICON_INFO} {RESET}{msg}");
}

pub fn success_stderr<T: fmt::Display>(msg: T) {
    eprintln!("{FG_GREEN}{BOLD}{ICON_OK} {RESET}{msg}");
}

pub fn warning<T: fmt::Display>(msg: T) {
    eprintln!("{FG_YELLOW}{BOLD}{ICON_WARN} {RESET}{msg}");
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{FG_RED}{BOLD}{ICON_ERR} {RESET}{msg}");
}

/// Section header for admin screens and reports.
pub fn header<T: fmt::Display>(msg: T) {
    println!("{FG_BLUE}{BOLD}{} {msg}{RESET}\n", "=".repeat(HEADER_RULE));
}
