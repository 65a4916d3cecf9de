// src/export/mod.rs

pub mod csv;
pub(crate) mod fs_utils;
pub mod json;

use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

/// Common completion message for exports.
pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} export completed: {}", path.display()));
}

/// CSV exports offered on the service screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ServiceExport {
    Attendees,
    FirstTime,
}

impl ServiceExport {
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ServiceExport::Attendees => "attendees",
            ServiceExport::FirstTime => "first_time_visitors",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceExport::Attendees => "Attendees",
            ServiceExport::FirstTime => "First-time visitors",
        }
    }
}
