use crate::errors::AppResult;
use serde::Serialize;

/// Pretty JSON for the terminal.
pub fn to_pretty<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
