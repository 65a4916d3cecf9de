pub mod attendance;
pub mod audit;
pub mod families;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod people;
pub mod pool;
pub mod services;
pub mod settings;
pub mod stats;
pub mod users;

/// Build a `LIKE` pattern matching `query` anywhere, with wildcards escaped.
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" ann "), "%ann%");
        assert_eq!(like_pattern("50%_x"), "%50\\%\\_x%");
    }
}
