//! Log sanitization utilities
//!
//! Keeps usernames and search queries from being fully exposed in logs.
//! Passwords are never passed here; they are never logged at all.

/// Maximum number of characters of a free-text value to include in log output.
const TRUNCATE_LIMIT: usize = 64;

/// Mask an identifying value for logging.
///
/// Keeps the first character and replaces the rest with `*`, preserving the
/// character count so distinct values stay distinguishable in traces.
pub fn mask(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.count();
            format!("{first}{}", "*".repeat(rest))
        }
        None => String::new(),
    }
}

/// Mask an optional username, rendering an absent one as `<none>`.
pub fn mask_username(username: Option<&str>) -> String {
    username.map_or_else(|| "<none>".to_string(), mask)
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit,
/// otherwise returns the first `TRUNCATE_LIMIT` characters with a suffix
/// indicating the total length.
pub fn truncate_for_log(s: &str) -> String {
    let total = s.chars().count();
    if total <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        let head: String = s.chars().take(TRUNCATE_LIMIT).collect();
        format!("{head}... [truncated, total {total} chars]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_first_char_and_length() {
        assert_eq!(mask("alice"), "a****");
        assert_eq!(mask("x"), "x");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn mask_multibyte_safe() {
        assert_eq!(mask("你好吗"), "你**");
    }

    #[test]
    fn absent_username() {
        assert_eq!(mask_username(None), "<none>");
        assert_eq!(mask_username(Some("bob")), "b**");
    }

    #[test]
    fn short_string_unchanged() {
        assert_eq!(truncate_for_log("example"), "example");
    }

    #[test]
    fn over_limit_truncated() {
        let s = "q".repeat(TRUNCATE_LIMIT + 10);
        let result = truncate_for_log(&s);
        assert!(result.contains("... [truncated, total"));
        assert!(result.ends_with(&format!("{} chars]", TRUNCATE_LIMIT + 10)));
    }
}
