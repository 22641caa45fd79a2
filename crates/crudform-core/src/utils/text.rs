//! String utility functions.

use regex::Regex;
use std::sync::OnceLock;

/// Escapes the characters that are significant in HTML.
///
/// # Examples
///
/// ```
/// use crudform_core::utils::text::escape_html;
///
/// assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"),
///            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Turns a field name into a label: underscores become spaces and the first
/// letter is capitalized.
///
/// ```
/// use crudform_core::utils::text::humanize;
///
/// assert_eq!(humanize("birth_date"), "Birth date");
/// ```
pub fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |c| {
        let mut label = c.to_uppercase().to_string();
        label.extend(chars);
        label
    })
}

/// Rewrites a raw validation message into the form shown next to a card.
///
/// Model validators report their failures prefixed with `Value error, `; the
/// prefix is dropped. A "not a valid string" complaint is replaced by a short
/// message naming the offending location.
///
/// # Examples
///
/// ```
/// use crudform_core::utils::text::clean_validation_message;
///
/// assert_eq!(clean_validation_message("Value error, too old", "age"), "too old");
/// assert_eq!(
///     clean_validation_message("Input should be a valid string", "name"),
///     "name: not a string"
/// );
/// ```
pub fn clean_validation_message(msg: &str, loc: &str) -> String {
    static VALUE_ERROR: OnceLock<Regex> = OnceLock::new();
    static NOT_A_STRING: OnceLock<Regex> = OnceLock::new();

    let value_error =
        VALUE_ERROR.get_or_init(|| Regex::new(r"^Value error, ").expect("valid regex"));
    let not_a_string = NOT_A_STRING
        .get_or_init(|| Regex::new(r"^Input should be a valid string").expect("valid regex"));

    let msg = value_error.replace(msg, "");
    if not_a_string.is_match(&msg) {
        return format!("{loc}: not a string");
    }
    msg.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── escape_html ──────────────────────────────────────────────────

    #[test]
    fn test_escape_html_plain() {
        assert_eq!(escape_html("Frodo"), "Frodo");
    }

    #[test]
    fn test_escape_html_all_specials() {
        assert_eq!(escape_html("<>&\"'"), "&lt;&gt;&amp;&quot;&#x27;");
    }

    // ── labels ───────────────────────────────────────────────────────

    #[test]
    fn test_humanize_unicode_and_empty() {
        assert_eq!(humanize("élan_vital"), "Élan vital");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("id"), "Id");
        assert_eq!(humanize("max_hit_points"), "Max hit points");
    }

    // ── clean_validation_message ─────────────────────────────────────

    #[test]
    fn test_clean_message_untouched() {
        assert_eq!(
            clean_validation_message("Input should be less than 101", "level"),
            "Input should be less than 101"
        );
    }

    #[test]
    fn test_clean_message_prefix_only_at_start() {
        assert_eq!(
            clean_validation_message("Oops. Value error, x", "a"),
            "Oops. Value error, x"
        );
    }

    #[test]
    fn test_clean_message_not_a_string_with_suffix() {
        assert_eq!(
            clean_validation_message("Input should be a valid string, got int", "title"),
            "title: not a string"
        );
    }
}
