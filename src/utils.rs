use crate::regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static NON_ALNUM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

static LEADING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+").unwrap());

/// Removes every grouping brace from a field value and trims it.
///
/// # Arguments
///
/// * `value` - The raw field value, `None` when the field is absent
pub fn clean_field(value: Option<&str>) -> String {
    match value {
        Some(value) => value.replace(['{', '}'], "").trim().to_string(),
        None => String::new(),
    }
}

/// Splits a BibTeX author list into display names.
///
/// Names are separated by the literal `" and "`. A name written as
/// "Family, Given" comes back as "Given Family"; anything after a second
/// comma is dropped.
pub fn parse_authors(author_field: Option<&str>) -> Vec<String> {
    let Some(field) = author_field else {
        return Vec::new();
    };
    if clean_field(Some(field)).is_empty() {
        return Vec::new();
    }

    field
        .split(" and ")
        .map(|name| display_author_name(&clean_field(Some(name))))
        .collect()
}

/// Helper function to turn one cleaned author name into "Given Family" order
pub fn display_author_name(name: &str) -> String {
    if !name.contains(',') {
        return name.to_string();
    }

    let mut parts = name.split(',').map(str::trim);
    let family = parts.next().unwrap_or_default();
    let given = parts.next().unwrap_or_default();
    format!("{} {}", given, family)
}

/// Last whitespace-delimited token of a display name.
pub fn surname(display_name: &str) -> Option<&str> {
    display_name.split_whitespace().last()
}

/// Replaces characters that have a meaning in file paths with `-`.
pub fn file_safe(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Lower-case, `-`-joined, alphanumeric-only slug of `text`.
///
/// Accented letters are folded to their base letter (`ö` to `o`) before
/// everything outside `a-z0-9` collapses into separators.
pub fn slugify(text: &str) -> String {
    let folded = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    NON_ALNUM_RUN
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Truncates `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Escapes a value for use inside a double-quoted YAML scalar
pub fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Parses the leading base-10 digits of a cleaned year value.
///
/// Returns `None` when the value does not start with a digit or the digits
/// overflow.
pub fn parse_year(value: &str) -> Option<i32> {
    LEADING_DIGITS
        .find(value.trim())
        .and_then(|m| m.as_str().parse::<i32>().ok())
}
