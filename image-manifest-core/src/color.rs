//! colorInfo: a best-effort human label guessed from an image filename.
//!
//! Matchers are tried in order and the first one that produces a label wins.
//! [`title_case_label`] always succeeds, so every filename gets a label.

use regex::Regex;
use std::sync::LazyLock;

/// A single filename heuristic, applied to the filename without extension.
pub type ColorMatcher = fn(&str) -> Option<String>;

// Word and digit classes are ASCII only: `ü 123 blau` is not a code label.

/// `albmerino 7353M Beige-Meliert` -> `7353M Beige Meliert`
static CODE_AND_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_]+)\s+([0-9]+[A-Z]?)\s+(.+)$").expect("valid regex")
});

/// `Echt_8073_01_1` -> `Echt 8073-01`
static STRUCTURED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_]+)_([0-9]+)_([0-9]+)_([0-9]+)").expect("valid regex")
});

pub const MATCHERS: &[ColorMatcher] = &[code_and_name_label, structured_label, title_case_label];

/// Label for `filename` (extension included).
pub fn extract_color_info(filename: &str) -> String {
    let stem = strip_extension(filename);
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(stem))
        .unwrap_or_default()
}

/// Removes the last `.ext` suffix, if any.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem,
        _ => filename,
    }
}

pub fn code_and_name_label(stem: &str) -> Option<String> {
    let caps = CODE_AND_NAME.captures(stem)?;
    Some(format!("{} {}", &caps[2], caps[3].replace('-', " ")))
}

pub fn structured_label(stem: &str) -> Option<String> {
    let caps = STRUCTURED.captures(stem)?;
    Some(format!("{} {}-{}", &caps[1], &caps[2], &caps[3]))
}

/// Dashes and underscores become spaces; each word starts upper-case.
pub fn title_case_label(stem: &str) -> Option<String> {
    let mut label = String::with_capacity(stem.len());
    let mut at_word_start = true;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if c.is_alphanumeric() {
            if at_word_start {
                label.extend(c.to_uppercase());
            } else {
                label.push(c);
            }
            at_word_start = false;
        } else {
            label.push(c);
            at_word_start = true;
        }
    }
    Some(label)
}
