use once_cell::sync::Lazy;
use regex::Regex;

use super::collapse_whitespace;

pub const MAX_FOLDER_NAME_CHARS: usize = 100;

static ILLEGAL_PATH_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[<>:"/\\|?*]"#)
        .expect("Invalid path character regex")
});

/// Turn a free-text product name into a filesystem-safe folder name.
///
/// Illegal path characters are dropped, whitespace is collapsed and the result is
/// cut to [`MAX_FOLDER_NAME_CHARS`] characters. An empty result is left to the
/// caller to replace with a positional name.
pub fn sanitize_folder_name(raw_name: &str) -> String {
    let stripped = ILLEGAL_PATH_CHARS.replace_all(raw_name, "");
    let collapsed = collapse_whitespace(&stripped);

    if collapsed.chars().count() <= MAX_FOLDER_NAME_CHARS {
        return collapsed;
    }

    // A cut can land right after a space
    collapsed
        .chars()
        .take(MAX_FOLDER_NAME_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Positional stand-in for products without a usable name
pub fn fallback_product_name(ordinal: usize) -> String {
    format!("Product_{}", ordinal)
}
