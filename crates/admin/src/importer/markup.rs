//! Plain-text extraction for remote product titles.
//!
//! Titles are compared byte-for-byte against stored titles, so only markup is
//! removed: entities and internal whitespace are kept as they arrive.

use std::sync::LazyLock;

use regex::Regex;

/// `script` and `style` elements, removed together with their content.
static HIDDEN_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("Invalid regex")
});

/// Any remaining tag. A `<` followed by whitespace is literal text; an
/// unterminated tag runs to the end of the input.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^\s<>][^>]*(?:>|$)").expect("Invalid regex"));

/// Strip HTML tags from `input` and trim the result.
///
/// `script`/`style` contents are dropped with their tags.
#[must_use]
pub fn strip_markup(input: &str) -> String {
    if !input.contains('<') {
        return input.trim().to_string();
    }

    let visible = HIDDEN_ELEMENT_RE.replace_all(input, "");
    TAG_RE.replace_all(&visible, "").trim().to_string()
}
