//! URL slugs derived from titles

use regex::Regex;
use std::sync::LazyLock;
use time::Date;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid slug regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid slug regex"));

/// Lowercase, drop punctuation, join words with `-`. Non-ASCII letters are kept.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, "");
    let joined = SEPARATORS.replace_all(&cleaned, "-");
    joined.trim_matches('-').to_string()
}

/// `YYYYMMDD-{slugified title}`; the date prefix keeps same-titled posts apart
pub fn dated_slug(title: &str, date: Date) -> String {
    let prefix = format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    );
    let slug = slugify(title);

    if slug.is_empty() {
        prefix
    } else {
        format!("{}-{}", prefix, slug)
    }
}
