//! Blog front matter rendering and line-level access
//!
//! Values are written as JSON literals, which are also valid YAML flow
//! scalars/sequences, so Hugo reads them and we can parse them back.

use time::OffsetDateTime;
use time::macros::format_description;

pub const DELIMITER: &str = "---";

/// Header block prepended to a blog post
#[derive(Debug, Clone)]
pub struct FrontMatter<'a> {
    pub title: &'a str,
    /// Rendered in its own offset
    pub date: OffsetDateTime,
    pub draft: bool,
    pub tags: &'a [String],
    pub categories: &'a [String],
}

impl FrontMatter<'_> {
    /// Render the block, a blank line, then `body`
    pub fn render_with_body(&self, body: &str) -> String {
        let date = self
            .date
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
            ))
            .unwrap_or_else(|_| self.date.to_string());

        format!(
            "{DELIMITER}\ntitle: {}\ndate: {}\ndraft: {}\ntags: {}\ncategories: {}\n{DELIMITER}\n\n{}",
            quote(self.title),
            date,
            self.draft,
            render_list(self.tags),
            render_list(self.categories),
            body
        )
    }
}

/// Split a document into (front matter lines, body); `None` without a header block
pub fn split(markdown: &str) -> Option<(&str, &str)> {
    let rest = markdown
        .strip_prefix(DELIMITER)?
        .strip_prefix('\n')
        .or_else(|| markdown.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = rest[..offset].trim_end_matches(['\n', '\r']);
            let body = &rest[offset + line.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }

    None
}

/// A double-quoted scalar
pub fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// Inverse of [`quote`]; bare values are accepted as-is
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    serde_json::from_str::<String>(value)
        .unwrap_or_else(|_| value.trim_matches(['"', '\'']).to_string())
}

/// A flow sequence of quoted strings
pub fn render_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| quote(i)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Parse `[a, "b", 'c']` or `a, b, c` into items
pub fn parse_list(value: &str) -> Vec<String> {
    let value = value.trim();
    if let Ok(items) = serde_json::from_str::<Vec<String>>(value) {
        return items;
    }

    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);

    inner
        .split(',')
        .map(|s| s.trim().trim_matches(['"', '\'']).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
