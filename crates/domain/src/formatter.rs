//! Platform formatting: turns content into platform-ready text
//!
//! Rules are looked up by platform key in an open registry; unknown platforms
//! fall back to the default rule.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::Content;

const ELLIPSIS: &str = "...";

/// A formatting rule for one platform
pub trait FormatRule: Send + Sync {
    fn format(&self, content: &Content) -> String;
}

/// Text followed by a blank line and space-separated hashtags
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRule;

impl FormatRule for DefaultRule {
    fn format(&self, content: &Content) -> String {
        format!("{}{}", content.text, tag_suffix(&content.tags))
    }
}

/// Default rule bounded to `max_length` characters, truncating on a word boundary
#[derive(Debug, Clone, Copy)]
pub struct LengthBoundedRule {
    max_length: usize,
}

impl LengthBoundedRule {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl FormatRule for LengthBoundedRule {
    fn format(&self, content: &Content) -> String {
        let mut suffix = tag_suffix(&content.tags);
        let mut suffix_len = suffix.chars().count();

        if content.text.chars().count() + suffix_len <= self.max_length {
            return format!("{}{}", content.text, suffix);
        }

        // Truncating; tags that leave no room for an ellipsis are dropped
        if suffix_len + ELLIPSIS.len() > self.max_length {
            suffix.clear();
            suffix_len = 0;
        }

        let available = self.max_length - suffix_len;
        if content.text.chars().count() <= available {
            return content.text.clone();
        }

        if available < ELLIPSIS.len() {
            return take_chars(&content.text, self.max_length).to_string();
        }

        let cut = take_chars(&content.text, available - ELLIPSIS.len());
        let prefix = match cut.rfind(' ') {
            Some(idx) => cut[..idx].trim_end_matches(' '),
            None => cut,
        };

        format!("{}{}{}", prefix, ELLIPSIS, suffix)
    }
}

/// Registry of formatting rules keyed by platform name
pub struct PlatformFormatter {
    rules: HashMap<String, Arc<dyn FormatRule>>,
    fallback: Arc<dyn FormatRule>,
}

impl PlatformFormatter {
    /// X post limit in characters
    pub const X_MAX_CHARS: usize = 280;
    /// Threads post limit in characters
    pub const THREADS_MAX_CHARS: usize = 500;

    /// Formatter with no platform rules; everything uses the default rule
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: Arc::new(DefaultRule),
        }
    }

    /// Formatter with the built-in `x` and `threads` limits
    pub fn with_builtin_rules() -> Self {
        let mut formatter = Self::new();
        formatter.register("x", Arc::new(LengthBoundedRule::new(Self::X_MAX_CHARS)));
        formatter.register(
            "threads",
            Arc::new(LengthBoundedRule::new(Self::THREADS_MAX_CHARS)),
        );
        formatter
    }

    /// Register (or replace) the rule for a platform
    pub fn register(&mut self, platform: impl Into<String>, rule: Arc<dyn FormatRule>) {
        self.rules.insert(platform.into(), rule);
    }

    pub fn format_for_platform(&self, content: &Content, platform: &str) -> String {
        self.rules
            .get(platform)
            .unwrap_or(&self.fallback)
            .format(content)
    }
}

impl Default for PlatformFormatter {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}

/// `"\n\n#a #b"` for non-empty tags, otherwise empty
pub fn tag_suffix(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }

    let hashtags: Vec<String> = tags.iter().map(|t| format!("#{}", t)).collect();
    format!("\n\n{}", hashtags.join(" "))
}

fn take_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
