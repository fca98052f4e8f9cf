//! Markdown translation: front matter field by field, then the body

use crate::front_matter::{self, DELIMITER};
use crate::ports::{TranslateError, Translator};

/// Translates blog documents between two languages
pub struct MarkdownTranslator<'a, T: Translator + ?Sized> {
    translator: &'a T,
    source_lang: &'a str,
    target_lang: &'a str,
}

impl<'a, T: Translator + ?Sized> MarkdownTranslator<'a, T> {
    pub fn new(translator: &'a T, source_lang: &'a str, target_lang: &'a str) -> Self {
        Self {
            translator,
            source_lang,
            target_lang,
        }
    }

    /// Translate a whole document. `title`, `tags` and `categories` are
    /// translated; every other front matter line is kept verbatim.
    pub async fn translate_markdown(&self, markdown: &str) -> Result<String, TranslateError> {
        let Some((header, body)) = front_matter::split(markdown) else {
            return self.translate_text(markdown).await;
        };

        let mut lines = Vec::new();
        for line in header.lines() {
            lines.push(self.translate_header_line(line).await?);
        }

        let body = self.translate_text(body.trim()).await?;

        Ok(format!(
            "{DELIMITER}\n{}\n{DELIMITER}\n\n{}",
            lines.join("\n"),
            body
        ))
    }

    /// Translate plain text; blank text is returned as-is
    pub async fn translate_text(&self, text: &str) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        self.translator
            .translate(text, self.source_lang, self.target_lang)
            .await
    }

    async fn translate_header_line(&self, line: &str) -> Result<String, TranslateError> {
        let Some((key, value)) = line.split_once(':') else {
            return Ok(line.to_string());
        };

        match key.trim() {
            "title" => {
                let title = front_matter::unquote(value);
                let translated = self.translate_text(&title).await?;
                Ok(format!("title: {}", front_matter::quote(translated.trim())))
            }
            field @ ("tags" | "categories") => {
                let mut translated = Vec::new();
                for item in front_matter::parse_list(value) {
                    translated.push(self.translate_text(&item).await?.trim().to_string());
                }
                Ok(format!("{}: {}", field, front_matter::render_list(&translated)))
            }
            _ => Ok(line.to_string()),
        }
    }
}
