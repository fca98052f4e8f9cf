//! X API write adapter: media upload and post creation

use async_trait::async_trait;
use indieshout_domain::formatter::PlatformFormatter;
use indieshout_domain::validation::{MediaLimits, require_text, validate_images};
use indieshout_domain::{Content, FormattedContent, PublishError, PublishResult, Publisher};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::http_client;
use crate::storage::content_type_for;

pub const X_API_BASE: &str = "https://api.twitter.com";
const PLATFORM: &str = "x";

/// X publisher using an OAuth 2.0 user-context token
pub struct XPublisher {
    client: Client,
    user_token: SecretString,
    base_url: String,
    formatter: Arc<PlatformFormatter>,
    authenticated: bool,
}

impl XPublisher {
    pub fn new(user_token: SecretString) -> Self {
        Self::with_base_url(user_token, X_API_BASE.to_string())
    }

    pub fn with_base_url(user_token: SecretString, base_url: String) -> Self {
        Self {
            client: http_client(),
            user_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            formatter: Arc::new(PlatformFormatter::with_builtin_rules()),
            authenticated: false,
        }
    }

    /// Share a formatter that may carry custom rules
    pub fn with_formatter(mut self, formatter: Arc<PlatformFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.user_token.expose_secret())
    }

    /// Upload one image, returning its media id
    async fn upload_media(&self, path: &Path) -> Result<String, PublishError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type_for(path))
            .map_err(|e| PublishError::Remote(e.to_string()))?;
        let form = Form::new()
            .text("media_category", "tweet_image")
            .part("media", part);

        let url = format!("{}/2/media/upload", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::Remote(e.to_string()))?;

        if response.status() == 401 {
            return Err(PublishError::Auth("Invalid user token".to_string()));
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Remote(format!(
                "Failed to upload {}: {}",
                path.display(),
                body
            )));
        }

        let media: MediaUploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Remote(e.to_string()))?;

        tracing::debug!(path = %path.display(), media_id = %media.data.id, "Uploaded media");
        Ok(media.data.id)
    }
}

#[derive(Serialize)]
struct CreateTweetRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<TweetMedia>,
}

#[derive(Serialize)]
struct TweetMedia {
    media_ids: Vec<String>,
}

#[derive(Deserialize)]
struct IdData {
    id: String,
}

#[derive(Deserialize)]
struct CreateTweetResponse {
    data: IdData,
}

#[derive(Deserialize)]
struct MediaUploadResponse {
    data: IdData,
}

#[async_trait]
impl Publisher for XPublisher {
    fn platform(&self) -> &str {
        PLATFORM
    }

    async fn authenticate(&mut self) -> Result<(), PublishError> {
        if self.user_token.expose_secret().trim().is_empty() {
            return Err(PublishError::Auth("X access token is not set".to_string()));
        }

        let url = format!("{}/2/users/me", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| PublishError::Remote(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Auth(format!(
                "Could not get user info ({}): {}",
                status, body
            )));
        }

        self.authenticated = true;
        Ok(())
    }

    fn validate(&self, content: &Content) -> Result<(), PublishError> {
        require_text(content)?;
        if !self.authenticated {
            return Err(PublishError::Auth(
                "Not authenticated. Call authenticate() first".to_string(),
            ));
        }
        validate_images(content.image_paths.as_slice(), MediaLimits::X)
    }

    fn format_content(&self, content: &Content) -> Result<FormattedContent, PublishError> {
        Ok(FormattedContent::Text(
            self.formatter.format_for_platform(content, PLATFORM),
        ))
    }

    async fn publish(&self, content: &Content) -> Result<PublishResult, PublishError> {
        let text = self.format_content(content)?.as_text().to_string();

        // Uploaded one by one; ids keep the input order
        let mut media_ids = Vec::with_capacity(content.image_paths.len());
        for path in &content.image_paths {
            media_ids.push(self.upload_media(path).await?);
        }

        let request = CreateTweetRequest {
            text,
            media: (!media_ids.is_empty()).then_some(TweetMedia { media_ids }),
        };

        let url = format!("{}/2/tweets", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Remote(e.to_string()))?;

        if response.status() == 401 {
            return Err(PublishError::Auth("Invalid user token".to_string()));
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Remote(format!(
                "Failed to create post: {}",
                body
            )));
        }

        let created: CreateTweetResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Remote(e.to_string()))?;

        Ok(PublishResult {
            url: format!("https://x.com/i/status/{}", created.data.id),
            id: Some(created.data.id),
            blog: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_me(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "id": "42", "username": "dev" }
            })))
            .mount(server)
            .await;
    }

    async fn authenticated(server: &MockServer) -> XPublisher {
        mount_me(server).await;
        let mut publisher =
            XPublisher::with_base_url(SecretString::new("test-token".into()), server.uri());
        publisher.authenticate().await.unwrap();
        publisher
    }

    #[tokio::test]
    async fn test_publish_text_post() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(serde_json::json!({
                "text": "Shipped it\n\n#rust"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": { "id": "1890", "text": "Shipped it\n\n#rust" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let publisher = authenticated(&server).await;
        let content = Content::social("Shipped it").with_tags(["rust"]);

        publisher.validate(&content).unwrap();
        let result = publisher.publish(&content).await.unwrap();

        assert_eq!(result.id.as_deref(), Some("1890"));
        assert_eq!(result.url, "https://x.com/i/status/1890");
    }

    #[tokio::test]
    async fn test_publish_with_media_in_order() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("1.png");
        let second = dir.path().join("2.jpg");
        std::fs::write(&first, b"png").unwrap();
        std::fs::write(&second, b"jpg").unwrap();

        Mock::given(method("POST"))
            .and(path("/2/media/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "id": "m1" }
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/media/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "id": "m2" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(body_json(serde_json::json!({
                "text": "Look",
                "media": { "media_ids": ["m1", "m2"] }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": { "id": "77" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let publisher = authenticated(&server).await;
        let content = Content::social("Look").with_images([first, second]);

        publisher.validate(&content).unwrap();
        let result = publisher.publish(&content).await.unwrap();
        assert_eq!(result.id.as_deref(), Some("77"));
    }

    #[tokio::test]
    async fn test_rejected_token_fails_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let mut publisher =
            XPublisher::with_base_url(SecretString::new("bad".into()), server.uri());
        let result = publisher.authenticate().await;
        assert!(matches!(result, Err(PublishError::Auth(_))));
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let mut publisher =
            XPublisher::with_base_url(SecretString::new("".into()), "http://127.0.0.1:9".into());
        let result = publisher.authenticate().await;
        assert!(matches!(result, Err(PublishError::Auth(_))));
    }

    #[test]
    fn test_validate_requires_authentication() {
        let publisher = XPublisher::new(SecretString::new("token".into()));

        let blank = publisher.validate(&Content::social(" "));
        assert!(matches!(blank, Err(PublishError::Validation(_))));

        let unauthenticated = publisher.validate(&Content::social("hi"));
        assert!(matches!(unauthenticated, Err(PublishError::Auth(_))));
    }

    #[test]
    fn test_format_truncates_to_280() {
        let publisher = XPublisher::new(SecretString::new("token".into()));
        let content = Content::social("a ".repeat(200));

        let formatted = publisher.format_content(&content).unwrap();
        let text = formatted.as_text();
        assert!(text.chars().count() <= 280);
        assert!(text.ends_with("..."));
    }

    #[tokio::test]
    async fn test_api_error_surfaces_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(403).set_body_string("duplicate content"))
            .mount(&server)
            .await;

        let publisher = authenticated(&server).await;
        let err = publisher
            .publish(&Content::social("again"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Remote(ref m) if m.contains("duplicate content")));
    }
}
