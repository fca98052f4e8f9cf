//! Threads Graph API publisher
//!
//! Text posts are a two-step call: create a container, then publish it.

use async_trait::async_trait;
use indieshout_domain::formatter::PlatformFormatter;
use indieshout_domain::validation::{MediaLimits, require_text, validate_images};
use indieshout_domain::{Content, FormattedContent, PublishError, PublishResult, Publisher};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;

use crate::http_client;

pub const THREADS_API_BASE: &str = "https://graph.threads.net/v1.0";
const PLATFORM: &str = "threads";

pub struct ThreadsPublisher {
    client: Client,
    access_token: SecretString,
    user_id: String,
    base_url: String,
    formatter: Arc<PlatformFormatter>,
    authenticated: bool,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

impl ThreadsPublisher {
    pub fn new(access_token: SecretString, user_id: impl Into<String>) -> Self {
        Self::with_base_url(access_token, user_id, THREADS_API_BASE.to_string())
    }

    pub fn with_base_url(
        access_token: SecretString,
        user_id: impl Into<String>,
        base_url: String,
    ) -> Self {
        Self {
            client: http_client(),
            access_token,
            user_id: user_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            formatter: Arc::new(PlatformFormatter::with_builtin_rules()),
            authenticated: false,
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<PlatformFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// POST a form and read back `{"id": ...}`
    async fn post_form(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<String, PublishError> {
        let url = format!("{}/{}/{}", self.base_url, self.user_id, endpoint);
        let token = self.access_token.expose_secret();
        let mut params = form.to_vec();
        params.push(("access_token", token));

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| PublishError::Remote(e.to_string()))?;

        if response.status() == 401 {
            return Err(PublishError::Auth("Invalid access token".to_string()));
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Remote(format!("{} failed: {}", endpoint, body)));
        }

        let created: IdResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Remote(e.to_string()))?;
        Ok(created.id)
    }
}

#[async_trait]
impl Publisher for ThreadsPublisher {
    fn platform(&self) -> &str {
        PLATFORM
    }

    async fn authenticate(&mut self) -> Result<(), PublishError> {
        if self.access_token.expose_secret().trim().is_empty() || self.user_id.trim().is_empty() {
            return Err(PublishError::Auth(
                "Threads access_token and user_id are required".to_string(),
            ));
        }

        let url = format!("{}/me", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("access_token", self.access_token.expose_secret())])
            .send()
            .await
            .map_err(|e| PublishError::Remote(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Auth(format!("Authentication failed: {}", body)));
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
        validate_images(content.image_paths.as_slice(), MediaLimits::THREADS)
    }

    fn format_content(&self, content: &Content) -> Result<FormattedContent, PublishError> {
        Ok(FormattedContent::Text(
            self.formatter.format_for_platform(content, PLATFORM),
        ))
    }

    async fn publish(&self, content: &Content) -> Result<PublishResult, PublishError> {
        if !content.image_paths.is_empty() {
            return Err(PublishError::Unimplemented(
                "Image posts are not supported on Threads yet".to_string(),
            ));
        }

        let text = self.format_content(content)?.as_text().to_string();

        let container_id = self
            .post_form("threads", &[("media_type", "TEXT"), ("text", &text)])
            .await?;
        tracing::debug!(container_id = %container_id, "Created Threads container");

        let thread_id = self
            .post_form("threads_publish", &[("creation_id", &container_id)])
            .await?;

        Ok(PublishResult {
            url: format!("https://threads.net/@{}/post/{}", self.user_id, thread_id),
            id: Some(thread_id),
            blog: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn authenticated(server: &MockServer) -> ThreadsPublisher {
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(query_param("access_token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1234"
            })))
            .mount(server)
            .await;

        let mut publisher =
            ThreadsPublisher::with_base_url(SecretString::new("tok".into()), "1234", server.uri());
        publisher.authenticate().await.unwrap();
        publisher
    }

    #[tokio::test]
    async fn test_publish_text_two_step() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/1234/threads"))
            .and(body_string_contains("media_type=TEXT"))
            .and(body_string_contains("text=Hello+Threads"))
            .and(body_string_contains("access_token=tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "container-1"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/1234/threads_publish"))
            .and(body_string_contains("creation_id=container-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "post-9"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let publisher = authenticated(&server).await;
        let content = Content::social("Hello Threads");

        publisher.validate(&content).unwrap();
        let result = publisher.publish(&content).await.unwrap();

        assert_eq!(result.id.as_deref(), Some("post-9"));
        assert_eq!(result.url, "https://threads.net/@1234/post/post-9");
    }

    #[tokio::test]
    async fn test_container_failure_stops_publish() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/1234/threads"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad text"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/1234/threads_publish"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let publisher = authenticated(&server).await;
        let err = publisher
            .publish(&Content::social("Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Remote(ref m) if m.contains("bad text")));
    }

    #[tokio::test]
    async fn test_image_posts_unimplemented() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("1.png");
        std::fs::write(&image, b"png").unwrap();

        let publisher = authenticated(&server).await;
        let content = Content::social("pic").with_images([image]);

        publisher.validate(&content).unwrap();
        let err = publisher.publish(&content).await.unwrap_err();
        assert!(matches!(err, PublishError::Unimplemented(_)));
    }

    #[tokio::test]
    async fn test_authentication_requires_credentials() {
        let mut publisher = ThreadsPublisher::new(SecretString::new("tok".into()), "");
        assert!(matches!(
            publisher.authenticate().await,
            Err(PublishError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let mut publisher =
            ThreadsPublisher::with_base_url(SecretString::new("tok".into()), "1234", server.uri());
        let err = publisher.authenticate().await.unwrap_err();
        assert!(matches!(err, PublishError::Auth(ref m) if m.contains("invalid token")));
    }

    #[test]
    fn test_format_uses_500_limit() {
        let publisher = ThreadsPublisher::new(SecretString::new("tok".into()), "1");
        let text = "b".repeat(500);
        let formatted = publisher.format_content(&Content::social(text.clone())).unwrap();
        assert_eq!(formatted.as_text(), text);
    }
}
