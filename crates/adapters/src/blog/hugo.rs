//! Hugo blog publisher
//!
//! A post becomes `{repo}/{content_dir}/{slug}/index.{lang}.md`, one file per
//! configured language, committed to the blog repository. Pushing is a
//! separate [`BlogTarget::deploy`] step.

use async_trait::async_trait;
use indieshout_domain::front_matter::FrontMatter;
use indieshout_domain::slug::dated_slug;
use indieshout_domain::usecases::MarkdownTranslator;
use indieshout_domain::validation::require_text;
use indieshout_domain::{
    BlogArtifacts, BlogFiles, BlogTarget, Clock, CommitOutcome, Content, FormattedContent,
    ObjectStorage, PublishError, PublishResult, Publisher, SystemClock, Translator,
    VersionControl,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::macros::offset;
use time::{OffsetDateTime, UtcOffset};

const PLATFORM: &str = "blog";

#[derive(Debug, Clone)]
pub struct HugoSettings {
    pub repo_path: PathBuf,
    /// Relative to `repo_path`
    pub content_dir: String,
    pub base_url: String,
    pub default_language: String,
    /// Every language a file is written for, including the default
    pub languages: Vec<String>,
    /// Offset post dates are stamped in
    pub utc_offset: UtcOffset,
}

impl Default for HugoSettings {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("./blog-site"),
            content_dir: "content/posts".to_string(),
            base_url: "https://example.com".to_string(),
            default_language: "ko".to_string(),
            languages: vec!["ko".to_string(), "en".to_string()],
            utc_offset: offset!(+9),
        }
    }
}

pub struct HugoPublisher {
    settings: HugoSettings,
    vcs: Arc<dyn VersionControl>,
    storage: Option<Arc<dyn ObjectStorage>>,
    translator: Option<Arc<dyn Translator>>,
    clock: Arc<dyn Clock>,
}

impl HugoPublisher {
    pub fn new(settings: HugoSettings, vcs: Arc<dyn VersionControl>) -> Self {
        Self {
            settings,
            vcs,
            storage: None,
            translator: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Rehost images; without storage they stay local-referenced
    pub fn with_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Translate into the non-default languages; without one only the
    /// default-language file is written
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &HugoSettings {
        &self.settings
    }

    fn post_date(&self, content: &Content) -> OffsetDateTime {
        content
            .date
            .unwrap_or_else(|| self.clock.now())
            .to_offset(self.settings.utc_offset)
    }

    fn slug_for(&self, content: &Content) -> String {
        match &content.slug {
            Some(slug) => slug.clone(),
            None => dated_slug(
                content.title.as_deref().unwrap_or_default(),
                self.post_date(content).date(),
            ),
        }
    }

    fn render(&self, content: &Content, body: &str) -> Result<String, PublishError> {
        let title = content
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| PublishError::Validation("Title is required".to_string()))?;

        Ok(FrontMatter {
            title,
            date: self.post_date(content),
            draft: false,
            tags: &content.tags,
            categories: &content.categories,
        }
        .render_with_body(body))
    }

    fn post_dir(&self, slug: &str) -> PathBuf {
        self.settings
            .repo_path
            .join(&self.settings.content_dir)
            .join(slug)
    }

    /// Upload every image under `posts/{slug}/`; failures are skipped
    async fn upload_images(
        &self,
        storage: &dyn ObjectStorage,
        images: &[PathBuf],
        slug: &str,
    ) -> BTreeMap<String, String> {
        let mut uploaded = BTreeMap::new();

        for image in images {
            if !image.is_file() {
                tracing::warn!(image = %image.display(), "Image not found, skipping upload");
                continue;
            }

            let file_name = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let key = format!("posts/{}/{}", slug, file_name);

            match storage.upload(image, &key).await {
                Ok(url) => {
                    tracing::info!(image = %file_name, url = %url, "Image uploaded");
                    uploaded.insert(image.display().to_string(), url);
                }
                Err(e) => {
                    tracing::warn!(image = %image.display(), error = %e, "Image upload failed");
                }
            }
        }

        uploaded
    }

    /// Write `index.{lang}.md` for every non-default language we can translate to
    async fn write_translations(
        &self,
        markdown: &str,
        post_dir: &Path,
    ) -> BTreeMap<String, PathBuf> {
        let mut written = BTreeMap::new();
        let source = self.settings.default_language.as_str();

        for lang in self
            .settings
            .languages
            .iter()
            .filter(|lang| lang.as_str() != source)
        {
            let Some(translator) = &self.translator else {
                tracing::debug!(language = %lang, "No translator configured, skipping");
                continue;
            };

            let translated = MarkdownTranslator::new(translator.as_ref(), source, lang)
                .translate_markdown(markdown)
                .await;

            match translated {
                Ok(text) => {
                    let path = post_dir.join(format!("index.{}.md", lang));
                    match std::fs::write(&path, text) {
                        Ok(()) => {
                            written.insert(lang.clone(), path);
                        }
                        Err(e) => {
                            tracing::warn!(language = %lang, error = %e, "Failed to write translation");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(language = %lang, error = %e, "Translation failed, skipping");
                }
            }
        }

        written
    }
}

/// Point markdown and HTML image references at their uploaded URLs.
/// Both the local path and its `assets/{name}` form are rewritten.
fn rewrite_image_refs(markdown: &str, uploaded: &BTreeMap<String, String>) -> String {
    let mut result = markdown.to_string();

    for (local, url) in uploaded {
        let mut forms = vec![local.clone()];
        if let Some(name) = Path::new(local).file_name() {
            forms.push(format!("assets/{}", name.to_string_lossy()));
        }

        for form in forms {
            result = result
                .replace(&format!("]({})", form), &format!("]({})", url))
                .replace(&format!("src=\"{}\"", form), &format!("src=\"{}\"", url))
                .replace(&format!("src='{}'", form), &format!("src='{}'", url));
        }
    }

    result
}

#[async_trait]
impl Publisher for HugoPublisher {
    fn platform(&self) -> &str {
        PLATFORM
    }

    async fn authenticate(&mut self) -> Result<(), PublishError> {
        self.vcs
            .ensure_identity()
            .await
            .map_err(|e| PublishError::Auth(format!("Git user.name is not configured: {}", e)))
    }

    fn validate(&self, content: &Content) -> Result<(), PublishError> {
        require_text(content)?;

        if content.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(PublishError::Validation("Title is required".to_string()));
        }

        if !self.settings.repo_path.exists() {
            return Err(PublishError::NotFound(format!(
                "Blog repository not found: {}",
                self.settings.repo_path.display()
            )));
        }

        Ok(())
    }

    fn format_content(&self, content: &Content) -> Result<FormattedContent, PublishError> {
        Ok(FormattedContent::Markdown {
            markdown: self.render(content, &content.text)?,
            slug: self.slug_for(content),
        })
    }

    async fn publish(&self, content: &Content) -> Result<PublishResult, PublishError> {
        let slug = self.slug_for(content);

        let images = match &self.storage {
            Some(storage) if !content.image_paths.is_empty() => {
                self.upload_images(storage.as_ref(), &content.image_paths, &slug)
                    .await
            }
            _ => BTreeMap::new(),
        };
        let body = rewrite_image_refs(&content.text, &images);
        let markdown = self.render(content, &body)?;

        let post_dir = self.post_dir(&slug);
        std::fs::create_dir_all(&post_dir)?;

        let primary = post_dir.join(format!("index.{}.md", self.settings.default_language));
        std::fs::write(&primary, &markdown)?;
        tracing::info!(path = %primary.display(), "Wrote post");

        let translations = self.write_translations(&markdown, &post_dir).await;

        let title = content.title.as_deref().unwrap_or_default();
        self.vcs
            .add(&[PathBuf::from(&self.settings.content_dir)])
            .await
            .map_err(|e| PublishError::Remote(format!("Git add failed: {}", e)))?;
        let outcome = self
            .vcs
            .commit(&format!("Add post: {}", title))
            .await
            .map_err(|e| PublishError::Remote(format!("Git commit failed: {}", e)))?;
        if outcome == CommitOutcome::NothingToCommit {
            tracing::info!(slug = %slug, "Nothing to commit, post unchanged");
        }

        Ok(PublishResult {
            url: self.post_url(content),
            id: Some(slug.clone()),
            blog: Some(BlogArtifacts {
                slug,
                files: BlogFiles {
                    primary,
                    translations,
                },
                images,
            }),
        })
    }
}

#[async_trait]
impl BlogTarget for HugoPublisher {
    fn post_url(&self, content: &Content) -> String {
        format!(
            "{}/{}/posts/{}/",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.default_language,
            self.slug_for(content)
        )
    }

    async fn deploy(&self) -> Result<(), PublishError> {
        self.vcs
            .push()
            .await
            .map_err(|e| PublishError::Remote(format!("Git push failed: {}", e)))?;
        tracing::info!(repo = %self.settings.repo_path.display(), "Pushed blog repository");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indieshout_domain::{StorageError, TranslateError, VcsError};
    use std::sync::Mutex;
    use tempfile::TempDir;
    use time::macros::datetime;

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    #[derive(Default)]
    struct FakeVcs {
        calls: Mutex<Vec<String>>,
        nothing_to_commit: bool,
        fail_identity: bool,
        fail_push: bool,
    }

    fn vcs_error(command: &str) -> VcsError {
        VcsError::Command {
            command: command.to_string(),
            stderr: "boom".to_string(),
        }
    }

    #[async_trait]
    impl VersionControl for FakeVcs {
        async fn ensure_identity(&self) -> Result<(), VcsError> {
            if self.fail_identity {
                return Err(vcs_error("git config user.name"));
            }
            Ok(())
        }

        async fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("add {}", paths[0].display()));
            Ok(())
        }

        async fn commit(&self, message: &str) -> Result<CommitOutcome, VcsError> {
            self.calls.lock().unwrap().push(format!("commit {}", message));
            if self.nothing_to_commit {
                return Ok(CommitOutcome::NothingToCommit);
            }
            Ok(CommitOutcome::Committed)
        }

        async fn push(&self) -> Result<(), VcsError> {
            if self.fail_push {
                return Err(vcs_error("git push"));
            }
            self.calls.lock().unwrap().push("push".to_string());
            Ok(())
        }
    }

    /// Uploads succeed except for files named `bad.*`
    struct FakeStorage;

    #[async_trait]
    impl ObjectStorage for FakeStorage {
        async fn upload(&self, file_path: &Path, key: &str) -> Result<String, StorageError> {
            if file_path.file_stem().is_some_and(|s| s == "bad") {
                return Err(StorageError::Remote("denied".to_string()));
            }
            Ok(format!("https://cdn.test/{}", key))
        }

        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }

        async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
            Ok(true)
        }
    }

    struct PrefixTranslator;

    #[async_trait]
    impl Translator for PrefixTranslator {
        async fn translate(
            &self,
            text: &str,
            _source_lang: &str,
            target_lang: &str,
        ) -> Result<String, TranslateError> {
            Ok(format!("[{}] {}", target_lang, text))
        }
    }

    struct BrokenTranslator;

    #[async_trait]
    impl Translator for BrokenTranslator {
        async fn translate(
            &self,
            _text: &str,
            _source_lang: &str,
            _target_lang: &str,
        ) -> Result<String, TranslateError> {
            Err(TranslateError::Timeout(180))
        }
    }

    fn settings(repo: &Path) -> HugoSettings {
        HugoSettings {
            repo_path: repo.to_path_buf(),
            base_url: "https://blog.test/".to_string(),
            ..HugoSettings::default()
        }
    }

    fn publisher(repo: &Path, vcs: Arc<FakeVcs>) -> HugoPublisher {
        HugoPublisher::new(settings(repo), vcs)
            .with_clock(Arc::new(FixedClock(datetime!(2026-02-16 20:00:00 UTC))))
    }

    fn post() -> Content {
        Content::blog("Hello World", "Body text").with_tags(["rust"])
    }

    #[test]
    fn test_slug_and_url_use_configured_offset() {
        let dir = TempDir::new().unwrap();
        let blog = publisher(dir.path(), Arc::new(FakeVcs::default()));

        // 20:00 UTC is already the next day at +09:00
        assert_eq!(
            blog.post_url(&post()),
            "https://blog.test/ko/posts/20260217-hello-world/"
        );

        let mut explicit = post();
        explicit.slug = Some("custom".to_string());
        assert_eq!(blog.post_url(&explicit), "https://blog.test/ko/posts/custom/");
    }

    #[test]
    fn test_format_content_front_matter() {
        let dir = TempDir::new().unwrap();
        let blog = publisher(dir.path(), Arc::new(FakeVcs::default()));

        let FormattedContent::Markdown { markdown, slug } = blog.format_content(&post()).unwrap()
        else {
            panic!("expected markdown");
        };

        assert_eq!(slug, "20260217-hello-world");
        assert_eq!(
            markdown,
            "---\ntitle: \"Hello World\"\ndate: 2026-02-17T05:00:00+09:00\ndraft: false\ntags: [\"rust\"]\ncategories: []\n---\n\nBody text"
        );
    }

    #[test]
    fn test_validate_rules_in_order() {
        let dir = TempDir::new().unwrap();
        let blog = publisher(dir.path(), Arc::new(FakeVcs::default()));

        let blank = Content::blog("Title", "  ");
        assert!(matches!(blog.validate(&blank), Err(PublishError::Validation(ref m)) if m.contains("Text")));

        let untitled = Content::blog("", "Body");
        assert!(matches!(blog.validate(&untitled), Err(PublishError::Validation(ref m)) if m.contains("Title")));

        let missing_repo = publisher(&dir.path().join("missing"), Arc::new(FakeVcs::default()));
        assert!(matches!(
            missing_repo.validate(&post()),
            Err(PublishError::NotFound(_))
        ));

        assert!(blog.validate(&post()).is_ok());
    }

    #[tokio::test]
    async fn test_publish_writes_translates_and_commits() {
        let dir = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs::default());
        let blog =
            publisher(dir.path(), Arc::clone(&vcs)).with_translator(Arc::new(PrefixTranslator));

        let result = blog.publish(&post()).await.unwrap();

        assert_eq!(result.url, "https://blog.test/ko/posts/20260217-hello-world/");
        let artifacts = result.blog.unwrap();
        let post_dir = dir.path().join("content/posts/20260217-hello-world");
        assert_eq!(artifacts.files.primary, post_dir.join("index.ko.md"));
        assert_eq!(
            artifacts.files.translations.get("en"),
            Some(&post_dir.join("index.en.md"))
        );

        let english = std::fs::read_to_string(post_dir.join("index.en.md")).unwrap();
        assert!(english.contains("title: \"[en] Hello World\""));
        assert!(english.contains("tags: [\"[en] rust\"]"));
        assert!(english.ends_with("[en] Body text"));

        assert_eq!(
            *vcs.calls.lock().unwrap(),
            vec!["add content/posts", "commit Add post: Hello World"]
        );
    }

    #[tokio::test]
    async fn test_translation_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs::default());
        let blog =
            publisher(dir.path(), Arc::clone(&vcs)).with_translator(Arc::new(BrokenTranslator));

        let result = blog.publish(&post()).await.unwrap();
        let artifacts = result.blog.unwrap();

        assert!(artifacts.files.primary.exists());
        assert!(artifacts.files.translations.is_empty());
        assert!(!artifacts.files.primary.with_file_name("index.en.md").exists());
        assert_eq!(vcs.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_images_uploaded_and_rewritten() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("src/assets");
        std::fs::create_dir_all(&assets).unwrap();
        let good = assets.join("1.png");
        let bad = assets.join("bad.png");
        std::fs::write(&good, b"png").unwrap();
        std::fs::write(&bad, b"png").unwrap();

        let body = format!(
            "![one](assets/1.png)\n<img src=\"{}\">\n![two](assets/bad.png)",
            good.display()
        );
        let content = Content::blog("Pics", body).with_images([
            good.clone(),
            bad.clone(),
            assets.join("missing.png"),
        ]);

        let blog = publisher(dir.path(), Arc::new(FakeVcs::default()))
            .with_storage(Arc::new(FakeStorage));
        let result = blog.publish(&content).await.unwrap();
        let artifacts = result.blog.unwrap();

        let url = "https://cdn.test/posts/20260217-pics/1.png";
        assert_eq!(artifacts.images.len(), 1);
        assert_eq!(
            artifacts
                .images
                .get(&good.display().to_string())
                .map(String::as_str),
            Some(url)
        );

        let written = std::fs::read_to_string(&artifacts.files.primary).unwrap();
        assert!(written.contains(&format!("![one]({})", url)));
        assert!(written.contains(&format!("<img src=\"{}\">", url)));
        assert!(written.contains("![two](assets/bad.png)"));
    }

    #[tokio::test]
    async fn test_nothing_to_commit_is_success() {
        let dir = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs {
            nothing_to_commit: true,
            ..FakeVcs::default()
        });
        let blog = publisher(dir.path(), vcs);

        assert!(blog.publish(&post()).await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_requires_git_identity() {
        let dir = TempDir::new().unwrap();
        let mut blog = publisher(
            dir.path(),
            Arc::new(FakeVcs {
                fail_identity: true,
                ..FakeVcs::default()
            }),
        );

        assert!(matches!(blog.authenticate().await, Err(PublishError::Auth(_))));
    }

    #[tokio::test]
    async fn test_deploy_pushes() {
        let dir = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs::default());
        publisher(dir.path(), Arc::clone(&vcs)).deploy().await.unwrap();
        assert_eq!(*vcs.calls.lock().unwrap(), vec!["push"]);

        let failing = publisher(
            dir.path(),
            Arc::new(FakeVcs {
                fail_push: true,
                ..FakeVcs::default()
            }),
        );
        assert!(matches!(failing.deploy().await, Err(PublishError::Remote(_))));
    }
}
