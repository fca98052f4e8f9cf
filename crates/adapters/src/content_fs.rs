//! Filesystem content repository
//!
//! Layout of one content folder:
//!
//! ```text
//! {root}/{name}/content.md   blog body
//! {root}/{name}/meta.md      key: value header, `---`, then the social text
//! {root}/{name}/assets/      images named 1.jpg, 2.png, ...
//! ```

use async_trait::async_trait;
use indieshout_domain::front_matter;
use indieshout_domain::{
    Clock, Content, ContentRepo, DEFAULT_PLATFORMS, FolderBundle, LoadError, SystemClock,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CONTENT_FILE: &str = "content.md";
const META_FILE: &str = "meta.md";
const ASSETS_DIR: &str = "assets";

/// Content folders under a single root directory
pub struct FsContentRepo {
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FsContentRepo {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a standalone markdown file into blog content.
    ///
    /// A leading `---` block may set `title` and `tags`; the title
    /// otherwise falls back to the file stem.
    pub fn read_post(&self, path: &Path) -> Result<Content, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let Some((header, body)) = front_matter::split(&text) else {
            return Ok(Content::blog(stem, text.trim()));
        };

        let mut title = None;
        let mut tags = Vec::new();
        for line in header.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key.trim() {
                "title" => title = Some(front_matter::unquote(value)).filter(|t| !t.is_empty()),
                "tags" => tags = front_matter::parse_list(value),
                _ => {}
            }
        }

        Ok(Content::blog(title.unwrap_or(stem), body.trim()).with_tags(tags))
    }
}

#[async_trait]
impl ContentRepo for FsContentRepo {
    async fn load_folder(&self, name: &str) -> Result<FolderBundle, LoadError> {
        let folder = self.root.join(name);
        if !folder.is_dir() {
            return Err(LoadError::NotFound(format!(
                "Folder not found: {}",
                folder.display()
            )));
        }

        let content_path = folder.join(CONTENT_FILE);
        if !content_path.is_file() {
            return Err(LoadError::NotFound(format!(
                "{} not found: {}",
                CONTENT_FILE,
                content_path.display()
            )));
        }

        let meta_path = folder.join(META_FILE);
        if !meta_path.is_file() {
            return Err(LoadError::NotFound(format!(
                "{} not found: {}",
                META_FILE,
                meta_path.display()
            )));
        }

        let body = std::fs::read_to_string(&content_path)?;
        let meta = parse_meta(&std::fs::read_to_string(&meta_path)?);
        let images = collect_images(&folder.join(ASSETS_DIR))?;

        tracing::debug!(
            folder = %folder.display(),
            images = images.len(),
            "Read content folder"
        );

        let platforms = meta
            .platforms
            .unwrap_or_else(|| DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect());

        let mut blog_content = Content::blog(meta.title.unwrap_or_else(|| name.to_string()), body)
            .with_tags(meta.tags)
            .with_images(images);
        blog_content.categories = meta.categories;
        blog_content.date = Some(self.clock.now());

        Ok(FolderBundle {
            blog_content,
            sns_text: meta.sns_text,
            platforms,
            extra: meta.extra,
        })
    }

    async fn list_folders(&self) -> Result<Vec<String>, LoadError> {
        if !self.root.is_dir() {
            return Ok(vec![]);
        }

        let mut folders = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            folders.push(name);
        }

        folders.sort();
        Ok(folders)
    }
}

#[derive(Debug, Default)]
struct Meta {
    title: Option<String>,
    tags: Vec<String>,
    categories: Vec<String>,
    platforms: Option<Vec<String>>,
    extra: BTreeMap<String, String>,
    sns_text: String,
}

/// Header lines up to the first `---` line, then free text
fn parse_meta(text: &str) -> Meta {
    let mut meta = Meta::default();
    let mut lines = text.lines();

    for line in lines.by_ref() {
        if line.trim() == front_matter::DELIMITER {
            break;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "title" => meta.title = Some(value.to_string()),
            "tags" => meta.tags = split_list(value),
            "categories" => meta.categories = split_list(value),
            // A blank list means the defaults, never "post nowhere"
            "platforms" => meta.platforms = Some(split_list(value)).filter(|p| !p.is_empty()),
            _ => {
                meta.extra.insert(key.to_string(), value.to_string());
            }
        }
    }

    // Whatever follows the separator; empty when there was none
    meta.sns_text = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    meta
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Files directly under `assets/`, by leading number in the stem
fn collect_images(assets: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !assets.is_dir() {
        return Ok(vec![]);
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(assets)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            images.push(entry.path());
        }
    }

    // Stable: equal indices keep directory order
    images.sort_by_key(|path| leading_index(path));
    Ok(images)
}

fn leading_index(path: &Path) -> u64 {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use time::OffsetDateTime;
    use time::macros::datetime;

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    fn write_folder(root: &Path, name: &str, content: &str, meta: &str) -> PathBuf {
        let folder = root.join(name);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("content.md"), content).unwrap();
        std::fs::write(folder.join("meta.md"), meta).unwrap();
        folder
    }

    #[tokio::test]
    async fn test_load_folder() {
        let dir = TempDir::new().unwrap();
        write_folder(
            dir.path(),
            "first-post",
            "# Hello\n\nBody text",
            "title: My first post\ntags: python, 개발 , AI\ncategories: tech\nplatforms: threads\nmood: happy\n\n---\n\nCheck out my post!\n",
        );

        let repo = FsContentRepo::new(dir.path())
            .with_clock(Arc::new(FixedClock(datetime!(2026-02-17 03:00:00 UTC))));
        let bundle = repo.load_folder("first-post").await.unwrap();

        let content = &bundle.blog_content;
        assert_eq!(content.title.as_deref(), Some("My first post"));
        assert_eq!(content.text, "# Hello\n\nBody text");
        assert_eq!(content.tags, vec!["python", "개발", "AI"]);
        assert_eq!(content.categories, vec!["tech"]);
        assert_eq!(content.date, Some(datetime!(2026-02-17 03:00:00 UTC)));
        assert_eq!(bundle.sns_text, "Check out my post!");
        assert_eq!(bundle.platforms, vec!["threads"]);
        assert_eq!(bundle.extra.get("mood").map(String::as_str), Some("happy"));
    }

    #[tokio::test]
    async fn test_defaults_when_meta_is_sparse() {
        let dir = TempDir::new().unwrap();
        write_folder(dir.path(), "untitled", "Body", "tags: a\n");

        let repo = FsContentRepo::new(dir.path());
        let bundle = repo.load_folder("untitled").await.unwrap();

        assert_eq!(bundle.blog_content.title.as_deref(), Some("untitled"));
        assert_eq!(bundle.platforms, vec!["x", "threads"]);
        // No separator: the whole file is metadata
        assert_eq!(bundle.sns_text, "");
    }

    #[tokio::test]
    async fn test_blank_platforms_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        write_folder(dir.path(), "post", "Body", "title: T\nplatforms:\n---\nhello");

        let repo = FsContentRepo::new(dir.path());
        let bundle = repo.load_folder("post").await.unwrap();

        assert_eq!(bundle.platforms, vec!["x", "threads"]);
        assert_eq!(bundle.sns_text, "hello");
    }

    #[tokio::test]
    async fn test_images_sorted_numerically() {
        let dir = TempDir::new().unwrap();
        let folder = write_folder(dir.path(), "pics", "Body", "title: Pics\n---\nhi");
        let assets = folder.join("assets");
        std::fs::create_dir_all(assets.join("nested")).unwrap();
        for name in ["10.jpg", "cover.png", "2.png", "1.jpg"] {
            std::fs::write(assets.join(name), b"img").unwrap();
        }

        let repo = FsContentRepo::new(dir.path());
        let bundle = repo.load_folder("pics").await.unwrap();

        let names: Vec<_> = bundle
            .blog_content
            .image_paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["1.jpg", "2.png", "10.jpg", "cover.png"]);
    }

    #[tokio::test]
    async fn test_missing_files_are_named() {
        let dir = TempDir::new().unwrap();
        let repo = FsContentRepo::new(dir.path());

        let err = repo.load_folder("nope").await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(ref m) if m.contains("Folder not found")));

        let folder = dir.path().join("half");
        std::fs::create_dir_all(&folder).unwrap();
        let err = repo.load_folder("half").await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(ref m) if m.contains("content.md")));

        std::fs::write(folder.join("content.md"), "Body").unwrap();
        let err = repo.load_folder("half").await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(ref m) if m.contains("meta.md")));
    }

    #[test]
    fn test_separator_must_be_whole_line() {
        let meta = parse_meta("title: a --- b\n---\nsocial --- text\n---\nmore");
        assert_eq!(meta.title.as_deref(), Some("a --- b"));
        assert_eq!(meta.sns_text, "social --- text\n---\nmore");
    }

    #[tokio::test]
    async fn test_list_folders_skips_hidden_and_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("b-post")).unwrap();
        std::fs::create_dir_all(dir.path().join("a-post")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("README.md"), "x").unwrap();

        let repo = FsContentRepo::new(dir.path());
        assert_eq!(repo.list_folders().await.unwrap(), vec!["a-post", "b-post"]);

        let missing = FsContentRepo::new(dir.path().join("missing"));
        assert!(missing.list_folders().await.unwrap().is_empty());
    }

    #[test]
    fn test_read_post_with_front_matter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("draft.md");
        std::fs::write(
            &path,
            "---\ntitle: \"Shipping v1\"\ntags: [rust, 'cli']\n---\n\nWe shipped.\n",
        )
        .unwrap();

        let repo = FsContentRepo::new(dir.path());
        let content = repo.read_post(&path).unwrap();

        assert_eq!(content.title.as_deref(), Some("Shipping v1"));
        assert_eq!(content.tags, vec!["rust", "cli"]);
        assert_eq!(content.text, "We shipped.");
    }

    #[test]
    fn test_read_post_plain_uses_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello-world.md");
        std::fs::write(&path, "Just text\n").unwrap();

        let repo = FsContentRepo::new(dir.path());
        let content = repo.read_post(&path).unwrap();

        assert_eq!(content.title.as_deref(), Some("hello-world"));
        assert_eq!(content.text, "Just text");

        assert!(matches!(
            repo.read_post(&dir.path().join("missing.md")),
            Err(LoadError::NotFound(_))
        ));
    }
}
