//! Local precondition checks shared by publishers

use std::path::Path;

use crate::model::Content;
use crate::ports::PublishError;

/// Image extensions accepted by every social platform
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Per-platform media ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaLimits {
    pub max_images: usize,
    pub max_image_bytes: u64,
}

impl MediaLimits {
    pub const X: MediaLimits = MediaLimits {
        max_images: 4,
        max_image_bytes: 5 * 1024 * 1024,
    };

    pub const THREADS: MediaLimits = MediaLimits {
        max_images: 10,
        max_image_bytes: 8 * 1024 * 1024,
    };
}

pub fn require_text(content: &Content) -> Result<(), PublishError> {
    if content.has_blank_text() {
        return Err(PublishError::Validation(
            "Text content is required".to_string(),
        ));
    }
    Ok(())
}

/// Check image count, then each image's existence, extension and size in order
pub fn validate_images(images: &[impl AsRef<Path>], limits: MediaLimits) -> Result<(), PublishError> {
    if images.len() > limits.max_images {
        return Err(PublishError::Validation(format!(
            "Maximum {} images allowed, got {}",
            limits.max_images,
            images.len()
        )));
    }

    for image in images {
        let path = image.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|_| PublishError::NotFound(format!("Image not found: {}", path.display())))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(PublishError::Validation(format!(
                "Unsupported image format: .{}",
                extension
            )));
        }

        if metadata.len() > limits.max_image_bytes {
            return Err(PublishError::Validation(format!(
                "Image too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }
    }

    Ok(())
}

/// Text plus media checks for social targets
pub fn validate_social(content: &Content, limits: MediaLimits) -> Result<(), PublishError> {
    require_text(content)?;
    validate_images(content.image_paths.as_slice(), limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, len: usize) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn test_whitespace_text_rejected() {
        let result = validate_social(&Content::social("  \n "), MediaLimits::X);
        assert!(matches!(result, Err(PublishError::Validation(_))));
    }

    #[test]
    fn test_too_many_images() {
        let dir = TempDir::new().unwrap();
        let images: Vec<_> = (1..=5)
            .map(|i| write_file(&dir, &format!("{}.png", i), 10))
            .collect();

        let content = Content::social("hi").with_images(images);
        let err = validate_social(&content, MediaLimits::X).unwrap_err();
        assert!(err.to_string().contains("Maximum 4 images"));

        assert!(validate_social(&content, MediaLimits::THREADS).is_ok());
    }

    #[test]
    fn test_missing_image() {
        let content = Content::social("hi").with_images(["/nonexistent/1.png"]);
        let result = validate_social(&content, MediaLimits::X);
        assert!(matches!(result, Err(PublishError::NotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let image = write_file(&dir, "clip.bmp", 10);

        let content = Content::social("hi").with_images([image]);
        let err = validate_social(&content, MediaLimits::X).unwrap_err();
        assert!(err.to_string().contains("Unsupported image format: .bmp"));
    }

    #[test]
    fn test_uppercase_extension_accepted() {
        let dir = TempDir::new().unwrap();
        let image = write_file(&dir, "photo.JPG", 10);

        let content = Content::social("hi").with_images([image]);
        assert!(validate_social(&content, MediaLimits::X).is_ok());
    }

    #[test]
    fn test_image_too_large() {
        let dir = TempDir::new().unwrap();
        let limits = MediaLimits {
            max_images: 4,
            max_image_bytes: 100,
        };
        let image = write_file(&dir, "big.png", 101);

        let content = Content::social("hi").with_images([image]);
        let err = validate_social(&content, limits).unwrap_err();
        assert!(err.to_string().contains("Image too large (101 bytes)"));
    }

    #[test]
    fn test_first_violation_wins() {
        // Blank text is reported even though the image is also missing
        let content = Content::social("").with_images(["/nonexistent/1.png"]);
        let result = validate_social(&content, MediaLimits::X);
        assert!(matches!(result, Err(PublishError::Validation(_))));
    }
}
