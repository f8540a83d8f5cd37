// 🌿 Crop Image - the binary blob handed to the inference backend
//
// The core does not decode images. It only checks that the bytes carry a
// known image signature and fit the configured size limit.

use crate::error::ValidationError;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Detect format from leading magic bytes
    pub fn detect(bytes: &[u8]) -> Option<ImageFormat> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else {
            None
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

/// Named image blob. Cloning shares the underlying bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct CropImage {
    file_name: String,
    bytes: Arc<[u8]>,
    digest: String,
}

impl CropImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let digest = format!("{:x}", Sha256::digest(&bytes));

        CropImage {
            file_name: file_name.into(),
            bytes: Arc::from(bytes),
            digest,
        }
    }

    /// Read an image from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image file: {:?}", path))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(CropImage::new(file_name, bytes))
    }

    /// Check emptiness, size limit and signature, in that order
    pub fn validate(&self, max_bytes: usize) -> Result<ImageFormat, ValidationError> {
        if self.bytes.is_empty() {
            return Err(ValidationError::EmptyImage);
        }
        if self.bytes.len() > max_bytes {
            return Err(ValidationError::ImageTooLarge {
                size: self.bytes.len(),
                limit: max_bytes,
            });
        }
        ImageFormat::detect(&self.bytes).ok_or(ValidationError::UnsupportedFormat)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex SHA-256 of the image bytes
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn short_digest(&self) -> &str {
        &self.digest[..12]
    }
}

// Bytes are left out so logs and panics never dump image payloads
impl fmt::Debug for CropImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropImage")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .field("digest", &self.short_digest())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png(extra: usize) -> Vec<u8> {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.extend(std::iter::repeat(0u8).take(extra));
        bytes
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::detect(&png(4)), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::detect(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::detect(b"GIF89a.."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert_eq!(
            CropImage::new("empty.png", vec![]).validate(1024),
            Err(ValidationError::EmptyImage)
        );
        assert_eq!(
            CropImage::new("big.png", png(100)).validate(50),
            Err(ValidationError::ImageTooLarge { size: 108, limit: 50 })
        );
        assert_eq!(
            CropImage::new("notes.txt", b"hello".to_vec()).validate(1024),
            Err(ValidationError::UnsupportedFormat)
        );
        assert_eq!(
            CropImage::new("leaf.png", png(16)).validate(1024),
            Ok(ImageFormat::Png)
        );
    }

    #[test]
    fn test_digest_and_debug() {
        let a = CropImage::new("a.png", png(1));
        let b = CropImage::new("b.png", png(1));

        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);

        let debug = format!("{:?}", a);
        assert!(debug.contains("a.png"));
        assert!(!debug.contains("[137, 80"), "raw bytes must not be printed");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, png(8)).unwrap();

        let image = CropImage::from_file(&path).unwrap();
        assert_eq!(image.file_name(), "leaf.png");
        assert_eq!(image.len(), 16);

        assert!(CropImage::from_file(dir.path().join("missing.png")).is_err());
    }
}
