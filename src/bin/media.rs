use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageFormat, ImageReader};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid image payload. Expected a base64 encoded image.")]
    InvalidEncoding,

    #[error("Unsupported image format. Use PNG, JPEG, GIF or WebP.")]
    UnsupportedFormat,

    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    Corrupt(#[from] image::ImageError),

    #[error("Could not store image: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MediaError::Io(_))
    }
}

#[derive(Debug, Clone)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
}

/// Image files on disk, addressed by a path relative to the media root.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    const RECIPE_IMAGES_DIR: &'static str = "recipes/images";
    const ACCEPTED_FORMATS: [ImageFormat; 4] = [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Gif,
        ImageFormat::WebP,
    ];

    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root, url_prefix }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Accepts `data:image/<fmt>;base64,<payload>` or a bare base64 payload.
    pub fn decode_image(data: &str) -> Result<DecodedImage, MediaError> {
        let payload = match data.split_once(";base64,") {
            Some((header, payload)) if header.starts_with("data:") => payload,
            _ => data,
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| MediaError::InvalidEncoding)?;

        let format = image::guess_format(&bytes).map_err(|_| MediaError::UnsupportedFormat)?;
        if !Self::ACCEPTED_FORMATS.contains(&format) {
            return Err(MediaError::UnsupportedFormat);
        }

        // Sniffed headers are not enough, the whole image has to decode
        ImageReader::with_format(Cursor::new(&bytes), format).decode()?;

        Ok(DecodedImage { bytes, format })
    }

    pub fn save(&self, image: &DecodedImage) -> Result<String, MediaError> {
        let extension = image
            .format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("img");
        let relative = format!(
            "{}/{}.{}",
            Self::RECIPE_IMAGES_DIR,
            Uuid::new_v4().simple(),
            extension
        );

        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &image.bytes)?;

        debug!("Stored image {}", path.display());
        Ok(relative)
    }

    pub fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        if let Err(e) = fs::remove_file(&path) {
            warn!("Failed to remove image {}: {e}", path.display());
        }
    }

    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.url_prefix, relative)
    }
}
