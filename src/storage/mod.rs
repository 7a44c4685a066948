use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

/// Extensions offered by the open dialog, lowercase and without the dot.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];
pub const DEFAULT_SAVE_EXTENSION: &str = "png";
pub const SAVE_NAME_SUFFIX: &str = "_watermarked";
pub const LOSSY_QUALITY: u8 = 95;
const FALLBACK_STEM: &str = "image";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("webp encoding failed: {0}")]
    Webp(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Encoding chosen from the target file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// Flattened to RGB and encoded at [`LOSSY_QUALITY`].
    Jpeg,
    /// Lossy at [`LOSSY_QUALITY`], alpha kept when present.
    Webp,
    Other(ImageFormat),
}

impl SaveFormat {
    pub fn from_path(path: &Path) -> StorageResult<Self> {
        let extension = lowercase_extension(path)
            .ok_or_else(|| StorageError::UnsupportedExtension(String::new()))?;
        match extension.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "png" => Ok(Self::Other(ImageFormat::Png)),
            "bmp" => Ok(Self::Other(ImageFormat::Bmp)),
            "gif" => Ok(Self::Other(ImageFormat::Gif)),
            _ => Err(StorageError::UnsupportedExtension(extension)),
        }
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn is_accepted_image_path(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

pub fn load_image(path: &Path) -> StorageResult<DynamicImage> {
    if !is_accepted_image_path(path) {
        return Err(StorageError::UnsupportedExtension(
            lowercase_extension(path).unwrap_or_default(),
        ));
    }
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded image"
    );
    Ok(image)
}

/// `<stem>_watermarked.png` for the image loaded from `source`.
pub fn default_save_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_STEM);
    format!("{stem}{SAVE_NAME_SUFFIX}.{DEFAULT_SAVE_EXTENSION}")
}

/// Encodes `image` for the extension of `path` and writes it. The file is
/// only created once encoding has succeeded.
pub fn save_image(image: &DynamicImage, path: &Path) -> StorageResult<SaveFormat> {
    let format = SaveFormat::from_path(path)?;
    let bytes = encode_image(image, format)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;
    tracing::debug!(path = %path.display(), ?format, bytes = bytes.len(), "wrote image");
    Ok(format)
}

pub fn encode_image(image: &DynamicImage, format: SaveFormat) -> StorageResult<Vec<u8>> {
    match format {
        SaveFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let mut buffer = Vec::new();
            let encoder = JpegEncoder::new_with_quality(&mut buffer, LOSSY_QUALITY);
            rgb.write_with_encoder(encoder)?;
            Ok(buffer)
        }
        SaveFormat::Webp => encode_webp(image),
        SaveFormat::Other(format) => {
            let mut cursor = Cursor::new(Vec::new());
            writable_layout(image, format).write_to(&mut cursor, format)?;
            Ok(cursor.into_inner())
        }
    }
}

fn encode_webp(image: &DynamicImage) -> StorageResult<Vec<u8>> {
    let quality = f32::from(LOSSY_QUALITY);
    let encoded = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, quality)
            .map_err(|err| StorageError::Webp(format!("{err:?}")))?
            .to_vec()
    } else {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height)
            .encode_simple(false, quality)
            .map_err(|err| StorageError::Webp(format!("{err:?}")))?
            .to_vec()
    };
    Ok(encoded)
}

/// 8-bit layout the target encoder accepts, keeping alpha when present.
fn writable_layout(image: &DynamicImage, format: ImageFormat) -> DynamicImage {
    let has_alpha = image.color().has_alpha();
    match (format, image) {
        (ImageFormat::Png, DynamicImage::ImageLuma8(_) | DynamicImage::ImageLumaA8(_)) => {
            image.clone()
        }
        (ImageFormat::Png, DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgba16(_)) => {
            image.clone()
        }
        _ if has_alpha => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}
