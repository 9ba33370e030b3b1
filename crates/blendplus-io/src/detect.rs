//! Format detection utilities.
//!
//! Detects the accepted overlay formats from magic bytes and file
//! extensions.

use std::path::Path;

/// Image formats accepted as overlay sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Windows bitmap.
    Bmp,
    /// GIF (first frame).
    Gif,
    /// JPEG format.
    Jpeg,
    /// PNG format.
    Png,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// File extensions offered for overlay files.
    pub const EXTENSIONS: [&'static str; 5] = ["bmp", "gif", "jpg", "jpeg", "png"];

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("bmp") | Some("dib") => Format::Bmp,
            Some("gif") => Format::Gif,
            Some("jpg") | Some("jpeg") | Some("jpe") => Format::Jpeg,
            Some("png") => Format::Png,
            _ => Format::Unknown,
        }
    }

    /// Detects format from leading bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Format::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Format::Jpeg
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Format::Gif
        } else if data.starts_with(b"BM") {
            Format::Bmp
        } else {
            Format::Unknown
        }
    }

    /// Detects format from content, falling back to the extension.
    pub fn detect<P: AsRef<Path>>(path: P, data: &[u8]) -> Self {
        match Self::from_bytes(data) {
            Format::Unknown => Self::from_extension(path),
            known => known,
        }
    }

    /// The matching `image` crate format.
    pub(crate) fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            Format::Bmp => Some(image::ImageFormat::Bmp),
            Format::Gif => Some(image::ImageFormat::Gif),
            Format::Jpeg => Some(image::ImageFormat::Jpeg),
            Format::Png => Some(image::ImageFormat::Png),
            Format::Unknown => None,
        }
    }
}
