//! Overlay image sources and their acquisition.
//!
//! An [`ImageSource`] names where the overlay comes from. A
//! [`SourceProvider`] turns it into a [`Surface`]. The stock
//! [`ImageProvider`] decodes files itself and asks an injected
//! [`ClipboardReader`] for clipboard content, so the host decides how (and
//! on which thread) the system clipboard is touched.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use blendplus_core::{Pixel, Surface};
//! use blendplus_io::{ImageProvider, ImageSource, MemoryClipboard, SourceProvider};
//!
//! let clipboard = Arc::new(MemoryClipboard::new());
//! clipboard.set_bitmap(Surface::filled(2, 2, Pixel::opaque(1, 2, 3)));
//!
//! let provider = ImageProvider::new().with_clipboard(clipboard);
//! let surface = provider.acquire(&ImageSource::Clipboard).unwrap();
//! assert_eq!(surface.dimensions(), (2, 2));
//! ```

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use blendplus_core::Surface;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{codec, IoError, IoResult};

/// Where the overlay image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSource {
    /// An image file (BMP, GIF, JPEG or PNG).
    File(PathBuf),
    /// Whatever image the clipboard currently holds.
    Clipboard,
}

impl Default for ImageSource {
    fn default() -> Self {
        ImageSource::File(PathBuf::new())
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::File(path) => write!(f, "file '{}'", path.display()),
            ImageSource::Clipboard => f.write_str("clipboard"),
        }
    }
}

/// One representation of the clipboard content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardPayload {
    /// Encoded PNG bytes. Keeps alpha, preferred when present.
    Png(Vec<u8>),
    /// Already-decoded bitmap.
    Bitmap(Surface),
}

/// Read access to a clipboard.
pub trait ClipboardReader: Send + Sync {
    /// Returns every image representation currently available.
    ///
    /// An empty list means the clipboard holds no image.
    fn payloads(&self) -> IoResult<Vec<ClipboardPayload>>;
}

/// In-process clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    payloads: RwLock<Vec<ClipboardPayload>>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the content with PNG bytes.
    pub fn set_png(&self, data: Vec<u8>) {
        self.replace(vec![ClipboardPayload::Png(data)]);
    }

    /// Replaces the content with a bitmap.
    pub fn set_bitmap(&self, surface: Surface) {
        self.replace(vec![ClipboardPayload::Bitmap(surface)]);
    }

    /// Replaces the content with several representations of one image.
    pub fn replace(&self, payloads: Vec<ClipboardPayload>) {
        match self.payloads.write() {
            Ok(mut guard) => *guard = payloads,
            Err(poisoned) => *poisoned.into_inner() = payloads,
        }
    }

    /// Empties the clipboard.
    pub fn clear(&self) {
        self.replace(Vec::new());
    }
}

impl ClipboardReader for MemoryClipboard {
    fn payloads(&self) -> IoResult<Vec<ClipboardPayload>> {
        self.payloads
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| IoError::ClipboardUnavailable("clipboard lock poisoned".into()))
    }
}

/// Acquires overlay surfaces.
pub trait SourceProvider: Send + Sync {
    /// Loads the image named by `source`.
    fn acquire(&self, source: &ImageSource) -> IoResult<Surface>;
}

/// Stock provider: decodes files, reads an optional injected clipboard.
#[derive(Clone, Default)]
pub struct ImageProvider {
    clipboard: Option<Arc<dyn ClipboardReader>>,
}

impl std::fmt::Debug for ImageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageProvider")
            .field("clipboard", &self.clipboard.is_some())
            .finish()
    }
}

impl ImageProvider {
    /// Provider without clipboard access.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a clipboard reader.
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardReader>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    fn from_clipboard(&self) -> IoResult<Surface> {
        let Some(clipboard) = &self.clipboard else {
            return Err(IoError::ClipboardUnavailable("no clipboard reader configured".into()));
        };
        let payloads = clipboard.payloads()?;
        trace!(count = payloads.len(), "clipboard payloads");

        // PNG wins whenever it is offered, even if it then fails to decode
        if let Some(data) = payloads.iter().find_map(|p| match p {
            ClipboardPayload::Png(data) => Some(data),
            ClipboardPayload::Bitmap(_) => None,
        }) {
            return codec::decode(data);
        }
        payloads
            .into_iter()
            .find_map(|p| match p {
                ClipboardPayload::Bitmap(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .ok_or(IoError::ClipboardEmpty)
    }
}

impl SourceProvider for ImageProvider {
    fn acquire(&self, source: &ImageSource) -> IoResult<Surface> {
        debug!(%source, "acquiring overlay");
        match source {
            ImageSource::File(path) => codec::read(path),
            ImageSource::Clipboard => self.from_clipboard(),
        }
    }
}
