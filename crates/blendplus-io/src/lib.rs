//! # blendplus-io
//!
//! Image acquisition for BlendPlus.
//!
//! Overlays come from one of two places:
//!
//! - **File** - BMP, GIF, JPEG or PNG, decoded through the `image` crate
//! - **Clipboard** - PNG bytes (alpha preserved) or a plain bitmap, read
//!   through an injected [`ClipboardReader`]
//!
//! # Architecture
//!
//! - [`SourceProvider`] - Trait turning an [`ImageSource`] into a surface
//! - [`ImageProvider`] - Stock provider used by the CLI and tests
//! - [`read`] / [`decode`] / [`save`] - Codec helpers with format detection
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use blendplus_io::{read, save};
//!
//! let overlay = read("overlay.gif")?;
//! save("overlay.png", &overlay)?;
//! ```
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Notes |
//! |--------|------|-------|-------|
//! | PNG | Yes | Yes | Alpha preserved |
//! | BMP | Yes | Yes | |
//! | JPEG | Yes | Yes | Alpha dropped on write |
//! | GIF | Yes | Yes | First frame only on read |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod codec;
mod detect;
mod error;
pub mod source;

pub use codec::{decode, encode_png, read, save, write_png};
pub use detect::Format;
pub use error::{IoError, IoResult};
pub use source::{
    ClipboardPayload, ClipboardReader, ImageProvider, ImageSource, MemoryClipboard,
    SourceProvider,
};
