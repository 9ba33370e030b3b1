//! Decoding and encoding through the `image` crate.
//!
//! Decoded images are always converted to 8-bit straight-alpha RGBA
//! [`Surface`]s. GIF sources yield their first frame.
//!
//! # Example
//!
//! ```rust,ignore
//! use blendplus_io::codec::{read, write_png};
//!
//! let surface = read("overlay.jpg")?;
//! write_png("copy.png", &surface)?;
//! ```

use std::io::Cursor;
use std::path::Path;

use blendplus_core::Surface;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use crate::detect::Format;
use crate::{IoError, IoResult};

/// Decodes an in-memory BMP, GIF, JPEG or PNG image.
pub fn decode(data: &[u8]) -> IoResult<Surface> {
    decode_as(data, Format::from_bytes(data))
}

fn decode_as(data: &[u8], format: Format) -> IoResult<Surface> {
    let Some(fmt) = format.image_format() else {
        return Err(IoError::UnsupportedFormat(
            "expected BMP, GIF, JPEG or PNG data".into(),
        ));
    };
    let img = image::load_from_memory_with_format(data, fmt)?;
    let surface = from_dynamic(img)?;
    debug!(
        ?format,
        width = surface.width(),
        height = surface.height(),
        "decoded image"
    );
    Ok(surface)
}

/// Reads and decodes an image file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Surface> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let data = std::fs::read(path)?;
    let format = Format::detect(path, &data);
    debug!(path = %path.display(), ?format, bytes = data.len(), "reading image");
    decode_as(&data, format)
}

/// Converts any decoded image to a surface.
pub fn from_dynamic(img: DynamicImage) -> IoResult<Surface> {
    let rgba = img.into_rgba8();
    let (w, h) = rgba.dimensions();
    Ok(Surface::from_rgba8(w, h, rgba.as_raw())?)
}

fn to_rgba_image(surface: &Surface) -> IoResult<RgbaImage> {
    RgbaImage::from_raw(surface.width(), surface.height(), surface.to_rgba8()).ok_or_else(|| {
        IoError::EncodeError(format!(
            "buffer does not match {}x{}",
            surface.width(),
            surface.height()
        ))
    })
}

/// Encodes a surface as PNG bytes.
pub fn encode_png(surface: &Surface) -> IoResult<Vec<u8>> {
    let img = to_rgba_image(surface)?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Writes a surface as a PNG file.
pub fn write_png<P: AsRef<Path>>(path: P, surface: &Surface) -> IoResult<()> {
    let path = path.as_ref();
    let img = to_rgba_image(surface)?;
    img.save_with_format(path, ImageFormat::Png)?;
    debug!(path = %path.display(), width = surface.width(), height = surface.height(), "wrote png");
    Ok(())
}

/// Writes a surface, picking the format from the file extension.
///
/// JPEG output drops the alpha channel. Unknown extensions are rejected.
pub fn save<P: AsRef<Path>>(path: P, surface: &Surface) -> IoResult<()> {
    let path = path.as_ref();
    match Format::from_extension(path) {
        Format::Png => write_png(path, surface),
        Format::Bmp => {
            to_rgba_image(surface)?.save_with_format(path, ImageFormat::Bmp)?;
            Ok(())
        }
        Format::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(to_rgba_image(surface)?).into_rgb8();
            rgb.save_with_format(path, ImageFormat::Jpeg)?;
            Ok(())
        }
        Format::Gif => {
            to_rgba_image(surface)?.save_with_format(path, ImageFormat::Gif)?;
            Ok(())
        }
        Format::Unknown => Err(IoError::UnsupportedFormat(format!(
            "cannot infer output format from '{}'",
            path.display()
        ))),
    }
}
