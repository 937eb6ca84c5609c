//! Image decoding, rendering and encoding backend.
//!
//! The [`ImageBackend`] trait is the seam between the encoder's policy (what
//! size, which format, which quality) and the pixel work. [`RustBackend`] is
//! the production implementation on top of the `image` and `webp` crates.
//!
//! | Step   | RustBackend                                              |
//! |--------|----------------------------------------------------------|
//! | decode | `image::ImageReader` with format sniffing                |
//! | render | Lanczos3 `resize_exact` (skipped when the size matches)   |
//! | JPEG   | `image::codecs::jpeg::JpegEncoder`, alpha flattened white |
//! | WebP   | `webp::Encoder`, lossy                                    |

use crate::formats::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, Rgb, RgbImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(reason: impl Into<String>) -> Self {
        BackendError(reason.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pixel operations the encoder needs.
///
/// `Decoded` is the decode-time handle. `render` takes it by value, so the
/// handle is released as soon as rendering returns, whether it succeeded or
/// not.
pub trait ImageBackend {
    type Decoded;
    type Surface;

    /// Decode raw bytes and report the natural dimensions.
    fn decode(&self, data: &[u8]) -> Result<(Self::Decoded, Dimensions), BackendError>;

    /// Draw the decoded image onto a surface of `size` with high-quality resampling.
    fn render(&self, decoded: Self::Decoded, size: Dimensions) -> Result<Self::Surface, BackendError>;

    /// Encode the surface. `quality` is in (0, 1].
    fn encode(
        &self,
        surface: &Self::Surface,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, BackendError>;
}

/// Pure-Rust backend built on the `image` crate, with `webp` for lossy WebP.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        RustBackend
    }
}

impl ImageBackend for RustBackend {
    type Decoded = DynamicImage;
    type Surface = DynamicImage;

    fn decode(&self, data: &[u8]) -> Result<(DynamicImage, Dimensions), BackendError> {
        if data.is_empty() {
            return Err(BackendError::new("empty input"));
        }
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| BackendError::new(e.to_string()))?
            .decode()
            .map_err(|e| BackendError::new(e.to_string()))?;
        let (width, height) = img.dimensions();
        Ok((img, Dimensions { width, height }))
    }

    fn render(&self, decoded: DynamicImage, size: Dimensions) -> Result<DynamicImage, BackendError> {
        if size.width == 0 || size.height == 0 {
            return Err(BackendError::new(format!(
                "cannot create a {}x{} drawing surface",
                size.width, size.height
            )));
        }
        if decoded.dimensions() == (size.width, size.height) {
            return Ok(decoded);
        }
        Ok(decoded.resize_exact(size.width, size.height, FilterType::Lanczos3))
    }

    fn encode(
        &self,
        surface: &DynamicImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, BackendError> {
        match format {
            OutputFormat::Jpeg => encode_jpeg(surface, quality),
            OutputFormat::WebP => encode_webp(surface, quality),
        }
    }
}

fn quality_percent(quality: f32) -> f32 {
    (quality * 100.0).round().clamp(1.0, 100.0)
}

fn encode_jpeg(surface: &DynamicImage, quality: f32) -> Result<Vec<u8>, BackendError> {
    let rgb = flatten_onto_white(surface);
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality_percent(quality) as u8);
    encoder
        .encode_image(&rgb)
        .map_err(|e| BackendError::new(format!("JPEG encode failed: {}", e)))?;
    Ok(buffer)
}

fn encode_webp(surface: &DynamicImage, quality: f32) -> Result<Vec<u8>, BackendError> {
    let rgba = surface.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
    let memory = encoder
        .encode_simple(false, quality_percent(quality))
        .map_err(|e| BackendError::new(format!("WebP encode failed: {:?}", e)))?;
    Ok(memory.to_vec())
}

/// JPEG has no alpha channel; composite transparent pixels over white.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
