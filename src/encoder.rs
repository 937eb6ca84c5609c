//! Per-image compression: decode → optional downscale → re-encode with a
//! quality ladder → size-safety fallback to the original bytes.

use crate::backend::{Dimensions, ImageBackend, RustBackend};
use crate::constants::{
    DEFAULT_RETRY_QUALITIES, MAX_DIMENSION, MAX_QUALITY_PERCENT, MIN_QUALITY_PERCENT,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::queue::SourceImage;
use crate::utils::replace_extension;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOptions {
    pub max_dimension: u32,
    /// Overrides the per-format starting quality when set
    pub initial_quality: Option<f32>,
    /// Tried in order while the output is not smaller than the input
    pub retry_qualities: Vec<f32>,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            initial_quality: None,
            retry_qualities: DEFAULT_RETRY_QUALITIES.to_vec(),
        }
    }
}

impl CompressionOptions {
    pub fn new(
        max_dimension: Option<u32>,
        initial_quality: Option<f32>,
        retry_qualities: Option<Vec<f32>>,
    ) -> Result<Self> {
        let max_dimension = max_dimension.unwrap_or(MAX_DIMENSION);
        if max_dimension == 0 {
            return Err(CompressionError::InvalidDimension(max_dimension));
        }

        let retry_qualities = retry_qualities.unwrap_or_else(|| DEFAULT_RETRY_QUALITIES.to_vec());
        for quality in initial_quality.iter().chain(retry_qualities.iter()) {
            validate_quality(*quality)?;
        }

        Ok(Self {
            max_dimension,
            initial_quality,
            retry_qualities,
        })
    }

    /// Build options from 1–100 percentages, as taken on the command line.
    pub fn from_percentages(
        max_dimension: Option<u32>,
        initial_quality: Option<u8>,
        retry_qualities: Option<Vec<u8>>,
    ) -> Result<Self> {
        let to_fraction = |percent: u8| -> Result<f32> {
            if !(MIN_QUALITY_PERCENT..=MAX_QUALITY_PERCENT).contains(&percent) {
                return Err(CompressionError::InvalidQuality(percent as f32 / 100.0));
            }
            Ok(percent as f32 / 100.0)
        };

        let initial = initial_quality.map(to_fraction).transpose()?;
        let retries = retry_qualities
            .map(|list| list.into_iter().map(to_fraction).collect::<Result<Vec<_>>>())
            .transpose()?;
        Self::new(max_dimension, initial, retries)
    }

    /// Full quality sequence for an image whose format starts at `initial`.
    pub fn quality_ladder(&self, initial: f32) -> Vec<f32> {
        std::iter::once(self.initial_quality.unwrap_or(initial))
            .chain(self.retry_qualities.iter().copied())
            .collect()
    }
}

fn validate_quality(quality: f32) -> Result<()> {
    if quality.is_nan() || quality <= 0.0 || quality > 1.0 {
        return Err(CompressionError::InvalidQuality(quality));
    }
    Ok(())
}

/// Dimensions after fitting `source` inside `max` × `max`.
///
/// Both axes are scaled by the same factor and rounded down, never below one
/// pixel. Images already within bounds are returned unchanged.
pub fn target_dimensions(source: Dimensions, max: u32) -> Dimensions {
    let Dimensions { width, height } = source;
    if width <= max && height <= max {
        return source;
    }
    let ratio = (max as f64 / width as f64).min(max as f64 / height as f64);
    let scale = |side: u32| ((side as f64 * ratio).floor() as u32).clamp(1, max);
    Dimensions::new(scale(width), scale(height))
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncodeKind {
    Reencoded {
        format: OutputFormat,
        quality: f32,
        dimensions: Dimensions,
        attempts: usize,
    },
    /// No attempt beat the input; the original payload is passed through
    Original,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeResult {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub original_size: u64,
    pub compressed_size: u64,
    pub kind: EncodeKind,
}

impl EncodeResult {
    fn original(source: &SourceImage) -> Self {
        Self {
            name: source.name().to_string(),
            mime_type: source.mime_type().to_string(),
            data: source.data().to_vec(),
            original_size: source.size(),
            compressed_size: source.size(),
            kind: EncodeKind::Original,
        }
    }

    pub fn is_original(&self) -> bool {
        self.kind == EncodeKind::Original
    }
}

pub struct Encoder<B = RustBackend> {
    backend: B,
    options: CompressionOptions,
}

impl Encoder<RustBackend> {
    pub fn with_options(options: CompressionOptions) -> Self {
        Self::new(RustBackend::new(), options)
    }
}

impl Default for Encoder<RustBackend> {
    fn default() -> Self {
        Self::with_options(CompressionOptions::default())
    }
}

impl<B: ImageBackend> Encoder<B> {
    pub fn new(backend: B, options: CompressionOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compress one image.
    ///
    /// # Returns
    /// * `Ok(result)` - re-encoded output, or the original bytes if nothing
    ///   smaller could be produced; `result.compressed_size <= original_size`
    /// * `Err(CompressionError::Decode)` - the bytes are not a decodable image
    /// * `Err(CompressionError::Encode)` - no output buffer could be produced
    pub fn encode(&self, source: &SourceImage) -> Result<EncodeResult> {
        let original_size = source.size();
        let input_format = source.format();
        let format = input_format.output_format();

        let (surface, dimensions) = {
            let (decoded, natural) = self.backend.decode(source.data()).map_err(|e| {
                CompressionError::Decode {
                    name: source.name().to_string(),
                    reason: e.to_string(),
                }
            })?;
            let target = target_dimensions(natural, self.options.max_dimension);
            if target != natural {
                debug!(
                    "{}: downscaling {}x{} -> {}x{}",
                    source.name(),
                    natural.width,
                    natural.height,
                    target.width,
                    target.height
                );
            }
            // `decoded` moves into render and is released when it returns.
            let surface = self
                .backend
                .render(decoded, target)
                .map_err(|e| encode_error(source, e))?;
            (surface, target)
        };

        let ladder = self.options.quality_ladder(input_format.initial_quality());
        let mut best: Option<(Vec<u8>, f32)> = None;
        let mut attempts = 0;

        for quality in ladder {
            let bytes = self
                .backend
                .encode(&surface, format, quality)
                .map_err(|e| encode_error(source, e))?;
            attempts += 1;
            debug!(
                "{}: {} at quality {:.2} -> {} bytes (original {})",
                source.name(),
                format,
                quality,
                bytes.len(),
                original_size
            );

            let improves = best
                .as_ref()
                .map_or(true, |(current, _)| bytes.len() < current.len());
            if improves {
                best = Some((bytes, quality));
            }

            let smallest = best.as_ref().map_or(u64::MAX, |(b, _)| b.len() as u64);
            if smallest < original_size {
                break;
            }
        }

        let (data, quality) = match best {
            Some(best) => best,
            None => return Err(encode_error(source, "no quality levels configured")),
        };

        if data.len() as u64 > original_size {
            warn!(
                "{}: re-encoding never beat {} bytes, keeping original",
                source.name(),
                original_size
            );
            return Ok(EncodeResult::original(source));
        }

        Ok(EncodeResult {
            name: replace_extension(source.name(), format.extension()),
            mime_type: format.mime_type().to_string(),
            original_size,
            compressed_size: data.len() as u64,
            data,
            kind: EncodeKind::Reencoded {
                format,
                quality,
                dimensions,
                attempts,
            },
        })
    }
}

fn encode_error(source: &SourceImage, reason: impl ToString) -> CompressionError {
    CompressionError::Encode {
        name: source.name().to_string(),
        reason: reason.to_string(),
    }
}
