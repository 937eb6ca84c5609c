/// Image format utilities and type-safe format handling
///
/// Input formats are identified from the declared mime type (or, at intake,
/// from the file extension). Output formats are limited to the two lossy
/// re-encoding targets.
use crate::constants::{JPEG_QUALITY, PNG_TO_JPEG_QUALITY, WEBP_QUALITY};
use std::fmt;

/// Declared format of a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Jpeg,
    Png,
    WebP,
    Avif,
    Tiff,
    /// Anything else; treated like JPEG when picking an output format
    Other,
}

impl InputFormat {
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => InputFormat::Jpeg,
            "image/png" => InputFormat::Png,
            "image/webp" => InputFormat::WebP,
            "image/avif" => InputFormat::Avif,
            "image/tiff" => InputFormat::Tiff,
            _ => InputFormat::Other,
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(InputFormat::Jpeg),
            "png" => Some(InputFormat::Png),
            "webp" => Some(InputFormat::WebP),
            "avif" => Some(InputFormat::Avif),
            "tif" | "tiff" => Some(InputFormat::Tiff),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            InputFormat::Jpeg => "image/jpeg",
            InputFormat::Png => "image/png",
            InputFormat::WebP => "image/webp",
            InputFormat::Avif => "image/avif",
            InputFormat::Tiff => "image/tiff",
            InputFormat::Other => "application/octet-stream",
        }
    }

    /// Re-encoding target for this input.
    ///
    /// PNG goes to JPEG because a raster surface re-encoded as PNG rarely
    /// shrinks; WebP stays WebP; everything else is normalized to JPEG.
    pub fn output_format(&self) -> OutputFormat {
        match self {
            InputFormat::WebP => OutputFormat::WebP,
            _ => OutputFormat::Jpeg,
        }
    }

    /// First quality tried before the retry ladder kicks in
    pub fn initial_quality(&self) -> f32 {
        match self {
            InputFormat::Png => PNG_TO_JPEG_QUALITY,
            InputFormat::WebP => WEBP_QUALITY,
            _ => JPEG_QUALITY,
        }
    }
}

/// Supported output image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG format with lossy compression
    Jpeg,
    /// WebP format with lossy compression
    WebP,
}

impl OutputFormat {
    /// Returns the file extension for this format, including the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => ".jpg",
            OutputFormat::WebP => ".webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}
