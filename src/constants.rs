/// Longest edge, in pixels, an image may keep before it is downscaled.
pub const MAX_DIMENSION: u32 = 4096;

pub const PNG_TO_JPEG_QUALITY: f32 = 0.85;
pub const WEBP_QUALITY: f32 = 0.85;
pub const JPEG_QUALITY: f32 = 0.80;
pub const DEFAULT_RETRY_QUALITIES: [f32; 2] = [0.70, 0.55];

pub const MIN_QUALITY_PERCENT: u8 = 1;
pub const MAX_QUALITY_PERCENT: u8 = 100;

pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub const MAX_BATCH_FILES: usize = 50;

pub const ARCHIVE_NAME: &str = "compressed-images.zip";
pub const DEFAULT_OUTPUT_DIR: &str = "compressed";
pub const GENERIC_FAILURE_MESSAGE: &str = "Compression failed";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif", "tif", "tiff"];

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";
pub const PROGRESS_BAR_CHARS: &str = "=> ";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const INFO_PREFIX: &str = "📋";
