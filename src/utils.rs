/// Utility functions for common operations
///
/// This module contains helper functions that are used across multiple modules
/// to reduce code duplication and improve maintainability.
use crate::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, PROGRESS_BAR_CHARS, PROGRESS_BAR_TEMPLATE,
    SUCCESS_PREFIX, SUPPORTED_IMAGE_EXTENSIONS,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Check if a file path represents a supported image file
///
/// # Arguments
/// * `path` - The file path to check
///
/// # Returns
/// * `true` if the file has a supported image extension, `false` otherwise
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// Replace the extension of a file name, or append one if there is none.
///
/// `new_ext` includes the leading dot. Only the last extension is replaced,
/// so applying this twice never stacks extensions.
pub fn replace_extension(filename: &str, new_ext: &str) -> String {
    match filename.rfind('.') {
        Some(dot) => format!("{}{}", &filename[..dot], new_ext),
        None => format!("{}{}", filename, new_ext),
    }
}

/// Create a batch progress bar with consistent styling
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_BAR_CHARS);
    pb.set_style(style);
    pb
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 KB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate compression ratio as a percentage
///
/// # Returns
/// * Compression ratio as percentage (positive means reduction, negative means increase)
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

/// Whole-number savings, clamped at zero, as shown in batch statistics
pub fn savings_percent(original_size: u64, compressed_size: u64) -> u64 {
    calculate_compression_ratio(original_size, compressed_size)
        .round()
        .max(0.0) as u64
}

/// Print compression result with formatted output
pub fn print_compression_result(original_size: u64, compressed_size: u64) {
    let ratio = calculate_compression_ratio(original_size, compressed_size);

    crate::info!(
        "{} {} ({})",
        COMPRESSED_SIZE_PREFIX,
        compressed_size,
        format_file_size(compressed_size)
    );
    crate::info!("{} {:.1}%", COMPRESSION_RATIO_PREFIX, ratio);

    if ratio > 0.0 {
        crate::info!("{} Successfully reduced file size by {:.1}%", SUCCESS_PREFIX, ratio);
    } else {
        crate::info!("{} Already optimal, original kept", SUCCESS_PREFIX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.JPEG")));
        assert!(is_image_file(Path::new("test.png")));
        assert!(is_image_file(Path::new("test.webp")));
        assert!(is_image_file(Path::new("test.avif")));
        assert!(is_image_file(Path::new("test.tif")));
        assert!(is_image_file(Path::new("test.tiff")));

        assert!(!is_image_file(Path::new("test.gif")));
        assert!(!is_image_file(Path::new("test.txt")));
        assert!(!is_image_file(Path::new("test")));
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("photo.png", ".jpg"), "photo.jpg");
        assert_eq!(replace_extension("photo.tar.png", ".jpg"), "photo.tar.jpg");
        assert_eq!(replace_extension("photo", ".webp"), "photo.webp");
        assert_eq!(replace_extension("photo.jpg", ".jpg"), "photo.jpg");
    }

    #[test]
    fn test_replace_extension_twice() {
        let once = replace_extension("scan.tiff", ".webp");
        let twice = replace_extension(&once, ".jpg");
        assert_eq!(twice, "scan.jpg");

        let once = replace_extension("noext", ".jpg");
        assert_eq!(replace_extension(&once, ".jpg"), "noext.jpg");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_calculate_compression_ratio() {
        assert_eq!(calculate_compression_ratio(1000, 800), 20.0);
        assert_eq!(calculate_compression_ratio(1000, 1200), -20.0);
        assert_eq!(calculate_compression_ratio(1000, 1000), 0.0);
        assert_eq!(calculate_compression_ratio(0, 500), 0.0);
    }

    #[test]
    fn test_savings_percent() {
        assert_eq!(savings_percent(1000, 333), 67);
        assert_eq!(savings_percent(1000, 1000), 0);
        assert_eq!(savings_percent(1000, 1500), 0);
        assert_eq!(savings_percent(0, 0), 0);
    }
}
