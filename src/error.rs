use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load image: {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("Failed to encode image: {name}: {reason}")]
    Encode { name: String, reason: String },

    #[error("Failed to create archive: {0}")]
    Archive(String),

    #[error("Nothing to package: no image was compressed")]
    NothingToPackage,

    #[error("Invalid quality value: {0}. Must be between 0 (exclusive) and 1")]
    InvalidQuality(f32),

    #[error("Invalid maximum dimension: {0}. Must be greater than zero")]
    InvalidDimension(u32),

    #[error("File too large: {name} is {size} bytes. Maximum allowed: {max} bytes")]
    FileTooLarge { name: String, size: u64, max: u64 },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: &'static str,
        to: &'static str,
    },
}

impl CompressionError {
    /// Errors that belong to a single image and must not abort a batch.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            CompressionError::Decode { .. } | CompressionError::Encode { .. }
        )
    }
}

impl From<zip::result::ZipError> for CompressionError {
    fn from(err: zip::result::ZipError) -> Self {
        CompressionError::Archive(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_item_classification() {
        let decode = CompressionError::Decode {
            name: "a.png".to_string(),
            reason: "bad header".to_string(),
        };
        let encode = CompressionError::Encode {
            name: "a.png".to_string(),
            reason: "empty surface".to_string(),
        };
        assert!(decode.is_per_item());
        assert!(encode.is_per_item());
        assert!(!CompressionError::Archive("boom".to_string()).is_per_item());
        assert!(!CompressionError::NothingToPackage.is_per_item());
    }

    #[test]
    fn test_decode_message_names_the_file() {
        let err = CompressionError::Decode {
            name: "broken.jpg".to_string(),
            reason: "unexpected end of file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load image: broken.jpg: unexpected end of file"
        );
    }

    #[test]
    fn test_zip_error_becomes_archive_error() {
        let err: CompressionError =
            zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, CompressionError::Archive(_)));
    }
}
