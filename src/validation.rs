use crate::constants::{MAX_BATCH_FILES, MAX_FILE_SIZE};
use crate::error::{CompressionError, Result};
use crate::formats::InputFormat;
use crate::queue::SourceImage;
use crate::utils::is_image_file;
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Per-file and per-batch caps applied when files are taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_files: MAX_BATCH_FILES,
        }
    }
}

/// Files accepted into a batch, and the ones turned away.
#[derive(Debug, Clone, Default)]
pub struct IntakeReport {
    pub accepted: Vec<SourceImage>,
    /// Names of files over the size limit
    pub oversized: Vec<String>,
    /// Names of files whose type is not accepted
    pub unsupported: Vec<String>,
    /// Names of acceptable files left out because the batch was full
    pub dropped: Vec<String>,
    pub max_files: usize,
}

impl IntakeReport {
    /// "Only X of Y files added (max N)" when the file cap was hit.
    pub fn limit_message(&self) -> Option<String> {
        if self.dropped.is_empty() {
            return None;
        }
        Some(format!(
            "Only {} of {} files added (max {})",
            self.accepted.len(),
            self.accepted.len() + self.dropped.len(),
            self.max_files
        ))
    }

    /// "Skipped files over 50 MB: a.png, b.png" when any file was too large.
    pub fn oversized_message(&self, limits: &IntakeLimits) -> Option<String> {
        if self.oversized.is_empty() {
            return None;
        }
        Some(format!(
            "Skipped files over {} MB: {}",
            limits.max_file_size / (1024 * 1024),
            self.oversized.join(", ")
        ))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Check that `path` is an existing regular file.
pub fn validate_input_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(CompressionError::UnsupportedFormat(format!(
            "{} is not a file",
            path.display()
        )));
    }
    Ok(())
}

/// Accepted input type of `path`, judged by its extension.
pub fn input_format_of(path: &Path) -> Result<InputFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(InputFormat::from_extension)
        .ok_or_else(|| CompressionError::UnsupportedFormat(display_name(path)))
}

/// Run every intake check short of reading the file.
fn check_candidate(path: &Path, limits: &IntakeLimits) -> Result<InputFormat> {
    validate_input_path(path)?;
    let format = input_format_of(path)?;
    let size = fs::metadata(path)?.len();
    if size > limits.max_file_size {
        return Err(CompressionError::FileTooLarge {
            name: display_name(path),
            size,
            max: limits.max_file_size,
        });
    }
    Ok(format)
}

/// Read one file into a [`SourceImage`], mime type taken from its extension.
pub fn load_source_image(path: &Path, limits: &IntakeLimits) -> Result<SourceImage> {
    let format = check_candidate(path, limits)?;
    let data = fs::read(path)?;
    Ok(SourceImage::new(display_name(path), format.mime_type(), data))
}

/// Load `paths` in order, skipping oversized and unsupported files and
/// stopping at the batch file cap.
pub fn intake(paths: &[PathBuf], limits: &IntakeLimits) -> Result<IntakeReport> {
    let mut report = IntakeReport {
        max_files: limits.max_files,
        ..IntakeReport::default()
    };

    for path in paths {
        match check_candidate(path, limits) {
            Ok(format) => {
                if report.accepted.len() >= limits.max_files {
                    report.dropped.push(display_name(path));
                    continue;
                }
                let data = fs::read(path)?;
                debug!("Accepted {} ({} bytes)", path.display(), data.len());
                report
                    .accepted
                    .push(SourceImage::new(display_name(path), format.mime_type(), data));
            }
            Err(CompressionError::FileTooLarge { name, size, .. }) => {
                warn!("Skipping {}: {} bytes is over the size limit", name, size);
                report.oversized.push(name);
            }
            Err(CompressionError::UnsupportedFormat(_)) => {
                debug!("Skipping unsupported file {}", path.display());
                report.unsupported.push(display_name(path));
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(message) = report.limit_message() {
        warn!("{}", message);
    }
    Ok(report)
}

/// Expand a file, directory or glob pattern into the image files it names.
///
/// Directory walks skip hidden entries and descend only with `recursive`.
/// Results are sorted by file name within each directory.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = WalkDir::new(input_path).sort_by_file_name();
        let walker = if recursive { walker } else { walker.max_depth(1) };

        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    } else {
        return Err(CompressionError::NoImageFilesFound(input.to_string()));
    }

    if image_files.is_empty() {
        return Err(CompressionError::NoImageFilesFound(input.to_string()));
    }
    Ok(image_files)
}
