//! Packaging of encode results into something a user can save: the single
//! compressed image, or a zip archive when there are several.

use crate::constants::ARCHIVE_NAME;
use crate::encoder::EncodeResult;
use crate::error::{CompressionError, Result};
use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

/// A downloadable unit produced by the packager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Single {
        name: String,
        mime_type: String,
        data: Vec<u8>,
    },
    Archive {
        name: String,
        data: Vec<u8>,
    },
}

impl Artifact {
    pub fn name(&self) -> &str {
        match self {
            Artifact::Single { name, .. } | Artifact::Archive { name, .. } => name,
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            Artifact::Single { mime_type, .. } => mime_type,
            Artifact::Archive { .. } => ARCHIVE_MIME_TYPE,
        }
    }

    pub fn data(&self) -> &[u8] {
        match self {
            Artifact::Single { data, .. } | Artifact::Archive { data, .. } => data,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Artifact::Archive { .. })
    }

    /// Write the artifact into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))?;
        let path = dir.join(self.name());
        fs::write(&path, self.data())?;
        debug!("Saved {} ({} bytes)", path.display(), self.data().len());
        Ok(path)
    }
}

/// Turns ordered `(name, bytes)` entries into archive bytes.
pub trait ArchiveWriter {
    fn write_archive(&self, entries: &[(String, &[u8])]) -> Result<Vec<u8>>;
}

/// Deflate-compressed zip archives via the `zip` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter;

impl ArchiveWriter for ZipArchiveWriter {
    fn write_archive(&self, entries: &[(String, &[u8])]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)
                .map_err(|e| CompressionError::Archive(format!("{}: {}", name, e)))?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

/// What to do when two results derive the same output name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Later duplicates become `name-1.ext`, `name-2.ext`, ...
    #[default]
    Rename,
    /// The last result with a name replaces earlier ones
    Overwrite,
}

/// Apply `policy` to an ordered list of entry names.
///
/// Returns, for each input position, the name to use, or `None` when the
/// entry is dropped because a later one overwrites it.
pub fn resolve_entry_names(names: &[&str], policy: CollisionPolicy) -> Vec<Option<String>> {
    match policy {
        CollisionPolicy::Rename => {
            let mut used: HashSet<String> = HashSet::new();
            names
                .iter()
                .map(|name| {
                    let mut candidate = name.to_string();
                    let mut counter = 1;
                    while used.contains(&candidate) {
                        candidate = numbered_name(name, counter);
                        counter += 1;
                    }
                    if candidate != *name {
                        warn!("Duplicate entry name {}, storing as {}", name, candidate);
                    }
                    used.insert(candidate.clone());
                    Some(candidate)
                })
                .collect()
        }
        CollisionPolicy::Overwrite => names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let overwritten = names[index + 1..].contains(name);
                if overwritten {
                    warn!("Duplicate entry name {}, keeping the last one", name);
                    None
                } else {
                    Some(name.to_string())
                }
            })
            .collect(),
    }
}

/// `photo.jpg` + 2 → `photo-2.jpg`
fn numbered_name(name: &str, counter: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], counter, &name[dot..]),
        _ => format!("{}-{}", name, counter),
    }
}

pub struct Packager<W: ArchiveWriter = ZipArchiveWriter> {
    writer: W,
    policy: CollisionPolicy,
}

impl Default for Packager<ZipArchiveWriter> {
    fn default() -> Self {
        Self::new(ZipArchiveWriter)
    }
}

impl<W: ArchiveWriter> Packager<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            policy: CollisionPolicy::default(),
        }
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// One result is handed back as-is; several are zipped together in order.
    pub fn package(&self, results: &[EncodeResult]) -> Result<Artifact> {
        match results {
            [] => Err(CompressionError::NothingToPackage),
            [only] => Ok(Artifact::Single {
                name: only.name.clone(),
                mime_type: only.mime_type.clone(),
                data: only.data.clone(),
            }),
            _ => {
                let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
                let entries: Vec<(String, &[u8])> = resolve_entry_names(&names, self.policy)
                    .into_iter()
                    .zip(results)
                    .filter_map(|(name, result)| name.map(|n| (n, result.data.as_slice())))
                    .collect();

                let data = self.writer.write_archive(&entries)?;
                info!(
                    "Packaged {} images into {} ({} bytes)",
                    entries.len(),
                    ARCHIVE_NAME,
                    data.len()
                );
                Ok(Artifact::Archive {
                    name: ARCHIVE_NAME.to_string(),
                    data,
                })
            }
        }
    }
}
