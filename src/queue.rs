//! Batch data model: source images, queue items and their status lifecycle.

use crate::constants::MAX_BATCH_FILES;
use crate::error::{CompressionError, Result};
use crate::formats::InputFormat;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// An input image as handed over by the caller. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn format(&self) -> InputFormat {
        InputFormat::from_mime(&self.mime_type)
    }
}

/// Stable identity of a queue item, unique for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        ItemId(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Compressing,
    Done { compressed_size: u64 },
    Error { message: String },
}

impl ItemStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Compressing => "compressing",
            ItemStatus::Done { .. } => "done",
            ItemStatus::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Done { .. } | ItemStatus::Error { .. })
    }
}

/// A source image plus its processing state within one batch.
#[derive(Debug, Clone)]
pub struct QueueItem {
    id: ItemId,
    source: SourceImage,
    status: ItemStatus,
}

impl QueueItem {
    pub fn new(source: SourceImage) -> Self {
        Self {
            id: ItemId::next(),
            source,
            status: ItemStatus::Pending,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn status(&self) -> &ItemStatus {
        &self.status
    }

    pub fn original_size(&self) -> u64 {
        self.source.size()
    }

    /// Set only once the item is `Done`.
    pub fn compressed_size(&self) -> Option<u64> {
        match self.status {
            ItemStatus::Done { compressed_size } => Some(compressed_size),
            _ => None,
        }
    }

    /// Set only once the item is `Error`.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Size counted in the "after" total: compressed if done, else original.
    pub fn effective_size(&self) -> u64 {
        self.compressed_size().unwrap_or_else(|| self.original_size())
    }

    pub fn start(&mut self) -> Result<()> {
        match self.status {
            ItemStatus::Pending => {
                self.status = ItemStatus::Compressing;
                Ok(())
            }
            _ => Err(self.invalid_transition("compressing")),
        }
    }

    pub fn finish(&mut self, compressed_size: u64) -> Result<()> {
        match self.status {
            ItemStatus::Compressing => {
                self.status = ItemStatus::Done { compressed_size };
                Ok(())
            }
            _ => Err(self.invalid_transition("done")),
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        match self.status {
            ItemStatus::Compressing => {
                self.status = ItemStatus::Error {
                    message: message.into(),
                };
                Ok(())
            }
            _ => Err(self.invalid_transition("error")),
        }
    }

    fn invalid_transition(&self, to: &'static str) -> CompressionError {
        CompressionError::InvalidTransition {
            id: self.id.to_string(),
            from: self.status.label(),
            to,
        }
    }
}

/// Result of adding files to a queue that has a file cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub added: Vec<ItemId>,
    /// Names of images turned away because the queue was full
    pub rejected: Vec<String>,
}

/// Ordered list of queue items with a maximum size.
#[derive(Debug, Clone)]
pub struct BatchQueue {
    items: Vec<QueueItem>,
    max_files: usize,
}

impl Default for BatchQueue {
    fn default() -> Self {
        Self::new(MAX_BATCH_FILES)
    }
}

impl BatchQueue {
    pub fn new(max_files: usize) -> Self {
        Self {
            items: Vec::new(),
            max_files,
        }
    }

    /// Append images in order until the queue is full; the rest are rejected.
    pub fn add_all(&mut self, sources: impl IntoIterator<Item = SourceImage>) -> AddReport {
        let mut report = AddReport::default();
        for source in sources {
            if self.items.len() >= self.max_files {
                report.rejected.push(source.name().to_string());
                continue;
            }
            let item = QueueItem::new(source);
            report.added.push(item.id());
            self.items.push(item);
        }
        report
    }

    pub fn remove(&mut self, id: ItemId) -> Option<QueueItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [QueueItem] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }
}
