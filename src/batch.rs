use crate::backend::ImageBackend;
use crate::constants::GENERIC_FAILURE_MESSAGE;
use crate::encoder::{EncodeResult, Encoder};
use crate::queue::{ItemId, ItemStatus, QueueItem, SourceImage};
use crate::utils::savings_percent;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cloneable flag used to ask a running batch to stop before its next item.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// State changes published while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    ItemStarted {
        id: ItemId,
        index: usize,
        name: String,
    },
    ItemFinished {
        id: ItemId,
        index: usize,
        name: String,
        status: ItemStatus,
    },
    Progress {
        completed: usize,
        total: usize,
        percent: u8,
    },
    Stopped {
        completed: usize,
        remaining: usize,
    },
}

/// Byte totals across every item of a batch.
///
/// Failed and untouched items count with their original size on both sides,
/// so failures never inflate the savings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl BatchTotals {
    pub fn from_items(items: &[QueueItem]) -> Self {
        items.iter().fold(Self::default(), |totals, item| Self {
            original_bytes: totals.original_bytes + item.original_size(),
            compressed_bytes: totals.compressed_bytes + item.effective_size(),
        })
    }

    pub fn saved_bytes(&self) -> u64 {
        self.original_bytes.saturating_sub(self.compressed_bytes)
    }

    pub fn savings_percent(&self) -> u64 {
        savings_percent(self.original_bytes, self.compressed_bytes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedItem {
    pub id: ItemId,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every attempted item succeeded
    Complete,
    /// Some succeeded, some failed
    Partial,
    /// Items were attempted and none succeeded
    TotalFailure,
    /// Nothing was attempted
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successful results, in input order
    pub results: Vec<EncodeResult>,
    pub failures: Vec<FailedItem>,
    pub totals: BatchTotals,
    pub stopped: bool,
    pub elapsed: Duration,
}

impl BatchOutcome {
    pub fn success_count(&self) -> usize {
        self.results.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn attempted(&self) -> usize {
        self.success_count() + self.failure_count()
    }

    pub fn status(&self) -> BatchStatus {
        match (self.success_count(), self.failure_count()) {
            (0, 0) => BatchStatus::Empty,
            (0, _) => BatchStatus::TotalFailure,
            (_, 0) => BatchStatus::Complete,
            _ => BatchStatus::Partial,
        }
    }

    pub fn summary_message(&self) -> String {
        match self.status() {
            BatchStatus::Complete => "All images compressed successfully!".to_string(),
            BatchStatus::Partial => format!(
                "{} of {} images compressed. Some failed.",
                self.success_count(),
                self.attempted()
            ),
            BatchStatus::TotalFailure => "All compressions failed. Please try again.".to_string(),
            BatchStatus::Empty => "No images to compress.".to_string(),
        }
    }
}

/// round(100 × completed / total)
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((completed as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Drives the encoder over a batch, one item at a time, in order.
pub struct BatchOrchestrator<'a, B: ImageBackend> {
    encoder: &'a Encoder<B>,
    stop: StopHandle,
}

impl<'a, B: ImageBackend> BatchOrchestrator<'a, B> {
    pub fn new(encoder: &'a Encoder<B>) -> Self {
        Self {
            encoder,
            stop: StopHandle::new(),
        }
    }

    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Compress every pending item of `items`.
    ///
    /// Items that are not `Pending` are left untouched but still count in the
    /// totals. A failing item is marked `Error` and the batch moves on. After
    /// each item the observer gets a `Progress` event and the task yields to
    /// the runtime before the next item starts.
    pub async fn run<F>(&self, items: &mut [QueueItem], mut observer: F) -> BatchOutcome
    where
        F: FnMut(&BatchEvent),
    {
        let start_time = Instant::now();
        let pending: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| *item.status() == ItemStatus::Pending)
            .map(|(index, _)| index)
            .collect();
        let total = pending.len();
        let mut outcome = BatchOutcome::default();
        let mut completed = 0;

        info!("Starting batch of {} images", total);

        for index in pending {
            if self.stop.is_stop_requested() {
                warn!(
                    "Stop requested, leaving {} images unprocessed",
                    total - completed
                );
                outcome.stopped = true;
                observer(&BatchEvent::Stopped {
                    completed,
                    remaining: total - completed,
                });
                break;
            }

            let item = &mut items[index];
            if let Err(e) = item.start() {
                warn!("Skipping {}: {}", item.name(), e);
                continue;
            }
            observer(&BatchEvent::ItemStarted {
                id: item.id(),
                index,
                name: item.name().to_string(),
            });

            let transition = match self.encode_contained(item.source()) {
                Ok(result) => {
                    debug!(
                        "{} done: {} -> {} bytes",
                        item.name(),
                        result.original_size,
                        result.compressed_size
                    );
                    let transition = item.finish(result.compressed_size);
                    outcome.results.push(result);
                    transition
                }
                Err(message) => {
                    warn!("{} failed: {}", item.name(), message);
                    outcome.failures.push(FailedItem {
                        id: item.id(),
                        name: item.name().to_string(),
                        message: message.clone(),
                    });
                    item.fail(message)
                }
            };
            if let Err(e) = transition {
                warn!("{}", e);
            }

            observer(&BatchEvent::ItemFinished {
                id: item.id(),
                index,
                name: item.name().to_string(),
                status: item.status().clone(),
            });

            completed += 1;
            observer(&BatchEvent::Progress {
                completed,
                total,
                percent: progress_percent(completed, total),
            });

            tokio::task::yield_now().await;
        }

        outcome.totals = BatchTotals::from_items(items);
        outcome.elapsed = start_time.elapsed();

        info!(
            "Batch finished: {} succeeded, {} failed in {:?}",
            outcome.success_count(),
            outcome.failure_count(),
            outcome.elapsed
        );

        outcome
    }

    /// Run the encoder with every failure, panics included, turned into a message.
    fn encode_contained(&self, source: &SourceImage) -> std::result::Result<EncodeResult, String> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.encoder.encode(source))) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => {
                if !err.is_per_item() {
                    warn!("Unexpected error kind for {}: {:?}", source.name(), err);
                }
                Err(failure_message(&err.to_string()))
            }
            Err(payload) => {
                warn!("Encoder panicked on {}", source.name());
                Err(failure_message(&panic_text(payload.as_ref())))
            }
        }
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default()
}

fn failure_message(text: &str) -> String {
    if text.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        text.to_string()
    }
}
