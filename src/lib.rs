//! Size-safe image compression.
//!
//! An [`Encoder`] re-encodes one image as JPEG or WebP with a descending
//! quality ladder and never returns something larger than its input. The
//! [`BatchOrchestrator`] drives it over a queue, one image at a time, and the
//! [`Packager`] turns the results into a single file or a zip archive.

pub mod logger;

pub mod backend;
pub mod batch;
pub mod cli;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod formats;
pub mod packager;
pub mod queue;
pub mod utils;
pub mod validation;

pub use backend::{BackendError, Dimensions, ImageBackend, RustBackend};
pub use batch::{BatchEvent, BatchOrchestrator, BatchOutcome, BatchStatus, BatchTotals, StopHandle};
pub use encoder::{target_dimensions, CompressionOptions, EncodeKind, EncodeResult, Encoder};
pub use error::{CompressionError, Result};
pub use formats::{InputFormat, OutputFormat};
pub use packager::{Artifact, ArchiveWriter, CollisionPolicy, Packager, ZipArchiveWriter};
pub use queue::{BatchQueue, ItemId, ItemStatus, QueueItem, SourceImage};
pub use validation::{collect_image_files, intake, load_source_image, IntakeLimits, IntakeReport};
