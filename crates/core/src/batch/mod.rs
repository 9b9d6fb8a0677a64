//! Batch orchestration.
//!
//! A batch is every file of one request converted to one target format.
//! Files are planned up front, converted one at a time in upload order, and
//! the batch succeeds or fails as a whole. A successful batch is delivered
//! as the single output file, or as `converted_files.zip` when there is
//! more than one output.

mod archive;
mod config;
mod error;
pub mod naming;
mod orchestrator;
mod types;

pub use archive::{archive_entry_names, build_archive, ARCHIVE_NAME};
pub use config::LimitsConfig;
pub use error::BatchError;
pub use orchestrator::BatchOrchestrator;
pub use types::{BatchResult, ConversionRequest, Delivery, PreparedDelivery, UploadedFile};
