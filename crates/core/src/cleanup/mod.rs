//! Cleanup of uploaded inputs and generated artifacts.
//!
//! Every file a request creates is deleted once the response is delivered
//! or the request fails. Deletion failures are logged and counted, never
//! propagated, so they cannot replace the result already decided for the
//! caller.
//!
//! - [`CleanupManager::release`] deletes a request's outputs and sources.
//! - [`CleanupGuard`] owns those paths for the life of a request and
//!   releases them on drop if nobody released them explicitly.
//! - [`TempArtifact`] does the same for a single intermediate file.

mod guard;
mod manager;

pub use guard::{CleanupGuard, TempArtifact};
pub use manager::{CleanupManager, CleanupReport};
