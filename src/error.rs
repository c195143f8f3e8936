//! Error types for the routing pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Category;

/// Fatal pipeline errors: bad wiring or an unusable source directory.
/// The pipeline refuses to start on any of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A category has no destination directory. Configuration bug; checked
    /// before any thread is spawned.
    #[error("no destination directory configured for category `{0}`")]
    MissingDestination(Category),

    /// The source directory is missing or unreadable and could not be created.
    #[error("source directory {}: {}", .path.display(), .source)]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Per-file delivery failures. Isolated to the one file: the worker keeps
/// running and the source file stays in place, so the next poll rediscovers it.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The destination already has a file with this name. Overwriting is
    /// never implicit.
    #[error("{} already exists, refusing to overwrite", .dest.display())]
    Conflict { dest: PathBuf },

    /// The move itself failed (permissions, disk full, cross-device).
    /// One attempt, no automatic retry.
    #[error("move {} -> {}: {}", .src.display(), .dest.display(), .source)]
    Io {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },
}
