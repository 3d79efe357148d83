//! Error types for the map core.
//!
//! Caller misuse and persistence failures surface as [`MapError`] results.
//! Runtime invariant violations are deliberately *not* errors: they go to
//! the tracing diagnostics channel and execution continues on a documented
//! fallback path (see the relevant `Map` methods).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the map core's call boundary.
#[derive(Debug, Error)]
pub enum MapError {
    /// The map file could not be opened, created, or read.
    #[error("cannot access map file {path}")]
    File {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },

    /// The map document failed to encode or decode.
    #[error("malformed map document")]
    Document(#[from] serde_json::Error),

    /// A dynamic entity node names a type tag the registry does not know.
    #[error("unknown dynamic entity type `{0}`")]
    UnknownActorTag(String),

    /// A map file name is not `<positive integer>` + the map suffix.
    #[error("invalid map file name `{0}`")]
    InvalidFileName(String),
}
