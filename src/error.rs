//! Error taxonomy for the workshop harness.
//!
//! Every variant is terminal: the harness is a one-shot developer tool, so
//! `main` prints the error and exits with a non-zero status. No retries, no
//! partial-success state.

use std::path::PathBuf;

use thiserror::Error;

/// A specialized `Result` type for workshop operations.
pub type Result<T, E = WorkshopError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkshopError {
    /// A build subprocess exited non-zero (or produced no usable artifact).
    #[error("failed to build '{name}':\n{details}")]
    Build { name: String, details: String },

    /// The settings file does not exist at the expected location.
    #[error("could not find workshop settings at '{}'", path.display())]
    MissingSettings { path: PathBuf },

    /// The settings file exists but could not be parsed or failed validation.
    #[error("invalid workshop settings: {source}")]
    InvalidSettings {
        #[source]
        source: serde_json::Error,
    },

    /// A built artifact could not be loaded as a dynamic library.
    #[error(
        "could not load implementation from '{}': {source}\n\
         Ensure both implementations were built for the current platform.",
        artifact.display()
    )]
    Import {
        artifact: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The artifact loaded but does not export the `implementation` symbol.
    #[error(
        "no `implementation` entry point in '{}': {source}\n\
         The implementation crate must export a `#[no_mangle] pub extern \"C\"` \
         function named `implementation`.",
        artifact.display()
    )]
    EntryPoint {
        artifact: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The reference result failed to compare equal to itself. This is a
    /// defect in the user-supplied `compare_results`, not in either
    /// implementation.
    #[error(
        "the reference result does not match itself; check your \
         `compare_results` implementation (reference result: {result})"
    )]
    SelfComparison { result: String },

    /// The accelerated implementation produced a different result than the
    /// reference implementation for the same workload.
    #[error(
        "results do not match\n  reference result: {reference}\naccelerated result: {accelerated}"
    )]
    ResultMismatch {
        reference: String,
        accelerated: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
