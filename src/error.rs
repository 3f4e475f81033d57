//! Domain-specific error types for the sync engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`BundleError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! OpsyncError
//! ├── Config(ConfigError)       discovery, parsing, target resolution
//! ├── Bundle(BundleError)       staging and archiving
//! ├── Restore(RestoreError)     payload decoding and manifest re-placement
//! └── Transport(TransportError) the remote secret-store collaborator
//! ```
//!
//! Recoverable conditions (an unknown preset name, a missing include or
//! preset source file, a manifest entry absent from an extracted archive)
//! are *not* error variants: collection and restore warn and continue.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the sync engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum OpsyncError {
    /// Configuration-related error (discovery, parsing, resolution).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bundle build error (staging, archiving).
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Bundle restore error (decoding, extraction, manifest handling).
    #[error("Restore error: {0}")]
    Restore(#[from] RestoreError),

    /// Secret-store transport error.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors that arise from sync-specification loading and target resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No sync specification file could be discovered.
    #[error("no sync specification found (searched project and home locations)")]
    NotFound,

    /// The specification file exists but is not valid JSON(C).
    #[error("invalid sync specification in {file}: {message}")]
    Parse {
        /// Path of the file that failed to parse.
        file: String,
        /// Parser diagnostic.
        message: String,
    },

    /// An I/O error occurred while reading a specification file.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The requested target name is not declared in the specification.
    #[error("unknown target '{0}'")]
    UnknownTarget(String),
}

/// Errors that arise while building a bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    /// The external archiver exited non-zero.
    #[error("archiver failed: {message}")]
    Archive {
        /// Diagnostic output from the archiver (stderr, exit status).
        message: String,
    },

    /// A file could not be staged into the bundle directory.
    #[error("failed to stage {path}: {source}")]
    Staging {
        /// Destination path inside the staging tree.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The bundle manifest could not be written.
    #[error("failed to write manifest: {0}")]
    Manifest(#[source] std::io::Error),
}

/// Errors that arise while restoring a bundle.
#[derive(Error, Debug)]
pub enum RestoreError {
    /// The transported payload is not valid base64.
    #[error("payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The archive could not be extracted.
    #[error("failed to extract archive: {message}")]
    Extract {
        /// Diagnostic output from the archiver.
        message: String,
    },

    /// The extracted archive contains no manifest, so the bundle is malformed.
    #[error("malformed bundle: no manifest found after extraction")]
    MissingManifest,

    /// The manifest exists but cannot be parsed.
    #[error("malformed bundle manifest: {0}")]
    ManifestParse(String),

    /// A file could not be placed at its destination.
    #[error("failed to restore {path}: {source}")]
    Place {
        /// Destination path the file was meant to land at.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors from the remote secret-store collaborator.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The store rejected the write (authentication, missing environment, …).
    #[error("secret store rejected the write: {message}")]
    StoreRejected {
        /// Diagnostic string returned by the collaborator.
        message: String,
    },

    /// The store client is not available on this system.
    #[error("secret store client '{client}' not found on PATH")]
    Unavailable {
        /// Name of the missing client program.
        client: String,
    },
}
