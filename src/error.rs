//! Error types for tapgen

use std::path::PathBuf;
use thiserror::Error;

/// Result type for generation operations
pub type GenResult<T> = Result<T, GenError>;

/// Errors that can occur while generating or validating a manifest
#[derive(Error, Debug)]
pub enum GenError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Repository identifier could not be parsed
    #[error("Invalid repository: {0}")]
    InvalidRepository(String),

    /// The repository has no usable release
    #[error("No releases found for {0}")]
    NoReleases(String),

    /// Every release asset was filtered out
    #[error("No eligible release asset among: {}", .candidates.join(", "))]
    NoEligibleAsset {
        /// Names of the assets that were considered
        candidates: Vec<String>,
    },

    /// No known build system in the repository root
    #[error("No supported build system detected in {0}")]
    NoBuildSystem(String),

    /// Archive suffix has no matching decompressor
    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    /// Archive could not be read
    #[error("Archive error: {0}")]
    Archive(String),

    /// Downloaded bytes do not match the upstream digest
    #[error("Checksum mismatch for {asset}:\n  Expected: {expected}\n  Actual:   {actual}")]
    ChecksumMismatch {
        /// Asset file name
        asset: String,
        /// Digest published upstream
        expected: String,
        /// Digest of the downloaded bytes
        actual: String,
    },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Manifest could not be rendered
    #[error("Render error: {0}")]
    Render(String),

    /// The external validator could not be run
    #[error("Validator error: {0}")]
    Validator(String),

    /// The manifest was written but still has violations
    #[error("Validation failed for {}:\n{diagnostics}", .path.display())]
    ValidationFailed {
        /// Path of the written manifest
        path: PathBuf,
        /// Diagnostics reported by the validator
        diagnostics: String,
    },
}
