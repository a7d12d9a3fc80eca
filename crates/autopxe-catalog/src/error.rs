//! Error types for catalog scanning
//!
//! None of these escape [`crate::scan_rootfs`]: each one is logged at the
//! directory where it happened and that branch of the tree is skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Directory could not be opened or listed
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A boot file matched a known stem but not its version grammar
    #[error("unparseable boot file name: {0}")]
    BadBootFileName(String),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
