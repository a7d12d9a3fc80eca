//! Error types for the request pipeline
//!
//! Routing itself never fails: unreadable directories and missing files
//! only shrink the menu or leave a request unhandled. These errors cover
//! startup (config, bootloader images) and writing the response.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for pipeline operations
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for [`crate::PipelineConfig`]
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// iPXE binary could not be loaded
    #[error("failed to load bootloader image {path}: {source}")]
    BootloaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the response to the sink failed
    #[error("response transfer failed: {0}")]
    Transfer(#[source] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::BootloaderLoad {
            path: PathBuf::from("/srv/ipxe.efi"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "failed to load bootloader image /srv/ipxe.efi: not found"
        );

        let err = PipelineError::Transfer(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "closed",
        ));
        assert!(err.to_string().contains("transfer failed"));
    }
}
