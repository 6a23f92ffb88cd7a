//! Error types and handling for the mailbox crate

use std::path::PathBuf;

/// Result type alias for mailbox operations
pub type Result<T> = std::result::Result<T, MailboxError>;

/// Error taxonomy of the mailbox access layer and control daemon
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    /// Device discovery walked the bus view but found no matching device
    #[error("mailbox device not found: {detail}")]
    DeviceNotFound { detail: String },

    /// A path was resolved but the handle could not be acquired
    #[error("could not open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A positioned read transferred fewer bytes than requested, or failed
    #[error("partial read at offset {offset}: {transferred}/{requested} bytes")]
    PartialRead {
        offset: usize,
        requested: usize,
        transferred: usize,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A positioned write transferred fewer bytes than requested, or failed
    #[error("partial write at offset {offset}: {transferred}/{requested} bytes")]
    PartialWrite {
        offset: usize,
        requested: usize,
        transferred: usize,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Index or slot identifier outside the fixed protocol bounds
    #[error("{what} out of range: {index} (limit {limit})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    /// The region header does not carry the protocol magic tag
    #[error("mailbox magic mismatch (found {found:02x?})")]
    MagicMismatch { found: [u8; 7] },

    /// Structural mismatch between this build and the firmware-side layout
    #[error("layout verification failed: {detail}")]
    LayoutMismatch { detail: String },

    /// The caller lacks the required elevation
    #[error("insufficient privileges: {detail}")]
    Privilege { detail: String },

    /// The platform shutdown action could not be started
    #[error("could not invoke shutdown command: {source}")]
    ShutdownFailed {
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration value or unreadable configuration file
    #[error("configuration error: {detail}")]
    Config { detail: String },

    /// Platform call failure outside the device I/O path (fork, signals)
    #[error("platform error: {detail}")]
    Platform { detail: String },
}

impl MailboxError {
    /// Create a device-not-found error
    pub fn device_not_found(detail: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            detail: detail.into(),
        }
    }

    /// Create an open-failed error from the underlying I/O error
    pub fn open_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an out-of-range error
    pub fn out_of_range(what: &'static str, index: usize, limit: usize) -> Self {
        Self::OutOfRange { what, index, limit }
    }

    /// Create a layout-mismatch error
    pub fn layout_mismatch(detail: impl Into<String>) -> Self {
        Self::LayoutMismatch {
            detail: detail.into(),
        }
    }

    /// Create a privilege error
    pub fn privilege(detail: impl Into<String>) -> Self {
        Self::Privilege {
            detail: detail.into(),
        }
    }

    /// Create a configuration error
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Create a platform error
    pub fn platform(detail: impl Into<String>) -> Self {
        Self::Platform {
            detail: detail.into(),
        }
    }
}
