//! Error types for container decoding
//!
//! Provides error handling for:
//! - Archive access (open, entry lookup, entry reads)
//! - Stack description parsing
//! - Per-layer image decoding
//! - UUID lookups on a loaded container

use std::path::PathBuf;
use zip::result::ZipError;

/// Errors while turning the stack description into a markup tree
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Markup is not well formed
    #[error("malformed markup: {0}")]
    Markup(#[from] roxmltree::Error),

    /// Descriptor bytes are not UTF-8
    #[error("descriptor is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Document root wraps no element
    #[error("document root has no top-level stack element")]
    MissingRootStack,

    /// Elements nest deeper than the configured limit
    #[error("stack description nests deeper than {max} elements")]
    TooDeep {
        /// Limit that was exceeded
        max: usize,
    },
}

/// Main error type for loading and querying a container
#[derive(Debug, thiserror::Error)]
pub enum OraError {
    /// Archive is malformed or unreadable
    #[error("failed to open container archive: {0}")]
    ContainerOpen(#[source] ZipError),

    /// Archive has no stack description entry
    #[error("stack description '{name}' not found in container")]
    DescriptorNotFound {
        /// Entry name that was looked up
        name: String,
    },

    /// Stack description could not be parsed
    #[error("failed to parse stack description: {0}")]
    ParseFailure(#[from] ParseError),

    /// Layer source names no archive entry
    #[error("image entry not found: {path}")]
    EntryNotFound {
        /// The `src` value of the layer
        path: String,
    },

    /// Archive entry exists but could not be read
    #[error("failed to read entry {path}: {source}")]
    EntryRead {
        /// Entry name
        path: String,
        #[source]
        source: ZipError,
    },

    /// Entry bytes are not a valid image for the bundled codec
    #[error("failed to decode image {path}: {source}")]
    DecodeFailure {
        /// Entry name
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// No item registered under the UUID
    #[error("item with UUID {uuid} not found")]
    NotFound {
        /// UUID that was looked up
        uuid: String,
    },

    /// `load` was called on a container that was already loaded
    #[error("container already loaded; use a new container per archive")]
    AlreadyLoaded,

    /// Worker pool could not be started
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// IO error opening a container file
    #[error("io error opening {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OraError {
    /// Create entry-not-found error for a layer source
    pub fn entry_not_found(path: impl Into<String>) -> Self {
        Self::EntryNotFound { path: path.into() }
    }

    /// Create entry read error
    pub fn entry_read(path: impl Into<String>, source: impl Into<ZipError>) -> Self {
        Self::EntryRead {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create decode error for an entry
    pub fn decode_failure(path: impl Into<String>, source: image::ImageError) -> Self {
        Self::DecodeFailure {
            path: path.into(),
            source,
        }
    }

    /// Create lookup miss error
    pub fn not_found(uuid: impl Into<String>) -> Self {
        Self::NotFound { uuid: uuid.into() }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for container operations
pub type OraResult<T> = Result<T, OraError>;
