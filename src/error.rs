use std::path::PathBuf;
use thiserror::Error;

/// Exit status for command-line usage errors (`EX_USAGE` from sysexits).
pub const EXIT_USAGE: i32 = 64;

/// Exit status for unrecoverable runtime failures.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum SearchfsError {
    // Configuration
    #[error("search term is empty")]
    EmptyTerm,

    #[error("search term is {len} bytes long, the maximum is {max}")]
    TermTooLong { len: usize, max: usize },

    #[error("directories-only and files-only cannot be combined")]
    ConflictingTypeFilter,

    #[error("limit must be a positive integer")]
    InvalidLimit,

    #[error("no mounted volume matches '{0}'")]
    VolumeNotFound(String),

    // Fatal
    #[error("unable to enumerate mounted volumes: {0}")]
    VolumeEnumeration(String),

    // Per-volume catalog access
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog error: {0}")]
    Catalog(String),
}

pub type Result<T> = std::result::Result<T, SearchfsError>;

impl SearchfsError {
    /// Whether this error is a configuration problem detected before any
    /// catalog access.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::EmptyTerm
                | Self::TermTooLong { .. }
                | Self::ConflictingTypeFilter
                | Self::InvalidLimit
                | Self::VolumeNotFound(_)
        )
    }

    /// Whether the run can continue after this error.
    ///
    /// Catalog errors are scoped to a single volume: that volume stops
    /// contributing results, the others carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::NotFound(_) | Self::Io { .. } | Self::Catalog(_)
        )
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Process exit status for a run that terminated with this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_usage() {
            EXIT_USAGE
        } else {
            EXIT_FAILURE
        }
    }

    /// Classify an I/O error raised while reading `path`.
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source },
        }
    }
}
