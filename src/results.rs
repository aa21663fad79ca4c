use std::path::PathBuf;
use std::time::Duration;

use crate::entry::Volume;
use crate::error::SearchfsError;

/// One item of a running search, in emission order.
#[derive(Debug)]
pub enum SearchEvent {
    /// An accepted path.
    Match(PathBuf),

    /// A volume's catalog failed; it contributes nothing further.
    VolumeFailed {
        volume: Volume,
        error: SearchfsError,
    },
}

impl SearchEvent {
    /// The matched path, if this is a match.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Match(p) => Some(p),
            Self::VolumeFailed { .. } => None,
        }
    }
}

/// Counters for a search, complete once the stream is exhausted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanStats {
    /// Catalog entries examined across all volumes (matched or not).
    pub entries: usize,

    /// Paths emitted.
    pub matches: usize,

    /// Volumes whose scans ran to the end.
    pub volumes_completed: usize,

    /// Volumes whose catalog failed.
    pub volumes_failed: usize,

    /// Wall-clock time from search start to completion (or to now, while
    /// the stream is still live).
    pub duration: Duration,

    /// `entries / duration`, 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(
        entries: usize,
        matches: usize,
        volumes_completed: usize,
        volumes_failed: usize,
        duration: Duration,
    ) -> Self {
        let eps = if duration.as_secs_f64() > 0.0 {
            (entries as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            entries,
            matches,
            volumes_completed,
            volumes_failed,
            duration,
            entries_per_sec: eps,
        }
    }
}
