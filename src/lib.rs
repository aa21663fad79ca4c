//! # searchfs
//!
//! Fast filename search across mounted volumes.
//!
//! searchfs compiles a search term into a [`NameMatcher`] (substring, `^`
//! prefix, `$` suffix, exact, or negated), builds a conjunctive
//! [`FilterChain`] (directories/files only, package contents, protected
//! system roots, hidden entries), resolves which volumes to search, and then
//! scans every volume concurrently through a [`CatalogProvider`], merging the
//! accepted paths in volume order under one global limit.
//!
//! Everything that can be wrong with the input is reported by
//! [`SearchBuilder::run`] before any catalog is opened.
//!
//! # Quick Start
//!
//! ```rust
//! use searchfs::{CatalogEntry, CatalogProvider, EntryStream, SearchfsError};
//! use searchfs::{Volume, VolumeEnumerator};
//!
//! struct Mounts;
//!
//! impl VolumeEnumerator for Mounts {
//!     fn list(&self) -> Result<Vec<Volume>, SearchfsError> {
//!         Ok(vec![Volume::new("disk1", "/")])
//!     }
//! }
//!
//! struct Catalog;
//!
//! impl CatalogProvider for Catalog {
//!     fn scan(&self, _volume: &Volume) -> Result<EntryStream, SearchfsError> {
//!         let entries = vec![
//!             Ok(CatalogEntry::new("/bin", true)),
//!             Ok(CatalogEntry::new("/bin/ls", false)),
//!             Ok(CatalogEntry::new("/bin/lsof", false)),
//!         ];
//!         Ok(Box::new(entries.into_iter()))
//!     }
//! }
//!
//! let paths: Vec<_> = searchfs::search()
//!     .term("ls")
//!     .exact(true)
//!     .volume_enumerator(Mounts)
//!     .catalog(Catalog)
//!     .run()
//!     .unwrap()
//!     .filter_map(|event| event.path().cloned())
//!     .collect();
//!
//! assert_eq!(paths, [std::path::PathBuf::from("/bin/ls")]);
//! ```

#![forbid(unsafe_code)]

pub mod engine;
pub mod filter;
pub mod mounts;
pub mod pattern;
pub mod sink;
pub mod volume;
pub mod walk;

mod builder;
mod entry;
mod error;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchBuilder;
pub use engine::{SearchRequest, SearchStream};
pub use entry::{CatalogEntry, Volume};
pub use error::{Result, SearchfsError, EXIT_FAILURE, EXIT_USAGE};
pub use filter::{FilterChain, FilterConfig, PathFilterOptions, TypeFilter};
pub use mounts::SystemVolumes;
pub use pattern::{MatchMode, NameMatcher, MAX_TERM_LEN};
pub use results::{ScanStats, SearchEvent};
pub use traits::{CatalogProvider, EntryStream, Matcher, VolumeEnumerator};
pub use walk::TreeWalkProvider;

// ── Entry points ──────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}

/// Every mounted volume `enumerator` reports, for `--list`.
///
/// # Errors
///
/// Whatever the enumerator fails with; this is fatal for the run.
pub fn list_volumes(enumerator: &dyn VolumeEnumerator) -> Result<Vec<Volume>> {
    Ok(volume::resolve(true, None, enumerator)?.volumes().to_vec())
}
