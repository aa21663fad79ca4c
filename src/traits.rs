use crate::entry::{CatalogEntry, Volume};
use crate::error::SearchfsError;

/// A lazy stream of catalog entries for one volume.
///
/// Dropping the iterator must release whatever the provider holds open for the
/// scan; the orchestrator drops it as soon as it stops pulling. Streams are
/// created and consumed on the scanner thread that owns them, so they need
/// not be `Send`.
pub type EntryStream = Box<dyn Iterator<Item = Result<CatalogEntry, SearchfsError>>>;

/// Lists a volume's filesystem objects.
///
/// Implement this to back searches with a native metadata catalog, a tree walk,
/// or an in-memory fixture.
///
/// # Thread Safety
///
/// `Send + Sync` are required: one provider is shared by every per-volume
/// scanner thread.
///
/// # Errors
///
/// `scan` returns `Err` when the volume cannot be opened at all. Failures part
/// way through are yielded as `Err` items; the orchestrator treats either as
/// the end of that volume's contribution.
///
/// # Example
///
/// ```rust
/// use searchfs::{CatalogEntry, CatalogProvider, EntryStream, SearchfsError, Volume};
///
/// struct Fixed(Vec<CatalogEntry>);
///
/// impl CatalogProvider for Fixed {
///     fn scan(&self, volume: &Volume) -> Result<EntryStream, SearchfsError> {
///         let under: Vec<_> = self.0.iter()
///             .filter(|e| e.path.starts_with(&volume.mount_path))
///             .cloned()
///             .map(Ok)
///             .collect();
///         Ok(Box::new(under.into_iter()))
///     }
/// }
/// ```
pub trait CatalogProvider: Send + Sync {
    /// Start scanning `volume`, yielding entries in catalog order.
    fn scan(&self, volume: &Volume) -> Result<EntryStream, SearchfsError>;
}

/// Enumerates the volumes currently mounted.
pub trait VolumeEnumerator {
    /// List mounted volumes in mount-table order.
    ///
    /// An `Err` here is fatal for the whole run.
    fn list(&self) -> Result<Vec<Volume>, SearchfsError>;
}

/// Decides whether a catalog entry is accepted.
///
/// Both the compiled name pattern and every path filter implement this, so the
/// search pipeline is a conjunction of `Matcher`s.
///
/// # Example
///
/// ```rust
/// use searchfs::{CatalogEntry, Matcher};
///
/// struct ExtensionMatcher(String);
///
/// impl Matcher for ExtensionMatcher {
///     fn is_match(&self, entry: &CatalogEntry) -> bool {
///         entry.path
///             .extension()
///             .map(|e| e.eq_ignore_ascii_case(&self.0))
///             .unwrap_or(false)
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if this entry should be included in results.
    fn is_match(&self, entry: &CatalogEntry) -> bool;
}
