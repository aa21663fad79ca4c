use std::sync::Arc;

use crate::engine::{run, SearchRequest, SearchStream};
use crate::error::{Result, SearchfsError};
use crate::filter::{build_filter, FilterConfig, PathFilterOptions, TypeFilter};
use crate::mounts::SystemVolumes;
use crate::pattern::NameMatcher;
use crate::traits::{CatalogProvider, Matcher, VolumeEnumerator};
use crate::volume::{resolve, VolumeSelection};
use crate::walk::TreeWalkProvider;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a volume search.
///
/// Created via [`searchfs::search()`](crate::search). Configure with chained
/// builder methods, then call [`run()`](SearchBuilder::run) to start it.
///
/// # Example
///
/// ```rust,ignore
/// let stream = searchfs::search()
///     .term("^README")
///     .case_sensitive(true)
///     .volume("/")
///     .limit(20)
///     .run()?;
/// ```
pub struct SearchBuilder {
    term:             Option<String>,
    exact:            bool,
    case_sensitive:   bool,
    negate:           bool,
    directories_only: bool,
    files_only:       bool,
    path_options:     PathFilterOptions,
    filter_config:    FilterConfig,
    extra_filters:    Vec<Box<dyn Matcher>>,
    limit:            Option<usize>,
    volume:           Option<String>,
    enumerator:       Box<dyn VolumeEnumerator>,
    catalog:          Arc<dyn CatalogProvider>,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            term:             None,
            exact:            false,
            case_sensitive:   false,
            negate:           false,
            directories_only: false,
            files_only:       false,
            path_options:     PathFilterOptions::default(),
            filter_config:    FilterConfig::default(),
            extra_filters:    Vec::new(),
            limit:            None,
            volume:           None,
            enumerator:       Box::new(SystemVolumes),
            catalog:          Arc::new(TreeWalkProvider::new()),
        }
    }
}

impl SearchBuilder {
    // ── Pattern ───────────────────────────────────────────────────────────

    /// The filename pattern. `^` anchors it to the start of the name, `$` to
    /// the end.
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Require the whole filename to equal the term.
    pub fn exact(mut self, yes: bool) -> Self {
        self.exact = yes;
        self
    }

    /// Compare case-sensitively. Matching is case-insensitive by default.
    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    /// Accept entries whose filename does *not* contain the term.
    pub fn negate(mut self, yes: bool) -> Self {
        self.negate = yes;
        self
    }

    // ── Filters ───────────────────────────────────────────────────────────

    /// Only directories. Combining with [`files_only`](Self::files_only) is
    /// a configuration error.
    pub fn directories_only(mut self, yes: bool) -> Self {
        self.directories_only = yes;
        self
    }

    /// Only non-directories (symlinks included).
    pub fn files_only(mut self, yes: bool) -> Self {
        self.files_only = yes;
        self
    }

    /// Set both type flags from an already resolved [`TypeFilter`].
    pub fn type_filter(mut self, filter: TypeFilter) -> Self {
        self.directories_only = filter == TypeFilter::DirectoriesOnly;
        self.files_only = filter == TypeFilter::FilesOnly;
        self
    }

    /// Skip everything inside package directories such as `.app` bundles.
    pub fn skip_packages(mut self, yes: bool) -> Self {
        self.path_options.skip_package_contents = yes;
        self
    }

    /// Skip everything under the protected system roots.
    pub fn skip_system(mut self, yes: bool) -> Self {
        self.path_options.exclude_system_paths = yes;
        self
    }

    /// Skip dot-files and the contents of dot-directories.
    pub fn skip_hidden(mut self, yes: bool) -> Self {
        self.path_options.skip_hidden = yes;
        self
    }

    /// Replace the package suffixes and protected roots the filters consult.
    pub fn filter_config(mut self, config: FilterConfig) -> Self {
        self.filter_config = config;
        self
    }

    /// Add a custom predicate to the filter chain.
    pub fn with_filter(mut self, filter: impl Matcher + 'static) -> Self {
        self.extra_filters.push(Box::new(filter));
        self
    }

    // ── Scope ─────────────────────────────────────────────────────────────

    /// Stop after `n` results across all volumes. Must be positive.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Search a single volume, named by device identifier or mount path.
    /// All mounted volumes are searched by default.
    pub fn volume(mut self, id_or_path: impl Into<String>) -> Self {
        self.volume = Some(id_or_path.into());
        self
    }

    /// Where mounted volumes come from. Defaults to the system mount table.
    pub fn volume_enumerator(mut self, enumerator: impl VolumeEnumerator + 'static) -> Self {
        self.enumerator = Box::new(enumerator);
        self
    }

    /// What lists each volume's entries. Defaults to [`TreeWalkProvider`].
    pub fn catalog(mut self, catalog: impl CatalogProvider + 'static) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Validate everything and resolve volumes, without touching any catalog.
    ///
    /// # Errors
    ///
    /// Usage errors ([`SearchfsError::is_usage`]) for a missing, empty or
    /// overlong term, conflicting type filters, a zero limit, or an unknown
    /// volume. A failure to enumerate volumes is passed through as is.
    pub fn build(self) -> Result<SearchRequest> {
        self.prepare().map(|(request, _)| request)
    }

    /// Validate, then start scanning.
    ///
    /// # Errors
    ///
    /// Same as [`build()`](Self::build). Catalog failures are not errors
    /// here; they arrive as [`SearchEvent::VolumeFailed`](crate::SearchEvent)
    /// on the stream.
    pub fn run(self) -> Result<SearchStream> {
        let (request, catalog) = self.prepare()?;
        Ok(run(request, catalog))
    }

    fn prepare(self) -> Result<(SearchRequest, Arc<dyn CatalogProvider>)> {
        let term = self.term.unwrap_or_default();
        let matcher = NameMatcher::compile(&term, self.exact, self.case_sensitive, self.negate)?;

        let mut filters = build_filter(
            self.directories_only,
            self.files_only,
            self.path_options,
            &self.filter_config,
        )?;
        for filter in self.extra_filters {
            filters.push_boxed(filter);
        }

        if self.limit == Some(0) {
            return Err(SearchfsError::InvalidLimit);
        }

        let volumes = match resolve(false, self.volume.as_deref(), self.enumerator.as_ref())? {
            VolumeSelection::Search(volumes) | VolumeSelection::List(volumes) => volumes,
        };

        let request = SearchRequest {
            matcher,
            filters,
            volumes,
            limit: self.limit,
        };
        Ok((request, self.catalog))
    }
}
