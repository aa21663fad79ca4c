//! The filter chain: type, package-contents, protected-root and hidden-entry
//! predicates composed into one conjunctive [`Matcher`].
//!
//! Which directory names count as packages and which roots are protected is
//! configuration ([`FilterConfig`]), not logic, so the chain can be tested
//! against synthetic layouts.

use std::path::PathBuf;

use crate::entry::CatalogEntry;
use crate::error::{Result, SearchfsError};
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Restricts results by entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    Any,
    DirectoriesOnly,
    FilesOnly,
}

impl TypeFilter {
    /// Resolve the `-d` / `-f` flag pair.
    ///
    /// # Errors
    ///
    /// [`SearchfsError::ConflictingTypeFilter`] when both are set.
    pub fn from_flags(directories_only: bool, files_only: bool) -> Result<Self> {
        match (directories_only, files_only) {
            (true, true) => Err(SearchfsError::ConflictingTypeFilter),
            (true, false) => Ok(Self::DirectoriesOnly),
            (false, true) => Ok(Self::FilesOnly),
            (false, false) => Ok(Self::Any),
        }
    }
}

/// Path-based exclusions, each off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathFilterOptions {
    /// Reject anything inside a package directory (the package itself stays).
    pub skip_package_contents: bool,

    /// Reject anything at or under a protected root.
    pub exclude_system_paths: bool,

    /// Reject dot-files and anything inside a dot-directory.
    pub skip_hidden: bool,
}

/// Naming conventions and protected locations the path filters consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Directory-name suffixes that mark a package, compared case-insensitively.
    pub package_suffixes: Vec<String>,

    /// Roots excluded by [`PathFilterOptions::exclude_system_paths`].
    pub protected_roots: Vec<PathBuf>,
}

const DEFAULT_PACKAGE_SUFFIXES: &[&str] = &[
    ".app", ".bundle", ".framework", ".plugin", ".kext", ".pkg", ".mpkg", ".xpc", ".appex",
    ".prefpane", ".qlgenerator", ".mdimporter", ".saver", ".wdgt", ".xcodeproj", ".xcworkspace",
    ".playground", ".photoslibrary", ".rtfd", ".pages", ".numbers", ".key",
];

impl Default for FilterConfig {
    fn default() -> Self {
        let mut protected_roots = vec![PathBuf::from("/System")];
        if cfg!(target_os = "linux") {
            protected_roots.extend(["/proc", "/sys", "/dev"].map(PathBuf::from));
        }
        Self {
            package_suffixes: DEFAULT_PACKAGE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            protected_roots,
        }
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

struct KindFilter(TypeFilter);

impl Matcher for KindFilter {
    fn is_match(&self, entry: &CatalogEntry) -> bool {
        match self.0 {
            TypeFilter::Any => true,
            TypeFilter::DirectoriesOnly => entry.is_directory,
            // Symlinks count as files even when they point at a directory.
            TypeFilter::FilesOnly => !entry.is_directory,
        }
    }
}

struct PackageContentsFilter {
    suffixes: Vec<String>,
}

impl PackageContentsFilter {
    fn new(suffixes: &[String]) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    fn is_package_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.suffixes
            .iter()
            .any(|s| name.len() > s.len() && name.ends_with(s.as_str()))
    }
}

impl Matcher for PackageContentsFilter {
    fn is_match(&self, entry: &CatalogEntry) -> bool {
        !entry.ancestor_names().any(|name| self.is_package_name(&name))
    }
}

struct ProtectedRootFilter {
    roots: Vec<PathBuf>,
}

impl Matcher for ProtectedRootFilter {
    fn is_match(&self, entry: &CatalogEntry) -> bool {
        !self.roots.iter().any(|root| entry.path.starts_with(root))
    }
}

struct HiddenFilter;

impl Matcher for HiddenFilter {
    fn is_match(&self, entry: &CatalogEntry) -> bool {
        !entry.name.starts_with('.') && !entry.ancestor_names().any(|name| name.starts_with('.'))
    }
}

// ---------------------------------------------------------------------------
// FilterChain
// ---------------------------------------------------------------------------

/// Conjunction of every enabled filter. An empty chain accepts everything.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Matcher>>,
}

impl FilterChain {
    /// Assemble the chain for a type filter and path options.
    pub fn new(type_filter: TypeFilter, options: PathFilterOptions, config: &FilterConfig) -> Self {
        let mut chain = Self::default();
        if type_filter != TypeFilter::Any {
            chain.push(KindFilter(type_filter));
        }
        if options.exclude_system_paths && !config.protected_roots.is_empty() {
            chain.push(ProtectedRootFilter {
                roots: config.protected_roots.clone(),
            });
        }
        if options.skip_package_contents && !config.package_suffixes.is_empty() {
            chain.push(PackageContentsFilter::new(&config.package_suffixes));
        }
        if options.skip_hidden {
            chain.push(HiddenFilter);
        }
        chain
    }

    /// Append a caller-supplied predicate.
    pub fn push(&mut self, filter: impl Matcher + 'static) {
        self.push_boxed(Box::new(filter));
    }

    pub fn push_boxed(&mut self, filter: Box<dyn Matcher>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Matcher for FilterChain {
    fn is_match(&self, entry: &CatalogEntry) -> bool {
        self.filters.iter().all(|f| f.is_match(entry))
    }
}

/// Validate the raw type flags and build the chain.
///
/// # Errors
///
/// [`SearchfsError::ConflictingTypeFilter`] when both `directories_only` and
/// `files_only` are set.
pub fn build_filter(
    directories_only: bool,
    files_only: bool,
    options: PathFilterOptions,
    config: &FilterConfig,
) -> Result<FilterChain> {
    let type_filter = TypeFilter::from_flags(directories_only, files_only)?;
    Ok(FilterChain::new(type_filter, options, config))
}
