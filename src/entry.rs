use std::fmt;
use std::path::{Path, PathBuf};

/// A single filesystem object delivered by a
/// [`CatalogProvider`](crate::traits::CatalogProvider) during a volume scan.
///
/// `name` is the final path component. Matching only ever looks at the name;
/// filters look at the full path and its ancestry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Absolute path to the entry.
    pub path: PathBuf,

    /// The final path component, lossily decoded.
    pub name: String,

    /// Whether the entry itself is a directory. Symlinks are never
    /// directories here, whatever they point at.
    pub is_directory: bool,
}

impl CatalogEntry {
    /// Build an entry from its path, deriving `name` from the last component.
    pub fn new(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            is_directory,
        }
    }

    /// Names of the directories enclosing this entry, root first.
    ///
    /// The entry's own name is not included.
    pub fn ancestor_names(&self) -> impl Iterator<Item = std::borrow::Cow<'_, str>> {
        self.path
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .filter_map(|c| match c {
                std::path::Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
    }
}

/// A mounted volume: the unit a search fans out over.
///
/// Volumes are enumerated fresh on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    /// Device identifier as the mount table reports it (`/dev/disk1s1`, `tmpfs`, ...).
    pub device_id: String,

    /// Absolute path the volume is mounted at.
    pub mount_path: PathBuf,
}

impl Volume {
    pub fn new(device_id: impl Into<String>, mount_path: impl Into<PathBuf>) -> Self {
        Self {
            device_id: device_id.into(),
            mount_path: mount_path.into(),
        }
    }
}

/// Formats as the `--list` line: `<deviceId>: <mountPath>`.
impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.device_id, self.mount_path.display())
    }
}
