//! Tree-walk catalog provider.
//!
//! Lists a volume by walking it from its mount path. Portable but slower than
//! a native catalog; nested mounts are left to their own volume scans.

use std::path::PathBuf;

use ignore::{DirEntry, WalkBuilder};

use crate::entry::{CatalogEntry, Volume};
use crate::error::{Result, SearchfsError};
use crate::traits::{CatalogProvider, EntryStream};

/// Walks each volume's directory tree in file-name order, never following
/// symlinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeWalkProvider;

impl TreeWalkProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CatalogProvider for TreeWalkProvider {
    fn scan(&self, volume: &Volume) -> Result<EntryStream> {
        let root = volume.mount_path.clone();
        let meta = std::fs::metadata(&root).map_err(|e| SearchfsError::from_io(root.clone(), e))?;
        if !meta.is_dir() {
            return Err(SearchfsError::Catalog(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let walker = WalkBuilder::new(&root)
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let entries = walker.filter_map(move |res| match res {
            Ok(entry) if entry.depth() == 0 => None,
            Ok(entry) => Some(Ok(to_catalog_entry(&entry))),
            Err(e) => {
                let err = map_ignore_error(e);
                // Unreadable subtrees are normal on a live system; only a
                // failure at the volume root ends the scan.
                if err.path().is_some_and(|p| *p == root) {
                    Some(Err(err))
                } else {
                    log::debug!("skipping: {err}");
                    None
                }
            }
        });

        Ok(Box::new(entries))
    }
}

fn to_catalog_entry(entry: &DirEntry) -> CatalogEntry {
    let is_directory = entry.file_type().is_some_and(|ft| ft.is_dir());
    CatalogEntry::new(entry.path(), is_directory)
}

fn map_ignore_error(e: ignore::Error) -> SearchfsError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => SearchfsError::from_io(path, io_err),
            other => SearchfsError::Catalog(format!("{}: {other}", path.display())),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => SearchfsError::Catalog(format!(
            "symlink loop at {}",
            child.display()
        )),
        ignore::Error::Io(io_err) => SearchfsError::Io {
            path: PathBuf::new(),
            source: io_err,
        },
        other => SearchfsError::Catalog(other.to_string()),
    }
}
