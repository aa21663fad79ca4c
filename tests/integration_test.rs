use std::fs;
use std::path::{Path, PathBuf};

use searchfs::{
    search, CatalogEntry, CatalogProvider, EntryStream, FilterConfig, SearchEvent, SearchfsError,
    TreeWalkProvider, Volume, VolumeEnumerator,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a fake volume layout.
///
/// Structure:
/// ```
/// tmp/
///   Applications/
///     Calendar.app/
///       Contents/
///         Info.plist
///   System/
///     Library/
///       Frameworks/
///   Library/
///     Frameworks/
///   bin/
///     ls
///     lsof
///   README
///   readme.md
///   notes.plist
///   .hidden.plist
/// ```
fn setup_volume() -> tempfile::TempDir {
    // Not tempdir(): its ".tmp" prefix would make the whole volume hidden.
    let dir = tempfile::Builder::new().prefix("searchfs-vol").tempdir().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("Applications/Calendar.app/Contents")).unwrap();
    fs::write(root.join("Applications/Calendar.app/Contents/Info.plist"), "").unwrap();
    fs::create_dir_all(root.join("System/Library/Frameworks")).unwrap();
    fs::create_dir_all(root.join("Library/Frameworks")).unwrap();
    fs::create_dir(root.join("bin")).unwrap();
    fs::write(root.join("bin/ls"), "").unwrap();
    fs::write(root.join("bin/lsof"), "").unwrap();
    fs::write(root.join("README"), "").unwrap();
    fs::write(root.join("readme.md"), "").unwrap();
    fs::write(root.join("notes.plist"), "").unwrap();
    fs::write(root.join(".hidden.plist"), "").unwrap();

    dir
}

/// Volumes backed by temporary directories.
struct TestVolumes(Vec<Volume>);

impl TestVolumes {
    fn of(dirs: &[&Path]) -> Self {
        Self(
            dirs.iter()
                .enumerate()
                .map(|(i, d)| Volume::new(format!("testdisk{i}"), *d))
                .collect(),
        )
    }
}

impl VolumeEnumerator for TestVolumes {
    fn list(&self) -> Result<Vec<Volume>, SearchfsError> {
        Ok(self.0.clone())
    }
}

/// A catalog that walks with walkdir in sorted order.
struct WalkdirCatalog;

impl CatalogProvider for WalkdirCatalog {
    fn scan(&self, volume: &Volume) -> Result<EntryStream, SearchfsError> {
        let root = volume.mount_path.clone();
        if !root.is_dir() {
            return Err(SearchfsError::NotFound(root));
        }
        let entries = walkdir::WalkDir::new(&root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|e| match e {
                Ok(e) => Ok(CatalogEntry::new(e.path(), e.file_type().is_dir())),
                Err(e) => Err(SearchfsError::Catalog(e.to_string())),
            });
        Ok(Box::new(entries))
    }
}

fn config_for(root: &Path) -> FilterConfig {
    FilterConfig {
        protected_roots: vec![root.join("System")],
        ..FilterConfig::default()
    }
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn run(builder: searchfs::SearchBuilder) -> Vec<PathBuf> {
    builder
        .run()
        .unwrap()
        .filter_map(|e| e.path().cloned())
        .collect()
}

fn on(dir: &Path) -> searchfs::SearchBuilder {
    search()
        .volume_enumerator(TestVolumes::of(&[dir]))
        .catalog(WalkdirCatalog)
        .filter_config(config_for(dir))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn substring_is_case_insensitive_by_default() {
    let dir = setup_volume();
    let found = names(&run(on(dir.path()).term("readme")));
    assert_eq!(found, ["README", "readme.md"]);
}

#[test]
fn respects_limit() {
    let dir = setup_volume();
    let found = run(on(dir.path()).term("s").limit(2));
    assert_eq!(found.len(), 2);
}

#[test]
fn limit_caps_but_does_not_pad() {
    let dir = setup_volume();
    let found = run(on(dir.path()).term(".plist$").limit(25));
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|p| p.to_string_lossy().ends_with(".plist")));
}

#[test]
fn sensitive_prefix_respects_case() {
    let dir = setup_volume();
    let found = names(&run(on(dir.path()).term("^README").case_sensitive(true)));
    assert_eq!(found, ["README"]);

    let none = run(on(dir.path()).term("^readme").case_sensitive(true).exact(true));
    assert!(none.is_empty());
}

#[test]
fn exact_match_finds_ls_only() {
    let dir = setup_volume();
    let found = run(on(dir.path()).term("ls").exact(true).limit(1));
    assert_eq!(found, [dir.path().join("bin/ls")]);
}

#[test]
fn directories_only() {
    let dir = setup_volume();
    let found = run(on(dir.path()).term("Frameworks").exact(true).directories_only(true));
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p.is_dir()));
}

#[test]
fn files_only() {
    let dir = setup_volume();
    let found = run(on(dir.path()).term("s").files_only(true));
    assert!(!found.is_empty());
    assert!(found.iter().all(|p| !p.is_dir()));
}

#[test]
fn conflicting_type_filter_is_rejected() {
    let dir = setup_volume();
    let err = on(dir.path())
        .term("s")
        .directories_only(true)
        .files_only(true)
        .run()
        .err()
        .unwrap();
    assert!(matches!(err, SearchfsError::ConflictingTypeFilter));
}

#[test]
fn package_contents_skipped_with_flag() {
    let dir = setup_volume();
    let contents = dir.path().join("Applications/Calendar.app/Contents");

    let with = run(on(dir.path()).term("Contents").exact(true).case_sensitive(true));
    assert!(with.contains(&contents));

    let without = run(
        on(dir.path())
            .term("Contents")
            .exact(true)
            .case_sensitive(true)
            .skip_packages(true),
    );
    assert!(!without.contains(&contents));

    let app = run(on(dir.path()).term(".app$").skip_packages(true));
    assert_eq!(app, [dir.path().join("Applications/Calendar.app")]);
}

#[test]
fn system_paths_excluded_with_flag() {
    let dir = setup_volume();
    let system = dir.path().join("System");
    let found = run(
        on(dir.path())
            .term("Frameworks")
            .exact(true)
            .case_sensitive(true)
            .skip_system(true),
    );
    assert!(!found.is_empty());
    assert!(found.iter().all(|p| !p.starts_with(&system)));
}

#[test]
fn hidden_entries_excluded_with_flag() {
    let dir = setup_volume();
    let found = names(&run(on(dir.path()).term("plist").skip_hidden(true)));
    assert_eq!(found, ["Info.plist", "notes.plist"]);
}

#[test]
fn negated_absent_term_matches_everything() {
    let dir = setup_volume();
    let absent = "Hold the newsreaders nose squarely, waiter, or friendly milk will countermand my trousers";
    let found = run(on(dir.path()).term(absent).negate(true).limit(5));
    assert_eq!(found.len(), 5);

    let all = run(on(dir.path()).term(absent).negate(true));
    assert_eq!(all.len(), 16);
}

#[test]
fn negated_term_excludes_matches() {
    let dir = setup_volume();
    let found = names(&run(on(dir.path()).term("l").negate(true)));
    assert!(found.iter().all(|n| !n.to_lowercase().contains('l')));
    assert!(found.contains(&"bin".to_string()));
}

#[test]
fn multi_volume_limit_is_global() {
    let a = setup_volume();
    let b = setup_volume();
    let builder = || {
        search()
            .volume_enumerator(TestVolumes::of(&[a.path(), b.path()]))
            .catalog(WalkdirCatalog)
            .term("plist")
    };

    let all = run(builder());
    assert_eq!(all.len(), 6);
    assert!(all[..3].iter().all(|p| p.starts_with(a.path())));
    assert!(all[3..].iter().all(|p| p.starts_with(b.path())));

    let capped = run(builder().limit(4));
    assert_eq!(capped, all[..4]);
}

#[test]
fn single_volume_selected_by_mount_path() {
    let a = setup_volume();
    let b = setup_volume();
    let found = run(
        search()
            .volume_enumerator(TestVolumes::of(&[a.path(), b.path()]))
            .catalog(WalkdirCatalog)
            .volume(b.path().to_string_lossy())
            .term("plist"),
    );
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|p| p.starts_with(b.path())));
}

#[test]
fn unknown_volume_is_usage_error() {
    let dir = setup_volume();
    let err = on(dir.path()).term("s").volume("nodisk").run().err().unwrap();
    assert!(err.is_usage());
}

#[test]
fn unreadable_volume_reports_and_others_continue() {
    let a = setup_volume();
    let gone = a.path().join("not-a-volume");
    let events: Vec<_> = search()
        .volume_enumerator(TestVolumes::of(&[&gone, a.path()]))
        .catalog(WalkdirCatalog)
        .term("ls")
        .exact(true)
        .run()
        .unwrap()
        .collect();

    assert!(matches!(
        &events[0],
        SearchEvent::VolumeFailed { volume, .. } if volume.mount_path == gone
    ));
    assert_eq!(events[1].path(), Some(&a.path().join("bin/ls")));
    assert_eq!(events.len(), 2);
}

#[test]
fn tree_walk_provider_end_to_end() {
    let dir = setup_volume();
    let found = run(
        search()
            .volume_enumerator(TestVolumes::of(&[dir.path()]))
            .catalog(TreeWalkProvider::new())
            .term("ls")
            .exact(true),
    );
    assert_eq!(found, [dir.path().join("bin/ls")]);
}
