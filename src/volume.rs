//! Maps `--list` / `--volume` input onto concrete volumes.

use std::path::Path;

use crate::entry::Volume;
use crate::error::{Result, SearchfsError};
use crate::traits::VolumeEnumerator;

/// What the invocation should do with the mounted volumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSelection {
    /// Print every mounted volume and stop.
    List(Vec<Volume>),

    /// Search these volumes, in this order.
    Search(Vec<Volume>),
}

impl VolumeSelection {
    pub fn volumes(&self) -> &[Volume] {
        match self {
            Self::List(v) | Self::Search(v) => v,
        }
    }
}

/// Resolve the volume arguments against what is currently mounted.
///
/// `volume_arg` is compared against every device identifier first and only
/// then against mount paths; the first exact hit wins. Without it, every
/// mounted volume is selected in enumeration order.
///
/// # Errors
///
/// [`SearchfsError::VolumeNotFound`] when `volume_arg` matches nothing, or
/// whatever the enumerator fails with.
pub fn resolve(
    list_only: bool,
    volume_arg: Option<&str>,
    enumerator: &dyn VolumeEnumerator,
) -> Result<VolumeSelection> {
    let volumes = enumerator.list()?;

    if list_only {
        return Ok(VolumeSelection::List(volumes));
    }

    let Some(arg) = volume_arg else {
        log::debug!("searching all {} mounted volumes", volumes.len());
        return Ok(VolumeSelection::Search(volumes));
    };

    let found = volumes
        .iter()
        .find(|v| v.device_id == arg)
        .or_else(|| volumes.iter().find(|v| v.mount_path == Path::new(arg)))
        .cloned()
        .ok_or_else(|| SearchfsError::VolumeNotFound(arg.to_owned()))?;

    log::debug!("volume '{arg}' resolved to {found}");
    Ok(VolumeSelection::Search(vec![found]))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Volume>);

    impl VolumeEnumerator for Fixed {
        fn list(&self) -> Result<Vec<Volume>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl VolumeEnumerator for Broken {
        fn list(&self) -> Result<Vec<Volume>> {
            Err(SearchfsError::VolumeEnumeration("mount table unreadable".into()))
        }
    }

    fn mounts() -> Fixed {
        Fixed(vec![
            Volume::new("/dev/disk1s1", "/"),
            Volume::new("/dev/disk2s1", "/Volumes/Backup"),
            // A device named like another volume's mount path.
            Volume::new("/Volumes/Backup", "/Volumes/Odd"),
        ])
    }

    #[test]
    fn list_returns_every_volume() {
        let sel = resolve(true, Some("ignored"), &mounts()).unwrap();
        assert!(matches!(sel, VolumeSelection::List(ref v) if v.len() == 3));
        let lines: Vec<String> = sel.volumes().iter().map(ToString::to_string).collect();
        assert_eq!(lines.iter().filter(|l| l.ends_with(": /")).count(), 1);
    }

    #[test]
    fn default_selects_all_volumes_in_order() {
        let sel = resolve(false, None, &mounts()).unwrap();
        let paths: Vec<&Path> = sel.volumes().iter().map(|v| v.mount_path.as_path()).collect();
        assert_eq!(
            paths,
            [Path::new("/"), Path::new("/Volumes/Backup"), Path::new("/Volumes/Odd")]
        );
    }

    #[test]
    fn device_id_wins_over_mount_path() {
        let sel = resolve(false, Some("/Volumes/Backup"), &mounts()).unwrap();
        assert_eq!(sel.volumes(), [Volume::new("/Volumes/Backup", "/Volumes/Odd")]);
    }

    #[test]
    fn mount_path_match() {
        let sel = resolve(false, Some("/"), &mounts()).unwrap();
        assert_eq!(sel.volumes(), [Volume::new("/dev/disk1s1", "/")]);

        let by_device = resolve(false, Some("/dev/disk2s1"), &mounts()).unwrap();
        assert_eq!(by_device.volumes()[0].mount_path, Path::new("/Volumes/Backup"));
    }

    #[test]
    fn unknown_volume_is_a_usage_error() {
        let err = resolve(false, Some("/Volumes/Nope"), &mounts()).unwrap_err();
        assert!(matches!(err, SearchfsError::VolumeNotFound(ref a) if a == "/Volumes/Nope"));
        assert!(err.is_usage());
    }

    #[test]
    fn enumeration_failure_propagates() {
        let err = resolve(false, None, &Broken).unwrap_err();
        assert!(!err.is_usage());
    }
}
