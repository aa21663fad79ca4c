//! System volume enumeration from the OS mount table.
//!
//! Linux reads `/proc/self/mounts`; other Unix systems parse the output of
//! `mount`. Pseudo filesystems have no searchable catalog and are dropped.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::entry::Volume;
use crate::error::{Result, SearchfsError};
use crate::traits::VolumeEnumerator;

/// Filesystem types that never hold user files.
const PSEUDO_FSTYPES: &[&str] = &[
    "proc", "sysfs", "devtmpfs", "devpts", "devfs", "securityfs", "cgroup", "cgroup2", "pstore",
    "debugfs", "tracefs", "hugetlbfs", "mqueue", "configfs", "efivarfs", "binfmt_misc", "fusectl",
    "autofs", "bpf", "nsfs", "rpc_pipefs", "selinuxfs", "nullfs",
];

/// A raw mount-table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: PathBuf,
    pub fstype: String,
}

impl MountEntry {
    pub fn is_pseudo(&self) -> bool {
        PSEUDO_FSTYPES.contains(&self.fstype.as_str())
    }
}

/// Parse `/proc/mounts`-formatted text.
pub fn parse_proc_mounts(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let device = parts.next()?;
            let mount_point = parts.next()?;
            let fstype = parts.next()?;
            Some(MountEntry {
                device: unescape_octal(device),
                mount_point: PathBuf::from(unescape_octal(mount_point)),
                fstype: fstype.to_owned(),
            })
        })
        .collect()
}

/// Parse BSD `mount` output: `<device> on <path> (<fstype>, <options>...)`.
pub fn parse_mount_output(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .filter_map(|line| {
            let (device, rest) = line.split_once(" on ")?;
            let open = rest.rfind(" (")?;
            let mount_point = &rest[..open];
            let options = rest[open + 2..].trim_end_matches(')');
            let fstype = options.split(',').next()?.trim();
            Some(MountEntry {
                device: device.to_owned(),
                mount_point: PathBuf::from(mount_point),
                fstype: fstype.to_owned(),
            })
        })
        .collect()
}

/// Turn mount-table rows into searchable volumes, in table order.
///
/// Pseudo filesystems are skipped. A mount point listed twice keeps the
/// position of its first row but the device of its last, since a later mount
/// shadows an earlier one on the same path.
pub fn volumes_from_mounts(entries: Vec<MountEntry>) -> Vec<Volume> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut volumes: Vec<Volume> = Vec::new();
    for m in entries.into_iter().filter(|m| !m.is_pseudo()) {
        match slots.get(&m.mount_point) {
            Some(&slot) => volumes[slot].device_id = m.device,
            None => {
                slots.insert(m.mount_point.clone(), volumes.len());
                volumes.push(Volume::new(m.device, m.mount_point));
            }
        }
    }
    volumes
}

/// Drop volumes whose mount point is not a directory, such as the file bind
/// mounts (`/etc/hosts`, `/etc/resolv.conf`) containers carry.
pub fn retain_directories(volumes: Vec<Volume>) -> Vec<Volume> {
    volumes
        .into_iter()
        .filter(|v| {
            let is_dir = v.mount_path.is_dir();
            if !is_dir {
                log::debug!("skipping non-directory mount {}", v.mount_path.display());
            }
            is_dir
        })
        .collect()
}

/// `\040`-style escapes used for whitespace in mount tables.
fn unescape_octal(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u16, |acc, b| acc * 8 + u16::from(b - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Enumerates the volumes mounted on this machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVolumes;

impl VolumeEnumerator for SystemVolumes {
    fn list(&self) -> Result<Vec<Volume>> {
        let entries = read_mount_table()?;
        let volumes = retain_directories(volumes_from_mounts(entries));
        if volumes.is_empty() {
            return Err(SearchfsError::VolumeEnumeration(
                "mount table lists no searchable volumes".into(),
            ));
        }
        Ok(volumes)
    }
}

#[cfg(target_os = "linux")]
fn read_mount_table() -> Result<Vec<MountEntry>> {
    let content = std::fs::read_to_string("/proc/self/mounts")
        .or_else(|_| std::fs::read_to_string("/proc/mounts"))
        .map_err(|e| SearchfsError::VolumeEnumeration(format!("/proc/mounts: {e}")))?;
    Ok(parse_proc_mounts(&content))
}

#[cfg(not(target_os = "linux"))]
fn read_mount_table() -> Result<Vec<MountEntry>> {
    let output = std::process::Command::new("mount")
        .output()
        .map_err(|e| SearchfsError::VolumeEnumeration(format!("mount: {e}")))?;
    if !output.status.success() {
        return Err(SearchfsError::VolumeEnumeration(format!(
            "mount exited with {}",
            output.status
        )));
    }
    Ok(parse_mount_output(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parses_proc_mounts() {
        let content = "\
/dev/sda1 / ext4 rw,relatime 0 1
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
tmpfs /tmp tmpfs rw,nosuid,nodev 0 0
/dev/sdb1 /mnt/My\\040Disk ext4 rw 0 0
";
        let entries = parse_proc_mounts(content);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].device, "/dev/sda1");
        assert_eq!(entries[0].mount_point, Path::new("/"));
        assert!(entries[1].is_pseudo());
        assert_eq!(entries[3].mount_point, Path::new("/mnt/My Disk"));
    }

    #[test]
    fn parses_bsd_mount_output() {
        let content = "\
/dev/disk3s1s1 on / (apfs, sealed, local, read-only, journaled)
devfs on /dev (devfs, local, nobrowse)
/dev/disk3s5 on /System/Volumes/Data (apfs, local, journaled, nobrowse, protect)
/dev/disk5s1 on /Volumes/USB Stick (msdos, local, nodev, nosuid, noowners)
";
        let entries = parse_mount_output(content);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].fstype, "apfs");
        assert!(entries[1].is_pseudo());
        assert_eq!(entries[3].mount_point, Path::new("/Volumes/USB Stick"));
        assert_eq!(entries[3].fstype, "msdos");
    }

    #[test]
    fn volumes_skip_pseudo_and_duplicates() {
        let content = "\
overlay / overlay rw 0 0
proc /proc proc rw 0 0
tmpfs /dev tmpfs rw 0 0
shm /dev/shm tmpfs rw 0 0
/dev/vda1 / ext4 rw 0 0
";
        let volumes = volumes_from_mounts(parse_proc_mounts(content));
        let lines: Vec<String> = volumes.iter().map(ToString::to_string).collect();
        assert_eq!(lines, ["/dev/vda1: /", "tmpfs: /dev", "shm: /dev/shm"]);
    }

    #[test]
    fn file_bind_mounts_are_not_volumes() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, "127.0.0.1 localhost\n").unwrap();

        let volumes = retain_directories(vec![
            Volume::new("/dev/vda1", dir.path()),
            Volume::new("/dev/vda1", &hosts),
            Volume::new("gone", dir.path().join("unmounted")),
        ]);
        assert_eq!(volumes, [Volume::new("/dev/vda1", dir.path())]);
    }

    #[test]
    fn unescape_leaves_plain_text_alone() {
        assert_eq!(unescape_octal("/mnt/plain"), "/mnt/plain");
        assert_eq!(unescape_octal("a\\011b"), "a\tb");
        assert_eq!(unescape_octal("trailing\\"), "trailing\\");
    }
}
