//! Removable drive detection.
//!
//! Volume enumeration sits behind [`VolumeSource`] so the copy engine can be
//! driven by a fixed list in tests or by another platform backend.

use std::path::{Path, PathBuf};

use sysinfo::Disks;
use tracing::debug;

use crate::error::{CopyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
    Fixed,
    Removable,
    Network,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub root: PathBuf,
    pub kind: VolumeKind,
}

impl Volume {
    pub fn new(root: impl Into<PathBuf>, kind: VolumeKind) -> Self {
        Self {
            root: root.into(),
            kind,
        }
    }
}

pub trait VolumeSource {
    /// Mounted volumes in platform enumeration order.
    fn list_volumes(&self) -> Vec<Volume>;
}

/// Volumes reported by the operating system.
#[derive(Debug, Default)]
pub struct SystemVolumes;

impl VolumeSource for SystemVolumes {
    fn list_volumes(&self) -> Vec<Volume> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .filter(|disk| !is_virtual_filesystem(&disk.file_system().to_string_lossy()))
            .map(|disk| {
                let fs = disk.file_system().to_string_lossy();
                let kind = if is_network_filesystem(&fs) {
                    VolumeKind::Network
                } else if disk.is_removable() {
                    VolumeKind::Removable
                } else {
                    VolumeKind::Fixed
                };
                Volume::new(disk.mount_point(), kind)
            })
            .collect()
    }
}

/// A fixed list of volumes, for callers that already know their drives.
#[derive(Debug, Clone, Default)]
pub struct StaticVolumes(pub Vec<Volume>);

impl VolumeSource for StaticVolumes {
    fn list_volumes(&self) -> Vec<Volume> {
        self.0.clone()
    }
}

pub fn first_removable_drive(source: &dyn VolumeSource) -> Result<PathBuf> {
    let volumes = source.list_volumes();
    debug!("Found {} mounted volumes", volumes.len());
    volumes
        .into_iter()
        .find(|v| v.kind == VolumeKind::Removable)
        .map(|v| v.root)
        .ok_or(CopyError::NoDriveFound)
}

/// Destination root on `drive`: the source folder's own name under the
/// drive root.
pub fn destination_on(drive: &Path, source: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| CopyError::InvalidSource(source.to_path_buf()))?;
    Ok(drive.join(name))
}

fn is_virtual_filesystem(fs: &str) -> bool {
    matches!(
        fs.to_lowercase().as_str(),
        "devfs" | "sysfs" | "proc" | "tmpfs" | "ramfs" | "devtmpfs" | "overlay" | "squashfs"
    )
}

fn is_network_filesystem(fs: &str) -> bool {
    matches!(
        fs.to_lowercase().as_str(),
        "nfs" | "nfs4" | "cifs" | "smbfs" | "smb2" | "afpfs" | "sshfs" | "fuse.sshfs" | "9p"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_removable_in_enumeration_order() {
        let volumes = StaticVolumes(vec![
            Volume::new("/", VolumeKind::Fixed),
            Volume::new("/mnt/share", VolumeKind::Network),
            Volume::new("/media/usb1", VolumeKind::Removable),
            Volume::new("/media/usb0", VolumeKind::Removable),
        ]);
        assert_eq!(first_removable_drive(&volumes).unwrap(), PathBuf::from("/media/usb1"));
    }

    #[test]
    fn no_removable_volume_is_an_error() {
        let empty = StaticVolumes::default();
        assert!(matches!(first_removable_drive(&empty), Err(CopyError::NoDriveFound)));

        let fixed_only = StaticVolumes(vec![Volume::new("/", VolumeKind::Fixed)]);
        assert!(matches!(first_removable_drive(&fixed_only), Err(CopyError::NoDriveFound)));
    }

    #[test]
    fn destination_keeps_source_folder_name() {
        let dest = destination_on(Path::new("/media/usb"), Path::new("/home/me/project")).unwrap();
        assert_eq!(dest, PathBuf::from("/media/usb/project"));
        assert!(destination_on(Path::new("/media/usb"), Path::new("/")).is_err());
    }

    #[test]
    fn classifies_filesystems() {
        assert!(is_network_filesystem("NFS4"));
        assert!(is_virtual_filesystem("tmpfs"));
        assert!(!is_network_filesystem("vfat"));
        assert!(!is_virtual_filesystem("exfat"));
    }
}
