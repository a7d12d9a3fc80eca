//! Rootfs scanner
//!
//! Walks `<root>/<distro>/<release>/boot` and builds a [`Catalog`] of
//! kernel/initrd pairs. Every directory that cannot be read is logged and
//! skipped, so the result may be partial but a scan never fails.

use crate::error::{CatalogError, Result};
use crate::version::VersionKey;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, error, warn};

/// Raw version label of the synthetic newest entry of every release
pub const LATEST: &str = "latest";

/// Name of the per-release directory holding kernels and initrds
pub const BOOT_DIR: &str = "boot";

const KERNEL_STEM: &str = "vmlinuz";
const INITRD_STEM: &str = "initrd.img";
const INITRAMFS_STEM: &str = "initramfs";
const INITRAMFS_EXT: &str = ".img";

/// One kernel with its matching initrd
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootFile {
    pub version: VersionKey,
    /// Rootfs-relative posix path, e.g. `debian/bookworm/boot/vmlinuz-6.1.0-9`
    pub kernel_path: String,
    /// Rootfs-relative posix path of the initrd
    pub initrd_path: String,
}

/// A release directory of a distro
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Release {
    pub name: String,
    /// `<root>/<distro>/<release>`, used as the NFS/overlay root
    pub rootfs_path: String,
    /// `latest` first, then ascending by version
    pub boot_files: Vec<BootFile>,
}

/// A top-level distro directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distro {
    pub name: String,
    pub releases: Vec<Release>,
}

/// Result of one scan
pub type Catalog = Vec<Distro>;

/// How a file inside a `boot` directory was recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootFileName<'a> {
    /// `vmlinuz-<ver>`
    Kernel(&'a str),
    /// `initrd.img-<ver>` or `initramfs-<ver>.img`
    Initrd(&'a str),
    /// Not a boot file
    Other,
}

impl<'a> BootFileName<'a> {
    /// Classify a file name.
    ///
    /// Names that start with a known stem but do not follow its grammar
    /// (`vmlinuz.old`, `initramfs-6.1.0`) are errors rather than `Other`.
    pub fn classify(name: &'a str) -> Result<Self> {
        let bad = || CatalogError::BadBootFileName(name.to_string());

        if name.starts_with(KERNEL_STEM) {
            return name
                .strip_prefix("vmlinuz-")
                .filter(|v| !v.is_empty())
                .map(BootFileName::Kernel)
                .ok_or_else(bad);
        }

        if name.starts_with(INITRD_STEM) {
            return name
                .strip_prefix("initrd.img-")
                .filter(|v| !v.is_empty())
                .map(BootFileName::Initrd)
                .ok_or_else(bad);
        }

        if name.starts_with(INITRAMFS_STEM) {
            return name
                .strip_prefix("initramfs-")
                .and_then(|rest| rest.strip_suffix(INITRAMFS_EXT))
                .filter(|v| !v.is_empty())
                .map(BootFileName::Initrd)
                .ok_or_else(bad);
        }

        Ok(BootFileName::Other)
    }
}

struct DirEntry {
    name: String,
    is_dir: bool,
}

/// List a directory sorted by name, following symlinks for the dir check
fn list_dir(path: &Path) -> Result<Vec<DirEntry>> {
    let read_err = |source| CatalogError::ReadDir {
        path: path.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!(name = ?raw, dir = %path.display(), "Ignoring non UTF-8 entry");
                continue;
            }
        };
        entries.push(DirEntry {
            is_dir: entry.path().is_dir(),
            name,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Scan a rootfs tree.
///
/// Distros and releases come out sorted by directory name so that two scans
/// of the same tree produce the same catalog. Distros without releases and
/// releases without a single kernel/initrd pair are left out.
pub fn scan_rootfs(root: impl AsRef<Path>) -> Catalog {
    let root = root.as_ref();
    debug!(root = %root.display(), "Scanning rootfs");

    let entries = match list_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = %e, "Failed to read rootfs dir");
            return Vec::new();
        }
    };

    let mut catalog = Vec::new();
    for entry in entries {
        if !entry.is_dir {
            debug!(file = %entry.name, "Ignoring non-directory");
            continue;
        }
        if let Some(distro) = scan_distro(root, &entry.name) {
            catalog.push(distro);
        }
    }

    catalog
}

fn scan_distro(root: &Path, name: &str) -> Option<Distro> {
    let distro_path = root.join(name);
    let entries = match list_dir(&distro_path) {
        Ok(entries) => entries,
        Err(e) => {
            error!(distro = %name, error = %e, "Failed to read distro dir");
            return None;
        }
    };

    let mut releases = Vec::new();
    for entry in entries {
        if !entry.is_dir {
            debug!(file = %entry.name, distro = %name, "Ignoring non-directory");
            continue;
        }
        if let Some(release) = scan_release(root, name, &entry.name) {
            releases.push(release);
        }
    }

    if releases.is_empty() {
        warn!(distro = %name, "No releases found");
        return None;
    }

    Some(Distro {
        name: name.to_string(),
        releases,
    })
}

fn scan_release(root: &Path, distro: &str, name: &str) -> Option<Release> {
    let release_path = root.join(distro).join(name);
    let entries = match list_dir(&release_path.join(BOOT_DIR)) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(distro = %distro, release = %name, error = %e, "Failed to read boot dir");
            return None;
        }
    };

    let mut kernels: BTreeMap<String, String> = BTreeMap::new();
    let mut initrds: BTreeMap<String, String> = BTreeMap::new();

    for entry in &entries {
        if entry.is_dir {
            debug!(dir = %entry.name, "Ignoring directory");
            continue;
        }

        let relative = format!("{}/{}/{}/{}", distro, name, BOOT_DIR, entry.name);
        match BootFileName::classify(&entry.name) {
            Ok(BootFileName::Kernel(version)) => {
                debug!(kversion = %version, kernel = %relative, "Found kernel");
                kernels.insert(version.to_string(), relative);
            }
            Ok(BootFileName::Initrd(version)) => {
                debug!(iversion = %version, initrd = %relative, "Found initrd");
                initrds.insert(version.to_string(), relative);
            }
            Ok(BootFileName::Other) => {
                debug!(file = %entry.name, "Ignoring non-kernel/initrd file");
            }
            Err(e) => {
                warn!(distro = %distro, release = %name, error = %e, "Failed to parse boot file version");
            }
        }
    }

    for (version, initrd) in &initrds {
        if !kernels.contains_key(version) {
            warn!(version = %version, initrd = %initrd, "No matching kernel found for initrd, ignoring");
        }
    }

    let mut boot_files = Vec::with_capacity(kernels.len() + 1);
    for (version, kernel_path) in kernels {
        let Some(initrd_path) = initrds.remove(&version) else {
            warn!(version = %version, kernel = %kernel_path, "No matching initrd found for kernel, ignoring");
            continue;
        };
        boot_files.push(BootFile {
            version: VersionKey::parse(version),
            kernel_path,
            initrd_path,
        });
    }

    // stable: equal keys stay in raw-token order
    boot_files.sort_by(|a, b| a.version.cmp(&b.version));

    let Some(newest) = boot_files.last() else {
        warn!(distro = %distro, release = %name, "No boot files found");
        return None;
    };
    let latest = BootFile {
        version: newest.version.relabel(LATEST),
        ..newest.clone()
    };
    boot_files.insert(0, latest);

    Some(Release {
        name: name.to_string(),
        rootfs_path: release_path.to_string_lossy().into_owned(),
        boot_files,
    })
}
