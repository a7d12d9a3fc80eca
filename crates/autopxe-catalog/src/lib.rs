//! AutoPXE rootfs catalog
//!
//! Discovers bootable images on a shared rootfs tree laid out as
//!
//! ```text
//! <root>/<distro>/<release>/boot/{vmlinuz-<ver>, initrd.img-<ver>, initramfs-<ver>.img}
//! ```
//!
//! and pairs every kernel with the initrd of the same version token.
//!
//! # Example
//!
//! ```no_run
//! use autopxe_catalog::scan_rootfs;
//!
//! let catalog = scan_rootfs("/rootfs");
//! for distro in &catalog {
//!     for release in &distro.releases {
//!         println!("{}/{}: {} images", distro.name, release.name, release.boot_files.len());
//!     }
//! }
//! ```

pub mod error;
pub mod scanner;
pub mod version;

pub use error::*;
pub use scanner::*;
pub use version::*;
