//! AutoPXE request pipeline
//!
//! Routes boot-file requests coming from a transport (TFTP or similar) to
//! an answer:
//!
//! | request path            | answer                                   |
//! |-------------------------|------------------------------------------|
//! | `ipxe.efi`              | UEFI iPXE binary                         |
//! | `undionly.kpxe`         | BIOS iPXE binary                         |
//! | `autopxe-<mac>`         | iPXE menu generated from a fresh scan    |
//! | `boot/<relative path>`  | `<rootfs>/<relative path>` streamed      |
//! | anything else           | nothing ([`Dispatch::Unhandled`])        |
//!
//! The transport creates a [`RequestContext`] per request with the client
//! address, the path and a sink, and hands it to [`Pipeline::dispatch`].
//!
//! # Example
//!
//! ```no_run
//! use autopxe_pipeline::{BootloaderImages, Pipeline, PipelineConfig, RequestContext};
//! use std::net::{IpAddr, Ipv4Addr};
//! use std::sync::Arc;
//!
//! # async fn run() -> autopxe_pipeline::Result<()> {
//! let config = Arc::new(PipelineConfig::new("/rootfs"));
//! let images = BootloaderImages::load(&config.bootloaders).await?;
//! let pipeline = Pipeline::standard(config, images);
//!
//! let mut reply = Vec::new();
//! let ctx = RequestContext::new(
//!     IpAddr::V4(Ipv4Addr::new(10, 0, 0, 42)),
//!     "autopxe-aa:bb:cc:dd:ee:ff",
//!     &mut reply,
//! );
//! pipeline.dispatch(ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod boot;
pub mod bootloader;
pub mod compose;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;

pub use boot::*;
pub use bootloader::*;
pub use compose::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use pipeline::*;
