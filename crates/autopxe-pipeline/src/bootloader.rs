//! First pipeline stage: iPXE binaries and client MAC capture
//!
//! Firmware fetches `ipxe.efi` or `undionly.kpxe` by name; both are served
//! from memory. iPXE then requests `autopxe-<mac>`, which this stage only
//! tags with the MAC before passing it on.

use crate::config::BootloaderPaths;
use crate::context::{RequestContext, Response};
use crate::error::{PipelineError, Result};
use crate::pipeline::{Outcome, RequestHandler};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use tracing::{debug, info, warn};

/// UEFI iPXE binary name
pub const IPXE_EFI: &str = "ipxe.efi";

/// Legacy BIOS iPXE binary name
pub const UNDIONLY_KPXE: &str = "undionly.kpxe";

/// Prefix of the menu request; the MAC follows it
pub const MAC_PREFIX: &str = "autopxe-";

/// iPXE binaries, read once at startup
#[derive(Debug, Clone, Default)]
pub struct BootloaderImages {
    pub efi: Option<Bytes>,
    pub bios: Option<Bytes>,
}

impl BootloaderImages {
    /// Read the configured binaries; unset paths stay empty
    pub async fn load(paths: &BootloaderPaths) -> Result<Self> {
        Ok(Self {
            efi: read_image(paths.efi.as_deref()).await?,
            bios: read_image(paths.bios.as_deref()).await?,
        })
    }

    /// Payload served for `name`, if it is a bootloader name and configured
    pub fn get(&self, name: &str) -> Option<&Bytes> {
        match name {
            IPXE_EFI => self.efi.as_ref(),
            UNDIONLY_KPXE => self.bios.as_ref(),
            _ => None,
        }
    }
}

async fn read_image(path: Option<&Path>) -> Result<Option<Bytes>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let data = tokio::fs::read(path)
        .await
        .map_err(|source| PipelineError::BootloaderLoad {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), bytes = data.len(), "Loaded bootloader image");
    Ok(Some(Bytes::from(data)))
}

/// Serves iPXE binaries and records the MAC of menu requests
#[derive(Debug, Clone)]
pub struct IpxeHandler {
    images: BootloaderImages,
}

impl IpxeHandler {
    pub fn new(images: BootloaderImages) -> Self {
        Self { images }
    }
}

#[async_trait]
impl RequestHandler for IpxeHandler {
    fn name(&self) -> &'static str {
        "ipxe"
    }

    async fn handle(&self, ctx: &mut RequestContext<'_>) -> Outcome {
        match ctx.path() {
            name @ (IPXE_EFI | UNDIONLY_KPXE) => match self.images.get(name) {
                Some(image) => Outcome::Terminate(Response::Bytes(image.clone())),
                None => {
                    warn!(file = %name, "Bootloader image requested but not configured");
                    Outcome::Continue
                }
            },
            path => {
                if let Some(mac) = path.strip_prefix(MAC_PREFIX).map(str::to_string) {
                    debug!(mac = %mac, "Client MAC from request path");
                    ctx.set_mac(&mac);
                }
                Outcome::Continue
            }
        }
    }
}
