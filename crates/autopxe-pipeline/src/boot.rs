//! Second pipeline stage: generated menus and rootfs files
//!
//! - `autopxe-<mac>`: scan the rootfs and answer with a fresh menu script
//! - `boot/<relative path>`: stream `<rootfs>/<relative path>`
//!
//! The catalog is rebuilt on every menu request; nothing is cached.

use crate::bootloader::MAC_PREFIX;
use crate::compose::MenuComposer;
use crate::config::PipelineConfig;
use crate::context::{RequestContext, Response};
use crate::pipeline::{Outcome, RequestHandler};
use async_trait::async_trait;
use autopxe_catalog::scan_rootfs;
use std::net::IpAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Prefix of raw file requests
pub const FILE_PREFIX: &str = "boot/";

/// Join a request-relative path onto `root`, refusing anything that could
/// leave it
fn resolve(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative.trim_start_matches('/'));
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !contained || relative.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(relative))
}

/// Answers menu requests and serves kernels/initrds from the rootfs
#[derive(Debug, Clone)]
pub struct RootfsHandler {
    config: Arc<PipelineConfig>,
}

impl RootfsHandler {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }

    async fn menu(&self, mac: Option<&str>, ip: IpAddr) -> Outcome {
        let root = self.config.rootfs_path.clone();
        let catalog = match tokio::task::spawn_blocking(move || scan_rootfs(root)).await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(error = %e, "Rootfs scan task failed");
                Vec::new()
            }
        };

        let script = MenuComposer::new(&self.config).compose(&catalog, mac, ip);
        Outcome::Terminate(Response::Script(script))
    }

    async fn file(&self, relative: &str) -> Outcome {
        let Some(path) = resolve(&self.config.rootfs_path, relative) else {
            warn!(path = %relative, "Blocked path outside rootfs");
            return Outcome::Continue;
        };

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to open file");
                return Outcome::Continue;
            }
        };

        match file.metadata().await {
            Ok(meta) if meta.is_file() => {
                debug!(path = %path.display(), bytes = meta.len(), "Serving file");
                Outcome::Terminate(Response::File(file))
            }
            Ok(_) => {
                warn!(path = %path.display(), "Not a regular file");
                Outcome::Continue
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to stat file");
                Outcome::Continue
            }
        }
    }
}

#[async_trait]
impl RequestHandler for RootfsHandler {
    fn name(&self) -> &'static str {
        "rootfs"
    }

    async fn handle(&self, ctx: &mut RequestContext<'_>) -> Outcome {
        let path = ctx.path().to_string();

        if path.starts_with(MAC_PREFIX) {
            let mac = ctx.mac().map(str::to_string);
            let ip = ctx.ip();
            return self.menu(mac.as_deref(), ip).await;
        }

        if let Some(relative) = path.strip_prefix(FILE_PREFIX) {
            return self.file(relative).await;
        }

        Outcome::Continue
    }
}
