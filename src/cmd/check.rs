use autopxe_catalog::scan_rootfs;
use autopxe_pipeline::{BootloaderImages, MenuComposer, PipelineConfig, IPXE_EFI, UNDIONLY_KPXE};
use color_eyre::eyre::{eyre, Result};
use tracing::{info, warn};

/// Load everything a server would load and report it
pub async fn run_check(config: &PipelineConfig) -> Result<()> {
    if !tokio::fs::metadata(&config.rootfs_path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        return Err(eyre!(
            "Rootfs {} is not a directory",
            config.rootfs_path.display()
        ));
    }

    let images = BootloaderImages::load(&config.bootloaders).await?;
    for name in [IPXE_EFI, UNDIONLY_KPXE] {
        match images.get(name) {
            Some(image) => info!(file = name, bytes = image.len(), "Bootloader ready"),
            None => warn!(file = name, "Bootloader not configured"),
        }
    }

    let root = config.rootfs_path.clone();
    let catalog = tokio::task::spawn_blocking(move || scan_rootfs(root))
        .await
        .map_err(|e| eyre!("Rootfs scan task failed: {}", e))?;

    let composer = MenuComposer::new(config);
    let targets = composer.targets(&catalog);
    info!(
        distros = catalog.len(),
        targets = targets.len(),
        "Menu targets"
    );

    if let Some(ref id) = config.default_image {
        if !targets.contains(id.as_str()) {
            warn!(default_image = %id, "Default image matches no menu entry");
        }
    }
    for (mac, id) in &config.host_defaults {
        if !targets.contains(id.as_str()) {
            warn!(mac = %mac, image = %id, "Host default matches no menu entry");
        }
    }

    println!(
        "ok: {} distros, {} menu entries",
        catalog.len(),
        targets.len()
    );
    Ok(())
}
