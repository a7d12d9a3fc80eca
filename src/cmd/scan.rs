use autopxe_catalog::{scan_rootfs, Catalog};
use autopxe_pipeline::PipelineConfig;
use clap::Args;
use color_eyre::eyre::{eyre, Result};
use std::fmt::Write;
use tracing::info;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Print the catalog as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Render the catalog as an indented tree
fn format_tree(catalog: &Catalog) -> String {
    let mut out = String::new();
    for distro in catalog {
        let _ = writeln!(out, "{}", distro.name);
        for release in &distro.releases {
            let _ = writeln!(out, "  {} ({})", release.name, release.rootfs_path);
            for boot in &release.boot_files {
                let _ = writeln!(
                    out,
                    "    {:<16} {} {}",
                    boot.version, boot.kernel_path, boot.initrd_path
                );
            }
        }
    }
    out
}

pub async fn run_scan(args: ScanArgs, config: &PipelineConfig) -> Result<()> {
    let root = config.rootfs_path.clone();
    let catalog = tokio::task::spawn_blocking(move || scan_rootfs(root))
        .await
        .map_err(|e| eyre!("Rootfs scan task failed: {}", e))?;

    let images: usize = catalog
        .iter()
        .flat_map(|d| &d.releases)
        .map(|r| r.boot_files.len())
        .sum();
    info!(distros = catalog.len(), images, "Scan complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print!("{}", format_tree(&catalog));
    }
    Ok(())
}
