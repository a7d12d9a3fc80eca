// Main binary: scans the rootfs and runs boot requests through the pipeline
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use std::io::stderr;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use autopxe_pipeline::PipelineConfig;

mod cmd;

use cmd::render::RenderArgs;
use cmd::scan::ScanArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "AutoPXE network boot menus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    config: ConfigArgs,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,
}

/// Where the configuration comes from; flags win over the file
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// YAML config file
    #[arg(long, env = "AUTOPXE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Rootfs root, overrides `rootfs_path`
    #[arg(long, env = "AUTOPXE_ROOTFS", global = true)]
    rootfs: Option<PathBuf>,

    /// Default menu entry, overrides `default_image`
    #[arg(long, env = "DEFAULT_DISTRO_VER", global = true)]
    default_image: Option<String>,
}

impl ConfigArgs {
    /// Load the config file (if any) and apply flag overrides
    pub async fn load(&self) -> Result<PipelineConfig> {
        let mut config = match self.config {
            Some(ref path) => {
                debug!(path = %path.display(), "Loading config");
                PipelineConfig::load(path).await?
            }
            None => PipelineConfig::default(),
        };

        if let Some(ref rootfs) = self.rootfs {
            config = config.with_rootfs_path(rootfs);
        }
        if let Some(ref id) = self.default_image {
            config = config.with_default_image(id);
        }

        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the rootfs and print the catalog
    Scan(ScanArgs),
    /// Run one boot request and write the answer to stdout
    Render(RenderArgs),
    /// Validate the config and bootloader images
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let default_directives = format!(
        "autopxe={level},autopxe_catalog={level},autopxe_pipeline={level}",
        level = default_level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    // stdout carries scripts and catalogs, logs go to stderr
    registry()
        .with(filter)
        .with(fmt::layer().with_writer(stderr))
        .init();

    let config = cli.config.load().await?;
    info!(rootfs = %config.rootfs_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Scan(args) => cmd::scan::run_scan(args, &config).await,
        Commands::Render(args) => {
            let handled = cmd::render::run_render(args, config).await?;
            if !handled {
                std::process::exit(2);
            }
            Ok(())
        }
        Commands::Check => cmd::check::run_check(&config).await,
    }
}
