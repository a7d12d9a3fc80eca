use autopxe_pipeline::{BootloaderImages, Dispatch, Pipeline, PipelineConfig, RequestContext};
use clap::Args;
use color_eyre::eyre::Result;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Requested path, e.g. `autopxe-aa:bb:cc:dd:ee:ff` or `boot/debian/...`
    pub path: String,

    /// Client address reported to the pipeline
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub ip: IpAddr,
}

/// Run one request with stdout as the sink; `false` when nothing answered
pub async fn run_render(args: RenderArgs, config: PipelineConfig) -> Result<bool> {
    let images = BootloaderImages::load(&config.bootloaders).await?;
    let pipeline = Pipeline::standard(Arc::new(config), images);
    debug!(?pipeline, "Pipeline ready");

    let mut stdout = tokio::io::stdout();
    let ctx = RequestContext::new(args.ip, args.path.as_str(), &mut stdout);

    match pipeline.dispatch(ctx).await? {
        Dispatch::Handled { bytes } => {
            debug!(bytes, "Response written");
            Ok(true)
        }
        Dispatch::Unhandled => {
            warn!(path = %args.path, "No handler answered");
            Ok(false)
        }
    }
}
