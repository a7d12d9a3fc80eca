//! Handler chain
//!
//! Handlers run in a fixed order. Each one looks at the request and either
//! terminates the chain with a [`Response`] or lets the next handler try.
//! A request nobody terminates is [`Dispatch::Unhandled`] and gets no
//! response; the transport decides how to report that.

use crate::bootloader::{BootloaderImages, IpxeHandler};
use crate::boot::RootfsHandler;
use crate::config::PipelineConfig;
use crate::context::{RequestContext, Response};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of one handler
#[derive(Debug)]
pub enum Outcome {
    /// Send this response and stop
    Terminate(Response),
    /// Try the next handler
    Continue,
}

/// Result of running the whole chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler answered; `bytes` were written to the sink
    Handled { bytes: u64 },
    /// No handler answered; nothing was written
    Unhandled,
}

/// One stage of the pipeline
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Inspect the request
    async fn handle(&self, ctx: &mut RequestContext<'_>) -> Outcome;
}

/// Ordered handler chain
#[derive(Clone, Default)]
pub struct Pipeline {
    handlers: Vec<Arc<dyn RequestHandler>>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain: iPXE binaries and MAC capture, then menus and files
    pub fn standard(config: Arc<PipelineConfig>, images: BootloaderImages) -> Self {
        Self::new()
            .with_handler(IpxeHandler::new(images))
            .with_handler(RootfsHandler::new(config))
    }

    /// Append a handler to the chain
    pub fn with_handler(mut self, handler: impl RequestHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Number of handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route one request and write the response, if any, to its sink
    pub async fn dispatch(&self, mut ctx: RequestContext<'_>) -> Result<Dispatch> {
        for handler in &self.handlers {
            match handler.handle(&mut ctx).await {
                Outcome::Continue => {
                    debug!(handler = handler.name(), path = %ctx.path(), "Passed");
                }
                Outcome::Terminate(response) => {
                    let bytes = ctx.deliver(response).await?;
                    info!(
                        ip = %ctx.ip(),
                        mac = ctx.mac().unwrap_or("-"),
                        path = %ctx.path(),
                        handler = handler.name(),
                        bytes,
                        "Boot request"
                    );
                    return Ok(Dispatch::Handled { bytes });
                }
            }
        }

        info!(
            ip = %ctx.ip(),
            mac = ctx.mac().unwrap_or("-"),
            path = %ctx.path(),
            "Boot request not handled"
        );
        Ok(Dispatch::Unhandled)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("Pipeline").field("handlers", &names).finish()
    }
}
