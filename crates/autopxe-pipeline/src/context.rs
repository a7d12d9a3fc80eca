//! Per-request state
//!
//! A [`RequestContext`] lives for exactly one boot request. The transport
//! fills in the client address, the requested path and the sink the reply
//! goes to; handlers may fill in the MAC. Only the pipeline writes to the
//! sink, once, after a handler terminates the chain.

use crate::error::{PipelineError, Result};
use bytes::Bytes;
use std::fmt;
use std::net::IpAddr;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Lower-case a MAC and use `:` separators
pub fn normalize_mac(mac: &str) -> String {
    mac.to_lowercase().replace('-', ":")
}

/// What a terminating handler wants sent back
pub enum Response {
    /// Generated iPXE script
    Script(String),
    /// In-memory payload
    Bytes(Bytes),
    /// File streamed from disk
    File(tokio::fs::File),
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Script(s) => f.debug_tuple("Script").field(&s.len()).finish(),
            Response::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Response::File(_) => f.write_str("File"),
        }
    }
}

/// Output sink handed over by the transport
pub type ResponseSink<'a> = &'a mut (dyn AsyncWrite + Send + Unpin);

/// State of one boot request
pub struct RequestContext<'a> {
    mac: Option<String>,
    ip: IpAddr,
    path: String,
    sink: ResponseSink<'a>,
}

impl<'a> RequestContext<'a> {
    /// Create a context; leading slashes are stripped from `path`
    pub fn new(ip: IpAddr, path: impl Into<String>, sink: ResponseSink<'a>) -> Self {
        let path = path.into();
        Self {
            mac: None,
            ip,
            path: path.trim_start_matches('/').to_string(),
            sink,
        }
    }

    /// Client MAC, once a handler has recognized it
    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref()
    }

    /// Record the client MAC
    pub fn set_mac(&mut self, mac: &str) {
        self.mac = Some(normalize_mac(mac));
    }

    /// Client address
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Requested path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Write `response` to the sink, returning the byte count
    pub(crate) async fn deliver(&mut self, response: Response) -> Result<u64> {
        let written = match response {
            Response::Script(script) => {
                self.sink
                    .write_all(script.as_bytes())
                    .await
                    .map_err(PipelineError::Transfer)?;
                script.len() as u64
            }
            Response::Bytes(bytes) => {
                self.sink
                    .write_all(&bytes)
                    .await
                    .map_err(PipelineError::Transfer)?;
                bytes.len() as u64
            }
            Response::File(mut file) => tokio::io::copy(&mut file, &mut *self.sink)
                .await
                .map_err(PipelineError::Transfer)?,
        };

        self.sink.flush().await.map_err(PipelineError::Transfer)?;
        Ok(written)
    }
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("mac", &self.mac)
            .field("ip", &self.ip)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 42));

    #[test]
    fn test_normalize_mac() {
        assert_eq!(normalize_mac("AA-BB-CC-DD-EE-FF"), "aa:bb:cc:dd:ee:ff");
        assert_eq!(normalize_mac("aa:bb:cc:dd:ee:ff"), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn test_context_fields() {
        let mut sink = Vec::new();
        let mut ctx = RequestContext::new(CLIENT, "/autopxe-AA-BB-CC-DD-EE-FF", &mut sink);

        assert_eq!(ctx.path(), "autopxe-AA-BB-CC-DD-EE-FF");
        assert_eq!(ctx.ip(), CLIENT);
        assert!(ctx.mac().is_none());

        ctx.set_mac("AA-BB-CC-DD-EE-FF");
        assert_eq!(ctx.mac(), Some("aa:bb:cc:dd:ee:ff"));
    }

    #[tokio::test]
    async fn test_deliver_script_and_bytes() {
        let mut sink = Vec::new();
        {
            let mut ctx = RequestContext::new(CLIENT, "x", &mut sink);
            let n = ctx
                .deliver(Response::Script("#!ipxe\n".to_string()))
                .await
                .unwrap();
            assert_eq!(n, 7);
        }
        assert_eq!(sink, b"#!ipxe\n");

        let mut sink = Vec::new();
        {
            let mut ctx = RequestContext::new(CLIENT, "x", &mut sink);
            let n = ctx
                .deliver(Response::Bytes(Bytes::from_static(b"\x7fELF")))
                .await
                .unwrap();
            assert_eq!(n, 4);
        }
        assert_eq!(sink, b"\x7fELF");
    }

    #[test]
    fn test_response_debug_hides_payload() {
        let r = Response::Bytes(Bytes::from_static(b"secret"));
        assert_eq!(format!("{:?}", r), "Bytes(6)");
    }
}
