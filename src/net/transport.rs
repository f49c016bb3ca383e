//! The transport seam between the request pipeline and the network.
//!
//! The pipeline hands a fully built `http::Request` to a [`Transport`] and gets
//! back status, headers and an unread body stream. Connections, TLS and
//! protocol framing are entirely the transport's business.
//!
//! [`ReqwestTransport`] is the platform implementation. A single shared
//! instance (see [`default_transport`]) is used by every URL that was not
//! given an explicit transport.

use std::io::Read;
use std::sync::Arc;

use http::{HeaderName, HeaderValue};
use lazy_static::lazy_static;

use crate::config::TransportConfig;
use crate::errors::{Error, Result};

/// Raw response as produced by a transport; the body has not been read yet.
pub type RawResponse = http::Response<Box<dyn Read + Send>>;

/// Shared handle to a transport.
pub type TransportHandle = Arc<dyn Transport>;

/// Sends one HTTP request and returns the raw response.
///
/// Implementations must be safe for concurrent use: every call builds its
/// own request, so no per-call state may be kept on the transport.
pub trait Transport: Send + Sync {
    fn send(&self, request: http::Request<Vec<u8>>) -> Result<RawResponse>;
}

lazy_static! {
    static ref DEFAULT_TRANSPORT: std::result::Result<TransportHandle, Arc<Error>> =
        ReqwestTransport::new()
            .map(|t| Arc::new(t) as TransportHandle)
            .map_err(Arc::new);
}

/// Returns the process-wide shared transport.
///
/// Fails only when the underlying client could not be built (for instance
/// when no TLS backend can be initialized); every call then reports that error.
pub fn default_transport() -> Result<TransportHandle> {
    match &*DEFAULT_TRANSPORT {
        Ok(transport) => Ok(transport.clone()),
        Err(e) => Err(Error::Transport(Box::new(e.clone()))),
    }
}

/// Transport backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Creates a transport with reqwest's default client settings, minus the
    /// total request timeout: a call blocks until the server answers or fails.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(None).build()?;
        Ok(Self { client })
    }

    /// Creates a transport honoring `config`.
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        let mut default_headers = http::HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::Init(e.into()))?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::Init(e.into()))?;
            default_headers.insert(name, value);
        }

        let redirects = if config.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(config.max_redirects)
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .user_agent(config.user_agent.clone())
            .default_headers(default_headers)
            .redirect(redirects)
            .cookie_store(config.cookie_store)
            .gzip(config.accept_compressed)
            .brotli(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()?;

        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: http::Request<Vec<u8>>) -> Result<RawResponse> {
        // reqwest only accepts absolute URIs; anything else is a request we failed to build.
        let request = reqwest::blocking::Request::try_from(request).map_err(|e| Error::Init(e.into()))?;
        let res = self.client.execute(request)?;

        let status = res.status();
        let version = res.version();
        let headers = res.headers().clone();

        // The reqwest response is itself the body stream; nothing is read here.
        let mut raw: RawResponse = http::Response::new(Box::new(res));
        *raw.status_mut() = status;
        *raw.version_mut() = version;
        *raw.headers_mut() = headers;

        Ok(raw)
    }
}
