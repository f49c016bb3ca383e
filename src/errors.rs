//! Error types for the request pipeline.
//!
//! Every failure is returned to the caller of a verb method or
//! [`Request::execute`](crate::Request::execute). Nothing is retried and
//! nothing is swallowed. Side effects of mods that already ran are kept.

use std::io;

/// Codec failures raised while converting between values and JSON/XML payloads.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xml: {0}")]
    XmlDecode(#[from] quick_xml::de::DeError),

    #[error("xml: {0}")]
    XmlEncode(#[from] quick_xml::se::SeError),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A verb method was called on a URL that was never successfully parsed.
    #[error("invalid URL")]
    InvalidUrl,

    #[error("cannot parse URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The request body carried an upstream failure instead of payload bytes.
    #[error("error in request body: {0}")]
    Body(#[source] Box<Error>),

    #[error("error marshalling: {0}")]
    Marshal(#[source] CodecError),

    #[error("error unmarshalling response: {0}")]
    Unmarshal(#[source] CodecError),

    /// The method, URL, headers or body could not be turned into a transport request.
    #[error("error initializing request: {0}")]
    Init(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Network, DNS or TLS failure reported by the transport as-is.
    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    #[error("error reading response body: {0}")]
    BodyRead(#[source] io::Error),

    #[error("invalid content-type: {0:?}")]
    UnsupportedContentType(String),

    /// Raised by [`DecodeOn200`](crate::mods::DecodeOn200) with the raw body for diagnostics.
    #[error("statuscode {status} body {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Failure raised by a user supplied mod.
    #[error(transparent)]
    Mod(#[from] anyhow::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(Box::new(err))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
