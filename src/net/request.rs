//! Request description and the synchronous execution pipeline.
//!
//! [`Request::execute`] runs, strictly in this order:
//! 1. every mod's `before` hook, in list order
//! 2. body resolution (a [`Body::Failed`] aborts here)
//! 3. transport request construction from method, URL and body
//! 4. header application
//! 5. one blocking call through the URL's [`Transport`](crate::net::Transport)
//! 6. response wrapping (the body is not read)
//! 7. every mod's `after` hook, in **reverse** list order
//!
//! The first failing step aborts the call and its error is returned. Nothing
//! that already ran is undone.

use std::collections::HashMap;

use http::{HeaderName, HeaderValue};
use serde::Serialize;

use crate::codec;
use crate::errors::{Error, Result};
use crate::mods::Mods;
use crate::net::Response;
use crate::uri::Url;

/// Outgoing request payload.
#[derive(Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    Text(String),
    /// Building the payload failed upstream; the request will not be sent.
    Failed(Error),
}

impl Body {
    /// JSON-encodes `value`. A marshal failure is carried in the body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        codec::to_json(value).map_or_else(|e| Body::Failed(Error::Marshal(e)), Body::Bytes)
    }

    /// XML-encodes `value`. A marshal failure is carried in the body.
    pub fn xml<T: Serialize + ?Sized>(value: &T) -> Self {
        codec::to_xml(value).map_or_else(|e| Body::Failed(Error::Marshal(e)), Body::Bytes)
    }

    fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Body::Empty => Ok(Vec::new()),
            Body::Bytes(bytes) => Ok(bytes),
            Body::Text(text) => Ok(text.into_bytes()),
            Body::Failed(e) => Err(Error::Body(Box::new(e))),
        }
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Body::Empty
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Body::Bytes(bytes.to_vec())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl<T: Into<Body>> From<Option<T>> for Body {
    fn from(body: Option<T>) -> Self {
        body.map_or(Body::Empty, Into::into)
    }
}

impl<T: Into<Body>> From<Result<T>> for Body {
    fn from(body: Result<T>) -> Self {
        body.map_or_else(Body::Failed, Into::into)
    }
}

/// A single request execution. Created per call and consumed by [`Request::execute`].
pub struct Request<'a> {
    method: String,
    url: Url,
    /// Header name to value, keys as supplied; `before` hooks may add or overwrite entries
    pub headers: HashMap<String, String>,
    body: Body,
    mods: Mods<'a>,
}

impl<'a> Request<'a> {
    pub fn new<M: Into<String>>(method: M, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            headers: HashMap::new(),
            body: Body::Empty,
            mods: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body<B: Into<Body>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_mods(mut self, mods: Mods<'a>) -> Self {
        self.mods = mods;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn set_body<B: Into<Body>>(&mut self, body: B) {
        self.body = body.into();
    }

    /// Runs the mod pipeline around one transport call.
    pub fn execute(mut self) -> Result<Response> {
        // Mods are detached so each hook can borrow the request mutably.
        let mut mods = std::mem::take(&mut self.mods);

        for (idx, m) in mods.iter_mut().enumerate() {
            log::trace!("{} {}: before hook #{idx}", self.method, self.url);
            m.before(&mut self)?;
        }

        let body = std::mem::take(&mut self.body).into_bytes()?;

        let target = self.url.parsed().ok_or(Error::InvalidUrl)?.as_str();
        let mut request = http::Request::builder()
            .method(self.method.as_str())
            .uri(target)
            .body(body)
            .map_err(|e| Error::Init(e.into()))?;

        for (k, v) in &self.headers {
            let name = HeaderName::from_bytes(k.as_bytes()).map_err(|e| Error::Init(e.into()))?;
            let value = HeaderValue::from_str(v).map_err(|e| Error::Init(e.into()))?;
            request.headers_mut().insert(name, value);
        }

        log::debug!("{} {}", self.method, target);
        let raw = self.url.transport()?.send(request)?;

        let mut response = Response::new(raw);
        log::debug!("{} {} -> {}", self.method, target, response.status());

        for (idx, m) in mods.iter_mut().enumerate().rev() {
            log::trace!("{} {}: after hook #{idx}", self.method, self.url);
            m.after(&mut response, &self)?;
        }

        Ok(response)
    }
}
