//! URL building and the verb entry points.
//!
//! A [`Url`] is produced from a base URI and an optional [`Query`]. It is
//! either parsed (valid) or empty, as returned by [`Url::new`]. Every verb
//! method on an empty URL fails with [`Error::InvalidUrl`] before anything
//! touches the network.
//!
//! ## Query handling
//! - `None` keeps whatever query string the base URI already had.
//! - `Some(query)` **replaces** the base query string, even when `query` is
//!   empty (the result then has no query at all).
//!
//! ```rust
//! use reqmod::uri::{Query, Url};
//! # fn main() -> Result<(), reqmod::Error> {
//! let kept = Url::from_uri("https://api.example.com/v1/items?page=2", None)?;
//! assert_eq!(kept.to_string(), "https://api.example.com/v1/items?page=2");
//!
//! let replaced = Url::from_uri(
//!     "https://api.example.com/v1/items?page=2",
//!     Some(&Query::new().set("q", "red shoes").set("limit", 50)),
//! )?;
//! assert_eq!(replaced.to_string(), "https://api.example.com/v1/items?limit=50&q=red+shoes");
//! # Ok(()) }
//! ```

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use url::Url as ParsedUrl;

use crate::errors::{Error, Result};
use crate::mods::{DecodeOn200, Mods};
use crate::net::{default_transport, Body, Request, Response, TransportHandle};

/// Query parameters keyed by name. Values are stringified on insert.
///
/// Keys are unique and encoded in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(BTreeMap<String, String>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to the display form of `value`, replacing any previous value.
    pub fn set<K: Into<String>, V: fmt::Display>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<K: Into<String>, V: fmt::Display>(&mut self, key: K, value: V) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: fmt::Display, const N: usize> From<[(K, V); N]> for Query {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: fmt::Display> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (k, v) in iter {
            query.insert(k, v);
        }
        query
    }
}

/// A request target. Cheap to clone.
#[derive(Clone, Default)]
pub struct Url {
    inner: Option<ParsedUrl>,
    transport: Option<TransportHandle>,
}

impl fmt::Debug for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Url")
            .field("url", &self.inner.as_ref().map(ParsedUrl::as_str))
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl fmt::Display for Url {
    /// Writes the full URL, or nothing when the URL was never parsed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(url) => f.write_str(url.as_str()),
            None => Ok(()),
        }
    }
}

impl Url {
    /// Creates an empty URL. Verb methods fail on it until [`Url::rebuild`] succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `uri` as an absolute URL and applies `query` (see the module docs).
    pub fn from_uri(uri: &str, query: Option<&Query>) -> Result<Self> {
        let mut url = Url::new();
        url.rebuild(uri, query)?;
        Ok(url)
    }

    /// Re-parses this URL in place. On failure the URL is left unchanged.
    pub fn rebuild(&mut self, uri: &str, query: Option<&Query>) -> Result<()> {
        let mut parsed = ParsedUrl::parse(uri)?;

        match query {
            None => {}
            Some(q) if q.is_empty() => parsed.set_query(None),
            Some(q) => {
                parsed.query_pairs_mut().clear().extend_pairs(q.iter());
            }
        }

        self.inner = Some(parsed);
        Ok(())
    }

    /// Routes requests for this URL through `transport` instead of the shared default.
    pub fn with_transport(mut self, transport: TransportHandle) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The transport set with [`Url::with_transport`], or the shared default.
    pub fn transport(&self) -> Result<TransportHandle> {
        match &self.transport {
            Some(transport) => Ok(transport.clone()),
            None => default_transport(),
        }
    }

    /// The parsed URL, or `None` when this URL was never successfully built.
    pub fn parsed(&self) -> Option<&ParsedUrl> {
        self.inner.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    fn call<'a>(&self, method: &str, body: Body, headers: HashMap<String, String>, mods: Mods<'a>) -> Result<Response> {
        if !self.is_valid() {
            return Err(Error::InvalidUrl);
        }

        Request::new(method, self.clone())
            .with_headers(headers)
            .with_body(body)
            .with_mods(mods)
            .execute()
    }

    pub fn get(&self, headers: HashMap<String, String>, mods: Mods<'_>) -> Result<Response> {
        self.call("GET", Body::Empty, headers, mods)
    }

    pub fn post<B: Into<Body>>(&self, body: B, headers: HashMap<String, String>, mods: Mods<'_>) -> Result<Response> {
        self.call("POST", body.into(), headers, mods)
    }

    pub fn put<B: Into<Body>>(&self, body: B, headers: HashMap<String, String>, mods: Mods<'_>) -> Result<Response> {
        self.call("PUT", body.into(), headers, mods)
    }

    pub fn delete(&self, headers: HashMap<String, String>, mods: Mods<'_>) -> Result<Response> {
        self.call("DELETE", Body::Empty, headers, mods)
    }

    /// [`Url::get`] that also decodes a `200 OK` body into `target`, when given.
    pub fn get_decode<'a, T: DeserializeOwned>(
        &self,
        headers: HashMap<String, String>,
        target: Option<&'a mut T>,
        mods: Mods<'a>,
    ) -> Result<Response> {
        self.get(headers, with_decode(mods, target))
    }

    pub fn post_decode<'a, B: Into<Body>, T: DeserializeOwned>(
        &self,
        body: B,
        headers: HashMap<String, String>,
        target: Option<&'a mut T>,
        mods: Mods<'a>,
    ) -> Result<Response> {
        self.post(body, headers, with_decode(mods, target))
    }

    pub fn put_decode<'a, B: Into<Body>, T: DeserializeOwned>(
        &self,
        body: B,
        headers: HashMap<String, String>,
        target: Option<&'a mut T>,
        mods: Mods<'a>,
    ) -> Result<Response> {
        self.put(body, headers, with_decode(mods, target))
    }

    pub fn delete_decode<'a, T: DeserializeOwned>(
        &self,
        headers: HashMap<String, String>,
        target: Option<&'a mut T>,
        mods: Mods<'a>,
    ) -> Result<Response> {
        self.delete(headers, with_decode(mods, target))
    }
}

/// Appends a [`DecodeOn200`] for `target`, making it the first `after` hook to run.
fn with_decode<'a, T: DeserializeOwned>(mut mods: Mods<'a>, target: Option<&'a mut T>) -> Mods<'a> {
    if let Some(target) = target {
        mods.push(Box::new(DecodeOn200::new(target)));
    }
    mods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mods;
    use crate::net::{RawResponse, Transport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter {
        calls: AtomicUsize,
    }

    impl Transport for Counter {
        fn send(&self, _request: http::Request<Vec<u8>>) -> Result<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(http::Response::new(Box::new(std::io::empty()) as Box<dyn std::io::Read + Send>))
        }
    }

    #[test]
    fn nil_query_keeps_original_query() {
        let url = Url::from_uri("http://example.com/search?a=1&b=2", None).unwrap();
        assert_eq!(url.to_string(), "http://example.com/search?a=1&b=2");
    }

    #[test]
    fn empty_query_clears_original_query() {
        let url = Url::from_uri("http://example.com/search?a=1", Some(&Query::new())).unwrap();
        assert_eq!(url.to_string(), "http://example.com/search");
        assert_eq!(url.parsed().unwrap().query(), None);
    }

    #[test]
    fn query_replaces_original_and_encodes_values() {
        let query = Query::new().set("q", "a&b c").set("n", 3).set("flag", true);
        let url = Url::from_uri("http://example.com/s?old=x&q=stale", Some(&query)).unwrap();

        let text = url.to_string();
        assert_eq!(text, "http://example.com/s?flag=true&n=3&q=a%26b+c");
        assert!(!text.contains("old="));
        assert_eq!(text.matches("q=").count(), 1);
    }

    #[test]
    fn query_keys_are_unique() {
        let mut query = Query::from([("k", "1")]);
        query.insert("k", "2");
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("k"), Some("2"));
    }

    #[test]
    fn malformed_base_fails() {
        for bad in ["", "not a url", "/relative/path", "http://exa mple.com/"] {
            let err = Url::from_uri(bad, None).unwrap_err();
            assert!(matches!(err, Error::UrlParse(_)), "{bad:?} -> {err:?}");
        }
    }

    #[test]
    fn rebuild_failure_keeps_previous_url() {
        let mut url = Url::from_uri("http://example.com/a", None).unwrap();
        assert!(url.rebuild("::::", None).is_err());
        assert_eq!(url.to_string(), "http://example.com/a");
    }

    #[test]
    fn unparsed_url_is_invalid_and_displays_empty() {
        let url = Url::new();
        assert!(!url.is_valid());
        assert!(url.parsed().is_none());
        assert_eq!(url.to_string(), "");
    }

    #[test]
    fn verbs_on_unparsed_url_never_reach_transport() {
        let counter = Arc::new(Counter::default());
        let url = Url::new().with_transport(counter.clone());

        assert!(matches!(url.get(HashMap::new(), mods![]), Err(Error::InvalidUrl)));
        assert!(matches!(url.post("x", HashMap::new(), mods![]), Err(Error::InvalidUrl)));
        assert!(matches!(url.put("x", HashMap::new(), mods![]), Err(Error::InvalidUrl)));
        assert!(matches!(url.delete(HashMap::new(), mods![]), Err(Error::InvalidUrl)));

        let mut out = serde_json::Value::Null;
        let res = url.get_decode(HashMap::new(), Some(&mut out), mods![]);
        assert!(matches!(res, Err(Error::InvalidUrl)));

        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn verbs_dispatch_through_custom_transport() {
        let counter = Arc::new(Counter::default());
        let url = Url::from_uri("http://example.com/", None)
            .unwrap()
            .with_transport(counter.clone());

        let resp = url.delete(HashMap::new(), mods![]).unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn decode_variant_without_target_adds_no_mod() {
        let counter = Arc::new(Counter::default());
        let url = Url::from_uri("http://example.com/", None)
            .unwrap()
            .with_transport(counter.clone());

        // The canned response has no content type; a decode mod would fail on it.
        url.get_decode::<serde_json::Value>(HashMap::new(), None, mods![]).unwrap();

        let mut out = serde_json::Value::Null;
        let err = url.get_decode(HashMap::new(), Some(&mut out), mods![]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedContentType(_)));
    }
}
