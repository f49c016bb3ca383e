use std::collections::HashMap;

use crate::errors::Result;
use crate::mods::Mod;
use crate::net::Request;

/// Sets a single request header, overwriting any previous value for `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Mod for Header {
    fn before(&mut self, request: &mut Request<'_>) -> Result<()> {
        request.headers.insert(self.key.clone(), self.value.clone());
        Ok(())
    }
}

/// Merges every entry into the request headers; entries win on key collision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(pub HashMap<String, String>);

impl Mod for Headers {
    fn before(&mut self, request: &mut Request<'_>) -> Result<()> {
        for (k, v) in &self.0 {
            request.headers.insert(k.clone(), v.clone());
        }
        Ok(())
    }
}

impl From<HashMap<String, String>> for Headers {
    fn from(map: HashMap<String, String>) -> Self {
        Headers(map)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(entries: [(K, V); N]) -> Self {
        Headers(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
