//! JSON and XML marshal helpers used for request bodies and response decoding.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CodecError;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(value)?)
}

/// Serializes `value` as an XML document. The root element is named after the type.
pub fn to_xml<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(quick_xml::se::to_string(value)?.into_bytes())
}

pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn from_xml<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(quick_xml::de::from_reader(bytes)?)
}

/// Merges header maps into a fresh one. Later maps win on key collision.
pub fn merge_headers<'a, I>(maps: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a HashMap<String, String>>,
{
    let mut base = HashMap::new();
    for map in maps {
        for (k, v) in map {
            base.insert(k.clone(), v.clone());
        }
    }
    base
}
