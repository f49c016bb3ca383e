use serde::de::DeserializeOwned;

use crate::codec;
use crate::errors::{Error, Result};
use crate::mods::Mod;
use crate::net::{Request, Response};

/// Unmarshals the response body into `target` after the call.
///
/// The codec is picked from the response media type: JSON for
/// `application/json`, XML for `text/xml` and `application/xml`. Any other
/// media type fails with [`Error::UnsupportedContentType`]. `target` is only
/// written when decoding succeeds.
#[derive(Debug)]
pub struct Decode<'a, T> {
    target: &'a mut T,
}

impl<'a, T> Decode<'a, T> {
    pub fn new(target: &'a mut T) -> Self {
        Self { target }
    }
}

impl<T: DeserializeOwned> Mod for Decode<'_, T> {
    fn after(&mut self, response: &mut Response, _request: &Request<'_>) -> Result<()> {
        decode_body(response, self.target)
    }
}

/// Like [`Decode`], but fails with [`Error::UnexpectedStatus`] unless the status is `200`.
///
/// The error carries the status code and the raw body text; `target` is left
/// untouched in that case.
#[derive(Debug)]
pub struct DecodeOn200<'a, T> {
    target: &'a mut T,
}

impl<'a, T> DecodeOn200<'a, T> {
    pub fn new(target: &'a mut T) -> Self {
        Self { target }
    }
}

impl<T: DeserializeOwned> Mod for DecodeOn200<'_, T> {
    fn after(&mut self, response: &mut Response, _request: &Request<'_>) -> Result<()> {
        let status = response.status().as_u16();
        if status != 200 {
            let body = response.body_string()?;
            return Err(Error::UnexpectedStatus { status, body });
        }

        decode_body(response, self.target)
    }
}

fn decode_body<T: DeserializeOwned>(response: &mut Response, target: &mut T) -> Result<()> {
    let (is_json, is_xml) = (response.is_json(), response.is_xml());
    let media_type = response.media_type().to_string();
    let bytes = response.body_bytes()?;

    let value = if is_json {
        codec::from_json(bytes)
    } else if is_xml {
        codec::from_xml(bytes)
    } else {
        return Err(Error::UnsupportedContentType(media_type));
    };

    *target = value.map_err(Error::Unmarshal)?;
    log::trace!("decoded {media_type} response body");
    Ok(())
}
