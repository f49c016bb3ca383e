//! Mods: ordered before/after hooks attached to a single request.
//!
//! A [`Mod`] can mutate the outgoing [`Request`] in [`Mod::before`] and inspect
//! or consume the [`Response`] in [`Mod::after`]. Mods run as a stack around
//! the network call: `before` hooks in list order, `after` hooks in reverse
//! list order, so the mod added last sits closest to the wire on both sides.
//!
//! Built-in mods:
//! - [`Header`] and [`Headers`] set request headers.
//! - [`Decode`] unmarshals the response body based on its media type.
//! - [`DecodeOn200`] does the same, but only for a `200 OK` response.
//!
//! Custom mods implement the trait and may fail with any `anyhow` error:
//!
//! ```rust
//! use reqmod::{Error, Mod, Request};
//!
//! struct RequireAuth;
//!
//! impl Mod for RequireAuth {
//!     fn before(&mut self, request: &mut Request<'_>) -> Result<(), Error> {
//!         if !request.headers.contains_key("Authorization") {
//!             return Err(anyhow::anyhow!("missing credentials").into());
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod decode;
mod header;

use crate::errors::Result;
use crate::net::{Request, Response};

pub use decode::{Decode, DecodeOn200};
pub use header::{Header, Headers};

/// A pre/post hook around one request execution.
///
/// Both hooks default to no-ops. Returning an error from either aborts the
/// pipeline immediately; hooks that already ran are not rolled back.
pub trait Mod {
    /// Called before dispatch, in list order.
    fn before(&mut self, request: &mut Request<'_>) -> Result<()> {
        let _ = request;
        Ok(())
    }

    /// Called after the transport returned, in reverse list order.
    fn after(&mut self, response: &mut Response, request: &Request<'_>) -> Result<()> {
        let _ = (response, request);
        Ok(())
    }
}

/// Ordered list of mods for one request.
pub type Mods<'a> = Vec<Box<dyn Mod + 'a>>;

/// Builds a [`Mods`] list from mod values.
///
/// ```rust
/// use reqmod::mods;
/// use reqmod::mods::{Decode, Header};
///
/// let mut out = serde_json::Value::Null;
/// let list = mods![Header::new("Accept", "application/json"), Decode::new(&mut out)];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! mods {
    () => {
        $crate::mods::Mods::new()
    };
    ($($m:expr),+ $(,)?) => {
        ::std::vec![$($crate::mods::boxed($m)),+]
    };
}

#[doc(hidden)]
pub fn boxed<'a, M: Mod + 'a>(m: M) -> Box<dyn Mod + 'a> {
    Box::new(m)
}
