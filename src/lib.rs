//! Lightweight HTTP request building and execution with ordered before/after mods.
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use reqmod::mods;
//! use reqmod::mods::Header;
//! use reqmod::uri::{Query, Url};
//!
//! #[derive(serde::Deserialize)]
//! struct Release {
//!     tag_name: String,
//! }
//!
//! # fn main() -> Result<(), reqmod::Error> {
//! let url = Url::from_uri(
//!     "https://api.github.com/repos/rust-lang/rust/releases/latest",
//!     Some(&Query::new().set("per_page", 1)),
//! )?;
//!
//! let mut release = Release { tag_name: String::new() };
//! url.get_decode(HashMap::new(), Some(&mut release), mods![Header::new("Accept", "application/json")])?;
//! println!("latest: {}", release.tag_name);
//! # Ok(()) }
//! ```

pub mod codec;
pub mod config;
pub mod errors;
pub mod mods;
pub mod net;
pub mod uri;

pub use errors::{Error, Result};
pub use mods::{Decode, DecodeOn200, Header, Headers, Mod, Mods};
pub use net::{Body, Request, Response, Transport};
pub use uri::{Query, Url};
