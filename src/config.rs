//! Transport configuration.
//!
//! `TransportConfig` controls how the default [`ReqwestTransport`](crate::net::ReqwestTransport)
//! talks to the network: identity (user agent, default headers) and a few
//! client behaviors. It provides defaults via [`Default`] and a fluent
//! [`TransportConfig::builder()`] with validation.
//!
//! ```rust
//! use reqmod::config::TransportConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = TransportConfig::builder()
//!     .user_agent("inventory-sync/2.1")
//!     .default_header("Accept", "application/json")
//!     .max_redirects(3)
//!     .build()?;
//! assert_eq!(cfg.max_redirects, 3);
//! # Ok(()) }
//! ```
//!
//! There are deliberately no timeout or retry knobs. A call blocks until the
//! transport completes or fails.

use std::fmt;

use http::{HeaderName, HeaderValue};

pub const DEFAULT_USER_AGENT: &str = concat!("reqmod/", env!("CARGO_PKG_VERSION"));

const MAX_REDIRECT_LIMIT: usize = 64;

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent sent with every request unless a mod overrides it
    pub user_agent: String,
    /// Headers sent with every request; request headers win on collision
    pub default_headers: Vec<(String, String)>,
    /// How many redirects are followed before giving up (0 disables following)
    pub max_redirects: usize,
    /// Keep cookies between calls made through the same transport
    pub cookie_store: bool,
    /// Advertise and transparently decode gzip, brotli and deflate bodies
    pub accept_compressed: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: Vec::new(),
            max_redirects: 10,
            cookie_store: false,
            accept_compressed: true,
        }
    }
}

impl TransportConfig {
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    inner: TransportConfig,
}

impl TransportConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut TransportConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn default_header<K: Into<String>, V: Into<String>>(self, key: K, value: V) -> Self {
        self.map(|c| c.default_headers.push((key.into(), value.into())))
    }
    pub fn max_redirects(self, n: usize) -> Self { self.map(|c| c.max_redirects = n) }
    pub fn cookie_store(self, on: bool) -> Self { self.map(|c| c.cookie_store = on) }
    pub fn accept_compressed(self, on: bool) -> Self { self.map(|c| c.accept_compressed = on) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut TransportConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<TransportConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyUserAgent,
    InvalidHeaderName(String),
    InvalidHeaderValue { name: String },
    TooManyRedirects(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyUserAgent =>
                write!(f, "user_agent must not be empty"),
            ConfigError::InvalidHeaderName(name) =>
                write!(f, "default header name {name:?} is not a valid HTTP token"),
            ConfigError::InvalidHeaderValue { name } =>
                write!(f, "default header {name:?} has an invalid value"),
            ConfigError::TooManyRedirects(n) =>
                write!(f, "max_redirects {n} is out of range (expected 0..={MAX_REDIRECT_LIMIT})"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &TransportConfig) -> Result<(), ConfigError> {
    if c.user_agent.trim().is_empty() {
        return Err(ConfigError::EmptyUserAgent);
    }
    for (name, value) in &c.default_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(ConfigError::InvalidHeaderName(name.clone()));
        }
        if HeaderValue::from_str(value).is_err() {
            return Err(ConfigError::InvalidHeaderValue { name: name.clone() });
        }
    }
    if c.max_redirects > MAX_REDIRECT_LIMIT {
        return Err(ConfigError::TooManyRedirects(c.max_redirects));
    }
    Ok(())
}
