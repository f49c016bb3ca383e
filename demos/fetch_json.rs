//! Fetches a JSON document and decodes it, logging the pipeline.
//!
//! Run with `RUST_LOG=reqmod=trace cargo run --example fetch_json -- <url>`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use reqmod::config::TransportConfig;
use reqmod::mods;
use reqmod::mods::Header;
use reqmod::net::ReqwestTransport;
use reqmod::Url;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/json".to_string());

    let config = TransportConfig::builder()
        .default_header("Accept", "application/json")
        .build()?;
    let transport = Arc::new(ReqwestTransport::from_config(&config)?);

    let url = Url::from_uri(&target, None)
        .with_context(|| format!("cannot use {target} as a request URL"))?
        .with_transport(transport);

    let mut doc = serde_json::Value::Null;
    let resp = url.get_decode(
        HashMap::new(),
        Some(&mut doc),
        mods![Header::new("X-Requested-With", "reqmod-demo")],
    )?;

    println!("{} {}", resp.status(), resp.media_type());
    println!("{}", serde_json::to_string_pretty(&doc)?);

    Ok(())
}
