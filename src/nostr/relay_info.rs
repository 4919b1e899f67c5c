//! NIP-11 relay information documents

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayInformation {
    pub name: Option<String>,
    pub description: Option<String>,
    pub pubkey: Option<String>,
    pub contact: Option<String>,
    pub supported_nips: Vec<u16>,
    pub software: Option<String>,
    pub version: Option<String>,
}

/// HTTP(S) URL serving the relay's information document
pub fn info_url(relay_url: &str) -> String {
    if let Some(rest) = relay_url.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = relay_url.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        relay_url.to_string()
    }
}

/// Fetch a relay's information document (blocking)
///
/// Must not be called from inside an async runtime.
pub fn fetch_relay_info(relay_url: &str) -> Result<RelayInformation> {
    let url = info_url(relay_url);
    debug!(%url, "requesting relay information");

    let response = reqwest::blocking::Client::new()
        .get(&url)
        .header(ACCEPT, "application/nostr+json")
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus(status.as_u16()));
    }
    Ok(response.json()?)
}
