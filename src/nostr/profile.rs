//! Kind-0 profile metadata

use serde::{Deserialize, Serialize};

use super::events::{kind, NostrEvent};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// LNURL (LUD-06)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lud06: Option<String>,
    /// Lightning address (LUD-16)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lud16: Option<String>,
}

impl Profile {
    /// Event content for this profile
    pub fn to_content(&self) -> Result<String> {
        for (field, value) in [
            ("picture", &self.picture),
            ("banner", &self.banner),
            ("website", &self.website),
        ] {
            if let Some(url) = value {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(Error::InvalidProfile(format!(
                        "{} must be an http(s) URL",
                        field
                    )));
                }
            }
        }
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the content of a kind-0 event
    pub fn from_event(event: &NostrEvent) -> Result<Self> {
        if event.kind != kind::METADATA {
            return Err(Error::MalformedEvent(format!(
                "kind {} is not profile metadata",
                event.kind
            )));
        }
        serde_json::from_str(&event.content).map_err(|e| Error::MalformedEvent(e.to_string()))
    }
}

/// Newest parseable profile among kind-0 events
pub fn latest_profile(events: &[NostrEvent]) -> Option<Profile> {
    events
        .iter()
        .filter_map(|e| Profile::from_event(e).ok().map(|p| (e.created_at, p)))
        .max_by_key(|(created_at, _)| *created_at)
        .map(|(_, profile)| profile)
}
