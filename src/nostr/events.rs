//! Event record with a fixed schema
//!
//! Relay events are converted into [`NostrEvent`] at the transport boundary so
//! the organizer works on plain data.

use nostr_sdk::prelude::*;
use serde::{Deserialize, Serialize};

use crate::time::display_timestamp;
use crate::{Error, Result};

/// Event kinds used by this crate
pub mod kind {
    pub const METADATA: u16 = 0;
    pub const TEXT_NOTE: u16 = 1;
    pub const CONTACT_LIST: u16 = 3;
    pub const ENCRYPTED_DIRECT_MESSAGE: u16 = 4;
    pub const DELETION: u16 = 5;
    pub const REACTION: u16 = 7;
}

/// Human name for a known kind
pub fn kind_name(kind: u16) -> &'static str {
    match kind {
        kind::METADATA => "metadata",
        kind::TEXT_NOTE => "text note",
        kind::CONTACT_LIST => "contact list",
        kind::ENCRYPTED_DIRECT_MESSAGE => "encrypted direct message",
        kind::DELETION => "deletion",
        kind::REACTION => "reaction",
        _ => "other",
    }
}

/// Immutable event as returned by a relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NostrEvent {
    pub id: String,
    pub pubkey: String,
    pub created_at: u64,
    pub kind: u16,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sig: String,
}

impl NostrEvent {
    /// Parse and check an event from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let event: NostrEvent =
            serde_json::from_str(json).map_err(|e| Error::MalformedEvent(e.to_string()))?;
        if !is_hex32(&event.id) {
            return Err(Error::MalformedEvent(format!("bad id '{}'", event.id)));
        }
        if !is_hex32(&event.pubkey) {
            return Err(Error::MalformedEvent(format!(
                "bad pubkey '{}'",
                event.pubkey
            )));
        }
        Ok(event)
    }

    /// Values of every tag named `name`; tags without a value are skipped
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |tag| tag.first().map(String::as_str) == Some(name))
            .filter_map(|tag| tag.get(1).map(String::as_str))
    }

    /// First value of the first tag named `name`
    pub fn first_tag_value<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.tag_values(name).next()
    }

    /// One-line terminal rendering
    pub fn summary_line(&self) -> String {
        format!(
            "[{}] {} {} by {}: {}",
            display_timestamp(self.created_at),
            kind_name(self.kind),
            self.id,
            self.pubkey,
            self.content
        )
    }
}

impl From<&Event> for NostrEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_hex(),
            pubkey: event.pubkey.to_hex(),
            created_at: event.created_at.as_u64(),
            kind: event.kind.as_u16(),
            tags: event.tags.iter().map(|t| t.as_slice().to_vec()).collect(),
            content: event.content.clone(),
            sig: event.sig.to_string(),
        }
    }
}

impl From<Event> for NostrEvent {
    fn from(event: Event) -> Self {
        NostrEvent::from(&event)
    }
}

/// True for 64 lowercase-or-uppercase hex characters
pub fn is_hex32(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
