//! Direct-message threads
//!
//! Kind-4 events are split into sent and received, decrypted with NIP-04 and
//! grouped by counterparty. A message that fails to decrypt keeps its place in
//! the thread with the error attached.

use std::collections::{BTreeMap, HashSet};

use nostr_sdk::prelude::*;
use serde_json::json;
use tracing::{debug, warn};

use super::events::{kind, NostrEvent};
use crate::crypto::keys::{hex_to_npub, parse_public_key};
use crate::time::display_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Sent => "sent",
            Direction::Received => "received",
        }
    }
}

/// Payload that could not be decrypted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decryption failed: {0}")]
pub struct DecryptError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub event_id: String,
    pub sender: String,
    pub created_at: u64,
    pub direction: Direction,
    pub plaintext: Result<String, DecryptError>,
}

impl ChatMessage {
    pub fn to_json(&self) -> serde_json::Value {
        let (content, error) = match &self.plaintext {
            Ok(text) => (Some(text.as_str()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        json!({
            "id": self.event_id,
            "sender": self.sender,
            "created_at": self.created_at,
            "direction": self.direction.as_str(),
            "content": content,
            "error": error,
        })
    }
}

/// Messages exchanged with one counterparty, ordered by `(created_at, id)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationThread {
    pub counterparty: String,
    pub messages: Vec<ChatMessage>,
}

/// Event that belongs to no conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnroutableEvent {
    pub event_id: String,
    pub reason: String,
}

/// All conversations of the local key
#[derive(Debug, Clone, Default)]
pub struct ChatRooms {
    pub threads: BTreeMap<String, ConversationThread>,
    pub unroutable: Vec<UnroutableEvent>,
}

impl ChatRooms {
    /// Thread with `pubkey` (hex or `npub`)
    pub fn chat_with(&self, pubkey: &str) -> crate::Result<Option<&ConversationThread>> {
        let key = parse_public_key(pubkey)?.to_hex();
        Ok(self.threads.get(&key))
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

/// Group sent and received direct messages by counterparty
pub fn organize_chat_messages(
    sent: Vec<NostrEvent>,
    received: Vec<NostrEvent>,
    keys: &Keys,
) -> ChatRooms {
    let local = keys.public_key().to_hex();
    let mut rooms = ChatRooms::default();
    let mut seen = HashSet::new();

    for event in sent.into_iter().chain(received) {
        if !seen.insert(event.id.clone()) {
            continue;
        }
        if event.kind != kind::ENCRYPTED_DIRECT_MESSAGE {
            rooms.unroutable.push(UnroutableEvent {
                event_id: event.id,
                reason: format!("kind {} is not a direct message", event.kind),
            });
            continue;
        }

        let recipient = event.first_tag_value("p").map(str::to_lowercase);
        let (direction, counterparty) = if event.pubkey.eq_ignore_ascii_case(&local) {
            match recipient {
                Some(p) => (Direction::Sent, p),
                None => {
                    rooms.unroutable.push(UnroutableEvent {
                        event_id: event.id,
                        reason: "sent message has no recipient tag".to_string(),
                    });
                    continue;
                }
            }
        } else if event.tag_values("p").any(|p| p.eq_ignore_ascii_case(&local)) {
            (Direction::Received, event.pubkey.to_lowercase())
        } else {
            rooms.unroutable.push(UnroutableEvent {
                event_id: event.id,
                reason: "not addressed to the local key".to_string(),
            });
            continue;
        };

        let plaintext = decrypt_payload(keys, &counterparty, &event.content);
        if let Err(e) = &plaintext {
            warn!(id = %event.id, "{}", e);
        }

        rooms
            .threads
            .entry(counterparty.clone())
            .or_insert_with(|| ConversationThread {
                counterparty,
                messages: Vec::new(),
            })
            .messages
            .push(ChatMessage {
                event_id: event.id,
                sender: event.pubkey,
                created_at: event.created_at,
                direction,
                plaintext,
            });
    }

    for thread in rooms.threads.values_mut() {
        thread.messages.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
    }
    debug!(
        threads = rooms.threads.len(),
        unroutable = rooms.unroutable.len(),
        "organized chats"
    );
    rooms
}

fn decrypt_payload(keys: &Keys, counterparty: &str, content: &str) -> Result<String, DecryptError> {
    let public_key =
        PublicKey::from_hex(counterparty).map_err(|e| DecryptError(e.to_string()))?;
    nip04::decrypt(keys.secret_key(), &public_key, content).map_err(|e| DecryptError(e.to_string()))
}

/// Render a thread for the terminal
pub fn format_thread(thread: &ConversationThread) -> String {
    let who = hex_to_npub(&thread.counterparty).unwrap_or_else(|_| thread.counterparty.clone());
    let mut out = format!("Chat with {}:\n", who);
    for msg in &thread.messages {
        let when = display_timestamp(msg.created_at);
        let label = match msg.direction {
            Direction::Sent => "Sent",
            Direction::Received => "Received",
        };
        match &msg.plaintext {
            Ok(text) => out.push_str(&format!("{} at {}: {}\n", label, when, text)),
            Err(e) => out.push_str(&format!("{} at {}: <{}>\n", label, when, e)),
        }
    }
    out
}
