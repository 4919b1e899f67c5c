//! Account actions
//!
//! [`Account`] pairs a keypair with an explicitly passed relay transport.
//! Publishing signs locally and hands the event to the transport; fetching
//! runs every relay batch through the organizer.

use nostr_sdk::prelude::*;
use tracing::{debug, info};

use super::chat::{organize_chat_messages, ChatRooms};
use super::client::RelayTransport;
use super::events::{kind, NostrEvent};
use super::filter::EventFilter;
use super::follows::{follows_from_contact_events, update_follow_set, FollowOp};
use super::organizer::organize_batches;
use super::profile::{latest_profile, Profile};
use crate::crypto::keys::parse_public_key;
use crate::crypto::pow;
use crate::{Error, Result};

/// Result of a follow-list change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpdate {
    pub follows: Vec<String>,
    /// Id of the replacement contact list, `None` when nothing changed
    pub event_id: Option<EventId>,
}

pub struct Account<T: RelayTransport> {
    keys: Keys,
    transport: T,
}

impl<T: RelayTransport> Account<T> {
    pub fn new(keys: Keys, transport: T) -> Self {
        Self { keys, transport }
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn public_key_hex(&self) -> String {
        self.keys.public_key().to_hex()
    }

    async fn sign_and_publish(&self, builder: EventBuilder) -> Result<EventId> {
        let event = builder.sign_with_keys(&self.keys)?;
        self.transport.publish(event).await
    }

    // ========================================================================
    // Publishing
    // ========================================================================

    /// Publish kind-0 profile metadata
    pub async fn publish_profile(&self, profile: &Profile) -> Result<EventId> {
        let content = profile.to_content()?;
        self.sign_and_publish(EventBuilder::new(Kind::Metadata, content))
            .await
    }

    /// Publish a kind-1 text note
    pub async fn publish_note(&self, content: &str) -> Result<EventId> {
        self.sign_and_publish(EventBuilder::text_note(content)).await
    }

    /// Publish a NIP-13 mined text note
    pub async fn publish_mined_note(&self, content: &str, difficulty: u8) -> Result<EventId> {
        let event = pow::mine_note(&self.keys, content, difficulty)?;
        self.transport.publish(event).await
    }

    /// React to an event (`+`, `-` or an emoji)
    pub async fn react(&self, event_id: &str, reaction: &str) -> Result<EventId> {
        let id = parse_event_id(event_id)?;
        self.sign_and_publish(
            EventBuilder::new(Kind::Reaction, reaction).tags(vec![Tag::event(id)]),
        )
        .await
    }

    /// Reply to an event with a text note
    pub async fn reply(&self, event_id: &str, content: &str) -> Result<EventId> {
        let id = parse_event_id(event_id)?;
        self.sign_and_publish(EventBuilder::text_note(content).tags(vec![Tag::event(id)]))
            .await
    }

    /// Send a NIP-04 encrypted direct message to a hex or `npub` key
    pub async fn send_direct_message(&self, recipient: &str, message: &str) -> Result<EventId> {
        let recipient = parse_public_key(recipient)?;
        let encrypted = nip04::encrypt(self.keys.secret_key(), &recipient, message)?;
        self.sign_and_publish(
            EventBuilder::new(Kind::EncryptedDirectMessage, encrypted)
                .tags(vec![Tag::public_key(recipient)]),
        )
        .await
    }

    /// Request deletion of one of our events (kind 5)
    pub async fn delete_event(&self, event_id: &str) -> Result<EventId> {
        let id = parse_event_id(event_id)?;
        self.sign_and_publish(
            EventBuilder::new(
                Kind::EventDeletion,
                format!("Delete event with ID: {}", id.to_hex()),
            )
            .tags(vec![Tag::event(id)]),
        )
        .await
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Fetch from every relay, deduplicate and re-apply `filter`
    pub async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<NostrEvent>> {
        filter.validate()?;
        let batches = self.transport.fetch(filter).await?;
        let events = organize_batches(batches, filter)?;
        debug!(events = events.len(), "organized fetch");
        Ok(events)
    }

    /// Text notes written by `author` (hex or `npub`)
    pub async fn fetch_notes(&self, author: &str, limit: usize) -> Result<Vec<NostrEvent>> {
        let author = parse_public_key(author)?.to_hex();
        self.fetch_events(
            &EventFilter::new()
                .author(author)
                .kind(kind::TEXT_NOTE)
                .limit(limit),
        )
        .await
    }

    /// Most recent profile metadata of `author`
    pub async fn fetch_profile(&self, author: &str) -> Result<Option<Profile>> {
        let author = parse_public_key(author)?.to_hex();
        let events = self
            .fetch_events(&EventFilter::new().author(author).kind(kind::METADATA))
            .await?;
        Ok(latest_profile(&events))
    }

    /// Replies and reactions referencing a note
    pub async fn fetch_interactions(&self, note_id: &str) -> Result<Vec<NostrEvent>> {
        let id = parse_event_id(note_id)?;
        self.fetch_events(
            &EventFilter::new()
                .kinds([kind::TEXT_NOTE, kind::REACTION])
                .event_ref(id.to_hex()),
        )
        .await
    }

    /// Sent and received direct messages since `since`, grouped by counterparty
    pub async fn fetch_conversations(&self, since: u64) -> Result<ChatRooms> {
        let me = self.public_key_hex();
        let sent = self
            .fetch_events(
                &EventFilter::new()
                    .author(me.clone())
                    .kind(kind::ENCRYPTED_DIRECT_MESSAGE)
                    .since(since),
            )
            .await?;
        let received = self
            .fetch_events(
                &EventFilter::new()
                    .pubkey_ref(me)
                    .kind(kind::ENCRYPTED_DIRECT_MESSAGE)
                    .since(since),
            )
            .await?;
        Ok(organize_chat_messages(sent, received, &self.keys))
    }

    /// Current follow list
    pub async fn fetch_follows(&self) -> Result<Vec<String>> {
        let me = self.public_key_hex();
        let events = self
            .fetch_events(&EventFilter::new().author(me.clone()).kind(kind::CONTACT_LIST))
            .await?;
        Ok(follows_from_contact_events(&events, &me))
    }

    // ========================================================================
    // Follow list
    // ========================================================================

    /// Follow or unfollow `pubkey`, publishing a replacement contact list
    ///
    /// Nothing is published when the list does not change. Our own key is
    /// never added.
    pub async fn set_follow(&self, pubkey: &str, op: FollowOp) -> Result<FollowUpdate> {
        let target = parse_public_key(pubkey)?.to_hex();
        let current = self.fetch_follows().await?;
        let follows = if target == self.public_key_hex() {
            current.clone()
        } else {
            update_follow_set(&current, &target, op)
        };

        if follows == current {
            debug!(pubkey = %target, ?op, "follow list unchanged");
            return Ok(FollowUpdate {
                follows,
                event_id: None,
            });
        }

        let event_id = self.publish_contact_list(&follows).await?;
        info!(pubkey = %target, ?op, follows = follows.len(), "follow list updated");
        Ok(FollowUpdate {
            follows,
            event_id: Some(event_id),
        })
    }

    /// Unfollow when followed, follow otherwise
    pub async fn toggle_follow(&self, pubkey: &str) -> Result<FollowUpdate> {
        let target = parse_public_key(pubkey)?.to_hex();
        let current = self.fetch_follows().await?;
        self.set_follow(&target, FollowOp::toggle_for(&current, &target))
            .await
    }

    async fn publish_contact_list(&self, follows: &[String]) -> Result<EventId> {
        let tags = follows
            .iter()
            .map(|pk| parse_public_key(pk).map(Tag::public_key))
            .collect::<Result<Vec<_>>>()?;
        self.sign_and_publish(EventBuilder::new(Kind::ContactList, "").tags(tags))
            .await
    }
}

fn parse_event_id(event_id: &str) -> Result<EventId> {
    EventId::from_hex(event_id.trim()).map_err(|e| Error::InvalidEventId(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nostr::chat::Direction;
    use crate::nostr::client::memory::MemoryTransport;

    fn account() -> Account<MemoryTransport> {
        Account::new(
            Keys::generate(),
            MemoryTransport::new(&["wss://one", "wss://two"]),
        )
    }

    fn tag_values(event: &Event, name: &str) -> Vec<String> {
        NostrEvent::from(event).tag_values(name).map(String::from).collect()
    }

    #[tokio::test]
    async fn test_publish_note_and_fetch_dedupes_relays() {
        let account = account();
        account.publish_note("hello nostr").await.unwrap();

        let notes = account
            .fetch_notes(&account.public_key_hex(), 10)
            .await
            .unwrap();
        // published to two relays, returned once
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "hello nostr");
    }

    #[tokio::test]
    async fn test_reaction_reply_and_delete_tags() {
        let account = account();
        let note = account.publish_note("note").await.unwrap().to_hex();

        account.react(&note, "+").await.unwrap();
        account.reply(&note, "great post").await.unwrap();
        account.delete_event(&note).await.unwrap();

        let published = account.transport().published();
        assert_eq!(published.len(), 4);
        assert_eq!(published[1].kind, Kind::Reaction);
        assert_eq!(published[1].content, "+");
        assert_eq!(tag_values(&published[1], "e"), vec![note.clone()]);
        assert_eq!(published[2].kind, Kind::TextNote);
        assert_eq!(tag_values(&published[2], "e"), vec![note.clone()]);
        assert_eq!(published[3].kind, Kind::EventDeletion);
        assert_eq!(published[3].content, format!("Delete event with ID: {}", note));

        let interactions = account.fetch_interactions(&note).await.unwrap();
        assert_eq!(interactions.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_event_id_rejected() {
        let account = account();
        assert!(matches!(
            account.react("not-an-id", "+").await,
            Err(Error::InvalidEventId(_))
        ));
        assert!(account.transport().published().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_filter() {
        let account = account();
        let result = account
            .fetch_events(&EventFilter::new().since(10).until(5))
            .await;
        assert!(matches!(result, Err(Error::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn test_direct_messages_round_trip() {
        let transport_relays = ["wss://one"];
        let alice = Account::new(Keys::generate(), MemoryTransport::new(&transport_relays));
        let bob_keys = Keys::generate();

        alice
            .send_direct_message(&bob_keys.public_key().to_bech32().unwrap(), "coucou")
            .await
            .unwrap();

        // Bob reads Alice's relay
        let bob = Account::new(bob_keys, MemoryTransport::new(&transport_relays));
        let published: Vec<NostrEvent> = alice
            .transport()
            .published()
            .iter()
            .map(NostrEvent::from)
            .collect();
        bob.transport().seed("wss://one", published);
        bob.send_direct_message(&alice.public_key_hex(), "salut")
            .await
            .unwrap();

        let rooms = bob.fetch_conversations(0).await.unwrap();
        let thread = rooms.chat_with(&alice.public_key_hex()).unwrap().unwrap();
        assert_eq!(thread.messages.len(), 2);

        let texts: Vec<(Direction, &str)> = thread
            .messages
            .iter()
            .map(|m| (m.direction, m.plaintext.as_deref().unwrap()))
            .collect();
        assert!(texts.contains(&(Direction::Received, "coucou")));
        assert!(texts.contains(&(Direction::Sent, "salut")));
    }

    #[tokio::test]
    async fn test_follow_unfollow_publishes_only_on_change() {
        let account = account();
        let friend = Keys::generate().public_key().to_hex();

        let first = account.set_follow(&friend, FollowOp::Follow).await.unwrap();
        assert_eq!(first.follows, vec![friend.clone()]);
        assert!(first.event_id.is_some());

        let again = account.set_follow(&friend, FollowOp::Follow).await.unwrap();
        assert_eq!(again.follows, first.follows);
        assert!(again.event_id.is_none());
        assert_eq!(account.transport().published().len(), 1);
        assert_eq!(account.fetch_follows().await.unwrap(), vec![friend.clone()]);

        let toggled = account.toggle_follow(&friend).await.unwrap();
        assert!(toggled.follows.is_empty());
        let published = account.transport().published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[1].kind, Kind::ContactList);
    }

    #[tokio::test]
    async fn test_following_own_key_is_a_noop() {
        let account = account();
        let me = account.public_key_hex();

        for _ in 0..2 {
            let update = account.set_follow(&me, FollowOp::Follow).await.unwrap();
            assert!(update.follows.is_empty());
            assert!(update.event_id.is_none());
        }
        let toggled = account.toggle_follow(&me).await.unwrap();
        assert!(toggled.event_id.is_none());
        assert!(account.transport().published().is_empty());

        // an existing list is left alone too
        let friend = Keys::generate().public_key().to_hex();
        account.set_follow(&friend, FollowOp::Follow).await.unwrap();
        let update = account.set_follow(&me, FollowOp::Follow).await.unwrap();
        assert_eq!(update.follows, vec![friend]);
        assert!(update.event_id.is_none());
        assert_eq!(account.transport().published().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_publish_and_fetch() {
        let account = account();
        let profile = Profile {
            name: Some("wallet-test".into()),
            about: Some("testing".into()),
            picture: Some("https://example.com/me.png".into()),
            ..Default::default()
        };
        account.publish_profile(&profile).await.unwrap();

        let fetched = account
            .fetch_profile(&account.public_key_hex())
            .await
            .unwrap();
        assert_eq!(fetched, Some(profile));
    }

    #[tokio::test]
    async fn test_mined_note_published() {
        let account = account();
        let id = account.publish_mined_note("pow", 4).await.unwrap();
        assert!(pow::leading_zero_bits(&id.to_hex()).unwrap() >= 4);
    }
}
