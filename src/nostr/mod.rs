//! Nostr module
//!
//! Provides:
//! - Fixed-schema event records and filters
//! - Relay transport trait and the `nostr-sdk` backed client
//! - Account actions (notes, reactions, replies, DMs, deletions, follows)
//! - Event organizer: deduplication, local filtering, DM threads

pub mod account;
pub mod chat;
pub mod client;
pub mod events;
pub mod filter;
pub mod follows;
pub mod organizer;
pub mod profile;
pub mod relay_info;

pub use account::{Account, FollowUpdate};
pub use chat::{
    format_thread, organize_chat_messages, ChatMessage, ChatRooms, ConversationThread,
    DecryptError, Direction,
};
pub use client::{NostrRelayClient, RelayTransport, DEFAULT_TIMEOUT};
pub use events::{kind, NostrEvent};
pub use filter::EventFilter;
pub use follows::{update_follow_set, FollowOp};
pub use organizer::{apply_filter, dedupe_events, organize_batches};
pub use profile::Profile;
pub use relay_info::{fetch_relay_info, RelayInformation};
