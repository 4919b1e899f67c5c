//! nostrkit - Nostr and Bitcoin keys from one seed phrase
//!
//! Thin glue over `nostr-sdk` and `bitcoin`:
//!
//! - **crypto**: BIP-39 mnemonics, Nostr key derivation and key encodings
//! - **btc**: BIP-84 wallet derivation from the same seed
//! - **nostr**: relay transport, account actions and the event organizer
//!   (deduplication, supplemental filtering, DM threads, follow lists)

pub mod btc;
pub mod config;
pub mod crypto;
pub mod error;
pub mod nostr;
pub mod time;

pub use error::{Error, Result};

/// Result from a command, separating human output from the copy-paste value
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Human readable output
    pub output: String,
    /// Clean value (JSON or a single key/address) for scripting
    pub result: String,
}
