//! Key Material
//!
//! - **mnemonic**: BIP-39 phrase generation, parsing and seed derivation
//! - **keys**: Nostr keypair from seed, hex / bech32 conversions
//! - **pow**: NIP-13 proof of work on text notes

pub mod keys;
pub mod mnemonic;
pub mod pow;
