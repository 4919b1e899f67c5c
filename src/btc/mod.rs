//! Bitcoin Integration
//!
//! - **wallet**: BIP-84 wallet derivation (address, WIF, xpub) from a seed

pub mod wallet;

pub use wallet::{derive_bitcoin_wallet, parse_network, WalletInfo};
