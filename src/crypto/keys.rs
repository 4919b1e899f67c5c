//! Nostr key derivation and encodings
//!
//! The Nostr secret key is `SHA-256(seed)` over the 64-byte BIP-39 seed.
//! Hex and bech32 (`npub`/`nsec`) conversions delegate to `nostr-sdk`.

use nostr_sdk::prelude::*;
use sha2::{Digest, Sha256};

use crate::Error;

/// Derive the Nostr keypair from a BIP-39 seed
pub fn derive_nostr_keys(seed: &[u8; 64]) -> crate::Result<Keys> {
    let digest = Sha256::digest(seed);
    let secret_key =
        SecretKey::from_slice(&digest).map_err(|e| Error::InvalidKey(e.to_string()))?;
    Ok(Keys::new(secret_key))
}

/// Parse a secret key given as hex or `nsec`
pub fn parse_keys(secret: &str) -> crate::Result<Keys> {
    Keys::parse(secret.trim()).map_err(|e| Error::InvalidKey(e.to_string()))
}

/// Parse a public key given as hex or `npub`
pub fn parse_public_key(key: &str) -> crate::Result<PublicKey> {
    let key = key.trim();
    if key.starts_with("npub1") {
        PublicKey::from_bech32(key).map_err(|e| Error::InvalidKey(e.to_string()))
    } else {
        PublicKey::from_hex(key).map_err(|e| Error::InvalidKey(e.to_string()))
    }
}

/// Convert a hex public key to `npub`
pub fn hex_to_npub(hex_pubkey: &str) -> crate::Result<String> {
    let public_key =
        PublicKey::from_hex(hex_pubkey.trim()).map_err(|e| Error::InvalidKey(e.to_string()))?;
    public_key
        .to_bech32()
        .map_err(|e| Error::InvalidKey(e.to_string()))
}

/// Convert an `npub` to its hex public key
pub fn npub_to_hex(npub: &str) -> crate::Result<String> {
    let npub = npub.trim();
    if !npub.starts_with("npub1") {
        return Err(Error::InvalidKey(format!("not an npub: {}", npub)));
    }
    PublicKey::from_bech32(npub)
        .map(|pk| pk.to_hex())
        .map_err(|e| Error::InvalidKey(e.to_string()))
}

/// Convert an `nsec` to its hex secret key
pub fn nsec_to_hex(nsec: &str) -> crate::Result<String> {
    let nsec = nsec.trim();
    if !nsec.starts_with("nsec1") {
        return Err(Error::InvalidKey("not an nsec".to_string()));
    }
    SecretKey::from_bech32(nsec)
        .map(|sk| sk.to_secret_hex())
        .map_err(|e| Error::InvalidKey(e.to_string()))
}

/// Encode the secret key of `keys` as `nsec`
pub fn secret_to_nsec(keys: &Keys) -> crate::Result<String> {
    keys.secret_key()
        .to_bech32()
        .map_err(|e| Error::InvalidKey(e.to_string()))
}

/// Encode the public key of `keys` as `npub`
pub fn public_to_npub(keys: &Keys) -> crate::Result<String> {
    keys.public_key()
        .to_bech32()
        .map_err(|e| Error::InvalidKey(e.to_string()))
}
