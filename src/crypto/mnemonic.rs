//! BIP-39 Seed Phrases
//!
//! One mnemonic drives both the Nostr identity and the Bitcoin wallet.
//!
//! ## Usage
//!
//! ```ignore
//! let mnemonic = generate_mnemonic(WordCount::Twelve)?;
//! let seed = mnemonic_to_seed(&mnemonic, "");
//! let keys = derive_nostr_keys(&seed)?;
//! ```

use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::Zeroize;

use crate::{Error, Result};

/// Supported phrase lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordCount {
    /// 128 bits of entropy
    #[default]
    Twelve,
    /// 256 bits of entropy
    TwentyFour,
}

impl WordCount {
    fn entropy_len(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::TwentyFour => 32,
        }
    }
}

// ============================================================================
// Mnemonic Generation
// ============================================================================

/// Generate a new random BIP-39 mnemonic
///
/// Entropy is zeroized once the phrase has been built.
pub fn generate_mnemonic(words: WordCount) -> Result<Mnemonic> {
    let mut entropy = [0u8; 32];
    let len = words.entropy_len();
    rand::thread_rng().fill_bytes(&mut entropy[..len]);
    let result = Mnemonic::from_entropy_in(Language::English, &entropy[..len])
        .map_err(|e| Error::InvalidMnemonic(e.to_string()));
    entropy.zeroize();
    result
}

/// Parse mnemonic from space-separated words
pub fn parse_mnemonic(words: &str) -> Result<Mnemonic> {
    Mnemonic::parse_in(Language::English, words.trim())
        .map_err(|e| Error::InvalidMnemonic(e.to_string()))
}

/// Validate mnemonic words (checksum and wordlist)
pub fn validate_mnemonic(words: &str) -> bool {
    parse_mnemonic(words).is_ok()
}

// ============================================================================
// BIP-39 Seed Derivation
// ============================================================================

/// Convert mnemonic to 512-bit seed using BIP-39 PBKDF2
///
/// The optional passphrase adds a second factor (the "25th word").
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> [u8; 64] {
    mnemonic.to_seed(passphrase)
}

// ============================================================================
// Display Helpers
// ============================================================================

/// Format mnemonic as numbered word list for display
pub fn format_mnemonic_numbered(mnemonic: &Mnemonic) -> String {
    mnemonic
        .words()
        .enumerate()
        .map(|(i, word)| format!("{:2}. {}", i + 1, word))
        .collect::<Vec<_>>()
        .join("\n")
}
