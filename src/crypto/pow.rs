//! NIP-13 Proof of Work
//!
//! Difficulty is the number of leading zero bits of the event id.

use nostr_sdk::prelude::*;
use tracing::debug;

use crate::{Error, Result};

/// Count leading zero bits of a hex-encoded id
pub fn leading_zero_bits(id_hex: &str) -> Result<u8> {
    let bytes = hex::decode(id_hex).map_err(|e| Error::MalformedEvent(e.to_string()))?;
    let mut bits: u32 = 0;
    for byte in bytes {
        if byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    Ok(bits.min(u8::MAX as u32) as u8)
}

/// Mine and sign a text note whose id meets `difficulty`
pub fn mine_note(keys: &Keys, content: &str, difficulty: u8) -> Result<Event> {
    let event = EventBuilder::text_note(content)
        .pow(difficulty)
        .sign_with_keys(keys)?;

    let got = leading_zero_bits(&event.id.to_hex())?;
    if got < difficulty {
        return Err(Error::PowNotReached {
            got,
            wanted: difficulty,
        });
    }
    debug!(id = %event.id, difficulty = got, "mined note");
    Ok(event)
}
