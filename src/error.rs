use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("unknown network '{0}'. Use: mainnet, testnet, signet, or regtest")]
    InvalidNetwork(String),

    #[error("invalid event id: {0}")]
    InvalidEventId(String),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("invalid profile field: {0}")]
    InvalidProfile(String),

    #[error("proof of work not reached: {got} < {wanted} leading zero bits")]
    PowNotReached { got: u8, wanted: u8 },

    #[error("relay error: {0}")]
    Relay(#[from] nostr_sdk::client::Error),

    #[error("event builder error: {0}")]
    Builder(#[from] nostr_sdk::event::builder::Error),

    #[error("nip04 error: {0}")]
    Nip04(#[from] nostr_sdk::nips::nip04::Error),

    #[error("bip32 error: {0}")]
    Bip32(#[from] bitcoin::bip32::Error),

    #[error("bitcoin key error: {0}")]
    BitcoinKey(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay information request failed with status {0}")]
    HttpStatus(u16),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
