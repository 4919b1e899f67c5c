//! Bitcoin Wallet from a BIP-39 Seed
//!
//! Derives a single-sig native segwit wallet (BIP-84) from the same seed that
//! backs the Nostr identity.
//!
//! ## Usage
//!
//! ```ignore
//! let wallet = derive_bitcoin_wallet(&seed, Network::Testnet)?;
//! println!("{}: {}", wallet.derivation_path, wallet.address);
//! ```

use std::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv, Xpub};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Address, CompressedPublicKey, Network};
use serde::Serialize;

use crate::{CommandResult, Error, Result};

// ============================================================================
// Data Structures
// ============================================================================

/// Wallet derived from a seed
#[derive(Debug, Clone, Serialize)]
pub struct WalletInfo {
    /// Name derived from the master key fingerprint
    pub name: String,
    /// First external P2WPKH address
    pub address: String,
    /// WIF private key of that address
    pub wif: String,
    /// Account-level extended public key
    pub xpub: String,
    /// Full path of the address key
    pub derivation_path: String,
    pub network: String,
}

/// BIP-84 path components below the account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressPath {
    /// 0 for external (receive), 1 for internal (change)
    pub change: u32,
    pub address_index: u32,
}

impl AddressPath {
    pub fn receive(index: u32) -> Self {
        Self {
            change: 0,
            address_index: index,
        }
    }

    pub fn change(index: u32) -> Self {
        Self {
            change: 1,
            address_index: index,
        }
    }

    /// Account path `m/84'/coin'/0'`
    pub fn account_string(network: Network) -> String {
        format!("m/84'/{}'/0'", coin_type(network))
    }

    /// Full path `m/84'/coin'/0'/change/index`
    pub fn to_full_string(&self, network: Network) -> String {
        format!(
            "{}/{}/{}",
            Self::account_string(network),
            self.change,
            self.address_index
        )
    }
}

// ============================================================================
// Derivation
// ============================================================================

/// Derive the wallet's first receive address, its WIF key and account xpub
pub fn derive_bitcoin_wallet(seed: &[u8], network: Network) -> Result<WalletInfo> {
    derive_wallet_at(seed, network, AddressPath::receive(0))
}

/// Derive wallet information for a specific address path
pub fn derive_wallet_at(seed: &[u8], network: Network, path: AddressPath) -> Result<WalletInfo> {
    let secp = Secp256k1::new();
    let master = Xpriv::new_master(network, seed)?;

    let account_path = DerivationPath::from_str(&AddressPath::account_string(network))?;
    let account = master.derive_priv(&secp, &account_path)?;
    let xpub = Xpub::from_priv(&secp, &account);

    let child_path =
        DerivationPath::from_str(&format!("m/{}/{}", path.change, path.address_index))?;
    let child = account.derive_priv(&secp, &child_path)?;

    let private_key = child.to_priv();
    let public_key = CompressedPublicKey::from_private_key(&secp, &private_key)
        .map_err(|e| Error::BitcoinKey(e.to_string()))?;
    let address = Address::p2wpkh(&public_key, network);

    Ok(WalletInfo {
        name: format!("wallet-{}", master.fingerprint(&secp)),
        address: address.to_string(),
        wif: private_key.to_wif(),
        xpub: xpub.to_string(),
        derivation_path: path.to_full_string(network),
        network: network.to_string(),
    })
}

/// List `count` receive addresses starting at index 0
pub fn list_receive_addresses(seed: &[u8], network: Network, count: u32) -> Result<Vec<String>> {
    (0..count)
        .map(|i| derive_wallet_at(seed, network, AddressPath::receive(i)).map(|w| w.address))
        .collect()
}

// ============================================================================
// CLI Core Functions
// ============================================================================

/// Core function for the `wallet` command
pub fn wallet_core(seed: &[u8], network_str: &str, count: u32) -> Result<CommandResult> {
    let network = parse_network(network_str)?;
    let wallet = derive_bitcoin_wallet(seed, network)?;

    let mut out = String::new();
    out.push_str("Bitcoin Wallet\n\n");
    out.push_str(&format!("Name:    {}\n", wallet.name));
    out.push_str(&format!("Network: {}\n", wallet.network));
    out.push_str(&format!("Path:    {}\n", wallet.derivation_path));
    out.push_str(&format!("Address: {}\n", wallet.address));
    out.push_str(&format!("WIF:     {}\n", wallet.wif));
    out.push_str(&format!("Xpub:    {}\n", wallet.xpub));

    if count > 1 {
        out.push_str("\nReceive addresses:\n");
        for (i, addr) in list_receive_addresses(seed, network, count)?.iter().enumerate() {
            out.push_str(&format!("  {:>3}  {}\n", i, addr));
        }
    }

    Ok(CommandResult {
        output: out,
        result: serde_json::to_string(&wallet)?,
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse network string to bitcoin::Network
pub fn parse_network(network_str: &str) -> Result<Network> {
    match network_str.to_lowercase().as_str() {
        "mainnet" | "main" | "bitcoin" => Ok(Network::Bitcoin),
        "testnet" | "test" | "testnet3" => Ok(Network::Testnet),
        "signet" => Ok(Network::Signet),
        "regtest" | "local" => Ok(Network::Regtest),
        _ => Err(Error::InvalidNetwork(network_str.to_string())),
    }
}

fn coin_type(network: Network) -> u32 {
    match network {
        Network::Bitcoin => 0,
        _ => 1,
    }
}
