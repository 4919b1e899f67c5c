//! End-to-end tests of the offline CLI commands
//!
//! Nothing here touches the network.

use std::process::{Command, Output};

use serde_json::Value;

const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

// NIP-19 reference pair
const HEX_PUBKEY: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";
const NPUB: &str = "npub180cvv07tjdrrgpa0j7j7tmnyl2yr6yr7l8j4s3evf6u64th6gkwsyjh6w6";

fn nostrkit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nostrkit"))
        .args(args)
        .env_remove("NOSTRKIT_NSEC")
        .env_remove("NOSTRKIT_MNEMONIC")
        .env_remove("NOSTRKIT_CONFIG")
        .output()
        .expect("failed to run nostrkit")
}

/// The JSON result is the last line on stdout
fn result_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .expect("no output");
    serde_json::from_str(last).expect("last line is not JSON")
}

#[test]
fn test_generate_twelve_words() {
    let result = result_json(&nostrkit(&["generate"]));

    let mnemonic = result["mnemonic"].as_str().unwrap();
    assert_eq!(mnemonic.split_whitespace().count(), 12);
    assert!(result["npub"].as_str().unwrap().starts_with("npub1"));
    assert!(result["nsec"].as_str().unwrap().starts_with("nsec1"));
    assert!(result["wallet"]["address"].as_str().unwrap().starts_with("tb1q"));
}

#[test]
fn test_generate_twenty_four_words_mainnet() {
    let result = result_json(&nostrkit(&["generate", "--words", "24", "--network", "mainnet"]));

    assert_eq!(
        result["mnemonic"].as_str().unwrap().split_whitespace().count(),
        24
    );
    assert!(result["wallet"]["address"].as_str().unwrap().starts_with("bc1q"));
}

#[test]
fn test_generate_rejects_odd_length() {
    let output = nostrkit(&["generate", "--words", "15"]);
    assert!(!output.status.success());
}

#[test]
fn test_keys_are_deterministic() {
    let first = result_json(&nostrkit(&["--mnemonic", ABANDON, "keys"]));
    let second = result_json(&nostrkit(&["--mnemonic", ABANDON, "keys"]));
    assert_eq!(first, second);

    // The nsec gives back the same identity
    let nsec = first["nsec"].as_str().unwrap();
    let from_nsec = result_json(&nostrkit(&["--nsec", nsec, "keys"]));
    assert_eq!(from_nsec["pubkey"], first["pubkey"]);
}

#[test]
fn test_passphrase_changes_identity() {
    let plain = result_json(&nostrkit(&["--mnemonic", ABANDON, "keys"]));
    let salted = result_json(&nostrkit(&[
        "--mnemonic",
        ABANDON,
        "--passphrase",
        "TREZOR",
        "keys",
    ]));
    assert_ne!(plain["pubkey"], salted["pubkey"]);
}

#[test]
fn test_keys_without_identity_fails() {
    let output = nostrkit(&["keys"]);
    assert!(!output.status.success());
}

#[test]
fn test_wallet_matches_bip84_vector() {
    let result = result_json(&nostrkit(&[
        "--mnemonic",
        ABANDON,
        "wallet",
        "--network",
        "mainnet",
    ]));
    assert_eq!(
        result["address"].as_str().unwrap(),
        "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"
    );
    assert_eq!(result["derivation_path"].as_str().unwrap(), "m/84'/0'/0'/0/0");
}

#[test]
fn test_wallet_lists_receive_addresses() {
    let output = nostrkit(&["--mnemonic", ABANDON, "wallet", "--count", "3"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // header, three listed addresses, JSON result
    assert_eq!(stdout.matches("tb1q").count(), 5);
}

#[test]
fn test_npub_conversions() {
    let encoded = result_json(&nostrkit(&["npub", HEX_PUBKEY]));
    assert_eq!(encoded["npub"].as_str().unwrap(), NPUB);

    let decoded = result_json(&nostrkit(&["decode-npub", NPUB]));
    assert_eq!(decoded["pubkey"].as_str().unwrap(), HEX_PUBKEY);
}

#[test]
fn test_decode_rejects_non_npub() {
    let output = nostrkit(&["decode-npub", HEX_PUBKEY]);
    assert!(!output.status.success());
}

#[test]
fn test_mine_dry_run() {
    let result = result_json(&nostrkit(&[
        "--mnemonic",
        ABANDON,
        "mine",
        "hello pow",
        "--difficulty",
        "8",
        "--dry-run",
    ]));
    assert_eq!(result["kind"].as_u64().unwrap(), 1);
    assert_eq!(result["content"].as_str().unwrap(), "hello pow");
    assert!(result["id"].as_str().unwrap().starts_with("00"));
    assert!(result["tags"]
        .as_array()
        .unwrap()
        .iter()
        .any(|tag| tag[0] == "nonce"));
}
