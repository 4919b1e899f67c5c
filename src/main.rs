use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use nostr_sdk::prelude::Keys;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use nostrkit::btc::wallet::wallet_core;
use nostrkit::btc::{derive_bitcoin_wallet, parse_network};
use nostrkit::config::Config;
use nostrkit::crypto::keys::{
    derive_nostr_keys, hex_to_npub, npub_to_hex, parse_keys, parse_public_key, public_to_npub,
    secret_to_nsec,
};
use nostrkit::crypto::mnemonic::{
    format_mnemonic_numbered, generate_mnemonic, mnemonic_to_seed, parse_mnemonic, WordCount,
};
use nostrkit::crypto::pow::{leading_zero_bits, mine_note};
use nostrkit::nostr::{
    fetch_relay_info, format_thread, Account, EventFilter, FollowOp, FollowUpdate,
    NostrEvent, NostrRelayClient, Profile, RelayTransport,
};
use nostrkit::time::{display_timestamp, now};
use nostrkit::CommandResult;

#[derive(Parser)]
#[command(name = "nostrkit")]
#[command(about = "nostrkit - Nostr identity, social actions and a Bitcoin wallet from one seed phrase", long_about = None)]
struct Cli {
    /// JSON config file (falls back to $NOSTRKIT_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Relay URL, repeatable; replaces the configured relays
    #[arg(long = "relay", global = true)]
    relays: Vec<String>,

    #[command(flatten)]
    identity: Identity,

    #[command(subcommand)]
    command: Commands,
}

/// Where the local keys come from
#[derive(Args)]
struct Identity {
    /// Secret key as nsec or hex
    #[arg(long, env = "NOSTRKIT_NSEC", global = true, hide_env_values = true)]
    nsec: Option<String>,

    /// BIP-39 seed phrase
    #[arg(long, env = "NOSTRKIT_MNEMONIC", global = true, hide_env_values = true)]
    mnemonic: Option<String>,

    /// Optional BIP-39 passphrase
    #[arg(long, default_value = "", global = true, hide_default_value = true)]
    passphrase: String,
}

impl Identity {
    fn seed(&self) -> Result<Zeroizing<[u8; 64]>> {
        let Some(words) = &self.mnemonic else {
            bail!("this command needs --mnemonic (or NOSTRKIT_MNEMONIC)");
        };
        let mnemonic = parse_mnemonic(words).context("failed to read seed phrase")?;
        Ok(Zeroizing::new(mnemonic_to_seed(&mnemonic, &self.passphrase)))
    }

    fn keys(&self) -> Result<Keys> {
        if let Some(secret) = &self.nsec {
            return parse_keys(secret).context("failed to read secret key");
        }
        if self.mnemonic.is_some() {
            let seed = self.seed()?;
            return Ok(derive_nostr_keys(&seed)?);
        }
        bail!("no identity: pass --nsec or --mnemonic (or set NOSTRKIT_NSEC / NOSTRKIT_MNEMONIC)")
    }

    /// Local keys, or a throwaway identity for read-only commands
    fn keys_or_ephemeral(&self) -> Result<Keys> {
        if self.nsec.is_none() && self.mnemonic.is_none() {
            return Ok(Keys::generate());
        }
        self.keys()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new seed phrase with its Nostr keys and Bitcoin wallet
    Generate {
        /// Phrase length (12 or 24)
        #[arg(long, default_value = "12")]
        words: u8,

        /// Bitcoin network (defaults to the configured one)
        #[arg(long)]
        network: Option<String>,
    },

    /// Show the Nostr keys of the current identity
    Keys,

    /// Show the Bitcoin wallet derived from the seed phrase
    Wallet {
        /// Bitcoin network (defaults to the configured one)
        #[arg(long)]
        network: Option<String>,

        /// Number of receive addresses to list
        #[arg(long, default_value = "1")]
        count: u32,
    },

    /// Encode a hex public key as npub
    Npub {
        /// Hex public key
        hex: String,
    },

    /// Decode an npub to its hex public key
    DecodeNpub {
        npub: String,
    },

    /// Publish profile metadata, or show a profile when no field is given
    Profile {
        /// Profile to show (hex or npub); defaults to our own
        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        about: Option<String>,

        /// Picture URL
        #[arg(long)]
        picture: Option<String>,

        /// Banner URL
        #[arg(long)]
        banner: Option<String>,

        #[arg(long)]
        website: Option<String>,

        /// LNURL
        #[arg(long)]
        lud06: Option<String>,

        /// Lightning address
        #[arg(long)]
        lud16: Option<String>,
    },

    /// Publish a text note
    Note {
        content: String,
    },

    /// React to an event
    React {
        event_id: String,

        /// Reaction content: +, - or an emoji
        #[arg(default_value = "+")]
        reaction: String,
    },

    /// Reply to an event
    Reply {
        event_id: String,
        content: String,
    },

    /// Send an encrypted direct message
    Dm {
        /// Recipient (hex or npub)
        recipient: String,
        message: String,
    },

    /// Fetch events matching a filter from all relays
    Fetch {
        /// Author (hex or npub), repeatable
        #[arg(long = "author")]
        authors: Vec<String>,

        /// Event kind, repeatable
        #[arg(long = "kind")]
        kinds: Vec<u16>,

        /// Event id, repeatable
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Referenced event id (#e), repeatable
        #[arg(long = "event-ref")]
        event_refs: Vec<String>,

        /// Referenced pubkey (#p), repeatable
        #[arg(long = "pubkey-ref")]
        pubkey_refs: Vec<String>,

        #[arg(long)]
        since: Option<u64>,

        #[arg(long)]
        until: Option<u64>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// List direct-message conversations
    Chats {
        /// Days of history to load (defaults to the configured lookback)
        #[arg(long)]
        days: Option<u64>,
    },

    /// Show the conversation with one counterparty
    Chat {
        /// Counterparty (hex or npub)
        pubkey: String,

        #[arg(long)]
        days: Option<u64>,
    },

    /// Show the current follow list
    Follows,

    /// Follow a public key
    Follow {
        pubkey: String,
    },

    /// Unfollow a public key
    Unfollow {
        pubkey: String,
    },

    /// Follow when not followed, unfollow otherwise
    ToggleFollow {
        pubkey: String,
    },

    /// Request deletion of one of our events
    Delete {
        event_id: String,
    },

    /// Mine a text note with NIP-13 proof of work and publish it
    Mine {
        content: String,

        /// Required leading zero bits
        #[arg(long, default_value = "16")]
        difficulty: u8,

        /// Print the mined event without publishing
        #[arg(long)]
        dry_run: bool,
    },

    /// Fetch a relay's NIP-11 information document
    RelayInfo {
        url: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        config,
        relays,
        identity,
        command,
    } = Cli::parse();

    let config = Config::load(config.as_deref())
        .context("failed to load config")?
        .with_relays(relays);

    let cmd_result = match command {
        Commands::Generate { words, network } => {
            generate(&config, words, network.as_deref())?
        }
        Commands::Keys => show_keys(&identity.keys()?)?,
        Commands::Wallet { network, count } => {
            let seed = identity.seed()?;
            let network = network.unwrap_or_else(|| config.network.clone());
            wallet_core(seed.as_slice(), &network, count)?
        }
        Commands::Npub { hex } => {
            let npub = hex_to_npub(&hex)?;
            CommandResult {
                output: format!("npub: {}\n", npub),
                result: json!({ "npub": npub }).to_string(),
            }
        }
        Commands::DecodeNpub { npub } => {
            let hex = npub_to_hex(&npub)?;
            CommandResult {
                output: format!("hex: {}\n", hex),
                result: json!({ "pubkey": hex }).to_string(),
            }
        }
        Commands::Mine {
            content,
            difficulty,
            dry_run: true,
        } => {
            let keys = identity.keys_or_ephemeral()?;
            let event = mine_note(&keys, &content, difficulty)?;
            let record = NostrEvent::from(&event);
            CommandResult {
                output: format!(
                    "Mined note {} ({} leading zero bits, not published)\n",
                    record.id,
                    leading_zero_bits(&record.id)?
                ),
                result: serde_json::to_string(&record)?,
            }
        }
        Commands::RelayInfo { url } => {
            let info = fetch_relay_info(&url)
                .with_context(|| format!("failed to fetch relay information from {}", url))?;
            let mut out = format!("Relay {}\n", url);
            if let Some(name) = &info.name {
                out.push_str(&format!("Name:        {}\n", name));
            }
            if let Some(description) = &info.description {
                out.push_str(&format!("Description: {}\n", description));
            }
            if let Some(software) = &info.software {
                out.push_str(&format!(
                    "Software:    {} {}\n",
                    software,
                    info.version.as_deref().unwrap_or("")
                ));
            }
            out.push_str(&format!("NIPs:        {:?}\n", info.supported_nips));
            CommandResult {
                output: out,
                result: serde_json::to_string(&info)?,
            }
        }
        command => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime.block_on(run_relay_command(&config, &identity, command))?
        }
    };

    print_result(&cmd_result);
    Ok(())
}

fn print_result(cmd_result: &CommandResult) {
    print!("{}", cmd_result.output);
    if !cmd_result.result.is_empty() {
        println!();
        println!("{}", cmd_result.result);
    }
}

// ============================================================================
// Offline commands
// ============================================================================

fn generate(config: &Config, words: u8, network: Option<&str>) -> Result<CommandResult> {
    let word_count = match words {
        12 => WordCount::Twelve,
        24 => WordCount::TwentyFour,
        other => bail!("unsupported phrase length {}: use 12 or 24", other),
    };
    let network = parse_network(network.unwrap_or(&config.network))?;

    let mnemonic = generate_mnemonic(word_count)?;
    let seed = Zeroizing::new(mnemonic_to_seed(&mnemonic, ""));
    let keys = derive_nostr_keys(&seed)?;
    let wallet = derive_bitcoin_wallet(seed.as_slice(), network)?;

    let npub = public_to_npub(&keys)?;
    let nsec = secret_to_nsec(&keys)?;

    let mut out = String::new();
    out.push_str("Seed phrase (write it down, it restores everything below):\n\n");
    out.push_str(&format_mnemonic_numbered(&mnemonic));
    out.push_str("\n\nNostr\n");
    out.push_str(&format!("  npub: {}\n", npub));
    out.push_str(&format!("  nsec: {}\n", nsec));
    out.push_str("\nBitcoin\n");
    out.push_str(&format!("  wallet:  {}\n", wallet.name));
    out.push_str(&format!("  network: {}\n", wallet.network));
    out.push_str(&format!("  address: {}\n", wallet.address));

    Ok(CommandResult {
        output: out,
        result: json!({
            "mnemonic": mnemonic.to_string(),
            "npub": npub,
            "nsec": nsec,
            "wallet": wallet,
        })
        .to_string(),
    })
}

fn show_keys(keys: &Keys) -> Result<CommandResult> {
    let npub = public_to_npub(keys)?;
    let nsec = secret_to_nsec(keys)?;
    let pubkey = keys.public_key().to_hex();

    Ok(CommandResult {
        output: format!("npub:   {}\nhex:    {}\nnsec:   {}\n", npub, pubkey, nsec),
        result: json!({ "npub": npub, "pubkey": pubkey, "nsec": nsec }).to_string(),
    })
}

// ============================================================================
// Relay commands
// ============================================================================

async fn run_relay_command(
    config: &Config,
    identity: &Identity,
    command: Commands,
) -> Result<CommandResult> {
    let keys = match &command {
        Commands::Fetch { .. } | Commands::Profile { author: Some(_), .. } => {
            identity.keys_or_ephemeral()?
        }
        _ => identity.keys()?,
    };

    if config.relays.is_empty() {
        bail!("no relays configured");
    }
    let transport = NostrRelayClient::connect_to(&config.relays, config.fetch_timeout())
        .await
        .context("failed to connect to relays")?;
    let account = Account::new(keys, transport);

    let cmd_result = relay_command(config, &account, command).await;
    account.transport().close().await;
    cmd_result
}

async fn relay_command(
    config: &Config,
    account: &Account<NostrRelayClient>,
    command: Commands,
) -> Result<CommandResult> {
    match command {
        Commands::Profile {
            author,
            name,
            display_name,
            about,
            picture,
            banner,
            website,
            lud06,
            lud16,
        } => {
            let profile = Profile {
                name,
                display_name,
                about,
                picture,
                banner,
                website,
                lud06,
                lud16,
            };
            if profile == Profile::default() {
                let author = author.unwrap_or_else(|| account.public_key_hex());
                let found = account.fetch_profile(&author).await?;
                let result = serde_json::to_string(&found)?;
                let output = match found {
                    Some(p) => serde_json::to_string_pretty(&p)? + "\n",
                    None => format!("No profile found for {}\n", author),
                };
                return Ok(CommandResult { output, result });
            }
            if author.is_some() {
                bail!("--author only applies when showing a profile");
            }
            let id = account.publish_profile(&profile).await?;
            Ok(published("Profile updated", id.to_hex()))
        }
        Commands::Note { content } => {
            let id = account.publish_note(&content).await?;
            Ok(published("Note published", id.to_hex()))
        }
        Commands::React { event_id, reaction } => {
            let id = account.react(&event_id, &reaction).await?;
            Ok(published("Reaction published", id.to_hex()))
        }
        Commands::Reply { event_id, content } => {
            let id = account.reply(&event_id, &content).await?;
            Ok(published("Reply published", id.to_hex()))
        }
        Commands::Dm { recipient, message } => {
            let id = account.send_direct_message(&recipient, &message).await?;
            Ok(published("Direct message sent", id.to_hex()))
        }
        Commands::Delete { event_id } => {
            let id = account.delete_event(&event_id).await?;
            Ok(published("Deletion requested", id.to_hex()))
        }
        Commands::Mine {
            content,
            difficulty,
            ..
        } => {
            let id = account.publish_mined_note(&content, difficulty).await?;
            Ok(published("Mined note published", id.to_hex()))
        }
        Commands::Fetch {
            authors,
            kinds,
            ids,
            event_refs,
            pubkey_refs,
            since,
            until,
            limit,
        } => {
            let mut filter = EventFilter::new().kinds(kinds);
            for author in authors {
                let hex = parse_public_key(&author)?.to_hex();
                filter = filter.author(hex);
            }
            for id in ids {
                filter = filter.id(id);
            }
            for id in event_refs {
                filter = filter.event_ref(id);
            }
            for pubkey in pubkey_refs {
                let hex = parse_public_key(&pubkey)?.to_hex();
                filter = filter.pubkey_ref(hex);
            }
            if let Some(since) = since {
                filter = filter.since(since);
            }
            if let Some(until) = until {
                filter = filter.until(until);
            }
            if let Some(limit) = limit {
                filter = filter.limit(limit);
            }

            let events = account.fetch_events(&filter).await?;
            let mut out = format!("{} event(s)\n", events.len());
            for event in &events {
                out.push_str(&event.summary_line());
                out.push('\n');
            }
            Ok(CommandResult {
                output: out,
                result: serde_json::to_string(&events)?,
            })
        }
        Commands::Chats { days } => {
            let rooms = account.fetch_conversations(config.dm_since(days, now())).await?;
            let mut out = format!("{} conversation(s)\n", rooms.len());
            let mut summary = serde_json::Map::new();
            for (counterparty, thread) in &rooms.threads {
                let who = hex_to_npub(counterparty).unwrap_or_else(|_| counterparty.clone());
                let last = thread
                    .messages
                    .last()
                    .map(|m| display_timestamp(m.created_at))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  {}  {} message(s), last {}\n",
                    who,
                    thread.messages.len(),
                    last
                ));
                summary.insert(counterparty.clone(), json!(thread.messages.len()));
            }
            if !rooms.unroutable.is_empty() {
                out.push_str(&format!(
                    "{} event(s) could not be assigned to a conversation\n",
                    rooms.unroutable.len()
                ));
            }
            Ok(CommandResult {
                output: out,
                result: serde_json::Value::Object(summary).to_string(),
            })
        }
        Commands::Chat { pubkey, days } => {
            let rooms = account.fetch_conversations(config.dm_since(days, now())).await?;
            match rooms.chat_with(&pubkey)? {
                Some(thread) => Ok(CommandResult {
                    output: format_thread(thread),
                    result: serde_json::to_string(
                        &thread.messages.iter().map(|m| m.to_json()).collect::<Vec<_>>(),
                    )?,
                }),
                None => Ok(CommandResult {
                    output: format!("No messages with {}\n", pubkey),
                    result: "[]".to_string(),
                }),
            }
        }
        Commands::Follows => {
            let follows = account.fetch_follows().await?;
            let mut out = format!("Following {}\n", follows.len());
            for pubkey in &follows {
                out.push_str(&format!(
                    "  {}\n",
                    hex_to_npub(pubkey).unwrap_or_else(|_| pubkey.clone())
                ));
            }
            Ok(CommandResult {
                output: out,
                result: serde_json::to_string(&follows)?,
            })
        }
        Commands::Follow { pubkey } => {
            follow_result(account.set_follow(&pubkey, FollowOp::Follow).await?)
        }
        Commands::Unfollow { pubkey } => {
            follow_result(account.set_follow(&pubkey, FollowOp::Unfollow).await?)
        }
        Commands::ToggleFollow { pubkey } => follow_result(account.toggle_follow(&pubkey).await?),
        _ => bail!("command does not use relays"),
    }
}

fn published(what: &str, id: String) -> CommandResult {
    CommandResult {
        output: format!("{}: {}\n", what, id),
        result: json!({ "id": id }).to_string(),
    }
}

fn follow_result(update: FollowUpdate) -> Result<CommandResult> {
    let output = match &update.event_id {
        Some(id) => format!(
            "Follow list updated ({} follows): {}\n",
            update.follows.len(),
            id
        ),
        None => format!("Follow list unchanged ({} follows)\n", update.follows.len()),
    };
    Ok(CommandResult {
        output,
        result: json!({
            "follows": update.follows,
            "id": update.event_id.map(|id| id.to_hex()),
        })
        .to_string(),
    })
}
