//! Relay transport
//!
//! [`RelayTransport`] is the seam between account actions and the network.
//! [`NostrRelayClient`] talks to real relays through `nostr-sdk`; tests use
//! an in-memory transport.

use std::time::Duration;

use nostr_sdk::prelude::*;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::events::NostrEvent;
use super::filter::EventFilter;
use crate::Result;

/// Default fetch timeout per relay
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Publish/subscribe access to a set of relays
#[allow(async_fn_in_trait)]
pub trait RelayTransport {
    /// Add relays and open connections
    async fn connect(&self, relays: &[String]) -> Result<()>;

    /// Send a signed event to every connected relay
    async fn publish(&self, event: Event) -> Result<EventId>;

    /// Query each relay separately, one batch per relay
    ///
    /// Batches may overlap and relays may ignore parts of the filter.
    async fn fetch(&self, filter: &EventFilter) -> Result<Vec<Vec<NostrEvent>>>;

    /// Disconnect from all relays
    async fn close(&self);
}

/// Relay transport backed by `nostr_sdk::Client`
pub struct NostrRelayClient {
    client: Client,
    relays: RwLock<Vec<String>>,
    timeout: Duration,
}

impl NostrRelayClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::default(),
            relays: RwLock::new(Vec::new()),
            timeout,
        }
    }

    /// Create and connect in one step
    pub async fn connect_to(relays: &[String], timeout: Duration) -> Result<Self> {
        let transport = Self::new(timeout);
        transport.connect(relays).await?;
        Ok(transport)
    }
}

impl Default for NostrRelayClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl RelayTransport for NostrRelayClient {
    async fn connect(&self, relays: &[String]) -> Result<()> {
        let mut known = self.relays.write().await;
        for url in relays {
            self.client.add_relay(url.as_str()).await?;
            if !known.contains(url) {
                known.push(url.clone());
            }
        }
        self.client.connect().await;
        info!(relays = known.len(), "connected");
        Ok(())
    }

    async fn publish(&self, event: Event) -> Result<EventId> {
        let kind = event.kind;
        let output = self.client.send_event(event).await?;
        info!(id = %output.val, kind = %kind, "published");
        Ok(output.val)
    }

    async fn fetch(&self, filter: &EventFilter) -> Result<Vec<Vec<NostrEvent>>> {
        let relay_filter = filter.to_relay_filter()?;
        let relays = self.relays.read().await.clone();

        let mut batches = Vec::with_capacity(relays.len());
        let mut last_error = None;
        for url in &relays {
            match self
                .client
                .fetch_events_from(
                    [url.as_str()],
                    vec![relay_filter.clone()],
                    Some(self.timeout),
                )
                .await
            {
                Ok(events) => {
                    let batch: Vec<NostrEvent> = events.into_iter().map(NostrEvent::from).collect();
                    debug!(relay = %url, events = batch.len(), "fetched");
                    batches.push(batch);
                }
                Err(e) => {
                    warn!(relay = %url, "fetch failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if batches.is_empty() => Err(e.into()),
            _ => Ok(batches),
        }
    }

    async fn close(&self) {
        self.client.disconnect().await.ok();
    }
}
