//! Query descriptor shared by relay requests and local re-filtering

use std::collections::BTreeSet;

use nostr_sdk::prelude::*;
use serde::{Deserialize, Serialize};

use super::events::{is_hex32, NostrEvent};
use crate::{Error, Result};

/// Event filter; empty fields are unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilter {
    pub ids: BTreeSet<String>,
    pub authors: BTreeSet<String>,
    pub kinds: BTreeSet<u16>,
    pub since: Option<u64>,
    pub until: Option<u64>,
    pub limit: Option<usize>,
    /// `#e` references
    pub event_refs: BTreeSet<String>,
    /// `#p` references
    pub pubkey_refs: BTreeSet<String>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.insert(id.into().to_lowercase());
        self
    }

    pub fn author(mut self, pubkey: impl Into<String>) -> Self {
        self.authors.insert(pubkey.into().to_lowercase());
        self
    }

    pub fn kind(mut self, kind: u16) -> Self {
        self.kinds.insert(kind);
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u16>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    pub fn since(mut self, since: u64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: u64) -> Self {
        self.until = Some(until);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn event_ref(mut self, id: impl Into<String>) -> Self {
        self.event_refs.insert(id.into().to_lowercase());
        self
    }

    pub fn pubkey_ref(mut self, pubkey: impl Into<String>) -> Self {
        self.pubkey_refs.insert(pubkey.into().to_lowercase());
        self
    }

    /// Reject filters that cannot be applied as written
    pub fn validate(&self) -> Result<()> {
        let hex_fields = [
            ("ids", &self.ids),
            ("authors", &self.authors),
            ("#e", &self.event_refs),
            ("#p", &self.pubkey_refs),
        ];
        for (name, values) in hex_fields {
            if let Some(bad) = values.iter().find(|v| !is_hex32(v)) {
                return Err(Error::InvalidFilter(format!(
                    "{} entry '{}' is not a 32-byte hex value",
                    name, bad
                )));
            }
        }
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(Error::InvalidFilter(format!(
                    "since ({}) is after until ({})",
                    since, until
                )));
            }
        }
        Ok(())
    }

    /// True when `event` satisfies every non-empty constraint
    pub fn matches(&self, event: &NostrEvent) -> bool {
        if !self.ids.is_empty() && !contains_hex(&self.ids, &event.id) {
            return false;
        }
        if !self.authors.is_empty() && !contains_hex(&self.authors, &event.pubkey) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&event.kind) {
            return false;
        }
        if self.since.is_some_and(|since| event.created_at < since) {
            return false;
        }
        if self.until.is_some_and(|until| event.created_at > until) {
            return false;
        }
        if !self.event_refs.is_empty()
            && !event.tag_values("e").any(|v| contains_hex(&self.event_refs, v))
        {
            return false;
        }
        if !self.pubkey_refs.is_empty()
            && !event.tag_values("p").any(|v| contains_hex(&self.pubkey_refs, v))
        {
            return false;
        }
        true
    }

    /// Convert into the relay-side filter
    pub fn to_relay_filter(&self) -> Result<Filter> {
        self.validate()?;

        let mut filter = Filter::new();
        if !self.ids.is_empty() {
            filter = filter.ids(parse_all(&self.ids, |s| EventId::from_hex(s))?);
        }
        if !self.authors.is_empty() {
            filter = filter.authors(parse_all(&self.authors, |s| PublicKey::from_hex(s))?);
        }
        if !self.kinds.is_empty() {
            filter = filter.kinds(self.kinds.iter().map(|k| Kind::from(*k)));
        }
        if let Some(since) = self.since {
            filter = filter.since(Timestamp::from(since));
        }
        if let Some(until) = self.until {
            filter = filter.until(Timestamp::from(until));
        }
        if let Some(limit) = self.limit {
            filter = filter.limit(limit);
        }
        if !self.event_refs.is_empty() {
            filter = filter.events(parse_all(&self.event_refs, |s| EventId::from_hex(s))?);
        }
        if !self.pubkey_refs.is_empty() {
            filter = filter.pubkeys(parse_all(&self.pubkey_refs, |s| PublicKey::from_hex(s))?);
        }
        Ok(filter)
    }
}

/// Hex values may arrive in either case from relays or deserialized filters
fn contains_hex(set: &BTreeSet<String>, value: &str) -> bool {
    set.iter().any(|v| v.eq_ignore_ascii_case(value))
}

fn parse_all<T, E: std::fmt::Display>(
    values: &BTreeSet<String>,
    parse: impl Fn(&str) -> std::result::Result<T, E>,
) -> Result<Vec<T>> {
    values
        .iter()
        .map(|v| parse(v).map_err(|e| Error::InvalidFilter(format!("'{}': {}", v, e))))
        .collect()
}
