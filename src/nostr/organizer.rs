//! Event Organizer
//!
//! Relays return overlapping batches and do not reliably honour filters.
//! Everything fetched goes through [`organize_batches`]: the filter is
//! validated, batches are merged by event id, and the filter is re-applied
//! locally.

use std::collections::HashSet;

use super::events::NostrEvent;
use super::filter::EventFilter;
use crate::Result;

/// Merge batches keeping the first occurrence of every id
///
/// Order is first-seen order across the batches in the order supplied.
pub fn dedupe_events<I, B>(batches: I) -> Vec<NostrEvent>
where
    I: IntoIterator<Item = B>,
    B: IntoIterator<Item = NostrEvent>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for event in batches.into_iter().flatten() {
        if seen.insert(event.id.clone()) {
            out.push(event);
        }
    }
    out
}

/// Keep events matching `filter`, newest first and truncated when a limit is set
///
/// Without a limit, input order is preserved.
pub fn apply_filter(events: Vec<NostrEvent>, filter: &EventFilter) -> Vec<NostrEvent> {
    let mut kept: Vec<NostrEvent> = events.into_iter().filter(|e| filter.matches(e)).collect();

    if let Some(limit) = filter.limit {
        kept.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        kept.truncate(limit);
    }
    kept
}

/// Validate, deduplicate and re-filter relay batches
pub fn organize_batches(
    batches: Vec<Vec<NostrEvent>>,
    filter: &EventFilter,
) -> Result<Vec<NostrEvent>> {
    filter.validate()?;
    Ok(apply_filter(dedupe_events(batches), filter))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Error;

    pub(crate) fn event(id: &str, kind: u16, created_at: u64) -> NostrEvent {
        NostrEvent {
            id: id.to_string(),
            pubkey: "0".repeat(64),
            created_at,
            kind,
            tags: Vec::new(),
            content: String::new(),
            sig: String::new(),
        }
    }

    fn ids(events: &[NostrEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_dedupe_then_since() {
        let batch = vec![event("a", 1, 100), event("a", 1, 100), event("b", 1, 200)];

        let unique = dedupe_events([batch]);
        assert_eq!(ids(&unique), vec!["a", "b"]);

        let recent = apply_filter(unique, &EventFilter::new().since(150));
        assert_eq!(ids(&recent), vec!["b"]);
    }

    #[test]
    fn test_dedupe_across_relays_keeps_first_seen_order() {
        let relay1 = vec![event("c", 1, 3), event("a", 1, 1)];
        let relay2 = vec![event("a", 1, 1), event("b", 1, 2), event("c", 1, 3)];

        let unique = dedupe_events(vec![relay1, relay2]);
        assert_eq!(ids(&unique), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let once = dedupe_events([vec![event("x", 1, 1), event("y", 7, 2), event("x", 1, 1)]]);
        let twice = dedupe_events([once.clone()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dedupe_empty() {
        assert!(dedupe_events(Vec::<Vec<NostrEvent>>::new()).is_empty());
    }

    #[test]
    fn test_kind_filter_only_returns_that_kind() {
        let events = vec![
            event("a", 1, 1),
            event("b", 7, 2),
            event("c", 0, 3),
            event("d", 1, 4),
        ];
        let notes = apply_filter(events, &EventFilter::new().kind(1));
        assert!(notes.iter().all(|e| e.kind == 1));
        assert_eq!(ids(&notes), vec!["a", "d"]);
    }

    #[test]
    fn test_limit_keeps_most_recent() {
        let events = vec![
            event("old", 1, 10),
            event("new", 1, 30),
            event("mid", 1, 20),
            event("tie", 1, 30),
        ];
        let top = apply_filter(events, &EventFilter::new().limit(3));
        assert_eq!(ids(&top), vec!["new", "tie", "mid"]);

        let none = apply_filter(vec![event("a", 1, 1)], &EventFilter::new().limit(0));
        assert!(none.is_empty());
    }

    #[test]
    fn test_until_bound_is_inclusive() {
        let events = vec![event("a", 1, 100), event("b", 1, 101)];
        let kept = apply_filter(events, &EventFilter::new().until(100));
        assert_eq!(ids(&kept), vec!["a"]);
    }

    #[test]
    fn test_organize_rejects_invalid_filter_before_work() {
        let result = organize_batches(
            vec![vec![event("a", 1, 1)]],
            &EventFilter::new().since(10).until(1),
        );
        assert!(matches!(result, Err(Error::InvalidFilter(_))));
    }

    #[test]
    fn test_organize_batches() {
        let result = organize_batches(
            vec![
                vec![event("a", 1, 5), event("b", 4, 6)],
                vec![event("a", 1, 5), event("c", 1, 7)],
            ],
            &EventFilter::new().kind(1).limit(5),
        )
        .unwrap();
        assert_eq!(ids(&result), vec!["c", "a"]);
    }
}
