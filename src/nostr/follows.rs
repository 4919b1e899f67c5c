//! Follow lists (kind 3)
//!
//! A follow list is the `p` tags of the user's most recent contact-list event.
//! Changing it means publishing a complete replacement event.

use super::events::{kind, NostrEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOp {
    Follow,
    Unfollow,
}

impl FollowOp {
    /// Unfollow when already followed, follow otherwise
    pub fn toggle_for(follows: &[String], pubkey: &str) -> Self {
        if contains(follows, pubkey) {
            FollowOp::Unfollow
        } else {
            FollowOp::Follow
        }
    }
}

/// Apply `op` for `pubkey`; repeating an operation is a no-op
pub fn update_follow_set(current: &[String], pubkey: &str, op: FollowOp) -> Vec<String> {
    let target = pubkey.to_lowercase();
    let mut follows: Vec<String> = Vec::with_capacity(current.len() + 1);
    for pk in current {
        let pk = pk.to_lowercase();
        if !follows.contains(&pk) {
            follows.push(pk);
        }
    }
    match op {
        FollowOp::Follow => {
            if !follows.contains(&target) {
                follows.push(target);
            }
        }
        FollowOp::Unfollow => follows.retain(|pk| *pk != target),
    }
    follows
}

/// Follow list from the newest contact-list event authored by `owner`
///
/// The owner's own key is never part of the result.
pub fn follows_from_contact_events(events: &[NostrEvent], owner: &str) -> Vec<String> {
    let latest = events
        .iter()
        .filter(|e| e.kind == kind::CONTACT_LIST && e.pubkey.eq_ignore_ascii_case(owner))
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

    let Some(latest) = latest else {
        return Vec::new();
    };

    let mut follows = Vec::new();
    for pk in latest.tag_values("p") {
        let pk = pk.to_lowercase();
        if !pk.eq_ignore_ascii_case(owner) && !follows.contains(&pk) {
            follows.push(pk);
        }
    }
    follows
}

fn contains(follows: &[String], pubkey: &str) -> bool {
    follows.iter().any(|pk| pk.eq_ignore_ascii_case(pubkey))
}
