use std::collections::HashMap;

use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Dismissed,
    Commented,
    Pending,
}

impl ReviewState {
    /// Whether a review in this state replaces the reviewer's previous verdict.
    /// Comments and pending drafts never do.
    pub fn is_overriding(self) -> bool {
        match self {
            ReviewState::Approved | ReviewState::ChangesRequested | ReviewState::Dismissed => true,
            ReviewState::Commented | ReviewState::Pending => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewEvent {
    pub reviewer: String,
    pub state: ReviewState,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

impl ReviewEvent {
    pub fn new(reviewer: impl Into<String>, state: ReviewState, submitted_at: OffsetDateTime) -> Self {
        Self {
            reviewer: reviewer.into(),
            state,
            submitted_at,
        }
    }
}

/// Count reviewers whose latest overriding review is an approval.
///
/// Events may arrive in any order. A reviewer's verdict only moves forward when an
/// overriding event is strictly newer than the one recorded, so of two events with the
/// same timestamp the first one seen is kept.
pub fn count_active_approvals<'a, I>(events: I) -> usize
where
    I: IntoIterator<Item = &'a ReviewEvent>,
{
    let mut latest: HashMap<&str, (OffsetDateTime, ReviewState)> = HashMap::new();

    for event in events {
        if !event.state.is_overriding() {
            continue;
        }
        latest
            .entry(event.reviewer.as_str())
            .and_modify(|entry| {
                if event.submitted_at > entry.0 {
                    *entry = (event.submitted_at, event.state);
                }
            })
            .or_insert((event.submitted_at, event.state));
    }

    latest
        .values()
        .filter(|(_, state)| *state == ReviewState::Approved)
        .count()
}
