use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::Deserialize;

use super::review::ReviewEvent;
use super::threshold::Label;

/// GitHub's aggregate review decision for a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    ReviewRequired,
    Approved,
    ChangesRequested,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

impl FromStr for PullRequestRef {
    type Err = anyhow::Error;

    // "{owner}/{repo}#{number}"
    fn from_str(s: &str) -> Result<Self> {
        let (slug, number) = s
            .trim()
            .rsplit_once('#')
            .ok_or_else(|| anyhow!("expected owner/repo#number, got {s:?}"))?;
        let (owner, repo) = slug
            .split_once('/')
            .ok_or_else(|| anyhow!("expected owner/repo#number, got {s:?}"))?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(anyhow!("expected owner/repo#number, got {s:?}"));
        }
        let number = number
            .parse::<u64>()
            .map_err(|e| anyhow!("invalid pull request number in {s:?}: {e}"))?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }
}

/// Everything the gate needs to know about one pull request.
///
/// `reviews` and `labels` are whatever window the source fetched; `total_reviews` and
/// `total_labels` are the upstream counts, so callers can tell when the window cut
/// something off.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestSnapshot {
    #[serde(default)]
    pub review_decision: Option<ReviewDecision>,
    #[serde(default)]
    pub reviews: Vec<ReviewEvent>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub total_reviews: Option<usize>,
    #[serde(default)]
    pub total_labels: Option<usize>,
}
