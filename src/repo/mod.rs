use anyhow::Result;

use crate::domain::pull_request::{PullRequestRef, PullRequestSnapshot};

pub mod github;
pub mod memory;

pub trait PullRequestSource {
    fn fetch(&self, pr: &PullRequestRef) -> Result<PullRequestSnapshot>;
}
