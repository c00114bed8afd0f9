use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use super::PullRequestSource;
use crate::domain::pull_request::{PullRequestRef, PullRequestSnapshot};

/// Serves pre-recorded snapshots, e.g. for offline runs and tests.
#[derive(Default)]
pub struct InMemoryPullRequestSource {
    items: HashMap<PullRequestRef, PullRequestSnapshot>,
}

impl InMemoryPullRequestSource {
    pub fn with_seed(seed: impl IntoIterator<Item = (PullRequestRef, PullRequestSnapshot)>) -> Self {
        let mut source = Self::default();
        source.items.extend(seed);
        source
    }

    /// Load a JSON object keyed by `owner/repo#number`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
        let by_key: HashMap<String, PullRequestSnapshot> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to decode snapshot file {}", path.display()))?;

        let mut seed = Vec::with_capacity(by_key.len());
        for (key, snapshot) in by_key {
            let pr = key
                .parse::<PullRequestRef>()
                .with_context(|| format!("bad key in snapshot file {}", path.display()))?;
            seed.push((pr, snapshot));
        }
        Ok(Self::with_seed(seed))
    }
}

impl PullRequestSource for InMemoryPullRequestSource {
    fn fetch(&self, pr: &PullRequestRef) -> Result<PullRequestSnapshot> {
        self.items
            .get(pr)
            .cloned()
            .ok_or_else(|| anyhow!("no snapshot recorded for {pr}"))
    }
}
