//! Locate the pull request a GitHub Actions run was triggered for.

use std::path::Path;

use crate::config::ConfigError;
use crate::domain::pull_request::PullRequestRef;

const SUPPORTED_EVENTS: [&str; 3] = ["pull_request", "pull_request_target", "pull_request_review"];

#[derive(Debug, serde::Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestField>,
    repository: Option<RepositoryField>,
}

#[derive(Debug, serde::Deserialize)]
struct PullRequestField {
    number: u64,
}

#[derive(Debug, serde::Deserialize)]
struct RepositoryField {
    name: String,
    owner: OwnerField,
}

#[derive(Debug, serde::Deserialize)]
struct OwnerField {
    login: String,
}

pub fn pull_request_from_env() -> Result<PullRequestRef, ConfigError> {
    let name = std::env::var("GITHUB_EVENT_NAME")
        .map_err(|_| ConfigError::MissingEventContext("GITHUB_EVENT_NAME"))?;
    let path = std::env::var("GITHUB_EVENT_PATH")
        .map_err(|_| ConfigError::MissingEventContext("GITHUB_EVENT_PATH"))?;
    pull_request_from_event(&name, Path::new(&path))
}

pub fn pull_request_from_event(event_name: &str, payload_path: &Path) -> Result<PullRequestRef, ConfigError> {
    if !SUPPORTED_EVENTS.contains(&event_name) {
        return Err(ConfigError::UnsupportedEvent(event_name.to_string()));
    }

    let raw = std::fs::read_to_string(payload_path).map_err(|e| {
        ConfigError::InvalidEventPayload(format!("failed to read {}: {e}", payload_path.display()))
    })?;
    let payload: EventPayload =
        serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidEventPayload(e.to_string()))?;

    let pr = payload
        .pull_request
        .ok_or_else(|| ConfigError::InvalidEventPayload("missing pull_request".to_string()))?;
    let repo = payload
        .repository
        .ok_or_else(|| ConfigError::InvalidEventPayload("missing repository".to_string()))?;

    Ok(PullRequestRef {
        owner: repo.owner.login,
        repo: repo.name,
        number: pr.number,
    })
}
