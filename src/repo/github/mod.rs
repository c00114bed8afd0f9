pub mod auth;
pub mod event;
pub mod model;
mod timeutil;

use anyhow::{Context, Result, anyhow};
use model::{GraphQlPayload, GraphQlResponse, PullRequestData, PullRequestNode, PullRequestVars, ReviewNode};
use octocrab::Octocrab;
use timeutil::parse_github_datetime;

use super::PullRequestSource;
use crate::domain::pull_request::{PullRequestRef, PullRequestSnapshot, ReviewDecision};
use crate::domain::review::{ReviewEvent, ReviewState};
use crate::domain::threshold::Label;

/// Only the most recent reviews are fetched; older ones are invisible to the gate.
pub const REVIEW_WINDOW: i32 = 20;
/// Only the first labels are fetched.
pub const LABEL_WINDOW: i32 = 20;

// GitHub reports deleted accounts with a null author.
const GHOST_LOGIN: &str = "ghost";

const PULL_REQUEST_QUERY: &str = r#"
query ($owner: String!, $name: String!, $number: Int!, $review_window: Int!, $label_window: Int!) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) {
      reviewDecision
      reviews(last: $review_window, states: [APPROVED, CHANGES_REQUESTED, DISMISSED, COMMENTED, PENDING]) {
        totalCount
        nodes {
          author {
            login
          }
          state
          submittedAt
          createdAt
        }
      }
      labels(first: $label_window) {
        totalCount
        nodes {
          name
        }
      }
    }
  }
}
"#;

fn map_review_decision(raw: Option<&str>) -> Option<ReviewDecision> {
    match raw? {
        "REVIEW_REQUIRED" => Some(ReviewDecision::ReviewRequired),
        "APPROVED" => Some(ReviewDecision::Approved),
        "CHANGES_REQUESTED" => Some(ReviewDecision::ChangesRequested),
        other => {
            tracing::warn!("ignoring unknown review decision {other:?}");
            None
        }
    }
}

fn map_review_state(raw: &str) -> Option<ReviewState> {
    match raw {
        "APPROVED" => Some(ReviewState::Approved),
        "CHANGES_REQUESTED" => Some(ReviewState::ChangesRequested),
        "DISMISSED" => Some(ReviewState::Dismissed),
        "COMMENTED" => Some(ReviewState::Commented),
        "PENDING" => Some(ReviewState::Pending),
        _ => None,
    }
}

fn to_review_event(node: ReviewNode) -> Option<ReviewEvent> {
    let reviewer = node
        .author
        .map(|a| a.login)
        .unwrap_or_else(|| GHOST_LOGIN.to_string());

    let Some(state) = node.state.as_deref().and_then(map_review_state) else {
        tracing::warn!(%reviewer, state = ?node.state, "skipping review with unknown state");
        return None;
    };

    // Pending reviews have no submittedAt yet.
    let submitted_at = node
        .submitted_at
        .as_deref()
        .and_then(parse_github_datetime)
        .or_else(|| node.created_at.as_deref().and_then(parse_github_datetime));
    let Some(submitted_at) = submitted_at else {
        tracing::warn!(%reviewer, ?state, "skipping review without a usable timestamp");
        return None;
    };

    Some(ReviewEvent::new(reviewer, state, submitted_at))
}

fn to_snapshot(node: PullRequestNode) -> PullRequestSnapshot {
    let review_decision = map_review_decision(node.review_decision.as_deref());

    let (reviews, total_reviews) = match node.reviews {
        Some(conn) => (
            conn.nodes
                .unwrap_or_default()
                .into_iter()
                .filter_map(to_review_event)
                .collect(),
            conn.total_count,
        ),
        None => (Vec::new(), None),
    };

    let (labels, total_labels) = match node.labels {
        Some(conn) => (
            conn.nodes
                .unwrap_or_default()
                .into_iter()
                .map(|n| Label::new(n.name))
                .collect(),
            conn.total_count,
        ),
        None => (Vec::new(), None),
    };

    PullRequestSnapshot {
        review_decision,
        reviews,
        labels,
        total_reviews,
        total_labels,
    }
}

fn decode_response(pr: &PullRequestRef, resp: GraphQlResponse<PullRequestData>) -> Result<PullRequestSnapshot> {
    if let Some(errors) = resp.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
        return Err(anyhow!(
            "GitHub GraphQL query for {pr} failed: {}",
            messages.join("; ")
        ));
    }
    let node = resp
        .data
        .and_then(|d| d.repository)
        .and_then(|r| r.pull_request)
        .ok_or_else(|| anyhow!("pull request {pr} not found"))?;
    Ok(to_snapshot(node))
}

pub async fn fetch_pull_request(octo: &Octocrab, pr: &PullRequestRef) -> Result<PullRequestSnapshot> {
    let payload = GraphQlPayload {
        query: PULL_REQUEST_QUERY,
        variables: PullRequestVars {
            owner: pr.owner.clone(),
            name: pr.repo.clone(),
            number: i64::try_from(pr.number).context("pull request number out of range")?,
            review_window: REVIEW_WINDOW,
            label_window: LABEL_WINDOW,
        },
    };
    let resp: GraphQlResponse<PullRequestData> = octo
        .graphql(&payload)
        .await
        .map_err(|e| anyhow!("GitHub GraphQL pull request query failed: {e:?}"))?;

    let snapshot = decode_response(pr, resp)?;
    tracing::debug!(
        %pr,
        reviews = snapshot.reviews.len(),
        labels = snapshot.labels.len(),
        decision = ?snapshot.review_decision,
        "fetched pull request"
    );
    Ok(snapshot)
}

/// Base URI for octocrab so that its `/graphql` request lands on the GraphQL endpoint.
///
/// `GITHUB_GRAPHQL_URL` is used as-is minus its `/graphql` suffix. Otherwise the REST base
/// is used, with a GitHub Enterprise Server `/api/v3` turned into `/api`, since GHES
/// serves GraphQL at `/api/graphql`.
pub fn graphql_base_uri(graphql_url: Option<&str>, api_url: Option<&str>) -> Option<String> {
    if let Some(url) = graphql_url.map(|u| u.trim().trim_end_matches('/')).filter(|u| !u.is_empty()) {
        return Some(url.strip_suffix("/graphql").unwrap_or(url).to_string());
    }
    let url = api_url.map(|u| u.trim().trim_end_matches('/')).filter(|u| !u.is_empty())?;
    Some(url.strip_suffix("/v3").unwrap_or(url).to_string())
}

pub struct GithubSource {
    token: String,
    api_base: Option<String>,
}

impl GithubSource {
    pub fn new(token: String, api_base: Option<String>) -> Self {
        Self { token, api_base }
    }
}

impl PullRequestSource for GithubSource {
    /// Synchronous facade that owns its own Tokio runtime.
    fn fetch(&self, pr: &PullRequestRef) -> Result<PullRequestSnapshot> {
        let token = self.token.clone();
        let api_base = self.api_base.clone();
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| anyhow!("failed to build tokio runtime: {e}"))?;

        rt.block_on(async move {
            let mut builder = Octocrab::builder().personal_token(token);
            if let Some(api) = api_base.as_deref() {
                builder = builder
                    .base_uri(api)
                    .map_err(|e| anyhow!("invalid GitHub API base {api:?}: {e}"))?;
            }
            let octo = builder
                .build()
                .map_err(|e| anyhow!("failed to init GitHub client: {e}"))?;
            fetch_pull_request(&octo, pr).await
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::domain::review::count_active_approvals;

    fn pr() -> PullRequestRef {
        "octo/widgets#3".parse().unwrap()
    }

    fn decode(body: serde_json::Value) -> Result<PullRequestSnapshot> {
        let resp: GraphQlResponse<PullRequestData> = serde_json::from_value(body).unwrap();
        decode_response(&pr(), resp)
    }

    #[test]
    fn maps_reviews_and_labels() {
        let snap = decode(json!({
            "data": {"repository": {"pullRequest": {
                "reviewDecision": "REVIEW_REQUIRED",
                "reviews": {
                    "totalCount": 24,
                    "nodes": [
                        {"author": {"login": "alice"}, "state": "CHANGES_REQUESTED",
                         "submittedAt": "2024-05-01T10:00:00Z", "createdAt": "2024-05-01T09:59:00Z"},
                        {"author": {"login": "alice"}, "state": "APPROVED",
                         "submittedAt": "2024-05-01T11:00:00Z", "createdAt": "2024-05-01T11:00:00Z"},
                        {"author": null, "state": "APPROVED",
                         "submittedAt": "2024-05-01T12:00:00Z", "createdAt": "2024-05-01T12:00:00Z"}
                    ]
                },
                "labels": {"totalCount": 2, "nodes": [{"name": "bug"}, {"name": "required-reviews/2"}]}
            }}}
        }))
        .unwrap();

        assert_eq!(snap.review_decision, Some(ReviewDecision::ReviewRequired));
        assert_eq!(snap.total_reviews, Some(24));
        assert_eq!(snap.reviews.len(), 3);
        assert_eq!(snap.reviews[2].reviewer, GHOST_LOGIN);
        assert_eq!(snap.labels[1].name, "required-reviews/2");
        assert_eq!(count_active_approvals(&snap.reviews), 2);
    }

    #[test]
    fn pending_review_falls_back_to_created_at() {
        let snap = decode(json!({
            "data": {"repository": {"pullRequest": {
                "reviewDecision": null,
                "reviews": {"totalCount": 1, "nodes": [
                    {"author": {"login": "bob"}, "state": "PENDING",
                     "submittedAt": null, "createdAt": "2024-05-02T08:00:00Z"}
                ]},
                "labels": {"totalCount": 0, "nodes": []}
            }}}
        }))
        .unwrap();

        assert_eq!(snap.review_decision, None);
        assert_eq!(snap.reviews[0].state, ReviewState::Pending);
        assert_eq!(snap.reviews[0].submitted_at, datetime!(2024-05-02 08:00 UTC));
    }

    #[test]
    fn drops_reviews_without_timestamps_or_known_state() {
        let snap = decode(json!({
            "data": {"repository": {"pullRequest": {
                "reviewDecision": "APPROVED",
                "reviews": {"totalCount": 2, "nodes": [
                    {"author": {"login": "bob"}, "state": "APPROVED", "submittedAt": null, "createdAt": null},
                    {"author": {"login": "eve"}, "state": "SHRUGGED", "submittedAt": "2024-05-02T08:00:00Z", "createdAt": null}
                ]},
                "labels": null
            }}}
        }))
        .unwrap();

        assert!(snap.reviews.is_empty());
        assert!(snap.labels.is_empty());
        assert_eq!(snap.total_labels, None);
    }

    #[test]
    fn graphql_errors_are_reported() {
        let err = decode(json!({
            "data": null,
            "errors": [{"message": "Could not resolve to a Repository"}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Could not resolve"));
    }

    #[test]
    fn missing_pull_request_is_an_error() {
        let err = decode(json!({"data": {"repository": {"pullRequest": null}}})).unwrap_err();
        assert!(err.to_string().contains("octo/widgets#3"));
    }

    #[test]
    fn graphql_base_for_github_com_is_unchanged() {
        assert_eq!(
            graphql_base_uri(None, Some("https://api.github.com")),
            Some("https://api.github.com".to_string())
        );
        assert_eq!(
            graphql_base_uri(Some("https://api.github.com/graphql"), Some("https://api.github.com")),
            Some("https://api.github.com".to_string())
        );
    }

    #[test]
    fn graphql_base_for_enterprise_drops_rest_version() {
        assert_eq!(
            graphql_base_uri(None, Some("https://ghe.corp/api/v3/")),
            Some("https://ghe.corp/api".to_string())
        );
        assert_eq!(
            graphql_base_uri(Some("https://ghe.corp/api/graphql"), Some("https://ghe.corp/api/v3")),
            Some("https://ghe.corp/api".to_string())
        );
    }

    #[test]
    fn graphql_base_defaults_to_octocrab() {
        assert_eq!(graphql_base_uri(None, None), None);
        assert_eq!(graphql_base_uri(Some(" "), Some("")), None);
    }
}
