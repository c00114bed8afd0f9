use thiserror::Error;

use crate::domain::threshold::ThresholdConfig;

/// Fatal configuration problems, reported before any GitHub call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("label prefix must not be empty")]
    EmptyLabelPrefix,

    #[error("default reviewers must be a whole number, got {0:?}")]
    InvalidDefaultReviewers(String),

    #[error("default reviewers must not be negative, got {0}")]
    NegativeDefaultReviewers(i64),

    #[error("GitHub token is empty after trimming")]
    EmptyToken,

    #[error("unsupported trigger event {0:?}; run on pull_request, pull_request_target or pull_request_review")]
    UnsupportedEvent(String),

    #[error("{0} is not set; pass --pull-request or run inside GitHub Actions")]
    MissingEventContext(&'static str),

    #[error("event payload has no pull request: {0}")]
    InvalidEventPayload(String),
}

/// Unvalidated inputs as they arrive from flags or the environment.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub label_prefix: String,
    pub default_reviewers: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub threshold: ThresholdConfig,
    pub token: Option<String>,
}

impl GateConfig {
    pub fn from_inputs(raw: RawInputs) -> Result<Self, ConfigError> {
        if raw.label_prefix.is_empty() {
            return Err(ConfigError::EmptyLabelPrefix);
        }

        let default_threshold = raw
            .default_reviewers
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidDefaultReviewers(raw.default_reviewers.clone()))?;
        if default_threshold < 0 {
            return Err(ConfigError::NegativeDefaultReviewers(default_threshold));
        }

        let token = match raw.token {
            Some(t) => {
                let trimmed = t.trim();
                if trimmed.is_empty() {
                    return Err(ConfigError::EmptyToken);
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        Ok(Self {
            threshold: ThresholdConfig::new(raw.label_prefix, default_threshold),
            token,
        })
    }
}
