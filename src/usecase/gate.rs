use std::fmt;

use crate::domain::pull_request::{PullRequestSnapshot, ReviewDecision};
use crate::domain::review::count_active_approvals;
use crate::domain::threshold::{Resolution, ThresholdConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    ChangesRequested,
    InsufficientApprovals { approvals: usize, threshold: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(FailReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateWarning {
    NoMatchingLabel { prefix: String, default: i64 },
    ThresholdBelowOne { threshold: i64 },
    ThresholdBelowDefault { threshold: i64, default: i64 },
    ReviewWindowTruncated { fetched: usize, total: usize },
    LabelWindowTruncated { fetched: usize, total: usize },
}

#[derive(Debug, Clone)]
pub struct GateReport {
    /// `None` when the gate failed before counting.
    pub approvals: Option<usize>,
    pub threshold: Option<i64>,
    pub verdict: Verdict,
    pub warnings: Vec<GateWarning>,
}

impl GateReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    pub fn log(&self) {
        for w in &self.warnings {
            tracing::warn!("{w}");
        }
        match &self.verdict {
            Verdict::Pass => tracing::info!(
                approvals = ?self.approvals,
                threshold = ?self.threshold,
                "{}",
                self.verdict
            ),
            Verdict::Fail(_) => tracing::error!(
                approvals = ?self.approvals,
                threshold = ?self.threshold,
                "{}",
                self.verdict
            ),
        }
    }
}

/// Decide whether a pull request has enough approvals for the threshold its labels ask for.
pub fn evaluate(snapshot: &PullRequestSnapshot, cfg: &ThresholdConfig) -> GateReport {
    let mut warnings = window_warnings(snapshot);

    if snapshot.review_decision == Some(ReviewDecision::ChangesRequested) {
        return GateReport {
            approvals: None,
            threshold: None,
            verdict: Verdict::Fail(FailReason::ChangesRequested),
            warnings,
        };
    }

    let resolution = cfg.resolve(&snapshot.labels);
    match resolution {
        Resolution::Default(default) => warnings.push(GateWarning::NoMatchingLabel {
            prefix: cfg.label_prefix.clone(),
            default,
        }),
        Resolution::Labeled { value, matched } => {
            tracing::debug!(matched, value, "threshold taken from labels");
        }
    }
    let threshold = resolution.value();
    if threshold < 1 {
        warnings.push(GateWarning::ThresholdBelowOne { threshold });
    }
    if threshold < cfg.default_threshold {
        warnings.push(GateWarning::ThresholdBelowDefault {
            threshold,
            default: cfg.default_threshold,
        });
    }

    let approvals = count_active_approvals(&snapshot.reviews);
    let verdict = if approvals as i64 >= threshold {
        Verdict::Pass
    } else {
        Verdict::Fail(FailReason::InsufficientApprovals {
            approvals,
            threshold,
        })
    };

    GateReport {
        approvals: Some(approvals),
        threshold: Some(threshold),
        verdict,
        warnings,
    }
}

fn window_warnings(snapshot: &PullRequestSnapshot) -> Vec<GateWarning> {
    let mut out = Vec::new();
    if let Some(total) = snapshot.total_reviews
        && total > snapshot.reviews.len()
    {
        out.push(GateWarning::ReviewWindowTruncated {
            fetched: snapshot.reviews.len(),
            total,
        });
    }
    if let Some(total) = snapshot.total_labels
        && total > snapshot.labels.len()
    {
        out.push(GateWarning::LabelWindowTruncated {
            fetched: snapshot.labels.len(),
            total,
        });
    }
    out
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "required reviews satisfied"),
            Verdict::Fail(FailReason::ChangesRequested) => {
                write!(f, "changes were requested on this pull request")
            }
            Verdict::Fail(FailReason::InsufficientApprovals {
                approvals,
                threshold,
            }) => write!(
                f,
                "{approvals} approving review(s), {threshold} required"
            ),
        }
    }
}

impl fmt::Display for GateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateWarning::NoMatchingLabel { prefix, default } => write!(
                f,
                "no label starts with {prefix:?}; requiring the default of {default} review(s)"
            ),
            GateWarning::ThresholdBelowOne { threshold } => write!(
                f,
                "required reviews resolved to {threshold}; any pull request will pass"
            ),
            GateWarning::ThresholdBelowDefault { threshold, default } => write!(
                f,
                "labels lower the requirement to {threshold}, below the default of {default}"
            ),
            GateWarning::ReviewWindowTruncated { fetched, total } => write!(
                f,
                "only the latest {fetched} of {total} reviews were considered"
            ),
            GateWarning::LabelWindowTruncated { fetched, total } => write!(
                f,
                "only the first {fetched} of {total} labels were considered"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::{ReviewEvent, ReviewState};
    use crate::domain::threshold::Label;
    use time::macros::datetime;

    const PREFIX: &str = "required-reviews/";

    fn approvals(who: &[&str]) -> Vec<ReviewEvent> {
        who.iter()
            .map(|w| ReviewEvent::new(*w, ReviewState::Approved, datetime!(2024-05-01 12:00 UTC)))
            .collect()
    }

    fn snapshot(reviewers: &[&str], labels: &[&str]) -> PullRequestSnapshot {
        PullRequestSnapshot {
            review_decision: Some(ReviewDecision::ReviewRequired),
            reviews: approvals(reviewers),
            labels: labels.iter().map(|l| Label::new(*l)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn passes_when_labels_are_met() {
        let report = evaluate(
            &snapshot(&["a", "b"], &["required-reviews/2"]),
            &ThresholdConfig::new(PREFIX, 1),
        );
        assert!(report.passed());
        assert_eq!(report.approvals, Some(2));
        assert_eq!(report.threshold, Some(2));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn fails_when_short_of_label_threshold() {
        let report = evaluate(
            &snapshot(&["a"], &["required-reviews/3"]),
            &ThresholdConfig::new(PREFIX, 1),
        );
        assert_eq!(
            report.verdict,
            Verdict::Fail(FailReason::InsufficientApprovals {
                approvals: 1,
                threshold: 3
            })
        );
    }

    #[test]
    fn changes_requested_short_circuits() {
        let mut snap = snapshot(&["a", "b", "c"], &["required-reviews/1"]);
        snap.review_decision = Some(ReviewDecision::ChangesRequested);
        let report = evaluate(&snap, &ThresholdConfig::new(PREFIX, 1));
        assert_eq!(report.verdict, Verdict::Fail(FailReason::ChangesRequested));
        assert_eq!(report.threshold, None);
        assert_eq!(report.approvals, None);
    }

    #[test]
    fn missing_label_warns_and_uses_default() {
        let report = evaluate(&snapshot(&["a"], &["bug"]), &ThresholdConfig::new(PREFIX, 2));
        assert!(!report.passed());
        assert_eq!(report.threshold, Some(2));
        assert_eq!(
            report.warnings,
            vec![GateWarning::NoMatchingLabel {
                prefix: PREFIX.to_string(),
                default: 2
            }]
        );
    }

    #[test]
    fn invalid_label_warns_but_still_decides() {
        let report = evaluate(
            &snapshot(&[], &["required-reviews/none"]),
            &ThresholdConfig::new(PREFIX, 2),
        );
        assert!(report.passed());
        assert_eq!(report.threshold, Some(0));
        assert_eq!(
            report.warnings,
            vec![
                GateWarning::ThresholdBelowOne { threshold: 0 },
                GateWarning::ThresholdBelowDefault {
                    threshold: 0,
                    default: 2
                },
            ]
        );
    }

    #[test]
    fn lower_label_warns_below_default() {
        let report = evaluate(
            &snapshot(&["a"], &["required-reviews/1"]),
            &ThresholdConfig::new(PREFIX, 2),
        );
        assert!(report.passed());
        assert_eq!(
            report.warnings,
            vec![GateWarning::ThresholdBelowDefault {
                threshold: 1,
                default: 2
            }]
        );
    }

    #[test]
    fn truncated_windows_are_reported() {
        let mut snap = snapshot(&["a"], &["required-reviews/1"]);
        snap.total_reviews = Some(35);
        snap.total_labels = Some(1);
        let report = evaluate(&snap, &ThresholdConfig::new(PREFIX, 1));
        assert_eq!(
            report.warnings,
            vec![GateWarning::ReviewWindowTruncated {
                fetched: 1,
                total: 35
            }]
        );
    }

    #[test]
    fn no_upstream_decision_still_counts() {
        let mut snap = snapshot(&["a"], &[]);
        snap.review_decision = None;
        let report = evaluate(&snap, &ThresholdConfig::new(PREFIX, 1));
        assert!(report.passed());
    }
}
