use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Parse a GitHub `DateTime` scalar ("2024-05-01T12:00:00Z", optionally with fractional
/// seconds or a numeric offset).
pub fn parse_github_datetime(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s.trim(), &Rfc3339).ok()
}
