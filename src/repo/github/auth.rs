use anyhow::{Result, anyhow};

fn non_empty_token(raw: &str, origin: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("GitHub token from {origin} is empty after trimming"));
    }
    Ok(trimmed.to_string())
}

/// Resolve the GitHub token: the explicit token input, else `GITHUB_TOKEN`.
///
/// `env_token` is the raw `GITHUB_TOKEN` value, if set.
pub fn resolve_github_token(explicit: Option<&str>, env_token: Option<&str>) -> Result<String> {
    match (explicit, env_token) {
        (Some(token), _) => non_empty_token(token, "the token input"),
        (None, Some(token)) => non_empty_token(token, "env GITHUB_TOKEN"),
        (None, None) => Err(anyhow!(
            "GitHub token is required (--token, INPUT_TOKEN or GITHUB_TOKEN)"
        )),
    }
}
