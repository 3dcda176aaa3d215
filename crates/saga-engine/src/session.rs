//! Repository-connection lifecycle.

use serde::Serialize;

/// The connected repository, known once a session is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoInfo {
    pub owner: String,
    pub name: String,
    pub is_fork: bool,
}

/// `NoSession → Creating → Active`, with `Creating → NoSession` on
/// failure. There is no teardown path from `Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    NoSession,
    Creating,
    Active {
        session_id: String,
        repo: RepoInfo,
    },
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            SessionState::Active { session_id, .. } => Some(session_id),
            _ => None,
        }
    }
}

/// Minimal well-formedness check for a repository URL, applied before
/// any request leaves the machine: an http(s) URL with a host and at
/// least an owner and a repository path segment.
pub fn validate_repo_url(repo_url: &str) -> Result<(), String> {
    let trimmed = repo_url.trim();
    if trimmed.is_empty() {
        return Err("repository URL is empty".to_string());
    }
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| format!("not an http(s) URL: {trimmed}"))?;
    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let host = segments.next();
    let owner = segments.next();
    let name = segments.next();
    match (host, owner, name) {
        (Some(_), Some(_), Some(_)) => Ok(()),
        _ => Err(format!("expected https://host/owner/repo, got: {trimmed}")),
    }
}
