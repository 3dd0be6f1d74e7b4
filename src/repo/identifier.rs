//! GitHub repository reference parsing.
//!
//! Turns whatever the user pasted into the search box into a validated
//! `owner/name` pair. Three shapes are accepted, tried in order:
//!
//! - `https://github.com/<owner>/<repo>[/anything...]` (also `http://`)
//! - `git@github.com:<owner>/<repo>[.git]`
//! - `<owner>/<repo>`

use std::fmt;
use tracing::debug;

const HTTPS_PREFIX: &str = "https://github.com/";
const HTTP_PREFIX: &str = "http://github.com/";
const SSH_PREFIX: &str = "git@github.com:";

/// A validated repository reference.
///
/// Only [`RepositoryIdentifier::parse`] can build one, so both segments
/// always satisfy [`is_valid_segment`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentifier {
    owner: String,
    name: String,
}

impl RepositoryIdentifier {
    /// Parse a raw repository reference. Returns `None` for anything that
    /// is not one of the accepted shapes or carries an invalid segment.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize(raw);

        let parsed = parse_web_url(normalized)
            .or_else(|| parse_ssh_url(normalized))
            .or_else(|| parse_bare(normalized));

        if parsed.is_none() {
            debug!("Rejected repository reference: {:?}", raw);
        }
        parsed
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn from_segments(owner: &str, name: &str) -> Option<Self> {
        if is_valid_segment(owner) && is_valid_segment(name) {
            Some(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            })
        } else {
            None
        }
    }
}

impl fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Trim, then drop one trailing `.git` and one trailing `/`.
fn normalize(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    trimmed.strip_suffix('/').unwrap_or(trimmed)
}

fn parse_web_url(url: &str) -> Option<RepositoryIdentifier> {
    let rest = url
        .strip_prefix(HTTPS_PREFIX)
        .or_else(|| url.strip_prefix(HTTP_PREFIX))?;

    // Anything after the repo segment (issues, tree/main, ...) is ignored.
    let mut parts = rest.splitn(3, '/');
    let owner = parts.next()?;
    let name = parts.next()?;
    RepositoryIdentifier::from_segments(owner, name)
}

fn parse_ssh_url(url: &str) -> Option<RepositoryIdentifier> {
    let rest = url.strip_prefix(SSH_PREFIX)?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, name) = rest.split_once('/')?;
    RepositoryIdentifier::from_segments(owner, name)
}

fn parse_bare(reference: &str) -> Option<RepositoryIdentifier> {
    let (owner, name) = reference.split_once('/')?;
    RepositoryIdentifier::from_segments(owner, name)
}

/// A segment is non-empty, made of `[A-Za-z0-9._-]`, and does not start
/// with `.` or `-`.
pub fn is_valid_segment(segment: &str) -> bool {
    let Some(first) = segment.chars().next() else {
        return false;
    };
    if first == '.' || first == '-' {
        return false;
    }
    segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
