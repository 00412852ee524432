// Repository reference parsing.
// Turns user input (URLs or owner/name tokens) into a canonical cache key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GitStatsError;

/// Remote metadata provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    GitHub,
}

impl Provider {
    /// Identifier used in records and store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
        }
    }

    /// Host serving the provider's web UI.
    pub fn web_host(&self) -> &'static str {
        match self {
            Provider::GitHub => "github.com",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical reference to a repository.
///
/// Owner and name are ASCII-lowercased, non-empty, and carry no `.git` suffix or
/// surrounding slashes. Construct through [`RepoRef::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    provider: Provider,
    owner: String,
    name: String,
    key: String,
}

impl RepoRef {
    /// Parse a repository reference.
    ///
    /// Accepts `https://github.com/OWNER/NAME[/...]` (query and fragment
    /// ignored) or a bare `OWNER/NAME`. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let provider = Provider::GitHub;
        let (owner, name) = match strip_web_prefix(input, provider.web_host()) {
            Some(path) => split_url_path(path)?,
            None => split_bare(input)?,
        };

        let owner = normalize_part(owner);
        let name = normalize_part(name);
        if owner.is_empty() || name.is_empty() {
            return None;
        }

        let key = format!("{}/{}", owner, name);
        Some(Self {
            provider,
            owner,
            name,
            key,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable `owner/name` key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for RepoRef {
    type Err = GitStatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| GitStatsError::InvalidRepo(s.to_string()))
    }
}

/// Strip `http(s)://<host>/` (case-insensitive) and return the remaining path.
fn strip_web_prefix<'a>(input: &'a str, host: &str) -> Option<&'a str> {
    let rest = strip_prefix_ignore_case(input, "https://")
        .or_else(|| strip_prefix_ignore_case(input, "http://"))?;
    let rest = strip_prefix_ignore_case(rest, host)?;
    rest.strip_prefix('/')
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &input[prefix.len()..])
}

/// Split `OWNER/NAME...` from a URL path. The owner runs up to the first
/// slash; the name stops at a slash, query, fragment, or whitespace.
fn split_url_path(path: &str) -> Option<(&str, &str)> {
    let (owner, rest) = path.split_once('/')?;
    if owner.is_empty() || owner.chars().any(char::is_whitespace) {
        return None;
    }

    let end = rest
        .find(|c: char| matches!(c, '/' | '#' | '?') || c.is_whitespace())
        .unwrap_or(rest.len());
    let name = &rest[..end];
    if name.is_empty() {
        return None;
    }

    Some((owner, name))
}

/// Split a bare `OWNER/NAME` token made of word characters, dots, and hyphens.
fn split_bare(input: &str) -> Option<(&str, &str)> {
    let (owner, name) = input.split_once('/')?;
    if is_token(owner) && is_token(name) {
        Some((owner, name))
    } else {
        None
    }
}

fn is_token(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Trim, drop a trailing `.git`, trim slashes, lowercase ASCII letters.
fn normalize_part(part: &str) -> String {
    let part = part.trim();
    let part = match part.len().checked_sub(4).and_then(|i| part.get(i..)) {
        Some(suffix) if suffix.eq_ignore_ascii_case(".git") => &part[..part.len() - 4],
        _ => part,
    };
    part.trim_matches('/').to_ascii_lowercase()
}
