//! Network address of an inference backend candidate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A backend endpoint: scheme + host + port, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendAddress(String);

/// Error returned when a string is not a usable backend address
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid backend address '{0}': expected http:// or https:// URL")]
pub struct InvalidAddress(pub String);

impl BackendAddress {
    /// Parse an address, trimming whitespace and trailing slashes
    pub fn parse(raw: &str) -> Result<Self, InvalidAddress> {
        let trimmed = raw.trim().trim_end_matches('/');
        let host = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"));
        match host {
            Some(h) if !h.is_empty() => Ok(Self(trimmed.to_string())),
            _ => Err(InvalidAddress(raw.to_string())),
        }
    }

    /// Build `<address>/<path>`
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BackendAddress {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BackendAddress {
    type Error = InvalidAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BackendAddress> for String {
    fn from(value: BackendAddress) -> Self {
        value.0
    }
}
