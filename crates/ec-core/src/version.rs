//! Migration version tokens.
//!
//! A version is `YYYY-MM-DD-HH-MM-xxxxx`: a minute-resolution timestamp
//! followed by a 5-character alphanumeric token. The fixed-width timestamp
//! prefix makes lexical order equal chronological order, so versions are
//! compared as plain strings everywhere.

use crate::error::CoreResult;
use crate::newtype_string::define_validated_string;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

/// Width of the random token that follows the timestamp.
pub const VERSION_TOKEN_LEN: usize = 5;

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_regex() -> &'static Regex {
    VERSION_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[A-Za-z0-9]{5}$")
            .expect("valid regex")
    })
}

fn is_valid_version(value: &str) -> bool {
    version_regex().is_match(value)
}

define_validated_string! {
    /// Sortable identifier of one migration.
    pub struct Version;
    check = is_valid_version;
    error = InvalidVersion;
}

impl Version {
    /// Build a version from a timestamp and a random token.
    pub fn from_parts(at: NaiveDateTime, token: &str) -> CoreResult<Self> {
        Self::new(format!("{}-{}", at.format("%Y-%m-%d-%H-%M"), token))
    }

    /// The timestamp portion (`YYYY-MM-DD-HH-MM`).
    pub fn timestamp_part(&self) -> &str {
        &self.as_str()[..self.len() - VERSION_TOKEN_LEN - 1]
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
