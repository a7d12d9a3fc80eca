//! Kernel version keys
//!
//! Kernel file names carry free-form version tokens such as
//! `5.10.0-8-amd64` or `6.6.0-45.0.0.54.oe2409.x86_64`. A [`VersionKey`]
//! splits such a token into a dotted numeric prefix and an opaque suffix so
//! that kernels of one release can be ordered oldest to newest.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Parsed, ordered form of a kernel version token.
///
/// The token is split on the first `-`. Everything before it is the numeric
/// prefix (split on `.`), everything after it is the suffix. A token without
/// a `-` is all prefix with an empty suffix.
///
/// # Lenient parsing
///
/// A prefix component that is not a non-negative integer parses as `0`
/// instead of failing. This keeps odd file names in the catalog and fixes
/// their position in the ordering; callers must not turn it into an error.
///
/// # Ordering
///
/// Keys compare component-wise over the longer numeric sequence, with
/// missing trailing components treated as `0`, then by suffix. The raw token
/// does not take part in comparison or equality, so `5.10` and `5.10.0`
/// compare equal.
#[derive(Debug, Clone, Serialize)]
pub struct VersionKey {
    numbers: Vec<u64>,
    suffix: String,
    raw: String,
}

impl VersionKey {
    /// Parse a raw version token
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let (prefix, suffix) = match raw.split_once('-') {
            Some((prefix, suffix)) => (prefix, suffix),
            None => (raw.as_str(), ""),
        };

        let numbers = prefix
            .split('.')
            .map(|part| part.parse::<u64>().unwrap_or(0))
            .collect();

        Self {
            numbers,
            suffix: suffix.to_string(),
            raw,
        }
    }

    /// Numeric components of the prefix
    pub fn numbers(&self) -> &[u64] {
        &self.numbers
    }

    /// Everything after the first `-`
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The token as it appeared in the file name
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Same ordering position, different label.
    ///
    /// Used for the synthetic `latest` entry of a release.
    pub fn relabel(&self, raw: impl Into<String>) -> Self {
        Self {
            numbers: self.numbers.clone(),
            suffix: self.suffix.clone(),
            raw: raw.into(),
        }
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.numbers.len().max(other.numbers.len());
        for i in 0..len {
            let a = self.numbers.get(i).copied().unwrap_or(0);
            let b = other.numbers.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.suffix.cmp(&other.suffix)
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
